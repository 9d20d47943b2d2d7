use std::sync::Arc;

use axum::{Extension, response::Response};

use solvendo_auth::Permission;

use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::RequestContext;

/// Run one scheduler pass for the caller's tenant and report the counts.
pub async fn run(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    if let Err(err) = authz::require(&ctx, &Permission::DLQ_WRITE) {
        return errors::forbidden(err);
    }

    match services
        .scheduler()
        .process_due(ctx.tenant_id(), services.now())
        .await
    {
        Ok(report) => errors::ok_with_message(report, "DLQ processing completed"),
        Err(err) => errors::domain_error(err, "DLQ message not found"),
    }
}

use std::sync::Arc;

use axum::{Extension, response::Response};

use solvendo_infra::stats;

use crate::app::{errors, services::AppServices};
use crate::context::RequestContext;

pub async fn get_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    let result = stats::compute(
        ctx.tenant_id(),
        services.segments(),
        services.dlq(),
        services.retries(),
        services.kpis(),
        services.now(),
    );
    match result {
        Ok(stats) => errors::ok(stats),
        Err(err) => errors::domain_error(err, "Stats unavailable"),
    }
}

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::rejection::JsonRejection,
    response::Response,
};

use solvendo_auth::Permission;
use solvendo_dunning::ConfigPatch;

use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::RequestContext;

const NOT_FOUND: &str = "Configuration not found";

pub async fn get_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    match services.configs().get(ctx.tenant_id()) {
        Ok(config) => errors::ok(config),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

pub async fn update_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<ConfigPatch>, JsonRejection>,
) -> Response {
    if let Err(err) = authz::require(&ctx, &Permission::CONFIG_WRITE) {
        return errors::forbidden(err);
    }
    let patch = match body {
        Ok(Json(patch)) => patch,
        Err(rejection) => return errors::bad_body(rejection),
    };

    match services.configs().update(ctx.tenant_id(), patch) {
        Ok(config) => errors::ok_with_message(config, "Dunning configuration updated successfully"),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

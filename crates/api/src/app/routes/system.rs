use std::sync::Arc;

use axum::{Extension, Json, response::IntoResponse};
use serde_json::json;

use crate::app::services::{AppServices, tenant_sse_stream};
use crate::context::RequestContext;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn whoami(Extension(ctx): Extension<RequestContext>) -> impl IntoResponse {
    Json(json!({
        "tenantId": ctx.tenant_id(),
        "principalId": ctx.principal_id(),
        "roles": ctx.roles(),
    }))
}

/// Tenant-scoped server-sent event stream of engine events.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> impl IntoResponse {
    tenant_sse_stream(&services, ctx.tenant_id())
}

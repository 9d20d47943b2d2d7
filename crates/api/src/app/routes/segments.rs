use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use serde_json::json;

use solvendo_auth::Permission;
use solvendo_dunning::{SegmentDraft, SegmentId, SegmentPatch};

use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::RequestContext;

const NOT_FOUND: &str = "Segment not found";

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    match services.segments().list(ctx.tenant_id()) {
        Ok(segments) => errors::ok(segments),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(segment_id): Path<String>,
) -> Response {
    // An unparseable id cannot name an existing segment.
    let Ok(segment_id) = segment_id.parse::<SegmentId>() else {
        return errors::fail(StatusCode::NOT_FOUND, NOT_FOUND);
    };
    match services.segments().get(ctx.tenant_id(), segment_id) {
        Ok(Some(segment)) => errors::ok(segment),
        Ok(None) => errors::fail(StatusCode::NOT_FOUND, NOT_FOUND),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<SegmentDraft>, JsonRejection>,
) -> Response {
    if let Err(err) = authz::require(&ctx, &Permission::SEGMENTS_WRITE) {
        return errors::forbidden(err);
    }
    let draft = match body {
        Ok(Json(draft)) => draft,
        Err(rejection) => return errors::bad_body(rejection),
    };

    match services
        .segments()
        .create(ctx.tenant_id(), draft, services.now())
    {
        Ok(segment) => {
            services.publish(ctx.tenant_id(), "segment.created", json!({ "id": segment.id }));
            errors::ok_with_message(segment, "Dunning segment created successfully")
        }
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(segment_id): Path<String>,
    body: Result<Json<SegmentPatch>, JsonRejection>,
) -> Response {
    if let Err(err) = authz::require(&ctx, &Permission::SEGMENTS_WRITE) {
        return errors::forbidden(err);
    }
    let Ok(segment_id) = segment_id.parse::<SegmentId>() else {
        return errors::fail(StatusCode::NOT_FOUND, NOT_FOUND);
    };
    let patch = match body {
        Ok(Json(patch)) => patch,
        Err(rejection) => return errors::bad_body(rejection),
    };

    match services
        .segments()
        .update(ctx.tenant_id(), segment_id, patch, services.now())
    {
        Ok(segment) => {
            services.publish(ctx.tenant_id(), "segment.updated", json!({ "id": segment.id }));
            errors::ok_with_message(segment, "Dunning segment updated successfully")
        }
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::Response,
};

use solvendo_auth::Permission;
use solvendo_dunning::{DlqIntake, DlqMessageId};
use solvendo_infra::stores::DlqFilter;

use crate::app::{
    dto::{self, DlqQuery},
    errors,
    services::AppServices,
};
use crate::authz;
use crate::context::RequestContext;

const NOT_FOUND: &str = "DLQ message not found";

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<DlqQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::bad_query(rejection),
    };
    if let Err(response) = dto::check_page(query.limit) {
        return response;
    }

    let filter = DlqFilter {
        status: query.status,
        priority: query.priority,
    };
    match services.dlq().list(ctx.tenant_id(), filter) {
        Ok(messages) => errors::ok(dto::paginate(
            "messages",
            messages,
            query.limit,
            query.offset,
        )),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

pub async fn add(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<DlqIntake>, JsonRejection>,
) -> Response {
    if let Err(err) = authz::require(&ctx, &Permission::DLQ_WRITE) {
        return errors::forbidden(err);
    }
    let intake = match body {
        Ok(Json(intake)) => intake,
        Err(rejection) => return errors::bad_body(rejection),
    };

    match services.scheduler().add_to_dlq(ctx.tenant_id(), intake) {
        Ok(message) => errors::ok_with_message(message, "Message added to DLQ successfully"),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

pub async fn retry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(dlq_id): Path<String>,
) -> Response {
    if let Err(err) = authz::require(&ctx, &Permission::DLQ_WRITE) {
        return errors::forbidden(err);
    }
    let Ok(dlq_id) = dlq_id.parse::<DlqMessageId>() else {
        return errors::fail(StatusCode::NOT_FOUND, NOT_FOUND);
    };

    match services.scheduler().retry_message(ctx.tenant_id(), dlq_id).await {
        Ok(attempt) => errors::ok_with_message(attempt, "DLQ message retry initiated successfully"),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

pub async fn resolve(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(dlq_id): Path<String>,
) -> Response {
    if let Err(err) = authz::require(&ctx, &Permission::DLQ_WRITE) {
        return errors::forbidden(err);
    }
    let Ok(dlq_id) = dlq_id.parse::<DlqMessageId>() else {
        return errors::fail(StatusCode::NOT_FOUND, NOT_FOUND);
    };

    match services.scheduler().resolve_message(ctx.tenant_id(), dlq_id) {
        Ok(message) => errors::ok_with_message(message, "DLQ message resolved successfully"),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

pub async fn requeue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(dlq_id): Path<String>,
) -> Response {
    if let Err(err) = authz::require(&ctx, &Permission::DLQ_WRITE) {
        return errors::forbidden(err);
    }
    let Ok(dlq_id) = dlq_id.parse::<DlqMessageId>() else {
        return errors::fail(StatusCode::NOT_FOUND, NOT_FOUND);
    };

    match services.scheduler().requeue_message(ctx.tenant_id(), dlq_id) {
        Ok(message) => errors::ok_with_message(message, "DLQ message requeued successfully"),
        Err(err) => errors::domain_error(err, NOT_FOUND),
    }
}

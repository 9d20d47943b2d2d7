use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, rejection::QueryRejection},
    response::Response,
};

use solvendo_infra::stores::RetryFilter;

use crate::app::{
    dto::{self, RetryQuery},
    errors,
    services::AppServices,
};
use crate::context::RequestContext;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<RetryQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::bad_query(rejection),
    };
    if let Err(response) = dto::check_page(query.limit) {
        return response;
    }

    let filter = RetryFilter {
        message_id: query.message_id,
        status: query.status,
    };
    match services.retries().list(ctx.tenant_id(), filter) {
        Ok(attempts) => errors::ok(dto::paginate(
            "retries",
            attempts,
            query.limit,
            query.offset,
        )),
        Err(err) => errors::domain_error(err, "Retry attempt not found"),
    }
}

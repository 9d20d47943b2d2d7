use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, rejection::QueryRejection},
    response::Response,
};

use solvendo_infra::stores::KpiFilter;

use crate::app::{
    dto::{self, KpiQuery},
    errors,
    services::AppServices,
};
use crate::context::RequestContext;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<KpiQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::bad_query(rejection),
    };
    if let Err(response) = dto::check_page(query.limit) {
        return response;
    }

    let filter = KpiFilter {
        segment_id: query.segment_id,
        period: query.period,
    };
    match services.kpis().list(ctx.tenant_id(), filter) {
        Ok(records) => errors::ok(dto::paginate("kpis", records, query.limit, query.offset)),
        Err(err) => errors::domain_error(err, "KPI not found"),
    }
}

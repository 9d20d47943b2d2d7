pub mod config;
pub mod dlq;
pub mod kpis;
pub mod process;
pub mod retries;
pub mod segments;
pub mod stats;
pub mod system;

use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated routes. The auth middleware is layered on by the caller.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .nest("/dunning-solid", dunning_router())
}

fn dunning_router() -> Router {
    Router::new()
        .route("/segments", get(segments::list).post(segments::create))
        .route(
            "/segments/:segment_id",
            get(segments::get_one).put(segments::update),
        )
        .route("/kpis", get(kpis::list))
        .route("/dlq", get(dlq::list).post(dlq::add))
        .route("/dlq/:dlq_id/retry", post(dlq::retry))
        .route("/dlq/:dlq_id/resolve", post(dlq::resolve))
        .route("/dlq/:dlq_id/requeue", post(dlq::requeue))
        .route("/retries", get(retries::list))
        .route("/config", get(config::get_config).put(config::update_config))
        .route("/stats", get(stats::get_stats))
        .route("/process", post(process::run))
}

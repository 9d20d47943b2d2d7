//! Application assembly: wiring stores, workers, auth, and routes.

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{Extension, Router, middleware::from_fn_with_state, routing::get};

use solvendo_auth::Hs256JwtValidator;
use solvendo_infra::delivery::{DeliveryChannel, LoggingDelivery};

use crate::middleware::{AuthState, auth_middleware};

/// Build the full application with the default (log-only) delivery channel.
pub fn build_app(jwt_secret: String) -> Router {
    build_app_with_channel(jwt_secret, Arc::new(LoggingDelivery))
}

/// Build the application with an injected delivery channel.
///
/// Tests use this to script delivery outcomes.
pub fn build_app_with_channel(jwt_secret: String, channel: Arc<dyn DeliveryChannel>) -> Router {
    let auth_state = AuthState {
        jwt: Arc::new(Hs256JwtValidator::new(jwt_secret.into_bytes())),
    };
    let services = Arc::new(services::build_services(channel));

    let protected = routes::router()
        .layer(Extension(services))
        .layer(from_fn_with_state(auth_state, auth_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}

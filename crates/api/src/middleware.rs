use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use solvendo_auth::JwtValidator;

use crate::app::errors;
use crate::context::RequestContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Validate the bearer token and attach a [`RequestContext`] to the request.
///
/// Failures short-circuit with an envelope-shaped 401 so unauthenticated
/// clients see the same body format as every other error.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return unauthorized();
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(error) => {
            debug!(%error, "token rejected");
            return unauthorized();
        }
    };

    req.extensions_mut().insert(RequestContext::new(
        claims.tenant_id,
        claims.sub,
        claims.roles,
    ));

    next.run(req).await
}

fn unauthorized() -> Response {
    errors::fail(axum::http::StatusCode::UNAUTHORIZED, "Unauthorized")
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

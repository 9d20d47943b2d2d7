//! Consistent response envelopes.
//!
//! Success: `{ success: true, data, message?, timestamp }`.
//! Failure: `{ success: false, error, message? }`.
//! Internal details are logged, not echoed to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use solvendo_auth::AuthzError;
use solvendo_core::DomainError;

pub fn ok<T: Serialize>(data: T) -> axum::response::Response {
    envelope(StatusCode::OK, data, None)
}

pub fn ok_with_message<T: Serialize>(data: T, message: &str) -> axum::response::Response {
    envelope(StatusCode::OK, data, Some(message))
}

fn envelope<T: Serialize>(
    status: StatusCode,
    data: T,
    message: Option<&str>,
) -> axum::response::Response {
    let mut body = json!({
        "success": true,
        "data": data,
        "timestamp": Utc::now(),
    });
    if let Some(message) = message {
        body["message"] = json!(message);
    }
    (status, Json(body)).into_response()
}

pub fn fail(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": error.into(),
        })),
    )
        .into_response()
}

pub fn fail_with_message(
    status: StatusCode,
    error: impl Into<String>,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": error.into(),
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a domain error onto the envelope.
///
/// `not_found_label` is the client-facing message for `NotFound` (e.g.
/// "Segment not found").
pub fn domain_error(err: DomainError, not_found_label: &str) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
            fail(StatusCode::BAD_REQUEST, msg)
        }
        DomainError::NotFound => fail(StatusCode::NOT_FOUND, not_found_label),
        DomainError::Conflict(msg) => fail(StatusCode::CONFLICT, msg),
        DomainError::InvariantViolation(msg) => fail(StatusCode::UNPROCESSABLE_ENTITY, msg),
        DomainError::Unauthorized => fail(StatusCode::FORBIDDEN, "forbidden"),
    }
}

pub fn forbidden(err: AuthzError) -> axum::response::Response {
    fail(StatusCode::FORBIDDEN, err.to_string())
}

pub fn bad_body(rejection: axum::extract::rejection::JsonRejection) -> axum::response::Response {
    fail_with_message(
        StatusCode::BAD_REQUEST,
        "Invalid request body",
        rejection.body_text(),
    )
}

pub fn bad_query(rejection: axum::extract::rejection::QueryRejection) -> axum::response::Response {
    fail_with_message(
        StatusCode::BAD_REQUEST,
        "Invalid query parameters",
        rejection.body_text(),
    )
}

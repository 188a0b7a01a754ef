use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use warden_core::DomainError;

/// Map the domain taxonomy onto HTTP statuses.
///
/// `CheckFailed` is deliberately a 5xx: an evaluation failure must never be
/// presented as `hasPermission: false` (fail-closed, but loudly).
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        DomainError::InvalidFormat(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_format", msg)
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvalidReference(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_reference", msg)
        }
        DomainError::CheckFailed(msg) => {
            tracing::error!("permission evaluation failed: {msg}");
            json_error(StatusCode::BAD_GATEWAY, "check_failed", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

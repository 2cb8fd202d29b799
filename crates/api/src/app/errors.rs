use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use nexium_infra::ServiceError;
use nexium_nfe::NfeError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        ServiceError::Lookup(msg) => json_error(StatusCode::BAD_GATEWAY, "lookup_error", msg),
        ServiceError::Persistence(msg) => {
            tracing::error!(error = %msg, "persistence failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "persistence_error", msg)
        }
    }
}

pub fn nfe_error_to_response(err: NfeError) -> axum::response::Response {
    json_error(StatusCode::UNPROCESSABLE_ENTITY, "parse_error", err.to_string())
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

/// Parse a path segment as a typed id.
pub fn parse_id<T: From<uuid::Uuid>>(raw: &str, what: &str) -> Result<T, axum::response::Response> {
    uuid::Uuid::parse_str(raw)
        .map(T::from)
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

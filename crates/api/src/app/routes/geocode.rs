use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};
use serde_json::json;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `200` with `{"result": null}` when nothing matched.
pub async fn geocode(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::GeocodeRequest>,
) -> axum::response::Response {
    match services.sites.geocode(&body.address, body.fallback).await {
        Ok(result) => Json(json!({ "result": result })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

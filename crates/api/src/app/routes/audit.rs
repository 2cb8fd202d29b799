use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::services::AppServices;

/// The retained audit log, newest first.
pub async fn list_entries(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(services.audit.load())
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::{get, post},
};

use nexium_core::NotificationId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:id/read", post(mark_read))
        .route("/:id/archive", post(archive))
}

pub async fn list_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    Query(filter): Query<dto::NotificationFilter>,
) -> axum::response::Response {
    match services.notifications.list(filter.unread_only).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: NotificationId = match errors::parse_id(&id, "notification") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.notifications.mark_read(id).await {
        Ok(n) => Json(n).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn archive(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: NotificationId = match errors::parse_id(&id, "notification") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.notifications.archive(id).await {
        Ok(n) => Json(n).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

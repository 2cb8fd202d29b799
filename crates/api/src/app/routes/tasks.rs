use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
};

use nexium_core::TaskId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id/status", post(move_task))
        .route("/:id", delete(delete_task))
}

pub async fn move_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::MoveTaskRequest>,
) -> axum::response::Response {
    let id: TaskId = match errors::parse_id(&id, "task") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.sites.move_task(id, body.status, ctx.actor()).await {
        Ok(task) => Json(task).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TaskId = match errors::parse_id(&id, "task") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.sites.delete_task(id, ctx.actor()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

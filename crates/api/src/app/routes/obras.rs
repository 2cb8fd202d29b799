use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use nexium_core::ObraId;
use nexium_sites::{CreateObra, CreateTask, UpdateObra};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_obra).get(list_obras))
        .route("/:id", get(get_obra).patch(update_obra).delete(delete_obra))
        .route("/:id/tarefas", post(create_task).get(list_tasks))
        .route("/:id/quadro", get(board))
}

fn obra_id(raw: &str) -> Result<ObraId, axum::response::Response> {
    errors::parse_id(raw, "obra")
}

pub async fn create_obra(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<CreateObra>,
) -> axum::response::Response {
    match services.sites.create_obra(body, ctx.actor()).await {
        Ok(obra) => (StatusCode::CREATED, Json(obra)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_obras(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.sites.list_obras().await {
        Ok(obras) => Json(obras).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_obra(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match obra_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.sites.get_obra(id).await {
        Ok(obra) => Json(obra).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_obra(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateObra>,
) -> axum::response::Response {
    let id = match obra_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.sites.update_obra(id, body, ctx.actor()).await {
        Ok(obra) => Json(obra).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_obra(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match obra_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.sites.delete_obra(id, ctx.actor()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<CreateTask>,
) -> axum::response::Response {
    let id = match obra_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.sites.create_task(id, body, ctx.actor()).await {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match obra_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(e) = services.sites.get_obra(id).await {
        return errors::service_error_to_response(e);
    }
    match services.sites.list_tasks(id).await {
        Ok(tasks) => Json(tasks).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Kanban view: tasks grouped by column.
pub async fn board(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match obra_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.sites.board(id).await {
        Ok(board) => Json(board).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

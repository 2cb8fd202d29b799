use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use nexium_core::{MaterialId, ObraId};
use nexium_inventory::{ProposedMovement, RegisterMaterial};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_material).get(list_materials))
        .route("/:id", get(get_material))
        .route("/:id/movimentacoes", post(apply_movement).get(list_movements))
}

pub async fn register_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<RegisterMaterial>,
) -> axum::response::Response {
    match services.stock.register_material(body, ctx.actor()).await {
        Ok(material) => (StatusCode::CREATED, Json(material)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_materials(
    Extension(services): Extension<Arc<AppServices>>,
    Query(filter): Query<dto::ObraFilter>,
) -> axum::response::Response {
    let obra_id = match filter.obra_id.as_deref().map(|raw| errors::parse_id::<ObraId>(raw, "obra")) {
        Some(Ok(id)) => Some(id),
        Some(Err(resp)) => return resp,
        None => None,
    };

    match services.stock.list_materials(obra_id).await {
        Ok(materials) => Json(materials).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_material(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MaterialId = match errors::parse_id(&id, "material") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.stock.get_material(id).await {
        Ok(material) => Json(material).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn apply_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::MovementRequest>,
) -> axum::response::Response {
    let id: MaterialId = match errors::parse_id(&id, "material") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let proposed = match ProposedMovement::new(id, body.quantity, body.reason, ctx.actor()) {
        Ok(p) => p,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.stock.apply_movement(proposed).await {
        Ok(applied) => (StatusCode::CREATED, Json(applied)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MaterialId = match errors::parse_id(&id, "material") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Err(e) = services.stock.get_material(id).await {
        return errors::service_error_to_response(e);
    }
    match services.stock.list_movements(id).await {
        Ok(movements) => Json(movements).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

//! NFe upload endpoints. Bodies are the raw XML document.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use nexium_core::ObraId;
use nexium_nfe::parse_invoice;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/parse", post(parse))
        .route("/import", post(import))
}

/// Extract supplier, key and items without touching stock.
pub async fn parse(body: Bytes) -> axum::response::Response {
    match parse_invoice(&body) {
        Ok(invoice) => {
            let total = invoice.total();
            Json(serde_json::json!({ "invoice": invoice, "total": total })).into_response()
        }
        Err(e) => errors::nfe_error_to_response(e),
    }
}

/// Parse and book every item as an incoming movement
/// (`?obra_id=` scopes the materials).
pub async fn import(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<dto::ObraFilter>,
    body: Bytes,
) -> axum::response::Response {
    let obra_id = match filter.obra_id.as_deref().map(|raw| errors::parse_id::<ObraId>(raw, "obra")) {
        Some(Ok(id)) => Some(id),
        Some(Err(resp)) => return resp,
        None => None,
    };
    let invoice = match parse_invoice(&body) {
        Ok(invoice) => invoice,
        Err(e) => return errors::nfe_error_to_response(e),
    };

    match services.stock.import_invoice(&invoice, obra_id, ctx.actor()).await {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

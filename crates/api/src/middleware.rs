use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use nexium_core::Actor;

use crate::app::errors::json_error;
use crate::context::ActorContext;

pub const ACTOR_HEADER: &str = "x-actor";

pub async fn actor_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let actor = match extract_actor(req.headers()) {
        Ok(actor) => actor,
        Err(msg) => return json_error(StatusCode::BAD_REQUEST, "invalid_actor", msg),
    };

    req.extensions_mut().insert(ActorContext::new(actor));
    next.run(req).await
}

/// A missing or blank header means the system actor.
fn extract_actor(headers: &HeaderMap) -> Result<Actor, &'static str> {
    let Some(value) = headers.get(ACTOR_HEADER) else {
        return Ok(Actor::system());
    };
    let value =
        std::str::from_utf8(value.as_bytes()).map_err(|_| "X-Actor must be valid UTF-8 text")?;
    if value.trim().is_empty() {
        return Ok(Actor::system());
    }
    Actor::new(value).map_err(|_| "X-Actor is not a valid actor label")
}

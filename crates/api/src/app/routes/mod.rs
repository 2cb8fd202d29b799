use axum::{
    Router,
    routing::{get, post},
};

pub mod audit;
pub mod geocode;
pub mod materials;
pub mod nfe;
pub mod notifications;
pub mod obras;
pub mod system;
pub mod tasks;

/// Router for every actor-scoped endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/materiais", materials::router())
        .nest("/notificacoes", notifications::router())
        .nest("/obras", obras::router())
        .nest("/tarefas", tasks::router())
        .nest("/nfe", nfe::router())
        .route("/auditoria", get(audit::list_entries))
        .route("/geocode", post(geocode::geocode))
}

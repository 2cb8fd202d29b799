//! Request bodies and query strings that do not map one-to-one onto a
//! domain command. Create/update bodies deserialize straight into the
//! commands (`RegisterMaterial`, `CreateObra`, `UpdateObra`, `CreateTask`).

use serde::Deserialize;

use nexium_sites::TaskStatus;

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    /// Signed delta: positive for entradas, negative for saídas.
    pub quantity: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
    /// Answer from the built-in city table when the search finds nothing.
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObraFilter {
    pub obra_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread_only: bool,
}

//! Entity trait: identity + creation time for persisted records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Something stored under a stable identifier.
///
/// Every Nexium record (obra, tarefa, material, movimentação, notificação) is
/// keyed by a UUID newtype and carries the instant it was created, which is the
/// default listing order.
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + Into<Uuid>;

    fn id(&self) -> Self::Id;

    fn created_at(&self) -> DateTime<Utc>;

    /// Raw UUID of the identifier, as used by storage keys.
    fn uuid(&self) -> Uuid {
        self.id().into()
    }
}

//! `nexium-core`: shared domain primitives.
//!
//! Identifiers, the actor label and the domain error model. No IO lives here.

pub mod actor;
pub mod entity;
pub mod error;
pub mod id;

pub use actor::Actor;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AuditEntryId, MaterialId, MovementId, NotificationId, ObraId, TaskId};

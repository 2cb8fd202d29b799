//! Inventory domain module.
//!
//! Materials, stock movements, the low-stock policy and the notifications it
//! produces, implemented as deterministic domain logic (no IO, no HTTP, no
//! storage). Persistence and sequencing live in `nexium-infra`.

pub mod material;
pub mod movement;
pub mod notification;
pub mod stock_alert;

pub use material::{Material, RegisterMaterial, clamped_quantity};
pub use movement::{Movement, MovementKind, ProposedMovement};
pub use notification::{NewNotification, Notification, NotificationCategory, Priority};
pub use stock_alert::{LOW_STOCK_THRESHOLD, StockLevel, evaluate_stock};

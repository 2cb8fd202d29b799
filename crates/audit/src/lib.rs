//! Bounded, newest-first audit log.
//!
//! One log service (`AuditLog`) over an injected `AuditStorage`, so the
//! storage medium can be swapped (memory, JSON file) without touching the
//! recording logic.

pub mod entry;
pub mod log;
pub mod storage;

pub use entry::{AuditAction, AuditEntityType, AuditEntry, NewAuditEntry};
pub use log::{AuditLog, MAX_ENTRIES};
pub use storage::{AuditStorage, AuditStorageError, FileAuditStorage, InMemoryAuditStorage, STORAGE_KEY};

use std::sync::Mutex;

use chrono::Utc;

use crate::entry::{AuditEntry, NewAuditEntry};
use crate::storage::AuditStorage;

/// Retention cap: only the most recent entries are kept.
pub const MAX_ENTRIES: usize = 100;

/// Best-effort audit recorder.
///
/// Entries are kept newest first and truncated to [`MAX_ENTRIES`]. Storage
/// failures never reach the caller: they are logged and an empty list is
/// returned, so recording can never break the operation being audited.
#[derive(Debug)]
pub struct AuditLog<S>
where
    S: AuditStorage,
{
    storage: S,
    // Serialises load-modify-save so concurrent appends don't drop entries.
    write_lock: Mutex<()>,
}

impl<S> AuditLog<S>
where
    S: AuditStorage,
{
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Record an entry and return the retained log (newest first).
    pub fn append(&self, entry: NewAuditEntry) -> Vec<AuditEntry> {
        let _guard = match self.write_lock.lock() {
            Ok(g) => g,
            Err(_) => {
                tracing::warn!("audit log lock poisoned; entry dropped");
                return Vec::new();
            }
        };

        let mut entries = match self.storage.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load audit log; entry dropped");
                return Vec::new();
            }
        };

        let entry = entry.stamp(Utc::now());
        tracing::debug!(
            action = ?entry.action,
            entity_type = ?entry.entity_type,
            entity_id = %entry.entity_id,
            actor = %entry.actor,
            "audit entry recorded"
        );
        entries.insert(0, entry);
        entries.truncate(MAX_ENTRIES);

        if let Err(e) = self.storage.save(&entries) {
            tracing::warn!(error = %e, "failed to persist audit log");
            return Vec::new();
        }
        entries
    }

    /// The full retained log, newest first.
    pub fn load(&self) -> Vec<AuditEntry> {
        match self.storage.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read audit log");
                Vec::new()
            }
        }
    }
}

//! Audit log storage backends.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::entry::AuditEntry;

/// Fixed key the serialized log is stored under.
pub const STORAGE_KEY: &str = "nexium_audit_log";

#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("audit storage unavailable: {0}")]
    Unavailable(String),

    #[error("audit log is corrupt: {0}")]
    Corrupt(String),
}

/// Where the serialized log lives.
///
/// Implementations store the whole retained list at once; ordering and the
/// retention cap are the log's job, not the storage's.
pub trait AuditStorage: Send + Sync {
    fn load(&self) -> Result<Vec<AuditEntry>, AuditStorageError>;
    fn save(&self, entries: &[AuditEntry]) -> Result<(), AuditStorageError>;
}

impl<S> AuditStorage for Arc<S>
where
    S: AuditStorage + ?Sized,
{
    fn load(&self) -> Result<Vec<AuditEntry>, AuditStorageError> {
        (**self).load()
    }

    fn save(&self, entries: &[AuditEntry]) -> Result<(), AuditStorageError> {
        (**self).save(entries)
    }
}

/// In-memory storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditStorage {
    inner: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStorage for InMemoryAuditStorage {
    fn load(&self) -> Result<Vec<AuditEntry>, AuditStorageError> {
        self.inner
            .read()
            .map(|v| v.clone())
            .map_err(|_| AuditStorageError::Unavailable("lock poisoned".to_string()))
    }

    fn save(&self, entries: &[AuditEntry]) -> Result<(), AuditStorageError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| AuditStorageError::Unavailable("lock poisoned".to_string()))?;
        *guard = entries.to_vec();
        Ok(())
    }
}

/// JSON file storage: one array at `<dir>/nexium_audit_log.json`.
///
/// A missing file is an empty log. Writes go to a sibling temp file first and
/// are renamed into place.
#[derive(Debug, Clone)]
pub struct FileAuditStorage {
    path: PathBuf,
}

impl FileAuditStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditStorage for FileAuditStorage {
    fn load(&self) -> Result<Vec<AuditEntry>, AuditStorageError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AuditStorageError::Unavailable(e.to_string())),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|e| AuditStorageError::Corrupt(e.to_string()))
    }

    fn save(&self, entries: &[AuditEntry]) -> Result<(), AuditStorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AuditStorageError::Unavailable(e.to_string()))?;
        }
        let data = serde_json::to_string(entries)
            .map_err(|e| AuditStorageError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data).map_err(|e| AuditStorageError::Unavailable(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| AuditStorageError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{AuditAction, AuditEntityType, NewAuditEntry};
    use chrono::Utc;
    use nexium_core::Actor;

    fn entry(details: &str) -> AuditEntry {
        NewAuditEntry::new(
            AuditAction::Update,
            AuditEntityType::Obra,
            "obra-1",
            details,
            Actor::new("ana").unwrap(),
        )
        .stamp(Utc::now())
    }

    #[test]
    fn missing_file_is_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileAuditStorage::new(dir.path());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn file_round_trip_preserves_order_and_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileAuditStorage::new(dir.path());
        let entries = vec![entry("segundo"), entry("primeiro")];

        storage.save(&entries).unwrap();
        let loaded = storage.load().unwrap();

        assert_eq!(loaded, entries);
        assert_eq!(loaded[0].timestamp, entries[0].timestamp);
    }

    #[test]
    fn timestamps_are_stored_as_iso_8601_strings() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileAuditStorage::new(dir.path());
        let e = entry("x");
        storage.save(std::slice::from_ref(&e)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(storage.path()).unwrap()).unwrap();
        let ts = raw[0]["timestamp"].as_str().unwrap();
        assert_eq!(
            chrono::DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
            e.timestamp
        );
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileAuditStorage::new(dir.path());
        std::fs::write(storage.path(), "{not json").unwrap();
        assert!(matches!(storage.load(), Err(AuditStorageError::Corrupt(_))));
    }
}

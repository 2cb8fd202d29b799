//! Generic structured-record storage.
//!
//! Every Nexium collection (`obras`, `tarefas`, `materiais`, `movimentacoes`,
//! `notificacoes`, ...) is a set of JSON objects keyed by UUID. The
//! [`RecordStore`] trait is the only way the services touch persisted state:
//!
//! - `select` with equality filters, one ordering field, and a limit
//! - `insert` returning the stored record
//! - `update` by id with a partial (top-level merge) patch, returning the record
//! - `delete` by id
//! - `begin` a [`RecordTx`] for multi-write sequences
//!
//! ## Transactions
//!
//! Writes issued through a `RecordTx` become visible only on `commit`.
//! Dropping a transaction without committing discards them. Implementations
//! also guarantee that a record read with `get_for_update` cannot be changed by
//! anyone else until the transaction ends, which is what keeps two concurrent
//! stock movements on the same material from overwriting each other.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {id} not found in '{collection}'")]
    NotFound { collection: String, id: Uuid },

    #[error("record {id} already exists in '{collection}'")]
    Duplicate { collection: String, id: Uuid },

    #[error("record serialization failed: {0}")]
    Serialization(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: Uuid) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

/// Select criteria: all filters must match (`field == value`, where a missing
/// field equals `null`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, JsonValue)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn newest_first(self) -> Self {
        self.order_by("created_at", Direction::Desc)
    }

    pub fn oldest_first(self) -> Self {
        self.order_by("created_at", Direction::Asc)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `record` satisfies every filter.
    pub fn matches(&self, record: &JsonValue) -> bool {
        self.filters.iter().all(|(field, expected)| {
            record.get(field).unwrap_or(&JsonValue::Null) == expected
        })
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, collection: &str, query: &Query) -> Result<Vec<JsonValue>, StoreError>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<JsonValue>, StoreError>;

    async fn insert(&self, collection: &str, id: Uuid, record: JsonValue) -> Result<JsonValue, StoreError>;

    async fn update(&self, collection: &str, id: Uuid, patch: JsonValue) -> Result<JsonValue, StoreError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError>;

    async fn begin(&self) -> Result<Box<dyn RecordTx>, StoreError>;
}

/// A unit of work over a [`RecordStore`]; rolled back when dropped uncommitted.
#[async_trait]
pub trait RecordTx: Send {
    /// Read a record and hold it against concurrent writers until the
    /// transaction ends.
    async fn get_for_update(&mut self, collection: &str, id: Uuid) -> Result<Option<JsonValue>, StoreError>;

    async fn insert(&mut self, collection: &str, id: Uuid, record: JsonValue) -> Result<JsonValue, StoreError>;

    async fn update(&mut self, collection: &str, id: Uuid, patch: JsonValue) -> Result<JsonValue, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn select(&self, collection: &str, query: &Query) -> Result<Vec<JsonValue>, StoreError> {
        (**self).select(collection, query).await
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<JsonValue>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn insert(&self, collection: &str, id: Uuid, record: JsonValue) -> Result<JsonValue, StoreError> {
        (**self).insert(collection, id, record).await
    }

    async fn update(&self, collection: &str, id: Uuid, patch: JsonValue) -> Result<JsonValue, StoreError> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError> {
        (**self).delete(collection, id).await
    }

    async fn begin(&self) -> Result<Box<dyn RecordTx>, StoreError> {
        (**self).begin().await
    }
}

/// Top-level merge of `patch` into `record`. The `id` key is never overwritten.
pub(crate) fn merge_patch(record: &mut JsonValue, patch: JsonValue) -> Result<(), StoreError> {
    let (Some(target), JsonValue::Object(fields)) = (record.as_object_mut(), patch) else {
        return Err(StoreError::Serialization(
            "records and patches must be JSON objects".to_string(),
        ));
    };
    for (k, v) in fields {
        if k == "id" {
            continue;
        }
        target.insert(k, v);
    }
    Ok(())
}

pub(crate) fn ensure_object(record: &JsonValue) -> Result<(), StoreError> {
    if record.is_object() {
        Ok(())
    } else {
        Err(StoreError::Serialization("records must be JSON objects".to_string()))
    }
}

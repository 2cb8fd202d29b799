use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Direction, Query, RecordStore, RecordTx, StoreError, ensure_object, merge_patch};

type Collections = HashMap<String, BTreeMap<Uuid, JsonValue>>;

/// In-memory record store.
///
/// Intended for tests/dev. Not optimized for performance. A transaction holds
/// the store lock from `begin` until it is committed or dropped, so
/// transactions are fully serialised.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    inner: Arc<Mutex<Collections>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(&self, collection: &str, query: &Query) -> Result<Vec<JsonValue>, StoreError> {
        let collections = self.inner.lock().await;
        let Some(records) = collections.get(collection) else {
            return Ok(vec![]);
        };

        let mut rows: Vec<(&Uuid, &JsonValue)> =
            records.iter().filter(|(_, r)| query.matches(r)).collect();

        if let Some(order) = &query.order {
            rows.sort_by(|(ida, a), (idb, b)| {
                let ord = compare_fields(a.get(&order.field), b.get(&order.field)).then(ida.cmp(idb));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows.into_iter().take(limit).map(|(_, r)| r.clone()).collect())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<JsonValue>, StoreError> {
        let collections = self.inner.lock().await;
        Ok(collections.get(collection).and_then(|c| c.get(&id)).cloned())
    }

    async fn insert(&self, collection: &str, id: Uuid, record: JsonValue) -> Result<JsonValue, StoreError> {
        let mut collections = self.inner.lock().await;
        insert_into(&mut collections, collection, id, record)
    }

    async fn update(&self, collection: &str, id: Uuid, patch: JsonValue) -> Result<JsonValue, StoreError> {
        let mut collections = self.inner.lock().await;
        update_in(&mut collections, collection, id, patch)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError> {
        let mut collections = self.inner.lock().await;
        collections
            .get_mut(collection)
            .and_then(|c| c.remove(&id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn begin(&self) -> Result<Box<dyn RecordTx>, StoreError> {
        let guard = self.inner.clone().lock_owned().await;
        Ok(Box::new(InMemoryTx {
            guard,
            staged: Collections::new(),
        }))
    }
}

/// Staged writes over a locked snapshot; published on commit.
struct InMemoryTx {
    guard: OwnedMutexGuard<Collections>,
    staged: Collections,
}

impl InMemoryTx {
    fn current(&self, collection: &str, id: Uuid) -> Option<JsonValue> {
        self.staged
            .get(collection)
            .and_then(|c| c.get(&id))
            .or_else(|| self.guard.get(collection).and_then(|c| c.get(&id)))
            .cloned()
    }
}

#[async_trait]
impl RecordTx for InMemoryTx {
    async fn get_for_update(&mut self, collection: &str, id: Uuid) -> Result<Option<JsonValue>, StoreError> {
        Ok(self.current(collection, id))
    }

    async fn insert(&mut self, collection: &str, id: Uuid, record: JsonValue) -> Result<JsonValue, StoreError> {
        ensure_object(&record)?;
        if self.current(collection, id).is_some() {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id,
            });
        }
        self.staged
            .entry(collection.to_string())
            .or_default()
            .insert(id, record.clone());
        Ok(record)
    }

    async fn update(&mut self, collection: &str, id: Uuid, patch: JsonValue) -> Result<JsonValue, StoreError> {
        let mut record = self
            .current(collection, id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        merge_patch(&mut record, patch)?;
        self.staged
            .entry(collection.to_string())
            .or_default()
            .insert(id, record.clone());
        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTx { mut guard, staged } = *self;
        for (collection, records) in staged {
            guard.entry(collection).or_default().extend(records);
        }
        Ok(())
    }
}

fn insert_into(
    collections: &mut Collections,
    collection: &str,
    id: Uuid,
    record: JsonValue,
) -> Result<JsonValue, StoreError> {
    ensure_object(&record)?;
    let records = collections.entry(collection.to_string()).or_default();
    if records.contains_key(&id) {
        return Err(StoreError::Duplicate {
            collection: collection.to_string(),
            id,
        });
    }
    records.insert(id, record.clone());
    Ok(record)
}

fn update_in(
    collections: &mut Collections,
    collection: &str,
    id: Uuid,
    patch: JsonValue,
) -> Result<JsonValue, StoreError> {
    let record = collections
        .get_mut(collection)
        .and_then(|c| c.get_mut(&id))
        .ok_or_else(|| StoreError::not_found(collection, id))?;
    let mut updated = record.clone();
    merge_patch(&mut updated, patch)?;
    *record = updated.clone();
    Ok(updated)
}

/// Order JSON field values: nulls first, then numbers, then strings.
///
/// Strings that are RFC 3339 timestamps compare chronologically, since their
/// textual form varies in fractional-second width.
fn compare_fields(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    fn rank(v: Option<&JsonValue>) -> u8 {
        match v {
            None | Some(JsonValue::Null) => 0,
            Some(JsonValue::Bool(_)) => 1,
            Some(JsonValue::Number(_)) => 2,
            Some(JsonValue::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => {
            match (
                DateTime::parse_from_rfc3339(x).map(|d| d.with_timezone(&Utc)),
                DateTime::parse_from_rfc3339(y).map(|d| d.with_timezone(&Utc)),
            ) {
                (Ok(dx), Ok(dy)) => dx.cmp(&dy),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

//! Typed access to record collections.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use nexium_core::Entity;
use nexium_inventory::{Material, Movement, Notification};
use nexium_sites::{Obra, Task};

use crate::store::{Query, RecordStore, RecordTx, StoreError};

/// A domain type stored in a named collection.
pub trait Record: Entity + Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
}

impl Record for Obra {
    const COLLECTION: &'static str = "obras";
}

impl Record for Task {
    const COLLECTION: &'static str = "tarefas";
}

impl Record for Material {
    const COLLECTION: &'static str = "materiais";
}

impl Record for Movement {
    const COLLECTION: &'static str = "movimentacoes";
}

impl Record for Notification {
    const COLLECTION: &'static str = "notificacoes";
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(value: JsonValue) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Typed view over one collection of a [`RecordStore`].
pub struct Repository<T> {
    store: Arc<dyn RecordStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.store
            .get(T::COLLECTION, id.into())
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn list(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        self.store
            .select(T::COLLECTION, query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn insert(&self, record: &T) -> Result<T, StoreError> {
        let stored = self
            .store
            .insert(T::COLLECTION, record.uuid(), encode(record)?)
            .await?;
        decode(stored)
    }

    /// Partial update by id; returns the merged record.
    pub async fn update(&self, id: T::Id, patch: JsonValue) -> Result<T, StoreError> {
        decode(self.store.update(T::COLLECTION, id.into(), patch).await?)
    }

    /// Overwrite every field of an existing record.
    pub async fn save(&self, record: &T) -> Result<T, StoreError> {
        decode(
            self.store
                .update(T::COLLECTION, record.uuid(), encode(record)?)
                .await?,
        )
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), StoreError> {
        self.store.delete(T::COLLECTION, id.into()).await
    }
}

/// Typed helpers for use inside a [`RecordTx`].
pub(crate) async fn tx_get_for_update<T: Record>(
    tx: &mut dyn RecordTx,
    id: T::Id,
) -> Result<Option<T>, StoreError> {
    let id: Uuid = id.into();
    tx.get_for_update(T::COLLECTION, id).await?.map(decode).transpose()
}

pub(crate) async fn tx_insert<T: Record>(tx: &mut dyn RecordTx, record: &T) -> Result<T, StoreError> {
    decode(tx.insert(T::COLLECTION, record.uuid(), encode(record)?).await?)
}

pub(crate) async fn tx_update<T: Record>(
    tx: &mut dyn RecordTx,
    id: T::Id,
    patch: JsonValue,
) -> Result<T, StoreError> {
    decode(tx.update(T::COLLECTION, id.into(), patch).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nexium_inventory::RegisterMaterial;
    use serde_json::json;

    use crate::store::InMemoryRecordStore;

    fn repo() -> Repository<Material> {
        Repository::new(Arc::new(InMemoryRecordStore::new()))
    }

    fn material(name: &str) -> Material {
        Material::register(
            RegisterMaterial {
                id: None,
                name: name.to_string(),
                unit: "kg".to_string(),
                initial_quantity: 25.0,
                obra_id: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_get_update_delete() {
        let repo = repo();
        let m = material("Argamassa");
        repo.insert(&m).await.unwrap();

        assert_eq!(repo.get(m.id).await.unwrap(), Some(m.clone()));

        let updated = repo
            .update(m.id, json!({ Material::QUANTITY_FIELD: 12.5 }))
            .await
            .unwrap();
        assert_eq!(updated.quantity, 12.5);
        assert_eq!(updated.name, "Argamassa");

        repo.delete(m.id).await.unwrap();
        assert_eq!(repo.get(m.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_filters_by_column() {
        let repo = repo();
        repo.insert(&material("Argamassa")).await.unwrap();
        repo.insert(&material("Rejunte")).await.unwrap();

        let found = repo
            .list(&Query::new().eq(Material::NAME_FIELD, "Rejunte"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Rejunte");
    }
}

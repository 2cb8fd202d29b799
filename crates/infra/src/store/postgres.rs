//! Postgres-backed record store.
//!
//! All collections share one JSONB table:
//!
//! ```sql
//! CREATE TABLE nexium_records (
//!     collection TEXT        NOT NULL,
//!     id         UUID        NOT NULL,
//!     data       JSONB       NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     PRIMARY KEY (collection, id)
//! );
//! ```
//!
//! `created_at` mirrors the record's own `created_at` field so ordering by it
//! is chronological rather than textual.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{Direction, Query, RecordStore, RecordTx, StoreError, ensure_object};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS nexium_records (
    collection TEXT        NOT NULL,
    id         UUID        NOT NULL,
    data       JSONB       NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (collection, id)
)
"#;

const INSERT_SQL: &str = r#"
INSERT INTO nexium_records (collection, id, data, created_at)
VALUES ($1, $2, $3, COALESCE(($3->>'created_at')::timestamptz, NOW()))
RETURNING data
"#;

const UPDATE_SQL: &str = r#"
UPDATE nexium_records
SET data = data || $3
WHERE collection = $1 AND id = $2
RETURNING data
"#;

pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(backend)?;
        Ok(Self::new(pool))
    }

    /// Create the records table if it does not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&*self.pool).await.map_err(backend)?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS nexium_records_collection_created_idx \
             ON nexium_records (collection, created_at)",
        )
        .execute(&*self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn insert_error(collection: &str, id: Uuid, e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate {
            collection: collection.to_string(),
            id,
        },
        _ => backend(e),
    }
}

/// Patches never rewrite the primary key.
fn strip_id(mut patch: JsonValue) -> Result<JsonValue, StoreError> {
    match patch.as_object_mut() {
        Some(fields) => {
            fields.remove("id");
            Ok(patch)
        }
        None => Err(StoreError::Serialization("patches must be JSON objects".to_string())),
    }
}

fn build_select<'a>(collection: &'a str, query: &'a Query) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT data FROM nexium_records WHERE collection = ");
    qb.push_bind(collection);

    for (field, value) in &query.filters {
        if value.is_null() {
            qb.push(" AND (data -> ");
            qb.push_bind(field.as_str());
            qb.push(" IS NULL OR data -> ");
            qb.push_bind(field.as_str());
            qb.push(" = 'null'::jsonb)");
        } else {
            qb.push(" AND data -> ");
            qb.push_bind(field.as_str());
            qb.push(" = ");
            qb.push_bind(value);
        }
    }

    if let Some(order) = &query.order {
        if order.field == "created_at" {
            qb.push(" ORDER BY created_at");
        } else {
            qb.push(" ORDER BY data -> ");
            qb.push_bind(order.field.as_str());
        }
        qb.push(match order.direction {
            Direction::Asc => " ASC, id ASC",
            Direction::Desc => " DESC, id DESC",
        });
    }

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }

    qb
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn select(&self, collection: &str, query: &Query) -> Result<Vec<JsonValue>, StoreError> {
        let mut qb = build_select(collection, query);
        qb.build_query_scalar::<JsonValue>()
            .fetch_all(&*self.pool)
            .await
            .map_err(backend)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<JsonValue>, StoreError> {
        sqlx::query_scalar::<_, JsonValue>(
            "SELECT data FROM nexium_records WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(backend)
    }

    async fn insert(&self, collection: &str, id: Uuid, record: JsonValue) -> Result<JsonValue, StoreError> {
        ensure_object(&record)?;
        sqlx::query_scalar::<_, JsonValue>(INSERT_SQL)
            .bind(collection)
            .bind(id)
            .bind(&record)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| insert_error(collection, id, e))
    }

    async fn update(&self, collection: &str, id: Uuid, patch: JsonValue) -> Result<JsonValue, StoreError> {
        let patch = strip_id(patch)?;
        sqlx::query_scalar::<_, JsonValue>(UPDATE_SQL)
            .bind(collection)
            .bind(id)
            .bind(&patch)
            .fetch_optional(&*self.pool)
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM nexium_records WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn RecordTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(backend)?;
        Ok(Box::new(PostgresTx { tx }))
    }
}

/// SQL transaction; sqlx rolls it back when dropped without commit.
struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RecordTx for PostgresTx {
    async fn get_for_update(&mut self, collection: &str, id: Uuid) -> Result<Option<JsonValue>, StoreError> {
        sqlx::query_scalar::<_, JsonValue>(
            "SELECT data FROM nexium_records WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(backend)
    }

    async fn insert(&mut self, collection: &str, id: Uuid, record: JsonValue) -> Result<JsonValue, StoreError> {
        ensure_object(&record)?;
        sqlx::query_scalar::<_, JsonValue>(INSERT_SQL)
            .bind(collection)
            .bind(id)
            .bind(&record)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| insert_error(collection, id, e))
    }

    async fn update(&mut self, collection: &str, id: Uuid, patch: JsonValue) -> Result<JsonValue, StoreError> {
        let patch = strip_id(patch)?;
        sqlx::query_scalar::<_, JsonValue>(UPDATE_SQL)
            .bind(collection)
            .bind(id)
            .bind(&patch)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_sql_binds_filters_and_orders_by_column() {
        let q = Query::new()
            .eq("material_id", json!("abc"))
            .eq("obra_id", JsonValue::Null)
            .newest_first()
            .limit(5);
        let qb = build_select("movimentacoes", &q);
        assert_eq!(
            qb.sql(),
            "SELECT data FROM nexium_records WHERE collection = $1 \
             AND data -> $2 = $3 \
             AND (data -> $4 IS NULL OR data -> $5 = 'null'::jsonb) \
             ORDER BY created_at DESC, id DESC LIMIT $6"
        );
    }

    #[test]
    fn strip_id_removes_primary_key() {
        let patch = strip_id(json!({ "id": "x", "lida": true })).unwrap();
        assert_eq!(patch, json!({ "lida": true }));
    }
}

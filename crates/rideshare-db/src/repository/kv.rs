//! # Key-Value Repository
//!
//! Raw access to the `kv_store` table. Values are opaque strings here; the
//! typed repositories layer JSON on top.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

pub(crate) const SELECT_SQL: &str = "SELECT value FROM kv_store WHERE key = ?1";

pub(crate) const UPSERT_SQL: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

pub(crate) const DELETE_SQL: &str = "DELETE FROM kv_store WHERE key = ?1";

/// Repository for the `kv_store` table.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(SELECT_SQL)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "kv get");
        Ok(value)
    }

    /// Inserts or replaces the value under `key`.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(UPSERT_SQL)
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "kv put");
        Ok(())
    }

    /// Writes several keys in one transaction. Either all land or none do.
    pub async fn put_many(&self, entries: &[(&str, String)]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        for (key, value) in entries {
            sqlx::query(UPSERT_SQL)
            .bind(*key)
            .bind(value.as_str())
            .bind(now.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(keys = entries.len(), "kv put_many");
        Ok(())
    }

    /// Deletes `key`. Returns true if it existed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query(DELETE_SQL)
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, "kv remove");
        Ok(result.rows_affected() > 0)
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    /// Reads and decodes a JSON value.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        match self.get(key).await? {
            Some(raw) => decode(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Encodes and stores a JSON value.
    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<()> {
        let raw = encode(key, value)?;
        self.put(key, &raw).await
    }
}

/// Decodes a value read from `key`.
pub(crate) fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|e| DbError::serialization(key, e))
}

/// Encodes a value for storage under `key`.
pub(crate) fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::serialization(key, e))
}

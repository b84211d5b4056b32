//! # Store Transaction
//!
//! Read-modify-write of the whole store under SQLite's write lock.
//!
//! ## Why A Revision Bump First
//! ```text
//! process A: BEGIN ─► bump revision (write lock) ─► read ─► check ─► write ─► COMMIT
//! process B: BEGIN ─► bump revision ── busy, waits ──────────────────────────────┘
//!                                      └─► read (sees A's commit) ─► check ─► ...
//! ```
//! A deferred transaction that reads first holds only a read snapshot, so
//! two processes could both read `pending` and both write `accepted`. The
//! bump is a write, so the lock is taken before anything is read.
//!
//! Dropping a `StoreTransaction` without [`commit`](StoreTransaction::commit)
//! rolls it back.

use chrono::Utc;
use rideshare_core::{Principal, RideRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::accounts::{ACCOUNTS_KEY, SESSION_KEY};
use crate::repository::kv::{decode, encode, DELETE_SQL, SELECT_SQL, UPSERT_SQL};
use crate::repository::rides::RIDES_KEY;

/// An open write transaction over the key-value store.
pub struct StoreTransaction {
    tx: Transaction<'static, Sqlite>,
    revision: i64,
}

impl std::fmt::Debug for StoreTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreTransaction")
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl StoreTransaction {
    /// Begins a transaction and takes the write lock.
    ///
    /// Waits up to the connection's busy timeout for another writer.
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let revision: i64 = sqlx::query_scalar(
            "UPDATE store_revision SET revision = revision + 1 WHERE id = 1 RETURNING revision",
        )
        .fetch_one(&mut *tx)
        .await?;

        debug!(revision, "Store transaction started");
        Ok(StoreTransaction { tx, revision })
    }

    /// Revision this transaction will commit as.
    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Loads every ride, or `None` if the collection was never written.
    pub async fn load_rides(&mut self) -> DbResult<Option<Vec<RideRecord>>> {
        self.get_json(RIDES_KEY).await
    }

    /// Loads the account directory, or `None` if never written.
    pub async fn load_accounts(&mut self) -> DbResult<Option<Vec<Principal>>> {
        self.get_json(ACCOUNTS_KEY).await
    }

    /// Replaces the ride collection.
    pub async fn save_rides(&mut self, rides: &[RideRecord]) -> DbResult<()> {
        self.put_json(RIDES_KEY, rides).await
    }

    /// Replaces the account directory.
    pub async fn save_accounts(&mut self, accounts: &[Principal]) -> DbResult<()> {
        self.put_json(ACCOUNTS_KEY, accounts).await
    }

    /// Stores `principal` as the session, or clears it for `None`.
    pub async fn save_session(&mut self, principal: Option<&Principal>) -> DbResult<()> {
        match principal {
            Some(principal) => self.put_json(SESSION_KEY, principal).await,
            None => {
                sqlx::query(DELETE_SQL)
                    .bind(SESSION_KEY)
                    .execute(&mut *self.tx)
                    .await?;
                Ok(())
            }
        }
    }

    /// Commits every write made through this transaction.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!(revision = self.revision, "Store transaction committed");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&mut self, key: &str) -> DbResult<Option<T>> {
        let raw: Option<String> = sqlx::query_scalar(SELECT_SQL)
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await?;
        raw.map(|raw| decode(key, &raw)).transpose()
    }

    async fn put_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> DbResult<()> {
        let raw = encode(key, value)?;
        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(raw.as_str())
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

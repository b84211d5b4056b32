//! # Database State
//!
//! Wraps the `Database` handle and owns the write path from the in-memory
//! ledger and session back to SQLite.
//!
//! ## Update Cycle
//! Every `rideshare` invocation is its own process, so the in-memory ledger
//! may be stale by the time a command runs. Each mutation therefore runs
//! against the latest committed store:
//!
//! ```text
//! update(apply)
//!   ├── gate.lock            one writer per process
//!   ├── begin_write          SQLite write lock, other processes wait
//!   ├── reload rides + accounts into the ledger and session
//!   ├── apply(ledger, session)  ── Err ──► rollback, nothing written
//!   ├── write rides + accounts (+ session if it changed)
//!   └── commit
//! ```
//!
//! Two drivers accepting the same ride from two terminals are serialized by
//! the write lock; the second one reloads, sees `accepted` and is rejected.

use chrono::Utc;
use rideshare_core::{demo, Principal, RideLedger, RideRecord, SessionStore};
use rideshare_db::{Database, DbError, DbResult};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{AppConfig, LedgerState, SessionState};

/// Wrapper around `Database` with a write gate.
#[derive(Debug)]
pub struct DbState {
    db: Database,
    write_gate: Mutex<()>,
}

/// What an update writes back.
struct Changes {
    rides: Vec<RideRecord>,
    accounts: Vec<Principal>,
    /// `Some` when the logged-in principal changed
    session: Option<Option<Principal>>,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState {
            db,
            write_gate: Mutex::new(()),
        }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// Loads the ledger and session from storage.
    ///
    /// An empty store is seeded with the demo accounts and sample rides when
    /// `config.seed_demo_data` is set; the seed is written back immediately.
    pub async fn restore(&self, config: &AppConfig) -> DbResult<(LedgerState, SessionState)> {
        let mut stored_rides = self.db.rides().load_all().await?;
        let mut stored_accounts = self.db.accounts().load_accounts().await?;
        let session = self.db.accounts().load_session().await?;

        if config.seed_demo_data && stored_rides.is_none() {
            let (rides, accounts) = self.seed().await?;
            stored_rides = Some(rides);
            stored_accounts = Some(accounts);
        }

        let ledger = LedgerState::new(RideLedger::from_records(stored_rides.unwrap_or_default()));
        let sessions = SessionState::new(SessionStore::restore(
            stored_accounts.unwrap_or_default(),
            session,
        ));

        info!(
            rides = ledger.with_ledger(RideLedger::len),
            accounts = sessions.with_session(|s| s.accounts().len()),
            logged_in = sessions.current().is_some(),
            "State restored"
        );
        Ok((ledger, sessions))
    }

    /// Writes the demo data unless another process got there first.
    async fn seed(&self) -> DbResult<(Vec<RideRecord>, Vec<Principal>)> {
        let _gate = self.write_gate.lock().await;
        let mut txn = self.db.begin_write().await?;

        if let Some(rides) = txn.load_rides().await? {
            let accounts = txn.load_accounts().await?.unwrap_or_default();
            debug!("Store seeded concurrently, keeping it");
            return Ok((rides, accounts));
        }

        info!("Empty store, seeding demo data");
        let rides = demo::sample_rides(Utc::now());
        let mut accounts = txn.load_accounts().await?.unwrap_or_default();
        for principal in demo::demo_principals() {
            if !accounts.iter().any(|a| a.id == principal.id) {
                accounts.push(principal);
            }
        }
        txn.save_rides(&rides).await?;
        txn.save_accounts(&accounts).await?;
        txn.commit().await?;
        Ok((rides, accounts))
    }

    /// Applies `apply` to the latest stored rides and accounts, then writes
    /// the result in the same transaction.
    ///
    /// The in-memory ledger and session are replaced by the stored state
    /// first; the logged-in principal is kept. An `Err` from `apply` rolls
    /// the transaction back.
    pub async fn update<T, E, F>(
        &self,
        ledger: &LedgerState,
        session: &SessionState,
        apply: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut RideLedger, &mut SessionStore) -> Result<T, E>,
        E: From<DbError>,
    {
        let _gate = self.write_gate.lock().await;
        let mut txn = self.db.begin_write().await?;
        let stored_rides = txn.load_rides().await?.unwrap_or_default();
        let stored_accounts = txn.load_accounts().await?.unwrap_or_default();

        let (value, changes) = ledger.with_ledger_mut(|l| {
            session.with_session_mut(|s| {
                *l = RideLedger::from_records(stored_rides);
                let current = s.current().cloned();
                *s = SessionStore::restore(stored_accounts, current);
                let before = s.current().cloned();

                let value = apply(l, s)?;

                let after = s.current().cloned();
                let changes = Changes {
                    rides: l.snapshot(),
                    accounts: s.accounts().to_vec(),
                    session: (after != before).then_some(after),
                };
                Ok::<_, E>((value, changes))
            })
        })?;

        txn.save_rides(&changes.rides).await?;
        txn.save_accounts(&changes.accounts).await?;
        if let Some(current) = &changes.session {
            txn.save_session(current.as_ref()).await?;
        }
        let revision = txn.revision();
        txn.commit().await?;

        debug!(
            revision,
            rides = changes.rides.len(),
            accounts = changes.accounts.len(),
            "Store updated"
        );
        Ok(value)
    }

    /// Like [`update`](Self::update) for changes that only touch accounts
    /// and the session. The ride collection is neither read nor written.
    pub async fn update_session<T, E, F>(&self, session: &SessionState, apply: F) -> Result<T, E>
    where
        F: FnOnce(&mut SessionStore) -> Result<T, E>,
        E: From<DbError>,
    {
        let _gate = self.write_gate.lock().await;
        let mut txn = self.db.begin_write().await?;
        let stored_accounts = txn.load_accounts().await?.unwrap_or_default();

        let (value, accounts, changed_session) = session.with_session_mut(|s| {
            let current = s.current().cloned();
            *s = SessionStore::restore(stored_accounts, current);
            let before = s.current().cloned();

            let value = apply(s)?;

            let after = s.current().cloned();
            Ok::<_, E>((value, s.accounts().to_vec(), (after != before).then_some(after)))
        })?;

        txn.save_accounts(&accounts).await?;
        if let Some(current) = &changed_session {
            txn.save_session(current.as_ref()).await?;
        }
        txn.commit().await?;

        debug!(accounts = accounts.len(), "Accounts updated");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use rideshare_core::{Money, Role};
    use rideshare_db::DbConfig;

    async fn db_state() -> DbState {
        DbState::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_restore_seeds_empty_store() {
        let db = db_state().await;
        let (ledger, session) = db.restore(&AppConfig::default()).await.unwrap();

        assert_eq!(ledger.with_ledger(RideLedger::len), 3);
        assert_eq!(session.with_session(|s| s.accounts().len()), 3);
        assert!(session.current().is_none());
        assert_eq!(db.inner().rides().load_all().await.unwrap().map(|r| r.len()), Some(3));
    }

    #[tokio::test]
    async fn test_restore_without_seed() {
        let db = db_state().await;
        let config = AppConfig {
            seed_demo_data: false,
            ..AppConfig::default()
        };
        let (ledger, session) = db.restore(&config).await.unwrap();

        assert!(ledger.with_ledger(RideLedger::is_empty));
        assert!(session.with_session(|s| s.accounts().is_empty()));
        assert_eq!(db.inner().rides().load_all().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_saved_session_survives_restore() {
        let db = db_state().await;
        let (_, session) = db.restore(&AppConfig::default()).await.unwrap();

        db.update_session(&session, |s| {
            Ok::<_, ApiError>(s.login("jane@example.com", "pw", Role::Driver)?)
        })
        .await
        .unwrap();

        let (ledger, restored) = db.restore(&AppConfig::default()).await.unwrap();
        assert_eq!(restored.current().map(|p| p.id), Some("2".to_string()));
        // Not re-seeded
        assert_eq!(ledger.with_ledger(RideLedger::len), 3);
    }

    #[tokio::test]
    async fn test_update_reloads_stale_state() {
        let db = db_state().await;
        let (_, session) = db.restore(&AppConfig::default()).await.unwrap();
        let (other_ledger, other_session) = db.restore(&AppConfig::default()).await.unwrap();

        db.update_session(&session, |s| {
            s.login("john@example.com", "pw", Role::Rider)?;
            Ok::<_, ApiError>(s.add_credit(Money::from_cents(2_500))?)
        })
        .await
        .unwrap();

        // The second copy never saw the credit; its update must not erase it
        db.update(&other_ledger, &other_session, |_, s| {
            Ok::<_, ApiError>(s.charge_account("1", Money::from_cents(1_000))?)
        })
        .await
        .unwrap();

        let accounts = db.inner().accounts().load_accounts().await.unwrap().unwrap();
        let john = accounts.iter().find(|a| a.id == "1").unwrap();
        assert_eq!(john.balance(), Money::from_cents(11_500));
        assert_eq!(
            other_session.with_session(|s| s.account("1").map(Principal::balance)),
            Some(Money::from_cents(11_500))
        );
    }

    #[tokio::test]
    async fn test_rejected_update_writes_nothing() {
        let db = db_state().await;
        let (ledger, session) = db.restore(&AppConfig::default()).await.unwrap();

        let err = db
            .update(&ledger, &session, |_, s| {
                s.logout();
                Err::<(), _>(ApiError::validation("stop"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert_eq!(db.inner().rides().load_all().await.unwrap().map(|r| r.len()), Some(3));
    }
}

//! # Account Repository
//!
//! The account directory (`accounts`) and the logged-in principal (`user`).
//! Logging out deletes `user` but leaves the account in `accounts`.

use rideshare_core::{Principal, RideRecord};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::kv::{encode, KvRepository};
use crate::repository::rides::RIDES_KEY;

/// Storage key of the account directory.
pub const ACCOUNTS_KEY: &str = "accounts";

/// Storage key of the current session principal.
pub const SESSION_KEY: &str = "user";

/// Repository for accounts and the session.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    kv: KvRepository,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(kv: KvRepository) -> Self {
        AccountRepository { kv }
    }

    /// Loads the account directory, or `None` if never written.
    pub async fn load_accounts(&self) -> DbResult<Option<Vec<Principal>>> {
        let accounts: Option<Vec<Principal>> = self.kv.get_json(ACCOUNTS_KEY).await?;
        debug!(count = accounts.as_ref().map(Vec::len), "Loaded accounts");
        Ok(accounts)
    }

    /// Replaces the account directory.
    pub async fn save_accounts(&self, accounts: &[Principal]) -> DbResult<()> {
        self.kv.put_json(ACCOUNTS_KEY, accounts).await?;
        info!(count = accounts.len(), "Saved accounts");
        Ok(())
    }

    /// Loads the session principal, if someone is logged in.
    pub async fn load_session(&self) -> DbResult<Option<Principal>> {
        self.kv.get_json(SESSION_KEY).await
    }

    /// Stores `principal` as the session, or clears it for `None`.
    pub async fn save_session(&self, principal: Option<&Principal>) -> DbResult<()> {
        match principal {
            Some(principal) => {
                self.kv.put_json(SESSION_KEY, principal).await?;
                debug!(principal_id = %principal.id, "Saved session");
            }
            None => {
                self.kv.remove(SESSION_KEY).await?;
                debug!("Cleared session");
            }
        }
        Ok(())
    }

    /// Writes rides, accounts and session together in one transaction.
    ///
    /// Used after operations that touch both stores, such as a fee-charging
    /// cancellation.
    pub async fn save_snapshot(
        &self,
        rides: &[RideRecord],
        accounts: &[Principal],
        session: Option<&Principal>,
    ) -> DbResult<()> {
        self.kv
            .put_many(&[
                (RIDES_KEY, encode(RIDES_KEY, rides)?),
                (ACCOUNTS_KEY, encode(ACCOUNTS_KEY, accounts)?),
            ])
            .await?;
        self.save_session(session).await?;

        info!(
            rides = rides.len(),
            accounts = accounts.len(),
            "Saved snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use rideshare_core::{demo, Role};

    #[tokio::test]
    async fn test_accounts_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accounts();

        assert_eq!(repo.load_accounts().await.unwrap(), None);

        let accounts = demo::demo_principals();
        repo.save_accounts(&accounts).await.unwrap();
        assert_eq!(repo.load_accounts().await.unwrap(), Some(accounts));
    }

    #[tokio::test]
    async fn test_session_save_and_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accounts();
        let driver = demo::demo_principal(Role::Driver);

        repo.save_session(Some(&driver)).await.unwrap();
        assert_eq!(repo.load_session().await.unwrap(), Some(driver));

        repo.save_session(None).await.unwrap();
        assert_eq!(repo.load_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_snapshot_writes_every_key() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rides = demo::sample_rides(Utc::now());
        let accounts = demo::demo_principals();

        db.accounts()
            .save_snapshot(&rides, &accounts, accounts.first())
            .await
            .unwrap();

        assert_eq!(db.rides().load_all().await.unwrap(), Some(rides));
        assert_eq!(db.accounts().load_session().await.unwrap().map(|p| p.id), Some("1".to_string()));
        assert_eq!(
            db.kv().keys().await.unwrap(),
            vec!["accounts".to_string(), "rides".to_string(), "user".to_string()]
        );
    }
}

//! # Auth Commands
//!
//! Mocked authentication. `login` accepts any password and returns the demo
//! account for the chosen role; `register` creates a fresh account.

use rideshare_core::{Principal, Role};
use serde::Serialize;
use tracing::{debug, info};

use super::account::AccountResponse;
use super::current_principal;
use crate::error::ApiError;
use crate::state::{AppConfig, DbState, SessionState};

/// Result of `logout`.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    /// Id of the principal that was logged in, if any.
    pub logged_out: Option<String>,
}

/// Logs in as the demo account for `role`.
pub async fn login(
    db: &DbState,
    session: &SessionState,
    email: &str,
    password: &str,
    role: Role,
) -> Result<Principal, ApiError> {
    debug!(email = %email, role = %role, "login command");

    let principal = db
        .update_session(session, |s| Ok::<_, ApiError>(s.login(email, password, role)?))
        .await?;

    info!(principal_id = %principal.id, role = %principal.role, "Logged in");
    Ok(principal)
}

/// Creates an account and logs it in.
pub async fn register(
    db: &DbState,
    session: &SessionState,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<Principal, ApiError> {
    debug!(email = %email, role = %role, "register command");

    let principal = db
        .update_session(session, |s| {
            Ok::<_, ApiError>(s.register(name, email, password, role)?)
        })
        .await?;

    info!(
        principal_id = %principal.id,
        role = %principal.role,
        balance = %principal.balance(),
        "Registered account"
    );
    Ok(principal)
}

/// Ends the session. Logging out twice is not an error.
pub async fn logout(db: &DbState, session: &SessionState) -> Result<LogoutResponse, ApiError> {
    let previous = db
        .update_session(session, |s| Ok::<_, ApiError>(s.logout()))
        .await?;

    if let Some(principal) = &previous {
        info!(principal_id = %principal.id, "Logged out");
    }
    Ok(LogoutResponse {
        logged_out: previous.map(|p| p.id),
    })
}

/// The logged-in principal with its formatted balance.
pub fn whoami(session: &SessionState, config: &AppConfig) -> Result<AccountResponse, ApiError> {
    let principal = current_principal(session, "view your account")?;
    Ok(AccountResponse::new(principal, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rideshare_db::{Database, DbConfig};

    async fn setup() -> (DbState, SessionState) {
        let db = DbState::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let (_, session) = db.restore(&AppConfig::default()).await.unwrap();
        (db, session)
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let (db, session) = setup().await;

        let principal = login(&db, &session, "any@example.com", "secret", Role::Driver)
            .await
            .unwrap();
        assert_eq!(principal.id, "2");
        assert_eq!(principal.name, "Jane Driver");

        let stored = db.inner().accounts().load_session().await.unwrap();
        assert_eq!(stored.map(|p| p.id), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let (db, session) = setup().await;

        let err = login(&db, &session, "not-an-email", "secret", Role::Rider)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = login(&db, &session, "a@b.com", "", Role::Rider).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_register_then_logout_keeps_account() {
        let (db, session) = setup().await;

        let driver = register(&db, &session, "Ana Souza", "ana@example.com", "pw", Role::Driver)
            .await
            .unwrap();
        assert_eq!(driver.balance().cents(), 50_000);

        let out = logout(&db, &session).await.unwrap();
        assert_eq!(out.logged_out.as_deref(), Some(driver.id.as_str()));
        assert!(session.current().is_none());

        let accounts = db.inner().accounts().load_accounts().await.unwrap().unwrap();
        assert!(accounts.iter().any(|a| a.id == driver.id));
        assert_eq!(db.inner().accounts().load_session().await.unwrap(), None);

        let again = logout(&db, &session).await.unwrap();
        assert!(again.logged_out.is_none());
    }

    #[tokio::test]
    async fn test_whoami_needs_login() {
        let (_, session) = setup().await;
        let err = whoami(&session, &AppConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}

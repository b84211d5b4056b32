//! # Commands Module
//!
//! Every operation the front-end can invoke. Each command takes only the
//! state it needs and returns `Result<T, ApiError>` with a serializable `T`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports, shared helpers)
//! ├── auth.rs     ◄─── login, register, logout, whoami
//! ├── account.rs  ◄─── credit, debit
//! ├── route.rs    ◄─── geocode, estimate
//! ├── ride.rs     ◄─── request, list, lifecycle transitions, waiting window
//! └── admin.rs    ◄─── operator dashboard, account search
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  $ rideshare accept 9f0c...                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  cli::execute ──► commands::ride::accept_ride(db, ledger, session, id)  │
//! │                        │                                                │
//! │                        ├─ session: who is acting?                       │
//! │                        ├─ ledger:  check-and-set under the mutex        │
//! │                        └─ db:      rewrite the ride collection          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stdout: RideRecord as JSON                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod ride;
pub mod route;

use rideshare_core::{CoreError, Principal, Role};

use crate::error::ApiError;
use crate::state::SessionState;

/// The logged-in principal, or `Unauthorized` naming `action`.
pub(crate) fn current_principal(session: &SessionState, action: &str) -> Result<Principal, ApiError> {
    session
        .with_session(|s| s.require_current(action).cloned())
        .map_err(ApiError::from)
}

/// The logged-in principal if it has `role`.
pub(crate) fn require_role(
    session: &SessionState,
    role: Role,
    action: &str,
) -> Result<Principal, ApiError> {
    let principal = current_principal(session, action)?;
    if principal.role != role {
        return Err(CoreError::unauthorized(action, role).into());
    }
    Ok(principal)
}

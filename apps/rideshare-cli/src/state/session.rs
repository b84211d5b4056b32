//! # Session State
//!
//! The shared session store: the account directory plus who is logged in.
//! Same locking pattern as [`super::LedgerState`].

use rideshare_core::{Principal, SessionStore};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle to the session store.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    store: Arc<Mutex<SessionStore>>,
}

impl SessionState {
    /// Wraps a session store restored from storage.
    pub fn new(store: SessionStore) -> Self {
        SessionState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Executes a function with read access to the store.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionStore) -> R,
    {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Executes a function with write access to the store.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionStore) -> R,
    {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// Clone of the logged-in principal, if any.
    pub fn current(&self) -> Option<Principal> {
        self.with_session(|s| s.current().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rideshare_core::{Money, Role};

    #[test]
    fn test_clones_share_the_store() {
        let state = SessionState::default();
        let other = state.clone();

        state
            .with_session_mut(|s| s.login("john@example.com", "pw", Role::Rider))
            .unwrap();
        assert_eq!(other.current().map(|p| p.id), Some("1".to_string()));

        other
            .with_session_mut(|s| s.add_credit(Money::from_cents(500)))
            .unwrap();
        assert_eq!(
            state.current().map(|p| p.balance()),
            Some(Money::from_cents(10_500))
        );
    }
}

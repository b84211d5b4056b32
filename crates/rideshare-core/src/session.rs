//! # Session Store
//!
//! The account directory and the currently logged-in principal.
//!
//! Authentication is mocked: `login` accepts any well-formed credentials and
//! hands back the demo account for the requested role. Accounts outlive the
//! session, so a balance changed by a cancellation fee is still there at the
//! next login.
//!
//! ## Balance Flow
//! ```text
//! add_credit(amount)        current  += amount
//! deduct_credit(amount)     current  -= amount   (may go negative → debt)
//! charge_account(id, fee)   accounts[id] -= fee  (whoever is logged in)
//! ```

use uuid::Uuid;

use crate::demo;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Principal, Role};
use crate::validation::{validate_credit_amount, validate_display_name, validate_email};

/// Accounts plus the id of the principal currently logged in.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    accounts: Vec<Principal>,
    current: Option<String>,
}

impl SessionStore {
    /// Creates a store with no accounts and nobody logged in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted accounts and the persisted session.
    ///
    /// A session principal missing from `accounts` is added to them.
    pub fn restore(accounts: Vec<Principal>, current: Option<Principal>) -> Self {
        let mut store = SessionStore {
            accounts: Vec::new(),
            current: None,
        };
        for account in accounts {
            store.upsert_account(account);
        }
        if let Some(principal) = current {
            if store.account(&principal.id).is_none() {
                store.upsert_account(principal.clone());
            }
            store.current = Some(principal.id);
        }
        store
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// All known accounts.
    pub fn accounts(&self) -> &[Principal] {
        &self.accounts
    }

    /// Looks an account up by id.
    pub fn account(&self, id: &str) -> Option<&Principal> {
        self.accounts.iter().find(|account| account.id == id)
    }

    fn account_mut(&mut self, id: &str) -> Option<&mut Principal> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    /// Inserts an account, replacing one with the same id.
    pub fn upsert_account(&mut self, principal: Principal) {
        match self.account_mut(&principal.id) {
            Some(existing) => *existing = principal,
            None => self.accounts.push(principal),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// The principal currently logged in.
    pub fn current(&self) -> Option<&Principal> {
        self.current.as_deref().and_then(|id| self.account(id))
    }

    /// The current principal, or `NotAuthenticated` naming `action`.
    pub fn require_current(&self, action: &str) -> CoreResult<&Principal> {
        self.current().ok_or_else(|| CoreError::NotAuthenticated {
            action: action.to_string(),
        })
    }

    /// Logs in as the demo account for `role`.
    ///
    /// Any password is accepted; email and password only have to be present.
    /// A demo account already in the directory keeps its stored balance.
    pub fn login(&mut self, email: &str, password: &str, role: Role) -> CoreResult<Principal> {
        validate_email(email)?;
        require_password(password)?;

        let demo_account = demo::demo_principal(role);
        if self.account(&demo_account.id).is_none() {
            self.upsert_account(demo_account.clone());
        }
        self.current = Some(demo_account.id.clone());

        self.require_current("log in").cloned()
    }

    /// Creates a new account and logs it in.
    ///
    /// Drivers start with R$500.00, everyone else with R$100.00.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> CoreResult<Principal> {
        validate_display_name(name)?;
        validate_email(email)?;
        require_password(password)?;

        let name = name.trim();
        let principal = Principal {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.trim().to_string(),
            role,
            avatar: Some(demo::avatar_url(name)),
            account_balance_cents: Some(role.initial_balance().cents()),
        };

        self.upsert_account(principal.clone());
        self.current = Some(principal.id.clone());
        Ok(principal)
    }

    /// Ends the session. The account stays in the directory.
    pub fn logout(&mut self) -> Option<Principal> {
        let previous = self.current().cloned();
        self.current = None;
        previous
    }

    // =========================================================================
    // Balance
    // =========================================================================

    /// Adds credit to the current principal; returns the new balance.
    pub fn add_credit(&mut self, amount: Money) -> CoreResult<Money> {
        validate_credit_amount(amount)?;
        let id = self.require_current("add credit")?.id.clone();
        self.adjust(&id, amount)
    }

    /// Deducts credit from the current principal; returns the new balance.
    ///
    /// The balance may go negative.
    pub fn deduct_credit(&mut self, amount: Money) -> CoreResult<Money> {
        validate_credit_amount(amount)?;
        let id = self.require_current("deduct credit")?.id.clone();
        self.adjust(&id, -amount)
    }

    /// Deducts `amount` from any account, logged in or not.
    pub fn charge_account(&mut self, account_id: &str, amount: Money) -> CoreResult<Money> {
        validate_credit_amount(amount)?;
        self.adjust(account_id, -amount)
    }

    /// True when the current principal owes money.
    pub fn has_debt(&self) -> bool {
        self.current().map(Principal::has_debt).unwrap_or(false)
    }

    fn adjust(&mut self, account_id: &str, delta: Money) -> CoreResult<Money> {
        let account = self
            .account_mut(account_id)
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;
        Ok(account.adjust_balance(delta)?)
    }
}

fn require_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

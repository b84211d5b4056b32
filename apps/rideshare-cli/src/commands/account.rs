//! # Account Commands
//!
//! Balance top-ups and deductions for the logged-in principal.

use rideshare_core::validation::parse_credit_amount;
use rideshare_core::Principal;
use serde::Serialize;
use tracing::info;

use super::current_principal;
use crate::error::ApiError;
use crate::state::{AppConfig, DbState, SessionState};

/// A principal plus display-ready balance fields.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    #[serde(flatten)]
    pub principal: Principal,
    /// Balance formatted with the configured currency symbol
    pub balance: String,
    pub has_debt: bool,
    pub can_request_rides: bool,
}

impl AccountResponse {
    pub fn new(principal: Principal, config: &AppConfig) -> Self {
        AccountResponse {
            balance: config.format_money(principal.balance()),
            has_debt: principal.has_debt(),
            can_request_rides: principal.can_request_rides(),
            principal,
        }
    }
}

/// Adds credit to the logged-in principal.
///
/// ## Arguments
/// * `amount` - User-entered amount such as `"50"` or `"12,50"`
pub async fn add_credit(
    db: &DbState,
    session: &SessionState,
    config: &AppConfig,
    amount: &str,
) -> Result<AccountResponse, ApiError> {
    let amount = parse_credit_amount(amount)?;
    let balance = db
        .update_session(session, |s| Ok::<_, ApiError>(s.add_credit(amount)?))
        .await?;

    let principal = current_principal(session, "add credit")?;
    info!(principal_id = %principal.id, amount = %amount, balance = %balance, "Credit added");
    Ok(AccountResponse::new(principal, config))
}

/// Deducts credit from the logged-in principal. The balance may go negative.
pub async fn deduct_credit(
    db: &DbState,
    session: &SessionState,
    config: &AppConfig,
    amount: &str,
) -> Result<AccountResponse, ApiError> {
    let amount = parse_credit_amount(amount)?;
    let balance = db
        .update_session(session, |s| Ok::<_, ApiError>(s.deduct_credit(amount)?))
        .await?;

    let principal = current_principal(session, "deduct credit")?;
    info!(principal_id = %principal.id, amount = %amount, balance = %balance, "Credit deducted");
    Ok(AccountResponse::new(principal, config))
}

//! # Admin Commands
//!
//! Operator dashboard: ride statistics for a period, ride search and the
//! account directory. Operators only.

use chrono::Utc;
use rideshare_core::analytics::{search_accounts, search_rides, AccountStats, RideStats, TimeFilter};
use rideshare_core::{Principal, RideRecord, Role};
use serde::Serialize;
use tracing::debug;

use super::require_role;
use crate::error::ApiError;
use crate::state::{AppConfig, LedgerState, SessionState};

/// Dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub period: TimeFilter,
    pub search: Option<String>,
    pub rides: RideStats,
    pub accounts: AccountStats,
    /// Completed-ride revenue formatted with the configured symbol
    pub revenue: String,
    pub fee_revenue: String,
    /// Rides inside the period matching the search, newest first
    pub matching: Vec<RideRecord>,
}

/// Statistics over the rides created inside `period` that match `search`.
pub fn dashboard(
    ledger: &LedgerState,
    session: &SessionState,
    config: &AppConfig,
    period: TimeFilter,
    search: Option<&str>,
) -> Result<Dashboard, ApiError> {
    let operator = require_role(session, Role::Operator, "view the dashboard")?;
    let term = search.unwrap_or("");

    let mut matching: Vec<RideRecord> = ledger.with_ledger(|l| {
        search_rides(l.iter(), period, term, Utc::now())
            .into_iter()
            .cloned()
            .collect()
    });
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let rides = RideStats::compute(&matching);
    let accounts = session.with_session(|s| AccountStats::compute(s.accounts()));

    debug!(
        operator_id = %operator.id,
        period = %period,
        matching = matching.len(),
        "dashboard command"
    );
    Ok(Dashboard {
        period,
        search: search.map(str::to_string),
        revenue: config.format_money(rides.revenue),
        fee_revenue: config.format_money(rides.fee_revenue),
        rides,
        accounts,
        matching,
    })
}

/// Accounts whose name or email contains `search`.
pub fn list_accounts(session: &SessionState, search: Option<&str>) -> Result<Vec<Principal>, ApiError> {
    require_role(session, Role::Operator, "list accounts")?;
    Ok(session.with_session(|s| {
        search_accounts(s.accounts(), search.unwrap_or(""))
            .into_iter()
            .cloned()
            .collect()
    }))
}

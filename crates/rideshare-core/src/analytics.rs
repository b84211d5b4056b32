//! # Operator Dashboard Statistics
//!
//! Read-only aggregates over the ride ledger and the account directory.
//! Nothing here mutates state.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Principal, RideRecord, RideStatus, Role};

// =============================================================================
// Time Filter
// =============================================================================

/// Which slice of history the dashboard shows. Boundaries are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    #[default]
    All,
    /// Since midnight.
    Today,
    /// Since midnight of the most recent Sunday.
    Week,
    /// Since the first day of the month.
    Month,
}

impl TimeFilter {
    /// Earliest `created_at` included by this filter.
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let day = match self {
            TimeFilter::All => return None,
            TimeFilter::Today => today,
            TimeFilter::Week => {
                today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
            }
            TimeFilter::Month => today.with_day(1)?,
        };
        Some(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)))
    }

    /// True if `ride` was created inside the window.
    pub fn includes(&self, ride: &RideRecord, now: DateTime<Utc>) -> bool {
        match self.start(now) {
            Some(start) => ride.created_at >= start,
            None => true,
        }
    }
}

impl FromStr for TimeFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TimeFilter::All),
            "today" => Ok(TimeFilter::Today),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            _ => Err(ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: ["all", "today", "week", "month"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeFilter::All => "all",
            TimeFilter::Today => "today",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Case-insensitive match on rider name, either address, or ride id.
pub fn matches_search(ride: &RideRecord, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    ride.rider_name.to_lowercase().contains(&term)
        || ride.pickup.address.to_lowercase().contains(&term)
        || ride.dropoff.address.to_lowercase().contains(&term)
        || ride.id.to_lowercase().contains(&term)
}

/// Rides inside `filter` that match `term`, in input order.
pub fn search_rides<'a>(
    rides: impl IntoIterator<Item = &'a RideRecord>,
    filter: TimeFilter,
    term: &str,
    now: DateTime<Utc>,
) -> Vec<&'a RideRecord> {
    rides
        .into_iter()
        .filter(|ride| filter.includes(ride, now) && matches_search(ride, term))
        .collect()
}

/// Accounts whose name or email contains `term`.
pub fn search_accounts<'a>(accounts: &'a [Principal], term: &str) -> Vec<&'a Principal> {
    let term = term.trim().to_lowercase();
    accounts
        .iter()
        .filter(|account| {
            term.is_empty()
                || account.name.to_lowercase().contains(&term)
                || account.email.to_lowercase().contains(&term)
        })
        .collect()
}

// =============================================================================
// Ride Stats
// =============================================================================

/// Dashboard totals for a set of rides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RideStats {
    pub total: usize,
    pub pending: usize,
    /// Accepted, en route, arrived or in progress.
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Sum of completed ride prices.
    pub revenue: Money,
    /// Sum of cancellation fees charged.
    pub fee_revenue: Money,
    /// Mean completed ride price; zero when nothing completed.
    pub average_price: Money,
    /// Total distance over all rides, km.
    pub total_distance_km: f64,
    /// Completed share of all rides, whole percent.
    pub completion_rate: u32,
}

impl RideStats {
    /// Aggregates `rides`.
    pub fn compute<'a>(rides: impl IntoIterator<Item = &'a RideRecord>) -> Self {
        let mut stats = RideStats::default();

        for ride in rides {
            stats.total += 1;
            stats.total_distance_km += ride.distance_km;
            match ride.status {
                RideStatus::Pending => stats.pending += 1,
                RideStatus::Completed => {
                    stats.completed += 1;
                    stats.revenue += ride.price();
                }
                RideStatus::Cancelled => stats.cancelled += 1,
                _ => stats.active += 1,
            }
            if let Some(fee) = ride.cancellation_fee() {
                stats.fee_revenue += fee;
            }
        }

        if stats.completed > 0 {
            let completed = stats.completed as f64;
            stats.average_price =
                Money::from_cents((stats.revenue.cents() as f64 / completed).round() as i64);
        }
        if stats.total > 0 {
            stats.completion_rate =
                (stats.completed as f64 / stats.total as f64 * 100.0).round() as u32;
        }
        stats
    }
}

/// Account counts by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountStats {
    pub riders: usize,
    pub drivers: usize,
    pub operators: usize,
}

impl AccountStats {
    pub fn compute(accounts: &[Principal]) -> Self {
        accounts.iter().fold(AccountStats::default(), |mut acc, account| {
            match account.role {
                Role::Rider => acc.riders += 1,
                Role::Driver => acc.drivers += 1,
                Role::Operator => acc.operators += 1,
            }
            acc
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_time_filter_boundaries() {
        // Wednesday
        let now = at("2026-03-18T15:30:00Z");

        assert_eq!(TimeFilter::All.start(now), None);
        assert_eq!(TimeFilter::Today.start(now), Some(at("2026-03-18T00:00:00Z")));
        assert_eq!(TimeFilter::Week.start(now), Some(at("2026-03-15T00:00:00Z")));
        assert_eq!(TimeFilter::Month.start(now), Some(at("2026-03-01T00:00:00Z")));

        // Sunday is its own week start
        let sunday = at("2026-03-15T08:00:00Z");
        assert_eq!(TimeFilter::Week.start(sunday), Some(at("2026-03-15T00:00:00Z")));
    }

    #[test]
    fn test_stats_over_sample_rides() {
        let rides = demo::sample_rides(at("2026-03-18T12:00:00Z"));
        let stats = RideStats::compute(&rides);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.revenue, Money::from_cents(576));
        assert_eq!(stats.average_price, Money::from_cents(576));
        assert_eq!(stats.completion_rate, 33);
        assert!((stats.total_distance_km - 14.4).abs() < 1e-9);
    }

    #[test]
    fn test_stats_count_fees_and_active() {
        let mut rides = demo::sample_rides(at("2026-03-18T12:00:00Z"));
        rides[0].status = RideStatus::Cancelled;
        rides[0].cancellation_fee_cents = Some(1000);
        rides[1].status = RideStatus::EnRoute;

        let stats = RideStats::compute(&rides);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.revenue, Money::zero());
        assert_eq!(stats.fee_revenue, Money::from_cents(1000));
    }

    #[test]
    fn test_empty_stats() {
        let rides: Vec<RideRecord> = Vec::new();
        let stats = RideStats::compute(&rides);
        assert_eq!(stats, RideStats::default());
    }

    #[test]
    fn test_search_rides() {
        let now = at("2026-03-18T12:00:00Z");
        let rides = demo::sample_rides(now);

        assert_eq!(search_rides(&rides, TimeFilter::All, "", now).len(), 3);
        assert_eq!(search_rides(&rides, TimeFilter::All, "PAULISTA", now).len(), 1);
        assert!(search_rides(&rides, TimeFilter::All, "nowhere", now).is_empty());

        // Sample rides are spread over the past hours
        assert_eq!(search_rides(&rides, TimeFilter::Month, "", now).len(), 3);
    }

    #[test]
    fn test_account_stats_and_search() {
        let accounts = demo::demo_principals();
        let stats = AccountStats::compute(&accounts);
        assert_eq!((stats.riders, stats.drivers, stats.operators), (1, 1, 1));

        assert_eq!(search_accounts(&accounts, "jane").len(), 1);
        assert_eq!(search_accounts(&accounts, "example.com").len(), 3);
    }
}

//! # Domain Types
//!
//! Core domain types used throughout the rideshare demo.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Principal     │   │   RideRecord    │   │  RouteEstimate  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (UUID)      │   │  distance_km    │       │
//! │  │  role           │   │  rider_id       │   │  duration_secs  │       │
//! │  │  balance_cents  │   │  status         │   │  geometry       │       │
//! │  └─────────────────┘   │  price_cents    │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Role       │   │   RideStatus    │   │    Location     │       │
//! │  │  Rider          │   │  Pending ...    │   │  lat, lon       │       │
//! │  │  Driver         │   │  Completed      │   │  address        │       │
//! │  │  Operator       │   │  Cancelled      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// The closed set of principal roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Requests rides and pays for them.
    Rider,
    /// Accepts and drives rides.
    Driver,
    /// Sees every ride on the dashboard.
    Operator,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Role; 3] = [Role::Rider, Role::Driver, Role::Operator];

    /// Lowercase name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Rider => "rider",
            Role::Driver => "driver",
            Role::Operator => "operator",
        }
    }

    /// Balance a freshly registered principal starts with.
    pub fn initial_balance(&self) -> Money {
        match self {
            Role::Driver => Money::from_cents(50_000),
            Role::Rider | Role::Operator => Money::from_cents(10_000),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the legacy front-end labels `user` and `admin` as well.
impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rider" | "user" | "passenger" => Ok(Role::Rider),
            "driver" => Ok(Role::Driver),
            "operator" | "admin" => Ok(Role::Operator),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: Role::ALL.iter().map(|r| r.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Principal
// =============================================================================

/// An authenticated actor of the mocked session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub avatar: Option<String>,
    /// Signed balance in centavos. Negative means the principal owes money.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub account_balance_cents: Option<i64>,
}

impl Principal {
    /// Returns the balance, treating a missing balance as zero.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.account_balance_cents.unwrap_or(0))
    }

    /// True when the balance is negative.
    #[inline]
    pub fn has_debt(&self) -> bool {
        self.balance().is_negative()
    }

    /// Riders without debt may request rides.
    pub fn can_request_rides(&self) -> bool {
        self.role == Role::Rider && !self.has_debt()
    }

    /// Adds a signed delta to the balance and returns the new balance.
    ///
    /// The balance is left unchanged if the result would overflow.
    pub(crate) fn adjust_balance(&mut self, delta: Money) -> Result<Money, ValidationError> {
        let balance = self
            .balance()
            .checked_add(delta)
            .ok_or_else(|| ValidationError::TooLarge {
                field: "balance".to_string(),
            })?;
        self.account_balance_cents = Some(balance.cents());
        Ok(balance)
    }
}

// =============================================================================
// Location
// =============================================================================

/// A point on the map with a free-text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl Location {
    /// Creates a new location.
    pub fn new(latitude: f64, longitude: f64, address: impl Into<String>) -> Self {
        Location {
            latitude,
            longitude,
            address: address.into(),
        }
    }

    /// Returns the `[longitude, latitude]` pair used by route geometry.
    #[inline]
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

// =============================================================================
// Route Estimate
// =============================================================================

/// Derived distance/duration/polyline between two locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RouteEstimate {
    /// Estimated road distance in kilometres (2 decimals).
    pub distance_km: f64,
    /// Estimated travel time in whole seconds.
    pub duration_secs: u64,
    /// Ordered `[longitude, latitude]` pairs from pickup to dropoff.
    pub geometry: Vec<[f64; 2]>,
}

impl RouteEstimate {
    /// Price of a ride over this route.
    pub fn price(&self) -> Money {
        Money::price_for_distance(self.distance_km)
    }

    /// Duration rounded to whole minutes, as shown to the rider.
    pub fn duration_minutes(&self) -> u64 {
        (self.duration_secs + 30) / 60
    }
}

// =============================================================================
// Ride Status
// =============================================================================

/// The lifecycle status of a ride.
///
/// ## Transition Graph
/// ```text
/// pending ──► accepted ──► en_route ──► arrived ──► in_progress ──► completed
///    │            │                        │
///    └────────────┴──► cancelled ◄─────────┘ (fee path only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    /// Waiting for a driver.
    Pending,
    /// Claimed by exactly one driver.
    Accepted,
    /// Driver is heading to the pickup point.
    EnRoute,
    /// Driver is waiting at the pickup point.
    Arrived,
    /// Rider on board; verification code checked.
    InProgress,
    /// Ride finished.
    Completed,
    /// Ride cancelled, with or without fee.
    Cancelled,
}

impl RideStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [RideStatus; 7] = [
        RideStatus::Pending,
        RideStatus::Accepted,
        RideStatus::EnRoute,
        RideStatus::Arrived,
        RideStatus::InProgress,
        RideStatus::Completed,
        RideStatus::Cancelled,
    ];

    /// Terminal statuses admit no further transition.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// True for rides a driver is currently working on.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RideStatus::Accepted | RideStatus::EnRoute | RideStatus::Arrived | RideStatus::InProgress
        )
    }

    /// Whether `next` is an edge of the lifecycle graph.
    pub fn can_transition_to(&self, next: RideStatus) -> bool {
        use RideStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Cancelled)
                | (Accepted, EnRoute)
                | (Accepted, Cancelled)
                | (EnRoute, Arrived)
                | (Arrived, InProgress)
                | (Arrived, Cancelled)
                | (InProgress, Completed)
        )
    }

    /// snake_case name, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Pending => "pending",
            RideStatus::Accepted => "accepted",
            RideStatus::EnRoute => "en_route",
            RideStatus::Arrived => "arrived",
            RideStatus::InProgress => "in_progress",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for RideStatus {
    fn default() -> Self {
        RideStatus::Pending
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RideStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        RideStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: RideStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Verification Code
// =============================================================================

/// The 4-digit secret the rider reads out before the ride starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Draws a fresh code in `1000..=9999`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        VerificationCode(rng.gen_range(1000..=9999u32).to_string())
    }

    /// Parses user input; exactly four ASCII digits.
    ///
    /// ## Example
    /// ```rust
    /// use rideshare_core::VerificationCode;
    ///
    /// assert!(VerificationCode::parse("0427").is_ok());
    /// assert!(VerificationCode::parse("42").is_err());
    /// assert!(VerificationCode::parse("12a4").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let code = input.trim();
        if code.is_empty() {
            return Err(ValidationError::required("verification code"));
        }
        if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "verification code",
                "must be exactly 4 digits",
            ));
        }
        Ok(VerificationCode(code.to_string()))
    }

    /// Wraps a literal known to be four digits (fixtures).
    pub(crate) fn fixed(code: &'static str) -> Self {
        debug_assert!(code.len() == 4 && code.bytes().all(|b| b.is_ascii_digit()));
        VerificationCode(code.to_string())
    }

    /// The code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Ride Record
// =============================================================================

/// A ride request and everything that happened to it.
///
/// Optional fields are filled in as the ride advances; once set they are
/// never cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RideRecord {
    pub id: String,
    pub rider_id: String,
    pub rider_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub rider_phone: Option<String>,
    pub pickup: Location,
    pub dropoff: Location,
    pub distance_km: f64,
    /// `round(distance_km × 1.80, 2)` in centavos.
    pub price_cents: i64,
    pub status: RideStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub verification_code: VerificationCode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub accepted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>", optional)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>", optional)]
    pub en_route_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>", optional)]
    pub arrived_at: Option<DateTime<Utc>>,
    /// Length of the waiting window opened on arrival.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub waiting_time_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>", optional)]
    pub in_progress_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>", optional)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>", optional)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub cancellation_fee_cents: Option<i64>,
}

impl RideRecord {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cancellation fee, if one was charged.
    #[inline]
    pub fn cancellation_fee(&self) -> Option<Money> {
        self.cancellation_fee_cents.map(Money::from_cents)
    }

    /// True if `driver_id` holds this ride.
    #[inline]
    pub fn is_assigned_to(&self, driver_id: &str) -> bool {
        self.accepted_by.as_deref() == Some(driver_id)
    }

    /// Time left in the arrival waiting window.
    ///
    /// `None` unless the ride is `arrived`. Purely advisory: the ledger never
    /// cancels on its own, the front-end prompts the driver instead.
    pub fn waiting_window_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.status != RideStatus::Arrived {
            return None;
        }
        let arrived_at = self.arrived_at?;
        let window = Duration::seconds(i64::from(self.waiting_time_secs.unwrap_or(0)));
        let elapsed = now - arrived_at;
        Some((window - elapsed).max(Duration::zero()))
    }

    /// True once the waiting window has run out.
    pub fn is_waiting_window_expired(&self, now: DateTime<Utc>) -> bool {
        self.waiting_window_remaining(now)
            .map(|left| left.is_zero())
            .unwrap_or(false)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_role_parsing_accepts_legacy_labels() {
        assert_eq!("rider".parse::<Role>().unwrap(), Role::Rider);
        assert_eq!("user".parse::<Role>().unwrap(), Role::Rider);
        assert_eq!("Driver".parse::<Role>().unwrap(), Role::Driver);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Operator);
        assert!("pilot".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Operator).unwrap(), "\"operator\"");
    }

    #[test]
    fn test_status_graph() {
        use RideStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Accepted.can_transition_to(EnRoute));
        assert!(EnRoute.can_transition_to(Arrived));
        assert!(Arrived.can_transition_to(InProgress));
        assert!(Arrived.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(InProgress));
        assert!(!EnRoute.can_transition_to(Cancelled));
        assert!(!InProgress.can_transition_to(Cancelled));

        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in RideStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in RideStatus::ALL {
            assert_eq!(status.to_string().parse::<RideStatus>().unwrap(), status);
        }
        assert_eq!("en-route".parse::<RideStatus>().unwrap(), RideStatus::EnRoute);
        assert_eq!(
            serde_json::to_string(&RideStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_verification_code_random_is_four_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let code = VerificationCode::random(&mut rng);
            assert_eq!(code.as_str().len(), 4);
            assert!(VerificationCode::parse(code.as_str()).is_ok());
        }
    }

    #[test]
    fn test_verification_code_parse() {
        assert_eq!(VerificationCode::parse(" 1234 ").unwrap().as_str(), "1234");
        assert!(VerificationCode::parse("").is_err());
        assert!(VerificationCode::parse("12345").is_err());
        assert!(VerificationCode::parse("१२३४").is_err());
    }

    #[test]
    fn test_principal_debt() {
        let mut rider = Principal {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            role: Role::Rider,
            avatar: None,
            account_balance_cents: None,
        };
        assert_eq!(rider.balance(), Money::zero());
        assert!(rider.can_request_rides());

        rider.adjust_balance(Money::from_cents(-1)).unwrap();
        assert!(rider.has_debt());
        assert!(!rider.can_request_rides());

        rider.account_balance_cents = Some(i64::MAX - 10);
        let err = rider.adjust_balance(Money::from_cents(11)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert_eq!(rider.balance(), Money::from_cents(i64::MAX - 10));
    }

    #[test]
    fn test_ts_bindings_mark_optional_fields() {
        let ride = RideRecord::decl();
        assert!(ride.contains("rider_phone?: string"));
        assert!(ride.contains("accepted_by?: string"));
        assert!(ride.contains("arrived_at?: string"));
        assert!(ride.contains("cancellation_fee_cents?: "));

        let principal = Principal::decl();
        assert!(principal.contains("account_balance_cents?: "));
    }
}

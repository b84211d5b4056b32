//! # Ride Ledger
//!
//! The authoritative collection of ride records and the only place their
//! status changes.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Ride Lifecycle                                    │
//! │                                                                         │
//! │  rider   create()               ──► pending                             │
//! │  driver  accept()               pending     ──► accepted                │
//! │  driver  start_navigation()     accepted    ──► en_route                │
//! │  driver  arrived_at_pickup()    en_route    ──► arrived  (180 s window) │
//! │  driver  start_ride(code)       arrived     ──► in_progress             │
//! │  driver  complete_ride()        in_progress ──► completed               │
//! │  driver  cancel_ride_with_fee() arrived     ──► cancelled (+ R$10 fee)  │
//! │  any*    cancel_ride()          pending | accepted ──► cancelled        │
//! │                                                                         │
//! │  * the rider who owns the ride, the driver holding it, or an operator  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Check-and-Set
//! Every transition reads the current status and writes the new one through
//! the same `&mut self` borrow, so a transition only happens if the ride is
//! still in the expected status. Wrapped in a mutex (see the CLI's
//! `LedgerState`), this makes `accept` single-assignment: of two drivers
//! racing for the same pending ride, the second one observes `accepted` and
//! gets [`CoreError::InvalidRideStatus`].
//!
//! A failed operation never modifies the ledger.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Location, Principal, RideRecord, RideStatus, Role, VerificationCode};
use crate::validation::{validate_distance_km, validate_location};
use crate::{CANCELLATION_FEE_CENTS, DEFAULT_RIDER_PHONE, WAITING_WINDOW_SECS};

// =============================================================================
// Inputs & Outputs
// =============================================================================

/// What a rider submits when requesting a ride.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRide {
    pub pickup: Location,
    pub dropoff: Location,
    pub distance_km: f64,
    pub rider_phone: Option<String>,
}

impl NewRide {
    /// Creates a request with the placeholder phone number.
    pub fn new(pickup: Location, dropoff: Location, distance_km: f64) -> Self {
        NewRide {
            pickup,
            dropoff,
            distance_km,
            rider_phone: None,
        }
    }
}

/// A fee the caller must deduct from the rider's account.
///
/// Returned by [`RideLedger::cancel_ride_with_fee`]; the ledger does not own
/// balances, the session store does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCharge {
    pub ride_id: String,
    pub rider_id: String,
    pub amount: Money,
}

// =============================================================================
// Ledger
// =============================================================================

/// Rides keyed by id, remembering insertion order for listings.
#[derive(Debug, Clone, Default)]
pub struct RideLedger {
    rides: HashMap<String, RideRecord>,
    order: Vec<String>,
}

impl RideLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from a stored collection.
    ///
    /// Later records with a duplicate id replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = RideRecord>) -> Self {
        let mut ledger = RideLedger::new();
        for record in records {
            ledger.insert(record);
        }
        ledger
    }

    fn insert(&mut self, record: RideRecord) {
        if !self.rides.contains_key(&record.id) {
            self.order.push(record.id.clone());
        }
        self.rides.insert(record.id.clone(), record);
    }

    /// The whole collection, in insertion order, for persistence.
    pub fn snapshot(&self) -> Vec<RideRecord> {
        self.iter().cloned().collect()
    }

    /// Iterates over all rides in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RideRecord> {
        self.order.iter().filter_map(move |id| self.rides.get(id))
    }

    /// Number of rides.
    pub fn len(&self) -> usize {
        self.rides.len()
    }

    /// True if there are no rides.
    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }

    /// Looks a ride up by id.
    pub fn get(&self, ride_id: &str) -> Option<&RideRecord> {
        self.rides.get(ride_id)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Pending rides any driver may accept.
    pub fn available_rides(&self) -> Vec<&RideRecord> {
        self.iter()
            .filter(|ride| ride.status == RideStatus::Pending)
            .collect()
    }

    /// Rides requested by `rider_id`.
    pub fn rides_for_rider(&self, rider_id: &str) -> Vec<&RideRecord> {
        self.iter().filter(|ride| ride.rider_id == rider_id).collect()
    }

    /// Rides held by `driver_id`.
    pub fn rides_for_driver(&self, driver_id: &str) -> Vec<&RideRecord> {
        self.iter()
            .filter(|ride| ride.is_assigned_to(driver_id))
            .collect()
    }

    /// The rides a principal sees on their own ride list.
    pub fn rides_visible_to(&self, principal: &Principal) -> Vec<&RideRecord> {
        match principal.role {
            Role::Rider => self.rides_for_rider(&principal.id),
            Role::Driver => self.rides_for_driver(&principal.id),
            Role::Operator => self.iter().collect(),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Records a new pending ride for `rider`.
    ///
    /// ## Guards
    /// - `rider` must have the rider role
    /// - balance must not be negative
    /// - both locations and the distance must be valid
    ///
    /// ## Result
    /// `price = round(distance × 1.80, 2)`, status `pending`, `created_at = now`.
    pub fn create(
        &mut self,
        rider: &Principal,
        request: NewRide,
        code: VerificationCode,
        now: DateTime<Utc>,
    ) -> CoreResult<RideRecord> {
        require_role(rider, Role::Rider, "request rides")?;
        if rider.has_debt() {
            return Err(CoreError::OutstandingDebt {
                balance: rider.balance(),
            });
        }
        validate_location(&request.pickup)?;
        validate_location(&request.dropoff)?;
        validate_distance_km(request.distance_km)?;

        let record = RideRecord {
            id: Uuid::new_v4().to_string(),
            rider_id: rider.id.clone(),
            rider_name: rider.name.clone(),
            rider_phone: Some(
                request
                    .rider_phone
                    .unwrap_or_else(|| DEFAULT_RIDER_PHONE.to_string()),
            ),
            pickup: request.pickup,
            dropoff: request.dropoff,
            distance_km: request.distance_km,
            price_cents: Money::price_for_distance(request.distance_km).cents(),
            status: RideStatus::Pending,
            created_at: now,
            verification_code: code,
            accepted_by: None,
            accepted_at: None,
            en_route_at: None,
            arrived_at: None,
            waiting_time_secs: None,
            in_progress_at: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_fee_cents: None,
        };

        self.insert(record.clone());
        Ok(record)
    }

    /// Claims a pending ride for `driver`.
    ///
    /// Check-and-set on `status == pending`: a ride already accepted (by this
    /// or any other driver) is rejected and `accepted_by` stays as it was.
    pub fn accept(
        &mut self,
        ride_id: &str,
        driver: &Principal,
        now: DateTime<Utc>,
    ) -> CoreResult<RideRecord> {
        require_role(driver, Role::Driver, "accept rides")?;
        self.transition(
            ride_id,
            "accept ride",
            &[RideStatus::Pending],
            RideStatus::Accepted,
            |ride| {
                ride.accepted_by = Some(driver.id.clone());
                ride.accepted_at = Some(now);
            },
        )
    }

    /// Driver starts heading to the pickup point.
    pub fn start_navigation(
        &mut self,
        ride_id: &str,
        driver: &Principal,
        now: DateTime<Utc>,
    ) -> CoreResult<RideRecord> {
        self.require_assigned_driver(ride_id, driver, "start navigation")?;
        self.transition(
            ride_id,
            "start navigation",
            &[RideStatus::Accepted],
            RideStatus::EnRoute,
            |ride| ride.en_route_at = Some(now),
        )
    }

    /// Driver reached the pickup point; opens the 180 s waiting window.
    pub fn arrived_at_pickup(
        &mut self,
        ride_id: &str,
        driver: &Principal,
        now: DateTime<Utc>,
    ) -> CoreResult<RideRecord> {
        self.require_assigned_driver(ride_id, driver, "mark arrival")?;
        self.transition(
            ride_id,
            "mark arrival",
            &[RideStatus::EnRoute],
            RideStatus::Arrived,
            |ride| {
                ride.arrived_at = Some(now);
                ride.waiting_time_secs = Some(WAITING_WINDOW_SECS);
            },
        )
    }

    /// Starts the ride once the rider's code checks out.
    ///
    /// A malformed code is a validation error; a well-formed but wrong code is
    /// [`CoreError::VerificationCodeMismatch`]. Neither changes the ride.
    pub fn start_ride(
        &mut self,
        ride_id: &str,
        driver: &Principal,
        code: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<RideRecord> {
        let supplied = VerificationCode::parse(code)?;
        let ride = self.require_assigned_driver(ride_id, driver, "start ride")?;

        if ride.status == RideStatus::Arrived && ride.verification_code != supplied {
            return Err(CoreError::VerificationCodeMismatch {
                ride_id: ride_id.to_string(),
            });
        }

        self.transition(
            ride_id,
            "start ride",
            &[RideStatus::Arrived],
            RideStatus::InProgress,
            |ride| ride.in_progress_at = Some(now),
        )
    }

    /// Finishes an in-progress ride.
    pub fn complete_ride(
        &mut self,
        ride_id: &str,
        driver: &Principal,
        now: DateTime<Utc>,
    ) -> CoreResult<RideRecord> {
        self.require_assigned_driver(ride_id, driver, "complete ride")?;
        self.transition(
            ride_id,
            "complete ride",
            &[RideStatus::InProgress],
            RideStatus::Completed,
            |ride| ride.completed_at = Some(now),
        )
    }

    /// Driver gives up on a no-show rider and charges the fixed fee.
    ///
    /// The waiting window is not checked here; the front-end offers this
    /// action once its countdown reaches zero. The returned [`FeeCharge`]
    /// names the ride's owner, whoever is logged in.
    pub fn cancel_ride_with_fee(
        &mut self,
        ride_id: &str,
        driver: &Principal,
        now: DateTime<Utc>,
    ) -> CoreResult<(RideRecord, FeeCharge)> {
        self.require_assigned_driver(ride_id, driver, "cancel ride with fee")?;
        let fee = Money::from_cents(CANCELLATION_FEE_CENTS);

        let ride = self.transition(
            ride_id,
            "cancel ride with fee",
            &[RideStatus::Arrived],
            RideStatus::Cancelled,
            |ride| {
                ride.cancelled_at = Some(now);
                ride.cancellation_fee_cents = Some(fee.cents());
            },
        )?;

        let charge = FeeCharge {
            ride_id: ride.id.clone(),
            rider_id: ride.rider_id.clone(),
            amount: fee,
        };
        Ok((ride, charge))
    }

    /// Cancels a ride without fee.
    ///
    /// Allowed for the owning rider, the driver holding the ride, or any
    /// operator, while the ride is still `pending` or `accepted`.
    pub fn cancel_ride(
        &mut self,
        ride_id: &str,
        actor: &Principal,
        now: DateTime<Utc>,
    ) -> CoreResult<RideRecord> {
        let ride = self.find(ride_id)?;
        let participant = match actor.role {
            Role::Operator => true,
            Role::Rider => ride.rider_id == actor.id,
            Role::Driver => ride.is_assigned_to(&actor.id),
        };
        if !participant {
            return Err(CoreError::NotRideParticipant {
                ride_id: ride_id.to_string(),
                principal_id: actor.id.clone(),
            });
        }

        self.transition(
            ride_id,
            "cancel ride",
            &[RideStatus::Pending, RideStatus::Accepted],
            RideStatus::Cancelled,
            |ride| ride.cancelled_at = Some(now),
        )
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn find(&self, ride_id: &str) -> CoreResult<&RideRecord> {
        self.rides
            .get(ride_id)
            .ok_or_else(|| CoreError::RideNotFound(ride_id.to_string()))
    }

    fn require_assigned_driver(
        &self,
        ride_id: &str,
        driver: &Principal,
        action: &str,
    ) -> CoreResult<&RideRecord> {
        require_role(driver, Role::Driver, action)?;
        let ride = self.find(ride_id)?;
        if !ride.is_assigned_to(&driver.id) {
            return Err(CoreError::NotRideParticipant {
                ride_id: ride_id.to_string(),
                principal_id: driver.id.clone(),
            });
        }
        Ok(ride)
    }

    /// Moves a ride from one of `from` to `to`, then lets `apply` stamp fields.
    fn transition(
        &mut self,
        ride_id: &str,
        action: &str,
        from: &[RideStatus],
        to: RideStatus,
        apply: impl FnOnce(&mut RideRecord),
    ) -> CoreResult<RideRecord> {
        let ride = self
            .rides
            .get_mut(ride_id)
            .ok_or_else(|| CoreError::RideNotFound(ride_id.to_string()))?;

        if !from.contains(&ride.status) || !ride.status.can_transition_to(to) {
            return Err(CoreError::invalid_status(ride_id, ride.status, action));
        }

        ride.status = to;
        apply(ride);
        Ok(ride.clone())
    }
}

fn require_role(principal: &Principal, role: Role, action: &str) -> CoreResult<()> {
    if principal.role != role {
        return Err(CoreError::unauthorized(action, role));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn principal(id: &str, role: Role, balance_cents: i64) -> Principal {
        Principal {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            role,
            avatar: None,
            account_balance_cents: Some(balance_cents),
        }
    }

    fn rider() -> Principal {
        principal("rider-1", Role::Rider, 10_000)
    }

    fn driver() -> Principal {
        principal("driver-1", Role::Driver, 50_000)
    }

    fn other_driver() -> Principal {
        principal("driver-2", Role::Driver, 50_000)
    }

    fn operator() -> Principal {
        principal("op-1", Role::Operator, 100_000)
    }

    fn code() -> VerificationCode {
        VerificationCode::parse("1234").unwrap()
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn request(distance_km: f64) -> NewRide {
        NewRide::new(
            Location::new(-23.5505, -46.6333, "Av. Paulista, 1000 - São Paulo"),
            Location::new(-23.5608, -46.6500, "Rua Augusta, 500 - São Paulo"),
            distance_km,
        )
    }

    fn created(ledger: &mut RideLedger) -> String {
        ledger.create(&rider(), request(2.5), code(), t0()).unwrap().id
    }

    fn arrived(ledger: &mut RideLedger) -> String {
        let id = created(ledger);
        ledger.accept(&id, &driver(), t0()).unwrap();
        ledger.start_navigation(&id, &driver(), t0()).unwrap();
        ledger.arrived_at_pickup(&id, &driver(), t0()).unwrap();
        id
    }

    #[test]
    fn test_create_prices_and_starts_pending() {
        let mut ledger = RideLedger::new();
        let ride = ledger.create(&rider(), request(2.5), code(), t0()).unwrap();

        assert_eq!(ride.status, RideStatus::Pending);
        assert_eq!(ride.price_cents, 450);
        assert_eq!(ride.created_at, t0());
        assert_eq!(ride.rider_id, "rider-1");
        assert_eq!(ride.rider_phone.as_deref(), Some(DEFAULT_RIDER_PHONE));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&ride.id), Some(&ride));
    }

    #[test]
    fn test_create_price_rule_holds_for_many_distances() {
        let mut ledger = RideLedger::new();
        for tenths in 1..200 {
            let km = tenths as f64 / 10.0 + 0.037;
            let ride = ledger.create(&rider(), request(km), code(), t0()).unwrap();
            assert_eq!(ride.price_cents, (km * 1.8 * 100.0).round() as i64, "km={km}");
        }
    }

    #[test]
    fn test_create_requires_rider_without_debt() {
        let mut ledger = RideLedger::new();

        let err = ledger.create(&driver(), request(2.5), code(), t0()).unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized { required: Role::Rider, .. }));

        let broke = principal("rider-2", Role::Rider, -1);
        let err = ledger.create(&broke, request(2.5), code(), t0()).unwrap_err();
        assert!(matches!(err, CoreError::OutstandingDebt { .. }));

        // Zero balance is not debt
        let zero = principal("rider-3", Role::Rider, 0);
        assert!(ledger.create(&zero, request(2.5), code(), t0()).is_ok());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let mut ledger = RideLedger::new();

        let mut bad = request(2.5);
        bad.pickup.latitude = f64::NAN;
        assert!(matches!(
            ledger.create(&rider(), bad, code(), t0()),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.create(&rider(), request(0.0), code(), t0()),
            Err(CoreError::Validation(_))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut ledger = RideLedger::new();
        let id = created(&mut ledger);

        let ride = ledger.accept(&id, &driver(), t0() + Duration::minutes(1)).unwrap();
        assert_eq!(ride.status, RideStatus::Accepted);
        assert_eq!(ride.accepted_by.as_deref(), Some("driver-1"));
        assert_eq!(ride.accepted_at, Some(t0() + Duration::minutes(1)));

        let ride = ledger.start_navigation(&id, &driver(), t0() + Duration::minutes(2)).unwrap();
        assert_eq!(ride.status, RideStatus::EnRoute);
        assert!(ride.en_route_at.is_some());

        let ride = ledger.arrived_at_pickup(&id, &driver(), t0() + Duration::minutes(5)).unwrap();
        assert_eq!(ride.status, RideStatus::Arrived);
        assert_eq!(ride.waiting_time_secs, Some(WAITING_WINDOW_SECS));

        let ride = ledger.start_ride(&id, &driver(), "1234", t0() + Duration::minutes(6)).unwrap();
        assert_eq!(ride.status, RideStatus::InProgress);
        assert!(ride.in_progress_at.is_some());

        let ride = ledger.complete_ride(&id, &driver(), t0() + Duration::minutes(20)).unwrap();
        assert_eq!(ride.status, RideStatus::Completed);
        assert_eq!(ride.completed_at, Some(t0() + Duration::minutes(20)));

        // Terminal: nothing else goes through
        assert!(ledger.cancel_ride(&id, &operator(), t0()).is_err());
        assert!(ledger.complete_ride(&id, &driver(), t0()).is_err());
        assert_eq!(ledger.get(&id).unwrap().status, RideStatus::Completed);
    }

    #[test]
    fn test_accept_is_single_assignment() {
        let mut ledger = RideLedger::new();
        let id = created(&mut ledger);

        ledger.accept(&id, &driver(), t0()).unwrap();
        let err = ledger.accept(&id, &other_driver(), t0()).unwrap_err();

        assert!(matches!(
            err,
            CoreError::InvalidRideStatus { current: RideStatus::Accepted, .. }
        ));
        assert_eq!(ledger.get(&id).unwrap().accepted_by.as_deref(), Some("driver-1"));

        // Re-accepting by the same driver fails too
        assert!(ledger.accept(&id, &driver(), t0()).is_err());
    }

    #[test]
    fn test_accept_guards() {
        let mut ledger = RideLedger::new();
        let id = created(&mut ledger);

        assert!(matches!(
            ledger.accept(&id, &rider(), t0()),
            Err(CoreError::Unauthorized { required: Role::Driver, .. })
        ));
        assert!(matches!(
            ledger.accept("missing", &driver(), t0()),
            Err(CoreError::RideNotFound(_))
        ));
    }

    #[test]
    fn test_only_assigned_driver_advances() {
        let mut ledger = RideLedger::new();
        let id = created(&mut ledger);
        ledger.accept(&id, &driver(), t0()).unwrap();

        assert!(matches!(
            ledger.start_navigation(&id, &other_driver(), t0()),
            Err(CoreError::NotRideParticipant { .. })
        ));
        assert_eq!(ledger.get(&id).unwrap().status, RideStatus::Accepted);
    }

    #[test]
    fn test_out_of_order_transitions_fail() {
        let mut ledger = RideLedger::new();
        let id = created(&mut ledger);
        ledger.accept(&id, &driver(), t0()).unwrap();

        assert!(matches!(
            ledger.arrived_at_pickup(&id, &driver(), t0()),
            Err(CoreError::InvalidRideStatus { .. })
        ));
        assert!(matches!(
            ledger.complete_ride(&id, &driver(), t0()),
            Err(CoreError::InvalidRideStatus { .. })
        ));
        assert!(matches!(
            ledger.start_ride(&id, &driver(), "1234", t0()),
            Err(CoreError::InvalidRideStatus { .. })
        ));
        assert_eq!(ledger.get(&id).unwrap().status, RideStatus::Accepted);
    }

    #[test]
    fn test_start_ride_wrong_code_keeps_state() {
        let mut ledger = RideLedger::new();
        let id = arrived(&mut ledger);
        let before = ledger.get(&id).unwrap().clone();

        let err = ledger.start_ride(&id, &driver(), "0000", t0()).unwrap_err();
        assert!(matches!(err, CoreError::VerificationCodeMismatch { .. }));

        let after = ledger.get(&id).unwrap();
        assert_eq!(after.status, RideStatus::Arrived);
        assert_eq!(after.verification_code.as_str(), "1234");
        assert_eq!(after, &before);
    }

    #[test]
    fn test_start_ride_malformed_code() {
        let mut ledger = RideLedger::new();
        let id = arrived(&mut ledger);

        assert!(matches!(
            ledger.start_ride(&id, &driver(), "12", t0()),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(ledger.get(&id).unwrap().status, RideStatus::Arrived);
    }

    #[test]
    fn test_cancel_with_fee_charges_owner() {
        let mut ledger = RideLedger::new();
        let id = arrived(&mut ledger);

        let later = t0() + Duration::seconds(200);
        let (ride, charge) = ledger.cancel_ride_with_fee(&id, &driver(), later).unwrap();

        assert_eq!(ride.status, RideStatus::Cancelled);
        assert_eq!(ride.cancelled_at, Some(later));
        assert_eq!(ride.cancellation_fee_cents, Some(CANCELLATION_FEE_CENTS));
        assert_eq!(charge.rider_id, "rider-1");
        assert_eq!(charge.amount, Money::from_cents(1000));
    }

    #[test]
    fn test_cancel_with_fee_requires_arrival() {
        let mut ledger = RideLedger::new();
        let id = created(&mut ledger);
        ledger.accept(&id, &driver(), t0()).unwrap();

        assert!(matches!(
            ledger.cancel_ride_with_fee(&id, &driver(), t0()),
            Err(CoreError::InvalidRideStatus { .. })
        ));
        assert!(ledger.get(&id).unwrap().cancellation_fee_cents.is_none());
    }

    #[test]
    fn test_cancel_ride_permissions() {
        let mut ledger = RideLedger::new();

        // Owner can cancel a pending ride
        let id = created(&mut ledger);
        let ride = ledger.cancel_ride(&id, &rider(), t0()).unwrap();
        assert_eq!(ride.status, RideStatus::Cancelled);
        assert!(ride.cancellation_fee_cents.is_none());

        // A stranger cannot
        let id = created(&mut ledger);
        let stranger = principal("rider-9", Role::Rider, 0);
        assert!(matches!(
            ledger.cancel_ride(&id, &stranger, t0()),
            Err(CoreError::NotRideParticipant { .. })
        ));
        // Nor can a driver who does not hold it
        assert!(ledger.cancel_ride(&id, &driver(), t0()).is_err());

        // Holding driver can cancel an accepted ride
        ledger.accept(&id, &driver(), t0()).unwrap();
        assert!(ledger.cancel_ride(&id, &driver(), t0()).is_ok());

        // Operator can cancel anyone's pending ride
        let id = created(&mut ledger);
        assert!(ledger.cancel_ride(&id, &operator(), t0()).is_ok());
    }

    #[test]
    fn test_cancel_ride_not_after_departure() {
        let mut ledger = RideLedger::new();
        let id = created(&mut ledger);
        ledger.accept(&id, &driver(), t0()).unwrap();
        ledger.start_navigation(&id, &driver(), t0()).unwrap();

        assert!(matches!(
            ledger.cancel_ride(&id, &rider(), t0()),
            Err(CoreError::InvalidRideStatus { current: RideStatus::EnRoute, .. })
        ));
    }

    #[test]
    fn test_waiting_window() {
        let mut ledger = RideLedger::new();
        let id = arrived(&mut ledger);
        let ride = ledger.get(&id).unwrap();

        assert_eq!(
            ride.waiting_window_remaining(t0() + Duration::seconds(60)),
            Some(Duration::seconds(120))
        );
        assert!(!ride.is_waiting_window_expired(t0() + Duration::seconds(179)));
        assert!(ride.is_waiting_window_expired(t0() + Duration::seconds(180)));
        assert_eq!(
            ride.waiting_window_remaining(t0() + Duration::seconds(500)),
            Some(Duration::zero())
        );
    }

    #[test]
    fn test_queries_by_role() {
        let mut ledger = RideLedger::new();
        let first = created(&mut ledger);
        let second = created(&mut ledger);
        ledger.accept(&second, &driver(), t0()).unwrap();

        let available: Vec<_> = ledger.available_rides().iter().map(|r| r.id.clone()).collect();
        assert_eq!(available, vec![first.clone()]);

        assert_eq!(ledger.rides_for_rider("rider-1").len(), 2);
        assert_eq!(ledger.rides_for_driver("driver-1").len(), 1);
        assert_eq!(ledger.rides_visible_to(&driver()).len(), 1);
        assert_eq!(ledger.rides_visible_to(&operator()).len(), 2);
        assert!(ledger.rides_visible_to(&other_driver()).is_empty());
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let mut ledger = RideLedger::new();
        let ids: Vec<_> = (0..5).map(|_| created(&mut ledger)).collect();

        let restored = RideLedger::from_records(ledger.snapshot());
        let restored_ids: Vec<_> = restored.iter().map(|r| r.id.clone()).collect();
        assert_eq!(restored_ids, ids);
    }
}

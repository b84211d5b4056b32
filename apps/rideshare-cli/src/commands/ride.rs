//! # Ride Commands
//!
//! Ride requests, ride lists and every lifecycle transition.
//!
//! ## Ride Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  request ──► pending ──accept──► accepted ──navigate──► en_route        │
//! │                 │                   │                       │           │
//! │               cancel              cancel                  arrive        │
//! │                 │                   │                       ▼           │
//! │                 ▼                   ▼          ┌──────── arrived        │
//! │             cancelled ◄─────────────┘          │            │           │
//! │                 ▲                              │      start (code)      │
//! │                 └──── cancel-with-fee ─────────┘            ▼           │
//! │                       (R$10.00 to the rider)           in_progress      │
//! │                                                             │           │
//! │                                                          complete       │
//! │                                                             ▼           │
//! │                                                         completed       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition runs inside [`DbState::update`]: the ride collection is
//! reloaded under the store's write lock, the transition is checked against
//! it and the result is written before the lock is released. A rejected
//! transition writes nothing.

use chrono::{DateTime, Utc};
use rideshare_core::geocode::Geocoder;
use rideshare_core::validation::validate_ride_id;
use rideshare_core::{
    CoreError, CoreResult, NewRide, Principal, RideLedger, RideRecord, RideStatus, Role,
    VerificationCode,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::current_principal;
use super::route::estimate;
use crate::error::ApiError;
use crate::state::{AppConfig, DbState, LedgerState, SessionState};

/// Which rides `list_rides` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RideScope {
    /// The caller's own rides (all rides for an operator)
    #[default]
    Mine,
    /// Pending rides open for acceptance
    Available,
}

/// A ride request as typed by the rider.
#[derive(Debug, Clone, Default)]
pub struct RideRequest {
    pub pickup: String,
    pub dropoff: String,
    pub rider_phone: Option<String>,
}

/// Result of a fee-charging cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct FeeCancellation {
    pub ride: RideRecord,
    pub rider_id: String,
    pub fee_cents: i64,
    pub fee: String,
    /// Rider balance after the fee
    pub rider_balance_cents: i64,
    pub rider_balance: String,
}

/// Waiting-window countdown for an arrived ride.
#[derive(Debug, Clone, Serialize)]
pub struct WaitStatus {
    pub ride_id: String,
    pub status: RideStatus,
    pub arrived_at: Option<DateTime<Utc>>,
    pub window_secs: Option<u32>,
    /// `None` unless the ride is `arrived`
    pub remaining_secs: Option<i64>,
    pub expired: bool,
    /// The front-end offers `cancel-with-fee` once this is true
    pub can_cancel_with_fee: bool,
}

// =============================================================================
// Request & Queries
// =============================================================================

/// Requests a ride between two free-text addresses.
///
/// ## Flow
/// 1. Resolve both addresses with the geocoder
/// 2. Estimate distance and price
/// 3. Create a `pending` ride with a fresh 4-digit code
/// 4. Rewrite the ride collection in the same store transaction
pub async fn request_ride<G: Geocoder>(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    config: &AppConfig,
    geocoder: &G,
    request: RideRequest,
) -> Result<RideRecord, ApiError> {
    debug!(pickup = %request.pickup, dropoff = %request.dropoff, "request_ride command");
    current_principal(session, "request rides")?;

    let quote = estimate(config, geocoder, &request.pickup, &request.dropoff)?;
    let new_ride = NewRide {
        rider_phone: request.rider_phone,
        ..NewRide::new(quote.pickup, quote.dropoff, quote.distance_km)
    };
    let code = VerificationCode::random(&mut rand::thread_rng());

    let ride = db
        .update(ledger, session, |l, s| -> Result<RideRecord, ApiError> {
            // Balance as stored now, not as loaded at startup
            let rider = s.require_current("request rides")?.clone();
            l.create(&rider, new_ride, code, Utc::now()).map_err(|e| {
                warn!(rider_id = %rider.id, error = %e, "Ride request rejected");
                ApiError::from(e)
            })
        })
        .await?;

    info!(
        ride_id = %ride.id,
        rider_id = %ride.rider_id,
        distance_km = ride.distance_km,
        price = %ride.price(),
        "Ride requested"
    );
    Ok(ride)
}

/// Lists rides for the logged-in principal.
pub fn list_rides(
    ledger: &LedgerState,
    session: &SessionState,
    scope: RideScope,
    status: Option<RideStatus>,
) -> Result<Vec<RideRecord>, ApiError> {
    let principal = current_principal(session, "list rides")?;

    let rides = ledger.with_ledger(|l| {
        let rides = match scope {
            RideScope::Mine => l.rides_visible_to(&principal),
            RideScope::Available => l.available_rides(),
        };
        rides
            .into_iter()
            .filter(|ride| status.map_or(true, |s| ride.status == s))
            .cloned()
            .collect::<Vec<_>>()
    });

    debug!(principal_id = %principal.id, ?scope, count = rides.len(), "list_rides command");
    Ok(rides)
}

/// One ride by id. Riders only see their own rides.
pub fn get_ride(
    ledger: &LedgerState,
    session: &SessionState,
    ride_id: &str,
) -> Result<RideRecord, ApiError> {
    validate_ride_id(ride_id)?;
    let principal = current_principal(session, "view rides")?;
    let ride = ledger
        .with_ledger(|l| l.get(ride_id).cloned())
        .ok_or_else(|| ApiError::not_found("Ride", ride_id))?;

    if principal.role == Role::Rider && ride.rider_id != principal.id {
        return Err(CoreError::NotRideParticipant {
            ride_id: ride_id.to_string(),
            principal_id: principal.id,
        }
        .into());
    }
    Ok(ride)
}

/// Countdown of the arrival waiting window. Advisory only.
pub fn wait_status(ledger: &LedgerState, ride_id: &str) -> Result<WaitStatus, ApiError> {
    validate_ride_id(ride_id)?;
    let now = Utc::now();
    let ride = ledger
        .with_ledger(|l| l.get(ride_id).cloned())
        .ok_or_else(|| ApiError::not_found("Ride", ride_id))?;

    let remaining = ride.waiting_window_remaining(now);
    let expired = ride.is_waiting_window_expired(now);
    Ok(WaitStatus {
        ride_id: ride.id,
        status: ride.status,
        arrived_at: ride.arrived_at,
        window_secs: ride.waiting_time_secs,
        remaining_secs: remaining.map(|d| d.num_seconds()),
        expired,
        can_cancel_with_fee: expired,
    })
}

// =============================================================================
// Transitions
// =============================================================================

/// Driver claims a pending ride. Exactly one of several racing drivers wins.
pub async fn accept_ride(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    ride_id: &str,
) -> Result<RideRecord, ApiError> {
    transition(db, ledger, session, ride_id, "accept ride", |l, actor, now| {
        l.accept(ride_id, actor, now)
    })
    .await
}

/// Driver heads to the pickup point.
pub async fn start_navigation(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    ride_id: &str,
) -> Result<RideRecord, ApiError> {
    transition(db, ledger, session, ride_id, "start navigation", |l, actor, now| {
        l.start_navigation(ride_id, actor, now)
    })
    .await
}

/// Driver reached the pickup point; the waiting window opens.
pub async fn arrive_at_pickup(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    ride_id: &str,
) -> Result<RideRecord, ApiError> {
    transition(db, ledger, session, ride_id, "mark arrival", |l, actor, now| {
        l.arrived_at_pickup(ride_id, actor, now)
    })
    .await
}

/// Starts the ride with the rider's verification code.
pub async fn start_ride(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    ride_id: &str,
    code: &str,
) -> Result<RideRecord, ApiError> {
    transition(db, ledger, session, ride_id, "start ride", |l, actor, now| {
        l.start_ride(ride_id, actor, code, now)
    })
    .await
}

/// Finishes an in-progress ride.
pub async fn complete_ride(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    ride_id: &str,
) -> Result<RideRecord, ApiError> {
    transition(db, ledger, session, ride_id, "complete ride", |l, actor, now| {
        l.complete_ride(ride_id, actor, now)
    })
    .await
}

/// Cancels a pending or accepted ride without fee.
pub async fn cancel_ride(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    ride_id: &str,
) -> Result<RideRecord, ApiError> {
    transition(db, ledger, session, ride_id, "cancel ride", |l, actor, now| {
        l.cancel_ride(ride_id, actor, now)
    })
    .await
}

/// Driver cancels an arrived ride and charges the rider R$10.00.
///
/// The fee always goes to the ride's owner, not to whoever is logged in.
/// Ride and balances are written in one transaction.
pub async fn cancel_ride_with_fee(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    config: &AppConfig,
    ride_id: &str,
) -> Result<FeeCancellation, ApiError> {
    validate_ride_id(ride_id)?;
    let actor = current_principal(session, "cancel ride with fee")?;

    let (ride, charge, balance) = db
        .update(ledger, session, |l, s| -> Result<_, ApiError> {
            // The rider account must exist before the ride is cancelled,
            // otherwise the fee could not be applied afterwards.
            let rider_id = l
                .get(ride_id)
                .map(|ride| ride.rider_id.clone())
                .ok_or_else(|| ApiError::not_found("Ride", ride_id))?;
            if s.account(&rider_id).is_none() {
                return Err(CoreError::AccountNotFound(rider_id).into());
            }

            let (ride, charge) = l
                .cancel_ride_with_fee(ride_id, &actor, Utc::now())
                .map_err(|e| {
                    warn!(
                        ride_id = %ride_id,
                        actor_id = %actor.id,
                        error = %e,
                        "Rejected cancel ride with fee"
                    );
                    ApiError::from(e)
                })?;
            let balance = s.charge_account(&charge.rider_id, charge.amount)?;
            Ok((ride, charge, balance))
        })
        .await?;

    info!(
        ride_id = %ride.id,
        driver_id = %actor.id,
        rider_id = %charge.rider_id,
        fee = %charge.amount,
        rider_balance = %balance,
        "Ride cancelled with fee"
    );
    Ok(FeeCancellation {
        rider_id: charge.rider_id,
        fee_cents: charge.amount.cents(),
        fee: config.format_money(charge.amount),
        rider_balance_cents: balance.cents(),
        rider_balance: config.format_money(balance),
        ride,
    })
}

/// Runs one ledger transition as the logged-in principal and persists it.
async fn transition<F>(
    db: &DbState,
    ledger: &LedgerState,
    session: &SessionState,
    ride_id: &str,
    action: &str,
    apply: F,
) -> Result<RideRecord, ApiError>
where
    F: FnOnce(&mut RideLedger, &Principal, DateTime<Utc>) -> CoreResult<RideRecord>,
{
    validate_ride_id(ride_id)?;
    let actor = current_principal(session, action)?;

    let ride = db
        .update(ledger, session, |l, _| -> Result<RideRecord, ApiError> {
            apply(l, &actor, Utc::now()).map_err(|e| {
                warn!(ride_id = %ride_id, actor_id = %actor.id, error = %e, "Rejected {}", action);
                ApiError::from(e)
            })
        })
        .await?;

    info!(
        ride_id = %ride.id,
        actor_id = %actor.id,
        status = %ride.status,
        "Ride transition: {}",
        action
    );
    Ok(ride)
}

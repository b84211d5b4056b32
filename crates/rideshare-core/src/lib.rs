//! # rideshare-core: Pure Business Logic for the Rideshare Demo
//!
//! This crate is the **heart** of the rideshare demo. It contains the ride
//! lifecycle state machine, the route/price estimator and the account rules
//! as plain Rust with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rideshare Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  rideshare-cli (front-end)                      │   │
//! │  │    request ──► accept ──► navigate ──► arrive ──► start ──►    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ rideshare-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐  │   │
//! │  │   │  ledger  │  │ session  │  │  route   │  │  analytics   │  │   │
//! │  │   │  rides   │  │ accounts │  │ haversine│  │  dashboard   │  │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO TIMERS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rideshare-db (Persistence Layer)                │   │
//! │  │         SQLite key-value store, whole-collection writes         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Principal, RideRecord, Location, ...)
//! - [`money`] - Money type with integer arithmetic (centavos)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`route`] - Haversine route/price estimator
//! - [`ledger`] - Ride ledger and lifecycle transitions
//! - [`session`] - Session store and account balances
//! - [`geocode`] - Mock geocoder
//! - [`analytics`] - Operator dashboard statistics
//! - [`demo`] - Demo principals and sample rides
//!
//! ## Example Usage
//!
//! ```rust
//! use rideshare_core::money::Money;
//!
//! // 2.5 km at R$1.80/km
//! let price = Money::price_for_distance(2.5);
//! assert_eq!(price.cents(), 450);
//! assert_eq!(price.to_string(), "R$4.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod demo;
pub mod error;
pub mod geocode;
pub mod ledger;
pub mod money;
pub mod route;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{FeeCharge, NewRide, RideLedger};
pub use money::Money;
pub use route::{estimate_route, haversine_km, DurationModel};
pub use session::SessionStore;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Price per kilometre, in centavos (R$1.80).
pub const PRICE_PER_KM_CENTS: i64 = 180;

/// Largest single credit or debit, in centavos (R$1,000,000.00).
pub const MAX_CREDIT_AMOUNT_CENTS: i64 = 100_000_000;

/// Fee charged to the rider when a driver cancels after the waiting window.
pub const CANCELLATION_FEE_CENTS: i64 = 1000;

/// Grace period a driver allows after arriving at the pickup point.
pub const WAITING_WINDOW_SECS: u32 = 180;

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Straight-line distance is inflated by this factor to approximate roads.
pub const ROAD_DISTANCE_FACTOR: f64 = 1.3;

/// Number of segments in the interpolated route polyline.
pub const ROUTE_SEGMENTS: usize = 10;

/// Placeholder phone stored on new rides (no phone capture in the demo).
pub const DEFAULT_RIDER_PHONE: &str = "+55 11 99999-9999";

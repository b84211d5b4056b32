//! # Route Commands
//!
//! Address lookup and fare quotes. Nothing here touches the ledger.

use rideshare_core::geocode::Geocoder;
use rideshare_core::{estimate_route, Location};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppConfig;

/// A fare quote between two resolved addresses.
#[derive(Debug, Clone, Serialize)]
pub struct RouteQuote {
    pub pickup: Location,
    pub dropoff: Location,
    pub distance_km: f64,
    pub duration_secs: u64,
    pub duration_minutes: u64,
    pub price_cents: i64,
    /// Price formatted with the configured currency symbol
    pub price: String,
    /// `[longitude, latitude]` pairs from pickup to dropoff
    pub geometry: Vec<[f64; 2]>,
}

/// Resolves an address or fails with `NOT_FOUND`.
pub fn geocode_address<G: Geocoder>(geocoder: &G, address: &str) -> Result<Location, ApiError> {
    debug!(address = %address, "geocode command");
    geocoder
        .geocode(address)
        .ok_or_else(|| ApiError::not_found("Address", address.trim()))
}

/// Quotes a ride between two free-text addresses.
pub fn estimate<G: Geocoder>(
    config: &AppConfig,
    geocoder: &G,
    pickup: &str,
    dropoff: &str,
) -> Result<RouteQuote, ApiError> {
    let pickup = geocode_address(geocoder, pickup)?;
    let dropoff = geocode_address(geocoder, dropoff)?;
    quote(config, pickup, dropoff)
}

/// Quotes a ride between two resolved locations.
pub fn quote(config: &AppConfig, pickup: Location, dropoff: Location) -> Result<RouteQuote, ApiError> {
    let route = estimate_route(&pickup, &dropoff, config.duration_model)?;
    let price = route.price();

    debug!(
        distance_km = route.distance_km,
        duration_secs = route.duration_secs,
        price = %price,
        "Route estimated"
    );

    Ok(RouteQuote {
        pickup,
        dropoff,
        distance_km: route.distance_km,
        duration_secs: route.duration_secs,
        duration_minutes: route.duration_minutes(),
        price_cents: price.cents(),
        price: config.format_money(price),
        geometry: route.geometry,
    })
}

//! # Route Estimator
//!
//! Turns two locations into a distance/duration/geometry estimate. No road
//! network is involved: distance is great-circle (Haversine) inflated by a
//! fixed factor, and the polyline is a straight interpolation.
//!
//! ## Estimation Pipeline
//! ```text
//! pickup, dropoff
//!      │
//!      ▼
//! validate_location ──► non-finite / out of range? → ValidationError
//!      │
//!      ▼
//! haversine_km × 1.3 ──► distance_km (2 decimals)
//!      │
//!      ├──► DurationModel ──► duration_secs
//!      │
//!      └──► interpolate(10 segments) ──► geometry [[lon, lat]; 11]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::{Location, RouteEstimate};
use crate::validation::{validate_location, ValidationResult};
use crate::{EARTH_RADIUS_KM, ROAD_DISTANCE_FACTOR, ROUTE_SEGMENTS};

// =============================================================================
// Duration Model
// =============================================================================

/// How travel time is derived from distance.
///
/// Two formulas circulated in the front-end; `PerKilometre` is canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationModel {
    /// 3 minutes per kilometre (~20 km/h), rounded to the nearest second.
    #[default]
    PerKilometre,
    /// Constant 30 km/h, truncated to whole seconds.
    AverageSpeed,
}

impl DurationModel {
    const MINUTES_PER_KM: f64 = 3.0;
    const AVERAGE_SPEED_KMH: f64 = 30.0;

    /// Travel time in seconds for `distance_km`.
    pub fn duration_secs(&self, distance_km: f64) -> u64 {
        match self {
            DurationModel::PerKilometre => (distance_km * Self::MINUTES_PER_KM * 60.0).round() as u64,
            DurationModel::AverageSpeed => {
                (distance_km / Self::AVERAGE_SPEED_KMH * 3600.0).floor() as u64
            }
        }
    }
}

impl fmt::Display for DurationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationModel::PerKilometre => f.write_str("per_kilometre"),
            DurationModel::AverageSpeed => f.write_str("average_speed"),
        }
    }
}

impl FromStr for DurationModel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "per_kilometre" | "per_kilometer" | "per_km" => Ok(DurationModel::PerKilometre),
            "average_speed" | "speed" => Ok(DurationModel::AverageSpeed),
            _ => Err(ValidationError::NotAllowed {
                field: "duration model".to_string(),
                allowed: vec!["per_kilometre".to_string(), "average_speed".to_string()],
            }),
        }
    }
}

// =============================================================================
// Distance
// =============================================================================

/// Great-circle distance in kilometres between two locations.
///
/// Symmetric, and zero for identical points. Inputs are assumed valid; use
/// [`estimate_route`] for user-supplied coordinates.
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Approximate road distance: Haversine × 1.3.
pub fn road_distance_km(a: &Location, b: &Location) -> f64 {
    haversine_km(a, b) * ROAD_DISTANCE_FACTOR
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Geometry
// =============================================================================

/// Straight polyline with `segments + 1` `[lon, lat]` points.
pub fn interpolate_geometry(a: &Location, b: &Location, segments: usize) -> Vec<[f64; 2]> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let fraction = i as f64 / segments as f64;
            [
                a.longitude + fraction * (b.longitude - a.longitude),
                a.latitude + fraction * (b.latitude - a.latitude),
            ]
        })
        .collect()
}

// =============================================================================
// Estimate
// =============================================================================

/// Estimates a route between two locations.
///
/// ## Example
/// ```rust
/// use rideshare_core::{estimate_route, DurationModel, Location};
///
/// let paulista = Location::new(-23.5505, -46.6333, "Av. Paulista, 1000");
/// let augusta = Location::new(-23.5608, -46.6500, "Rua Augusta, 500");
///
/// let route = estimate_route(&paulista, &augusta, DurationModel::PerKilometre).unwrap();
/// assert!(route.distance_km > 2.5 && route.distance_km < 2.8);
/// assert_eq!(route.geometry.len(), 11);
/// ```
pub fn estimate_route(
    pickup: &Location,
    dropoff: &Location,
    model: DurationModel,
) -> ValidationResult<RouteEstimate> {
    validate_location(pickup)?;
    validate_location(dropoff)?;

    let distance = road_distance_km(pickup, dropoff);

    Ok(RouteEstimate {
        distance_km: round_to_cents(distance),
        duration_secs: model.duration_secs(distance),
        geometry: interpolate_geometry(pickup, dropoff, ROUTE_SEGMENTS),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn paulista() -> Location {
        Location::new(-23.5505, -46.6333, "Av. Paulista, 1000 - São Paulo")
    }

    fn augusta() -> Location {
        Location::new(-23.5608, -46.6500, "Rua Augusta, 500 - São Paulo")
    }

    #[test]
    fn test_haversine_identity_and_symmetry() {
        let a = paulista();
        let b = augusta();

        assert_eq!(haversine_km(&a, &a), 0.0);
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }

    #[test]
    fn test_haversine_known_distance() {
        // São Paulo to Rio de Janeiro is roughly 360 km as the crow flies.
        let sp = Location::new(-23.5505, -46.6333, "São Paulo");
        let rio = Location::new(-22.9068, -43.1729, "Rio de Janeiro");
        let d = haversine_km(&sp, &rio);
        assert!(d > 350.0 && d < 365.0, "got {d}");
    }

    #[test]
    fn test_estimate_paulista_to_augusta() {
        let route = estimate_route(&paulista(), &augusta(), DurationModel::PerKilometre).unwrap();

        // ~2.05 km straight line, ×1.3 for roads
        assert!(route.distance_km > 2.6 && route.distance_km < 2.75, "got {}", route.distance_km);
        assert_eq!(route.distance_km, round_to_cents(route.distance_km));

        // 3 min per km
        let expected = (road_distance_km(&paulista(), &augusta()) * 180.0).round() as u64;
        assert_eq!(route.duration_secs, expected);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let first = estimate_route(&paulista(), &augusta(), DurationModel::PerKilometre).unwrap();
        let second = estimate_route(&paulista(), &augusta(), DurationModel::PerKilometre).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_same_point_route() {
        let route = estimate_route(&paulista(), &paulista(), DurationModel::PerKilometre).unwrap();
        assert_eq!(route.distance_km, 0.0);
        assert_eq!(route.duration_secs, 0);
        assert_eq!(route.geometry.len(), ROUTE_SEGMENTS + 1);
    }

    #[test]
    fn test_geometry_endpoints_are_lon_lat() {
        let route = estimate_route(&paulista(), &augusta(), DurationModel::PerKilometre).unwrap();
        assert_eq!(route.geometry.first(), Some(&paulista().lon_lat()));
        assert_eq!(route.geometry.last(), Some(&augusta().lon_lat()));
    }

    #[test]
    fn test_duration_models() {
        assert_eq!(DurationModel::PerKilometre.duration_secs(10.0), 1800);
        assert_eq!(DurationModel::AverageSpeed.duration_secs(10.0), 1200);
        assert_eq!("average-speed".parse::<DurationModel>().unwrap(), DurationModel::AverageSpeed);
        assert!("teleport".parse::<DurationModel>().is_err());
    }

    #[test]
    fn test_rejects_nan_coordinates() {
        let broken = Location::new(f64::NAN, -46.6, "nowhere");
        let err = estimate_route(&broken, &augusta(), DurationModel::PerKilometre).unwrap_err();
        assert!(matches!(err, ValidationError::NotFinite { .. }));
    }
}

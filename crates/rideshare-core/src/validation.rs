//! # Validation Module
//!
//! Input validation for ride requests, credit operations and registration.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Types (f64, String)                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Finite coordinates, positive distances and amounts                │
//! │  └── Code / email / name formats                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger & session guards                                      │
//! │  ├── Role and ownership                                                │
//! │  └── Lifecycle status                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Location;
use crate::MAX_CREDIT_AMOUNT_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Geographic Validators
// =============================================================================

/// Validates a latitude/longitude pair.
///
/// ## Rules
/// - Both must be finite (NaN and infinities are rejected)
/// - Latitude within [-90, 90], longitude within [-180, 180]
///
/// ## Example
/// ```rust
/// use rideshare_core::validation::validate_coordinates;
///
/// assert!(validate_coordinates(-23.5505, -46.6333).is_ok());
/// assert!(validate_coordinates(f64::NAN, -46.6333).is_err());
/// assert!(validate_coordinates(91.0, 0.0).is_err());
/// ```
pub fn validate_coordinates(latitude: f64, longitude: f64) -> ValidationResult<()> {
    check_range("latitude", latitude, -90.0, 90.0)?;
    check_range("longitude", longitude, -180.0, 180.0)?;
    Ok(())
}

/// Validates a location's coordinates.
pub fn validate_location(location: &Location) -> ValidationResult<()> {
    validate_coordinates(location.latitude, location.longitude)
}

/// Validates that a location was selected and is well-formed.
///
/// `field` names the input ("pickup", "dropoff") in the error message.
pub fn require_location<'a>(
    field: &str,
    location: Option<&'a Location>,
) -> ValidationResult<&'a Location> {
    let location = location.ok_or_else(|| ValidationError::required(field))?;
    validate_location(location)?;
    Ok(location)
}

/// Validates a ride distance in kilometres.
///
/// ## Rules
/// - Must be finite
/// - Must be strictly positive
pub fn validate_distance_km(distance_km: f64) -> ValidationResult<()> {
    if !distance_km.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "distance".to_string(),
        });
    }
    if distance_km <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "distance".to_string(),
        });
    }
    Ok(())
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Validates a credit adjustment amount.
///
/// ## Rules
/// - Must be strictly positive (zero and negative amounts are rejected)
/// - At most [`MAX_CREDIT_AMOUNT_CENTS`] per operation
pub fn validate_credit_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    if amount.cents() > MAX_CREDIT_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 0.01,
            max: MAX_CREDIT_AMOUNT_CENTS as f64 / 100.0,
        });
    }
    Ok(())
}

/// Parses and validates a user-entered credit amount.
///
/// ## Example
/// ```rust
/// use rideshare_core::validation::parse_credit_amount;
///
/// assert_eq!(parse_credit_amount("50").unwrap().cents(), 5000);
/// assert!(parse_credit_amount("0").is_err());
/// assert!(parse_credit_amount("fifty").is_err());
/// ```
pub fn parse_credit_amount(input: &str) -> ValidationResult<Money> {
    let amount = Money::from_decimal_str(input)?;
    validate_credit_amount(amount)?;
    Ok(amount)
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_display_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an email address (shape only; nothing is sent to it).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            "email",
            "must look like name@example.com",
        ));
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a ride identifier.
///
/// Rides created here carry UUIDs, but the seeded sample rides use short ids,
/// so any non-empty token without whitespace is accepted.
pub fn validate_ride_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("ride id"));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            "ride id",
            "must not contain whitespace",
        ));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());

        assert!(matches!(
            validate_coordinates(f64::NAN, 0.0),
            Err(ValidationError::NotFinite { .. })
        ));
        assert!(matches!(
            validate_coordinates(0.0, f64::INFINITY),
            Err(ValidationError::NotFinite { .. })
        ));
        assert!(matches!(
            validate_coordinates(0.0, 180.5),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_require_location() {
        let here = Location::new(-23.55, -46.63, "Av. Paulista");
        assert!(require_location("pickup", Some(&here)).is_ok());

        let err = require_location("dropoff", None).unwrap_err();
        assert_eq!(err.to_string(), "dropoff is required");
    }

    #[test]
    fn test_validate_distance() {
        assert!(validate_distance_km(2.5).is_ok());
        assert!(validate_distance_km(0.0).is_err());
        assert!(validate_distance_km(-1.0).is_err());
        assert!(validate_distance_km(f64::NAN).is_err());
    }

    #[test]
    fn test_credit_amount() {
        assert!(validate_credit_amount(Money::from_cents(1)).is_ok());
        assert!(validate_credit_amount(Money::zero()).is_err());
        assert!(validate_credit_amount(Money::from_cents(-100)).is_err());
        assert_eq!(parse_credit_amount("10,50").unwrap().cents(), 1050);
        assert!(parse_credit_amount("-5").is_err());

        assert!(parse_credit_amount("1000000").is_ok());
        assert!(matches!(
            parse_credit_amount("1000000.01"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(parse_credit_amount("92233720368547758.07").is_err());
    }

    #[test]
    fn test_validate_email_and_name() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("jane").is_err());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("ja ne@example.com").is_err());

        assert!(validate_display_name("Jane Driver").is_ok());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_ride_id() {
        assert!(validate_ride_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_ride_id("1").is_ok());
        assert!(validate_ride_id("").is_err());
        assert!(validate_ride_id("a b").is_err());
    }
}

//! # Error Types
//!
//! Domain-specific error types for rideshare-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rideshare-core errors (this file)                                     │
//! │  ├── CoreError        - Authorization, state and not-found errors      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rideshare-db errors (separate crate)                                  │
//! │  └── DbError          - Persistence failures                           │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the user sees (serialized)                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → notification           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is recoverable: the failed operation leaves the ledger and the
//! session untouched.

use thiserror::Error;

use crate::money::Money;
use crate::types::{RideStatus, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No principal is logged in.
    #[error("You must be logged in to {action}")]
    NotAuthenticated { action: String },

    /// The principal has the wrong role for the operation.
    #[error("Only {required} accounts can {action}")]
    Unauthorized { action: String, required: Role },

    /// The principal has the right role but does not own the ride.
    ///
    /// ## When This Occurs
    /// - A driver tries to advance a ride another driver accepted
    /// - A rider tries to cancel someone else's ride
    #[error("Ride {ride_id} is not assigned to {principal_id}")]
    NotRideParticipant {
        ride_id: String,
        principal_id: String,
    },

    /// Ride id is absent from the ledger.
    #[error("Ride not found: {0}")]
    RideNotFound(String),

    /// Account id is absent from the account directory.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Transition attempted from an incompatible status.
    ///
    /// ## When This Occurs
    /// - Two drivers race to accept the same ride; the loser sees `accepted`
    /// - Completing a ride that never started
    /// - Any transition out of `completed` or `cancelled`
    #[error("Ride {ride_id} is {current}, cannot {action}")]
    InvalidRideStatus {
        ride_id: String,
        current: RideStatus,
        action: String,
    },

    /// Supplied verification code does not match the stored one.
    #[error("Verification code does not match for ride {ride_id}")]
    VerificationCodeMismatch { ride_id: String },

    /// The rider owes money and cannot request new rides.
    #[error("Outstanding balance of {balance} must be settled before requesting a ride")]
    OutstandingDebt { balance: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Builds an `InvalidRideStatus` error.
    pub fn invalid_status(
        ride_id: impl Into<String>,
        current: RideStatus,
        action: impl Into<String>,
    ) -> Self {
        CoreError::InvalidRideStatus {
            ride_id: ride_id.into(),
            current,
            action: action.into(),
        }
    }

    /// Builds an `Unauthorized` error.
    pub fn unauthorized(action: impl Into<String>, required: Role) -> Self {
        CoreError::Unauthorized {
            action: action.into(),
            required,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value would not fit the stored representation.
    #[error("{field} is too large")]
    TooLarge { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., invalid UUID, non-numeric amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a `Required` error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an `InvalidFormat` error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::invalid_status("ride-1", RideStatus::Accepted, "accept ride");
        assert_eq!(err.to_string(), "Ride ride-1 is accepted, cannot accept ride");

        let err = CoreError::unauthorized("accept rides", Role::Driver);
        assert_eq!(err.to_string(), "Only driver accounts can accept rides");

        let err = CoreError::OutstandingDebt {
            balance: Money::from_cents(-1000),
        };
        assert_eq!(
            err.to_string(),
            "Outstanding balance of -R$10.00 must be settled before requesting a ride"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("pickup");
        assert_eq!(err.to_string(), "pickup is required");

        let err = ValidationError::NotFinite {
            field: "latitude".to_string(),
        };
        assert_eq!(err.to_string(), "latitude must be a finite number");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("code").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

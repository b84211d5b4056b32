//! # Money Module
//!
//! Provides the `Money` type for ride prices, fees and account balances.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    3.2 km × 1.8 = 5.760000000000001  ❌                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    Distance is a float, but it is converted to centavos exactly once   │
//! │    (at pricing time). Every balance mutation after that is integer.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rideshare_core::money::Money;
//!
//! let fare = Money::price_for_distance(3.2);   // R$5.76
//! let balance = Money::from_cents(10_000);     // R$100.00
//! assert_eq!((balance - fare).cents(), 9_424);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::PRICE_PER_KM_CENTS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (the smallest BRL unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: balances may go negative, representing debt
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// distance_km ──► price_for_distance ──► RideRecord.price_cents
///
/// CANCELLATION_FEE ──► RideRecord.cancellation_fee_cents
///                  └─► Principal.account_balance_cents (deducted)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use rideshare_core::money::Money;
    ///
    /// let fee = Money::from_cents(1000); // R$10.00
    /// assert_eq!(fee.cents(), 1000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from reais and centavos.
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -R$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Adds two amounts, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use rideshare_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(5).checked_add(Money::from_cents(-7)), Some(Money::from_cents(-2)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Prices a ride: `round(distance_km × 1.80, 2)`.
    ///
    /// ## Example
    /// ```rust
    /// use rideshare_core::money::Money;
    ///
    /// assert_eq!(Money::price_for_distance(2.5).cents(), 450);
    /// assert_eq!(Money::price_for_distance(8.7).cents(), 1566);
    /// ```
    ///
    /// Callers validate that the distance is finite and positive first.
    pub fn price_for_distance(distance_km: f64) -> Money {
        Money((distance_km * PRICE_PER_KM_CENTS as f64).round() as i64)
    }

    /// Parses a user-entered decimal amount such as `"25"`, `"12.5"` or `"12,50"`.
    ///
    /// ## Rules
    /// - Optional leading `-`
    /// - `.` or `,` as decimal separator
    /// - At most 2 fractional digits
    ///
    /// ## Example
    /// ```rust
    /// use rideshare_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal_str("12,50").unwrap().cents(), 1250);
    /// assert!(Money::from_decimal_str("ten").is_err());
    /// ```
    pub fn from_decimal_str(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::invalid_format("amount", reason);

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::required("amount"));
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let normalized = digits.replace(',', ".");
        let (major_str, minor_str) = match normalized.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (normalized.as_str(), ""),
        };

        if major_str.is_empty() && minor_str.is_empty() {
            return Err(invalid("must be a number"));
        }
        if !major_str.chars().all(|c| c.is_ascii_digit())
            || !minor_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a number"));
        }
        if minor_str.len() > 2 {
            return Err(invalid("at most 2 decimal places"));
        }

        let major: i64 = if major_str.is_empty() {
            0
        } else {
            major_str.parse().map_err(|_| invalid("amount is too large"))?
        };
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("must be a number"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("must be a number"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (debt).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the amount as a float, for display only.
    #[inline]
    pub fn as_reais_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `R$12.34`; the CLI can swap the symbol via its config.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R${}.{:02}", sign, self.reais().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.reais(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(450).to_string(), "R$4.50");
        assert_eq!(Money::from_cents(10_000).to_string(), "R$100.00");
        assert_eq!(Money::from_cents(-1000).to_string(), "-R$10.00");
        assert_eq!(Money::zero().to_string(), "R$0.00");
    }

    #[test]
    fn test_price_for_distance_matches_sample_rides() {
        assert_eq!(Money::price_for_distance(2.5).cents(), 450);
        assert_eq!(Money::price_for_distance(3.2).cents(), 576);
        assert_eq!(Money::price_for_distance(8.7).cents(), 1566);
        assert_eq!(Money::price_for_distance(2.67).cents(), 481);
    }

    #[test]
    fn test_from_decimal_str() {
        assert_eq!(Money::from_decimal_str("25").unwrap().cents(), 2500);
        assert_eq!(Money::from_decimal_str("12.5").unwrap().cents(), 1250);
        assert_eq!(Money::from_decimal_str("12,05").unwrap().cents(), 1205);
        assert_eq!(Money::from_decimal_str(" .75 ").unwrap().cents(), 75);
        assert_eq!(Money::from_decimal_str("-3").unwrap().cents(), -300);

        assert!(Money::from_decimal_str("").is_err());
        assert!(Money::from_decimal_str("abc").is_err());
        assert!(Money::from_decimal_str("1.234").is_err());
        assert!(Money::from_decimal_str("1.2.3").is_err());
        assert!(Money::from_decimal_str(".").is_err());
        assert!(Money::from_decimal_str("99999999999999999999").is_err());
    }

    #[test]
    fn test_arithmetic_and_sign() {
        let balance = Money::from_cents(500);
        let fee = Money::from_cents(1000);
        let after = balance - fee;

        assert_eq!(after.cents(), -500);
        assert!(after.is_negative());
        assert_eq!((-after).cents(), 500);
        assert_eq!(after.abs().cents(), 500);

        let total: Money = vec![Money::from_cents(450), Money::from_cents(576)]
            .into_iter()
            .sum();
        assert_eq!(total.cents(), 1026);
    }
}

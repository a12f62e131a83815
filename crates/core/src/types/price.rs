//! Type-safe price representation using decimal arithmetic.
//!
//! The points API sends prices and order totals as JSON floats. They are read
//! into a [`Decimal`] so cart totals and dashboard revenue sums do not pick up
//! binary floating point drift, and written back out as floats.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A dollar amount.
///
/// ```
/// use campus_points_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(1999, 2));
/// assert_eq!(price.to_string(), "$19.99");
/// assert_eq!((price * 3).to_string(), "$59.97");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Formats the amount with two decimals and no currency symbol.
    #[must_use]
    pub fn plain(&self) -> String {
        format!("{:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.plain())
    }
}

/// Saturates at the decimal bounds.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(1999, 2));

        let whole: Price = serde_json::from_str("15").unwrap();
        assert_eq!(whole.plain(), "15.00");
    }

    #[test]
    fn test_serialize_as_json_number() {
        let json = serde_json::to_value(Price::new(Decimal::new(1250, 2))).unwrap();
        assert_eq!(json, serde_json::json!(12.5));
    }

    #[test]
    fn test_sum_avoids_float_drift() {
        let total: Price = [0.1_f64, 0.2]
            .iter()
            .map(|v| serde_json::from_value::<Price>(serde_json::json!(v)).unwrap())
            .sum();
        assert_eq!(total.plain(), "0.30");
        assert_eq!(total.amount(), Decimal::new(3, 1));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Price::new(Decimal::MAX);
        assert_eq!((max + Price::new(Decimal::ONE)).amount(), Decimal::MAX);
        assert_eq!((max * 2).amount(), Decimal::MAX);
        assert_eq!((Price::new(Decimal::MIN) + Price::new(-Decimal::ONE)).amount(), Decimal::MIN);
    }
}

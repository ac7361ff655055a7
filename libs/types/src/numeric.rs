//! Price ticks and fixed-point collateral amounts
//!
//! Prices are integer ticks over a basis-points scale; collateral values are
//! fixed-point integers denominated in the collateral token's smallest unit.
//! All arithmetic is exact integer arithmetic with truncating division —
//! no floating point anywhere in the money path.

use crate::errors::{LedgerError, OrderError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Basis-points denominator for prices. Valid ticks are `1..BPS`.
pub const BPS: u64 = 1000;

/// Per-order size ceiling.
///
/// Bounding sizes keeps `size * price * MULT` inside `u128` for any
/// collateral with up to 18 decimals; placements above the bound are
/// rejected before any state change.
pub const MAX_ORDER_SIZE: u128 = 1_000_000_000_000;

/// A price tick in `[1, BPS - 1]`
///
/// A bid at tick `p` pays `p / BPS` collateral per share; the complementary
/// outcome's taker pays `(BPS - p) / BPS`. Construction validates the range,
/// so a held `Price` is always a legal tick.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Create a new Price from a raw tick
    ///
    /// # Panics
    /// Panics if the tick is outside `[1, BPS - 1]`
    pub fn new(tick: u64) -> Self {
        Self::try_new(tick).expect("price tick out of range")
    }

    /// Validate a raw tick into a Price
    pub fn try_new(tick: u64) -> Result<Self, OrderError> {
        if tick == 0 {
            Err(OrderError::InvalidPrice)
        } else if tick >= BPS {
            Err(OrderError::PriceTooHigh {
                price: tick,
                max: BPS - 1,
            })
        } else {
            Ok(Self(tick))
        }
    }

    /// Get the raw tick value
    pub fn get(&self) -> u64 {
        self.0
    }

    /// The mirrored tick `BPS - p`
    ///
    /// An ask quoted at `p` on one outcome rests at `complement()` in the
    /// opposite outcome's book; the result is always a valid tick.
    pub fn complement(&self) -> Price {
        Price(BPS - self.0)
    }

    /// Collateral cost of `size` shares at this tick: `size * p * mult / BPS`
    ///
    /// Division truncates toward zero; multiplication is overflow-checked.
    pub fn cost(&self, size: u128, mult: u128) -> Result<Collateral, LedgerError> {
        size.checked_mul(self.0 as u128)
            .and_then(|v| v.checked_mul(mult))
            .map(|v| Collateral(v / BPS as u128))
            .ok_or(LedgerError::Overflow)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-point collateral amount
///
/// Denominated in the collateral token's smallest unit (one winning share
/// pays `10^decimals` of these). Serialized as a string to prevent JSON
/// number precision loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Collateral(u128);

impl Collateral {
    pub const ZERO: Collateral = Collateral(0);

    /// Create a new Collateral amount
    pub fn new(units: u128) -> Self {
        Self(units)
    }

    /// Get the raw unit count
    pub fn get(&self) -> u128 {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Overflow-checked addition
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Underflow-checked subtraction
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

// Arithmetic operations
impl Add for Collateral {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs)
            .expect("collateral addition overflowed")
    }
}

impl Sub for Collateral {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs)
            .expect("collateral subtraction would go negative")
    }
}

// Custom serialization to preserve precision
impl Serialize for Collateral {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Collateral {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let units = s.parse::<u128>().map_err(serde::de::Error::custom)?;
        Ok(Self(units))
    }
}

impl fmt::Display for Collateral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULT: u128 = 1_000_000_000_000_000_000; // 10^18

    #[test]
    fn test_price_creation() {
        let price = Price::new(400);
        assert_eq!(price.get(), 400);
    }

    #[test]
    fn test_price_rejects_zero() {
        assert_eq!(Price::try_new(0), Err(OrderError::InvalidPrice));
    }

    #[test]
    fn test_price_rejects_bps_and_above() {
        assert!(matches!(
            Price::try_new(1000),
            Err(OrderError::PriceTooHigh { price: 1000, .. })
        ));
        assert!(matches!(
            Price::try_new(5000),
            Err(OrderError::PriceTooHigh { .. })
        ));
    }

    #[test]
    fn test_price_bounds_accepted() {
        assert!(Price::try_new(1).is_ok());
        assert!(Price::try_new(999).is_ok());
    }

    #[test]
    fn test_price_complement() {
        assert_eq!(Price::new(400).complement(), Price::new(600));
        assert_eq!(Price::new(1).complement(), Price::new(999));
        assert_eq!(Price::new(999).complement().complement(), Price::new(999));
    }

    #[test]
    fn test_cost_exact() {
        // 100 shares at tick 400 with 18 decimals: 100 * 400 * 10^18 / 1000
        let cost = Price::new(400).cost(100, MULT).unwrap();
        assert_eq!(cost, Collateral::new(40 * MULT));
    }

    #[test]
    fn test_cost_truncates() {
        // 1 share at tick 1 with 2-decimal collateral: 1 * 1 * 100 / 1000 = 0
        let cost = Price::new(1).cost(1, 100).unwrap();
        assert_eq!(cost, Collateral::ZERO);
    }

    #[test]
    fn test_cost_overflow_detected() {
        let result = Price::new(999).cost(u128::MAX, MULT);
        assert_eq!(result, Err(LedgerError::Overflow));
    }

    #[test]
    fn test_collateral_arithmetic() {
        let a = Collateral::new(60);
        let b = Collateral::new(40);
        assert_eq!(a + b, Collateral::new(100));
        assert_eq!(a - b, Collateral::new(20));
    }

    #[test]
    #[should_panic(expected = "collateral subtraction would go negative")]
    fn test_collateral_underflow_panics() {
        let _ = Collateral::new(1) - Collateral::new(2);
    }

    #[test]
    fn test_collateral_serialization() {
        let amount = Collateral::new(60_000_000_000_000_000_000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"60000000000000000000\"");

        let deserialized: Collateral = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, deserialized);
    }
}

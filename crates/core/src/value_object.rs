//! Value objects: compared by value, never by identity.

use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// An amount of money in the smallest currency unit (e.g. cents).
///
/// Prices and inventory values are never floats.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    pub fn minor(self) -> u64 {
        self.0
    }

    /// Value of `quantity` units at this unit price.
    ///
    /// Non-positive quantities are worth nothing; overflow saturates.
    pub fn times(self, quantity: i64) -> Money {
        if quantity <= 0 {
            return Money::ZERO;
        }
        Money(self.0.saturating_mul(quantity as u64))
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(&format!("{}.{:02}", self.0 / 100, self.0 % 100))
    }
}

//! Decimal stock quantities with three decimal places.
//!
//! Quantities are exchanged as decimals and persisted as whole thousandths so
//! the database column stays an integer.

use std::ops::{Add, Neg, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Decimal places kept for quantities.
pub const QUANTITY_SCALE: u32 = 3;

const MILLI: i64 = 1_000;

/// Errors raised when constructing a quantity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    /// More than three decimal places were supplied.
    #[error("quantity {value} has more than {QUANTITY_SCALE} decimal places")]
    TooPrecise {
        /// Rejected value.
        value: Decimal,
    },
    /// The value does not fit the storage range.
    #[error("quantity {value} is out of range")]
    OutOfRange {
        /// Rejected value.
        value: Decimal,
    },
}

/// Signed quantity of an inventory unit (kilograms, litres, packs, ...).
///
/// # Examples
/// ```
/// use fournil::domain::Quantity;
/// use rust_decimal::Decimal;
///
/// let q = Quantity::new(Decimal::new(2_500, 3)).expect("valid");
/// assert_eq!(q.to_milli(), 2_500);
/// assert!(Quantity::new(Decimal::new(1, 4)).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
#[schema(value_type = f64)]
pub struct Quantity(i64);

impl Quantity {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Validate a decimal quantity.
    pub fn new(value: Decimal) -> Result<Self, QuantityError> {
        let normalized = value.normalize();
        if normalized.scale() > QUANTITY_SCALE {
            return Err(QuantityError::TooPrecise { value });
        }
        normalized
            .checked_mul(Decimal::from(MILLI))
            .and_then(|milli| milli.to_i64())
            .map(Self)
            .ok_or(QuantityError::OutOfRange { value })
    }

    /// Build from whole thousandths, the storage representation.
    #[must_use]
    pub const fn from_milli(milli: i64) -> Self {
        Self(milli)
    }

    /// Build from a whole number of units.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(MILLI))
    }

    /// Storage representation in thousandths.
    #[must_use]
    pub const fn to_milli(self) -> i64 {
        self.0
    }

    /// Decimal value.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, QUANTITY_SCALE).normalize()
    }

    /// True when strictly above zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// True when strictly below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// True when zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Half of this quantity, used by the critical stock threshold.
    #[must_use]
    pub fn half(self) -> Decimal {
        self.to_decimal() / Decimal::TWO
    }

    /// Value of this quantity at a per-unit price, rounded to whole francs.
    ///
    /// Saturates at the `i64` bounds.
    #[must_use]
    pub fn value_at(self, unit_cost: i64) -> i64 {
        let saturated = if self.is_negative() == (unit_cost < 0) {
            i64::MAX
        } else {
            i64::MIN
        };
        self.to_decimal()
            .checked_mul(Decimal::from(unit_cost))
            .and_then(|value| {
                value
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_i64()
            })
            .unwrap_or(saturated)
    }

    /// Per-unit price for a total amount spread over this quantity.
    ///
    /// Returns `None` for non-positive quantities.
    #[must_use]
    pub fn unit_price_for(self, amount: i64) -> Option<i64> {
        if !self.is_positive() {
            return None;
        }
        (Decimal::from(amount) / self.to_decimal())
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = QuantityError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(value: Quantity) -> Self {
        value.to_decimal()
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Quantity {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

//! Guinean Franc amounts and payment methods.
//!
//! The franc has no minor unit, so amounts are whole numbers. Stored amounts
//! are never negative; balances, which describe reality and may dip below
//! zero, are plain signed integers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::macros::define_code_enum;

/// Non-negative whole amount of Guinean Francs.
///
/// # Examples
/// ```
/// use fournil::domain::Gnf;
///
/// let total = Gnf::new(1_500).unwrap().checked_add(Gnf::new(500).unwrap());
/// assert_eq!(total, Some(Gnf::new(2_000).unwrap()));
/// assert!(Gnf::new(-1).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i64", into = "i64")]
#[schema(value_type = i64)]
pub struct Gnf(i64);

/// Error raised when an amount is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("amount must not be negative (got {0})")]
pub struct NegativeAmountError(pub i64);

impl Gnf {
    /// Zero francs.
    pub const ZERO: Self = Self(0);

    /// Validate and wrap an amount.
    pub fn new(value: i64) -> Result<Self, NegativeAmountError> {
        if value < 0 {
            Err(NegativeAmountError(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// True when the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Subtract, returning `None` when the result would be negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).filter(|v| *v >= 0).map(Self)
    }

    /// Subtract, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0).max(0))
    }
}

impl TryFrom<i64> for Gnf {
    type Error = NegativeAmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Gnf> for i64 {
    fn from(value: Gnf) -> Self {
        value.0
    }
}

impl std::fmt::Display for Gnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} GNF", self.0)
    }
}

define_code_enum! {
    /// How money changed hands.
    pub enum PaymentMethod / ParsePaymentMethodError ("payment method") {
        /// Notes and coins in the till.
        Cash => "cash",
        /// Orange Money mobile wallet.
        OrangeMoney => "orange_money",
        /// Card terminal.
        Card => "card",
    }
}

impl PaymentMethod {
    /// Whether deposits by this method settle immediately.
    ///
    /// Cash sits in the till until somebody banks it, so its deposits start
    /// pending. Mobile money and card settle on their own.
    #[must_use]
    pub const fn settles_immediately(self) -> bool {
        !matches!(self, Self::Cash)
    }
}

/// Error raised when a payment split overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("payment split total overflows")]
pub struct SplitOverflowError;

/// Amounts received per payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSplit {
    /// Cash amount.
    pub cash: Gnf,
    /// Orange Money amount.
    pub orange_money: Gnf,
    /// Card amount.
    pub card: Gnf,
}

impl PaymentSplit {
    /// Amount for one method.
    #[must_use]
    pub const fn amount(&self, method: PaymentMethod) -> Gnf {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::OrangeMoney => self.orange_money,
            PaymentMethod::Card => self.card,
        }
    }

    /// Sum of all methods.
    pub fn total(&self) -> Result<Gnf, SplitOverflowError> {
        self.cash
            .checked_add(self.orange_money)
            .and_then(|sum| sum.checked_add(self.card))
            .ok_or(SplitOverflowError)
    }

    /// Iterate over the methods with a non-zero amount.
    pub fn parts(&self) -> impl Iterator<Item = (PaymentMethod, Gnf)> + '_ {
        PaymentMethod::ALL
            .iter()
            .map(|method| (*method, self.amount(*method)))
            .filter(|(_, amount)| !amount.is_zero())
    }
}

/// Signed per-method figures, used for balances and discrepancies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethodTotals {
    /// Cash figure.
    pub cash: i64,
    /// Orange Money figure.
    pub orange_money: i64,
    /// Card figure.
    pub card: i64,
}

impl MethodTotals {
    /// Figure for one method.
    #[must_use]
    pub const fn get(&self, method: PaymentMethod) -> i64 {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::OrangeMoney => self.orange_money,
            PaymentMethod::Card => self.card,
        }
    }

    /// Mutable access to one method's figure.
    pub fn get_mut(&mut self, method: PaymentMethod) -> &mut i64 {
        match method {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::OrangeMoney => &mut self.orange_money,
            PaymentMethod::Card => &mut self.card,
        }
    }

    /// Sum across methods.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.cash
            .saturating_add(self.orange_money)
            .saturating_add(self.card)
    }
}

impl From<PaymentSplit> for MethodTotals {
    fn from(value: PaymentSplit) -> Self {
        Self {
            cash: value.cash.get(),
            orange_money: value.orange_money.get(),
            card: value.card.get(),
        }
    }
}

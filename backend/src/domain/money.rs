//! Monetary amounts and the base/minor unit conversion boundary.
//!
//! Amounts are held internally as whole base units (naira). The payment
//! gateway speaks minor units (kobo), so every outbound call converts through
//! [`Money::to_minor_units`] and every inbound settlement converts back through
//! [`MinorUnits::to_money`]. Both conversions are checked.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of minor units in one base unit.
pub const MINOR_UNITS_PER_BASE_UNIT: i64 = 100;

/// Currency code used for wallets and gateway charges.
pub const DEFAULT_CURRENCY: &str = "NGN";

/// Errors raised by monetary arithmetic and conversions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("amount must not be negative (got {amount})")]
    Negative { amount: i64 },
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("amount overflowed")]
    Overflow,
    #[error("minor amount {minor} is not a whole number of base units")]
    Fractional { minor: i64 },
}

/// Non-negative amount in whole base currency units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    ToSchema,
)]
#[serde(try_from = "i64", into = "i64")]
#[schema(value_type = i64, example = 4500)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Validate and construct a non-negative amount.
    ///
    /// # Examples
    /// ```
    /// use barberzon::domain::Money;
    ///
    /// assert!(Money::new(4500).is_ok());
    /// assert!(Money::new(-1).is_err());
    /// ```
    pub const fn new(amount: i64) -> Result<Self, MoneyError> {
        if amount < 0 {
            return Err(MoneyError::Negative { amount });
        }
        Ok(Self(amount))
    }

    /// Validate an amount that must be strictly positive, such as a deposit.
    pub const fn positive(amount: i64) -> Result<Self, MoneyError> {
        if amount <= 0 {
            return Err(MoneyError::NotPositive);
        }
        Ok(Self(amount))
    }

    /// Raw base-unit value.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, failing on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0.checked_add(other.0).map(Self).ok_or(MoneyError::Overflow)
    }

    /// Subtract `other`, returning `None` when the result would be negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0
            .checked_sub(other.0)
            .filter(|value| *value >= 0)
            .map(Self)
    }

    /// Sum an iterator of amounts, failing on overflow.
    pub fn sum<I>(amounts: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(amount))
    }

    /// Percentage of this amount, rounded half-up to a whole base unit.
    ///
    /// # Examples
    /// ```
    /// use barberzon::domain::Money;
    ///
    /// let fee = Money::new(4500).unwrap().percent_half_up(20).unwrap();
    /// assert_eq!(fee.amount(), 900);
    /// let odd = Money::new(2).unwrap().percent_half_up(25).unwrap();
    /// assert_eq!(odd.amount(), 1);
    /// ```
    pub fn percent_half_up(self, percent: i64) -> Result<Self, MoneyError> {
        let scaled = self.0.checked_mul(percent).ok_or(MoneyError::Overflow)?;
        let rounded = scaled.checked_add(50).ok_or(MoneyError::Overflow)? / 100;
        Self::new(rounded)
    }

    /// Convert to gateway minor units (kobo).
    ///
    /// # Examples
    /// ```
    /// use barberzon::domain::Money;
    ///
    /// let minor = Money::new(5000).unwrap().to_minor_units().unwrap();
    /// assert_eq!(minor.amount(), 500_000);
    /// ```
    pub fn to_minor_units(self) -> Result<MinorUnits, MoneyError> {
        self.0
            .checked_mul(MINOR_UNITS_PER_BASE_UNIT)
            .map(MinorUnits)
            .ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Money {
    type Error = MoneyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

/// Amount expressed in the gateway's smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Wrap a raw minor-unit value reported by the gateway.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Raw minor-unit value.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Convert back to whole base units, rejecting fractional amounts.
    pub fn to_money(self) -> Result<Money, MoneyError> {
        if self.0 % MINOR_UNITS_PER_BASE_UNIT != 0 {
            return Err(MoneyError::Fractional { minor: self.0 });
        }
        Money::new(self.0 / MINOR_UNITS_PER_BASE_UNIT)
    }
}

//! Money and rate types with decimal arithmetic
//!
//! Amounts arrive from the data store as loosely formatted text
//! (`"1,250.50"`, `"₹ 300"`, `""`). [`Money::parse`] turns them into a
//! canonical decimal value once, at the snapshot boundary, and never fails:
//! unparseable text becomes zero so that a single bad record cannot block a
//! whole report. [`Money::try_parse`] exposes the strict outcome for callers
//! that want to count anomalies.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Currency symbols tolerated in front of an amount
const CURRENCY_SYMBOLS: [&str; 3] = ["₹", "Rs.", "$"];

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// Strips grouping separators and currency decoration from raw amount text
pub(crate) fn normalize_numeric(raw: &str) -> String {
    let mut text = raw.trim();
    for symbol in CURRENCY_SYMBOLS {
        if let Some(rest) = text.strip_prefix(symbol) {
            text = rest.trim_start();
            break;
        }
    }
    text.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect()
}

/// Parses normalized numeric text into a decimal
///
/// Empty input is a legitimate zero, anything else that does not parse is
/// reported as [`MoneyError::InvalidAmount`].
pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal, MoneyError> {
    let text = normalize_numeric(raw);
    if text.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| MoneyError::InvalidAmount(raw.to_string()))
}

/// A signed currency amount
///
/// Operator arithmetic saturates at the `Decimal` bounds, so summing any
/// set of parsed amounts never panics. Use [`Money::checked_add`] /
/// [`Money::checked_sub`] where an overflow must be detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a new Money value
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parses raw amount text, falling back to zero on malformed input
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_kernel::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::parse("1,250.50").amount(), dec!(1250.50));
    /// assert_eq!(Money::parse("n/a"), Money::ZERO);
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or(Self::ZERO)
    }

    /// Parses raw amount text, reporting malformed input
    pub fn try_parse(raw: &str) -> Result<Self, MoneyError> {
        parse_decimal(raw).map(Self)
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Rounds to two decimal places using banker's rounding
    pub fn round_to_currency(&self) -> Self {
        Self(self.0.round_dp_with_strategy(
            2,
            rust_decimal::RoundingStrategy::MidpointNearestEven,
        ))
    }

    /// Checked addition
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        self.0
            .checked_div(divisor)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Represents a percentage rate (e.g., profit margin, share of total)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.05 for 5%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 5.0 for 5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Ratio of `part` to `whole`; zero unless `whole` is strictly positive
    ///
    /// A ratio too large to represent saturates.
    pub fn of(part: Money, whole: Money) -> Self {
        if !whole.is_positive() {
            return Self::default();
        }
        let value = part.amount().checked_div(whole.amount()).unwrap_or(
            if part.is_negative() { Decimal::MIN } else { Decimal::MAX },
        );
        Self { value }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value.saturating_mul(dec!(100))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(2))
    }
}

//! Stock quantities and bag/ton unit conversion

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::money::{parse_decimal, MoneyError};

/// Display metric for quantities that may be recorded in bags or tons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMetric {
    #[default]
    Bags,
    Tons,
}

impl UnitMetric {
    /// Recognizes a free-text unit as one of the convertible metrics
    pub fn from_unit(unit: &str) -> Option<Self> {
        match unit.trim().to_ascii_lowercase().as_str() {
            "bag" | "bags" => Some(UnitMetric::Bags),
            "ton" | "tons" | "tonne" | "tonnes" | "mt" => Some(UnitMetric::Tons),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UnitMetric::Bags => "bags",
            UnitMetric::Tons => "tons",
        }
    }
}

impl fmt::Display for UnitMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitMetric {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_unit(s).ok_or_else(|| MoneyError::InvalidAmount(format!("unknown unit: {s}")))
    }
}

/// A signed quantity of goods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Parses raw quantity text, falling back to zero on malformed input
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or(Self::ZERO)
    }

    /// Parses raw quantity text, reporting malformed input
    pub fn try_parse(raw: &str) -> Result<Self, MoneyError> {
        parse_decimal(raw).map(Self)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Converts a ton quantity to bags: `bags = tons * ratio`
    pub fn to_bags(self, bags_per_ton: Decimal) -> Self {
        Self(self.0.saturating_mul(bags_per_ton))
    }

    /// Converts a bag quantity to tons: `tons = bags / ratio`
    pub fn to_tons(self, bags_per_ton: Decimal) -> Result<Self, MoneyError> {
        if bags_per_ton.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        self.0
            .checked_div(bags_per_ton)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Expresses a quantity recorded in `unit` in the `target` metric
    ///
    /// Units that are neither bags nor tons are returned unchanged, as is
    /// every quantity when the ratio is not strictly positive.
    pub fn convert(self, unit: &str, target: UnitMetric, bags_per_ton: Decimal) -> Self {
        if bags_per_ton <= Decimal::ZERO {
            return self;
        }
        match (UnitMetric::from_unit(unit), target) {
            (Some(UnitMetric::Tons), UnitMetric::Bags) => self.to_bags(bags_per_ton),
            (Some(UnitMetric::Bags), UnitMetric::Tons) => {
                self.to_tons(bags_per_ton).unwrap_or(self)
            }
            _ => self,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_tons_to_bags() {
        let q = Quantity::new(dec!(2)).convert("Tons", UnitMetric::Bags, dec!(20));
        assert_eq!(q.value(), dec!(40));
    }

    #[test]
    fn test_convert_bags_to_tons() {
        let q = Quantity::new(dec!(50)).convert("bags", UnitMetric::Tons, dec!(20));
        assert_eq!(q.value(), dec!(2.5));
    }

    #[test]
    fn test_convert_other_unit_passes_through() {
        let q = Quantity::new(dec!(7)).convert("kg", UnitMetric::Tons, dec!(20));
        assert_eq!(q.value(), dec!(7));
    }

    #[test]
    fn test_to_tons_zero_ratio() {
        assert_eq!(
            Quantity::new(dec!(1)).to_tons(Decimal::ZERO),
            Err(MoneyError::DivisionByZero)
        );
    }
}

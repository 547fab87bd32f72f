//! Customers, accounts and report settings
//!
//! Customers and accounts are the entities transactions refer to. Both carry
//! a balance anchored at a different point in time than the transactions
//! shown: a customer's opening balance sits at its opening date, an
//! account's balance is the balance *now*.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, CalendarDate, CoreError, CustomerId, Money};

use crate::records::lenient_text;

/// Category assigned to customers stored without one
pub const DEFAULT_CUSTOMER_CATEGORY: &str = "Individual";

/// Bag/ton ratio used when the settings carry none
pub const DEFAULT_BAGS_PER_TON: Decimal = dec!(20);

/// A customer as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCustomer {
    #[serde(with = "lenient_text")]
    pub id: String,
    #[serde(with = "lenient_text")]
    pub name: String,
    #[serde(with = "lenient_text")]
    pub phone: String,
    #[serde(with = "lenient_text")]
    pub category: String,
    #[serde(with = "lenient_text")]
    pub opening_balance: String,
    #[serde(with = "lenient_text")]
    pub opening_balance_date: String,
    /// Registration date, the fallback opening-balance date
    #[serde(with = "lenient_text")]
    pub created_at: String,
}

/// An account as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAccount {
    #[serde(with = "lenient_text")]
    pub id: String,
    #[serde(with = "lenient_text")]
    pub name: String,
    /// Balance as of now, after every transaction
    #[serde(with = "lenient_text")]
    pub balance: String,
}

/// Settings as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSettings {
    #[serde(with = "lenient_text")]
    pub bags_per_ton: String,
}

/// A canonical customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    pub category: String,
    pub opening_balance: Money,
    pub opening_balance_date: Option<CalendarDate>,
}

impl Customer {
    /// Creates a customer with no opening balance
    pub fn new(id: impl Into<CustomerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: String::new(),
            category: DEFAULT_CUSTOMER_CATEGORY.to_string(),
            opening_balance: Money::ZERO,
            opening_balance_date: None,
        }
    }

    /// Sets the opening balance and its date
    pub fn with_opening_balance(mut self, amount: Money, date: Option<CalendarDate>) -> Self {
        self.opening_balance = amount;
        self.opening_balance_date = date;
        self
    }

    /// Sets the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Case-insensitive, whitespace-trimmed name comparison
pub fn names_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

/// A canonical account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// Balance as of now
    pub balance: Money,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>, balance: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
        }
    }

    /// Matches an account selection by id or name
    pub fn is_selected_by(&self, selection: &str) -> bool {
        self.id.as_str() == selection.trim() || names_match(selection, &self.name)
    }
}

/// Canonical report settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Bags per ton used for quantity conversion
    pub bags_per_ton: Decimal,
}

impl Settings {
    /// Validates the settings
    ///
    /// # Errors
    ///
    /// Returns a validation error when the bag/ton ratio is not positive
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.bags_per_ton <= Decimal::ZERO {
            return Err(CoreError::validation(format!(
                "bagsPerTon must be positive, got {}",
                self.bags_per_ton
            )));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bags_per_ton: DEFAULT_BAGS_PER_TON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_selection() {
        let account = Account::new("a1", "Cash in Hand", Money::ZERO);
        assert!(account.is_selected_by("a1"));
        assert!(account.is_selected_by("cash in hand"));
        assert!(!account.is_selected_by("Bank"));
    }

    #[test]
    fn test_settings_validation() {
        assert!(Settings::default().validate().is_ok());
        let bad = Settings {
            bags_per_ton: Decimal::ZERO,
        };
        assert!(matches!(bad.validate(), Err(CoreError::Validation(_))));
    }
}

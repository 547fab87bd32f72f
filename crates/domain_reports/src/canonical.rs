//! Canonicalization of raw records
//!
//! Every text date and amount is parsed exactly once here. Failures never
//! abort: a malformed date becomes `None` (the record then falls outside
//! every date range) and a malformed amount becomes zero. Each anomaly is
//! counted in [`Diagnostics`] so callers can tell a clean snapshot from one
//! whose totals may be understated.

use serde::Serialize;

use core_kernel::{CalendarDate, DateParseError, Money, Quantity};

use crate::party::{
    Account, Customer, RawAccount, RawCustomer, RawSettings, Settings, DEFAULT_CUSTOMER_CATEGORY,
};
use crate::records::{
    AccountTransaction, Direction, Expense, Payment, ProductDescriptor, Purchase, RawAccountTransaction,
    RawExpense, RawPayment, RawPurchase, RawSale, RawStockTransaction, Sale, StockMovement,
    StockTransaction, SubCategory,
};

/// Counts of anomalies met while canonicalizing a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Dates that were present but could not be parsed
    pub malformed_dates: usize,
    /// Records with no date at all
    pub missing_dates: usize,
    /// Amounts or quantities that were present but could not be parsed
    pub malformed_amounts: usize,
    /// Account transactions whose Credit/Debit flag was unrecognized
    pub unknown_directions: usize,
}

impl Diagnostics {
    /// Returns true when nothing was coerced
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Parses raw fields into canonical values, tallying anomalies
#[derive(Debug, Default)]
pub struct Canonicalizer {
    diagnostics: Diagnostics,
}

impl Canonicalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the anomalies counted so far
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub fn date(&mut self, raw: &str) -> Option<CalendarDate> {
        match CalendarDate::parse(raw) {
            Ok(date) => Some(date),
            Err(DateParseError::Empty) => {
                self.diagnostics.missing_dates += 1;
                None
            }
            Err(_) => {
                self.diagnostics.malformed_dates += 1;
                None
            }
        }
    }

    /// Like [`Canonicalizer::date`] but an empty value is not an anomaly
    pub fn optional_date(&mut self, raw: &str) -> Option<CalendarDate> {
        if raw.trim().is_empty() {
            return None;
        }
        self.date(raw)
    }

    pub fn money(&mut self, raw: &str) -> Money {
        Money::try_parse(raw).unwrap_or_else(|_| {
            self.diagnostics.malformed_amounts += 1;
            Money::ZERO
        })
    }

    pub fn quantity(&mut self, raw: &str) -> Quantity {
        Quantity::try_parse(raw).unwrap_or_else(|_| {
            self.diagnostics.malformed_amounts += 1;
            Quantity::ZERO
        })
    }

    pub fn sale(&mut self, raw: &RawSale) -> Sale {
        Sale {
            id: raw.id.as_str().into(),
            date: self.date(&raw.date),
            customer_id: raw.customer_id.as_str().into(),
            customer_name: raw.customer_name.trim().to_string(),
            product: ProductDescriptor::parse(&raw.product),
            amount: self.money(&raw.amount),
            bill_number: raw.bill_number.trim().to_string(),
            sub_category: SubCategory::parse(&raw.sub_category),
        }
    }

    pub fn payment(&mut self, raw: &RawPayment) -> Payment {
        Payment {
            id: raw.id.as_str().into(),
            date: self.date(&raw.date),
            customer_id: raw.customer_id.as_str().into(),
            customer_name: raw.customer_name.trim().to_string(),
            amount: self.money(&raw.amount),
            mode: raw.mode.trim().to_string(),
            note: raw.note.trim().to_string(),
        }
    }

    pub fn purchase(&mut self, raw: &RawPurchase) -> Purchase {
        Purchase {
            id: raw.id.as_str().into(),
            date: self.date(&raw.date),
            vendor: raw.vendor.trim().to_string(),
            product: raw.product.trim().to_string(),
            quantity: self.quantity(&raw.quantity),
            unit: raw.unit.trim().to_string(),
            amount: self.money(&raw.amount),
            sub_category: SubCategory::parse(&raw.sub_category),
        }
    }

    pub fn expense(&mut self, raw: &RawExpense) -> Expense {
        Expense {
            id: raw.id.as_str().into(),
            date: self.date(&raw.date),
            category: raw.category.trim().to_string(),
            description: raw.description.trim().to_string(),
            paid_to: raw.paid_to.trim().to_string(),
            amount: self.money(&raw.amount),
        }
    }

    pub fn account_transaction(&mut self, raw: &RawAccountTransaction) -> AccountTransaction {
        let direction = Direction::parse(&raw.direction);
        if direction.is_none() {
            self.diagnostics.unknown_directions += 1;
        }
        AccountTransaction {
            id: raw.id.as_str().into(),
            date: self.date(&raw.date),
            account_id: raw.account_id.as_str().into(),
            amount: self.money(&raw.amount),
            direction,
            description: raw.description.trim().to_string(),
        }
    }

    pub fn stock_transaction(&mut self, raw: &RawStockTransaction) -> StockTransaction {
        StockTransaction {
            id: raw.id.as_str().into(),
            date: self.date(&raw.date),
            product: raw.product.trim().to_string(),
            quantity: self.quantity(&raw.quantity),
            unit: raw.unit.trim().to_string(),
            movement: StockMovement::parse(&raw.movement),
            note: raw.note.trim().to_string(),
        }
    }

    /// Canonical customer; category and opening date fall back to their
    /// defaults
    pub fn customer(&mut self, raw: &RawCustomer) -> Customer {
        let category = match raw.category.trim() {
            "" => DEFAULT_CUSTOMER_CATEGORY.to_string(),
            other => other.to_string(),
        };
        let opening_balance_date = self
            .optional_date(&raw.opening_balance_date)
            .or_else(|| self.optional_date(&raw.created_at));

        Customer {
            id: raw.id.as_str().into(),
            name: raw.name.trim().to_string(),
            phone: raw.phone.trim().to_string(),
            category,
            opening_balance: self.money(&raw.opening_balance),
            opening_balance_date,
        }
    }

    pub fn account(&mut self, raw: &RawAccount) -> Account {
        Account {
            id: raw.id.as_str().into(),
            name: raw.name.trim().to_string(),
            balance: self.money(&raw.balance),
        }
    }

    /// Canonical settings; a missing or non-positive ratio keeps the default
    pub fn settings(&mut self, raw: &RawSettings) -> Settings {
        let mut settings = Settings::default();
        if raw.bags_per_ton.trim().is_empty() {
            return settings;
        }
        let ratio = self.quantity(&raw.bags_per_ton).value();
        let candidate = Settings {
            bags_per_ton: ratio,
        };
        if candidate.validate().is_ok() {
            settings = candidate;
        } else {
            tracing::warn!(bags_per_ton = %ratio, "ignoring non-positive bag/ton ratio");
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_malformed_fields_are_counted() {
        let mut canon = Canonicalizer::new();
        let sale = canon.sale(&RawSale {
            id: "s1".into(),
            date: "31/01/2024".into(),
            amount: "12O0".into(),
            product: "Cement • 5 bags".into(),
            ..RawSale::default()
        });

        assert_eq!(sale.date, None);
        assert_eq!(sale.amount, Money::ZERO);
        assert_eq!(sale.product.quantity.value(), dec!(5));
        assert_eq!(canon.diagnostics().malformed_dates, 1);
        assert_eq!(canon.diagnostics().malformed_amounts, 1);
    }

    #[test]
    fn test_customer_defaults() {
        let mut canon = Canonicalizer::new();
        let customer = canon.customer(&RawCustomer {
            id: "c1".into(),
            name: " Asha ".into(),
            created_at: "2023-04-01T08:00:00Z".into(),
            ..RawCustomer::default()
        });

        assert_eq!(customer.name, "Asha");
        assert_eq!(customer.category, DEFAULT_CUSTOMER_CATEGORY);
        assert_eq!(customer.opening_balance_date, CalendarDate::parse("01-04-2023").ok());
        assert!(canon.diagnostics().is_clean());
    }

    #[test]
    fn test_settings_reject_zero_ratio() {
        let mut canon = Canonicalizer::new();
        let settings = canon.settings(&RawSettings {
            bags_per_ton: "0".into(),
        });
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_unknown_direction_is_counted() {
        let mut canon = Canonicalizer::new();
        let txn = canon.account_transaction(&RawAccountTransaction {
            direction: "sideways".into(),
            date: "2024-01-01".into(),
            ..RawAccountTransaction::default()
        });
        assert_eq!(txn.direction, None);
        assert_eq!(canon.diagnostics().unknown_directions, 1);
    }
}

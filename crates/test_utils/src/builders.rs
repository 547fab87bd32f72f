//! Test Data Builders
//!
//! Provides a builder for raw snapshots with sensible defaults. Tests state
//! only the records they care about; every field is given as the text a data
//! store would hand over, so the canonicalization path is exercised too.

use domain_reports::party::{RawAccount, RawCustomer, RawSettings};
use domain_reports::records::{
    RawAccountTransaction, RawExpense, RawPayment, RawPurchase, RawSale, RawStockTransaction,
};
use domain_reports::{RawSnapshot, Snapshot};

/// Builder for constructing raw and canonical snapshots
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    raw: RawSnapshot,
    next_id: usize,
}

impl SnapshotBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    /// Sets the store-issued version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.raw.version = Some(version.into());
        self
    }

    /// Sets the bag/ton ratio
    pub fn bags_per_ton(mut self, ratio: &str) -> Self {
        self.raw.settings = RawSettings {
            bags_per_ton: ratio.to_string(),
        };
        self
    }

    /// Adds a customer with no opening balance
    pub fn customer(mut self, id: &str, name: &str) -> Self {
        self.raw.customers.push(RawCustomer {
            id: id.into(),
            name: name.into(),
            ..RawCustomer::default()
        });
        self
    }

    /// Adds a customer with an opening balance at `date`
    pub fn customer_with_opening(mut self, id: &str, name: &str, opening: &str, date: &str) -> Self {
        self.raw.customers.push(RawCustomer {
            id: id.into(),
            name: name.into(),
            opening_balance: opening.into(),
            opening_balance_date: date.into(),
            ..RawCustomer::default()
        });
        self
    }

    /// Adds a customer in a category
    pub fn customer_in(mut self, id: &str, name: &str, category: &str) -> Self {
        self.raw.customers.push(RawCustomer {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            ..RawCustomer::default()
        });
        self
    }

    /// Adds an account with its current balance
    pub fn account(mut self, id: &str, name: &str, balance: &str) -> Self {
        self.raw.accounts.push(RawAccount {
            id: id.into(),
            name: name.into(),
            balance: balance.into(),
        });
        self
    }

    /// Adds a sale to a customer id
    pub fn sale(mut self, date: &str, customer_id: &str, product: &str, amount: &str) -> Self {
        let id = self.id("s");
        self.raw.sales.push(RawSale {
            id,
            date: date.into(),
            customer_id: customer_id.into(),
            product: product.into(),
            amount: amount.into(),
            ..RawSale::default()
        });
        self
    }

    /// Adds a sale carrying only a customer name
    pub fn sale_to_name(mut self, date: &str, customer_name: &str, product: &str, amount: &str) -> Self {
        let id = self.id("s");
        self.raw.sales.push(RawSale {
            id,
            date: date.into(),
            customer_name: customer_name.into(),
            product: product.into(),
            amount: amount.into(),
            ..RawSale::default()
        });
        self
    }

    /// Adds a sale tagged with a purchase sub-category
    pub fn tagged_sale(mut self, date: &str, product: &str, sub_category: &str) -> Self {
        let id = self.id("s");
        self.raw.sales.push(RawSale {
            id,
            date: date.into(),
            product: product.into(),
            sub_category: sub_category.into(),
            ..RawSale::default()
        });
        self
    }

    /// Adds a fully specified sale
    pub fn push_sale(mut self, sale: RawSale) -> Self {
        self.raw.sales.push(sale);
        self
    }

    /// Adds a payment from a customer id
    pub fn payment(mut self, date: &str, customer_id: &str, amount: &str) -> Self {
        let id = self.id("p");
        self.raw.payments.push(RawPayment {
            id,
            date: date.into(),
            customer_id: customer_id.into(),
            amount: amount.into(),
            ..RawPayment::default()
        });
        self
    }

    /// Adds a transfer between own accounts
    pub fn internal_transfer(mut self, date: &str, amount: &str) -> Self {
        let id = self.id("p");
        self.raw.payments.push(RawPayment {
            id,
            date: date.into(),
            amount: amount.into(),
            is_internal_transfer: true,
            ..RawPayment::default()
        });
        self
    }

    /// Adds a purchase
    #[allow(clippy::too_many_arguments)]
    pub fn purchase(
        mut self,
        date: &str,
        vendor: &str,
        product: &str,
        quantity: &str,
        unit: &str,
        amount: &str,
        sub_category: &str,
    ) -> Self {
        let id = self.id("pu");
        self.raw.purchases.push(RawPurchase {
            id,
            date: date.into(),
            vendor: vendor.into(),
            product: product.into(),
            quantity: quantity.into(),
            unit: unit.into(),
            amount: amount.into(),
            sub_category: sub_category.into(),
        });
        self
    }

    /// Adds an expense
    pub fn expense(mut self, date: &str, category: &str, amount: &str) -> Self {
        let id = self.id("e");
        self.raw.expenses.push(RawExpense {
            id,
            date: date.into(),
            category: category.into(),
            amount: amount.into(),
            ..RawExpense::default()
        });
        self
    }

    /// Adds a stock movement
    pub fn stock(mut self, date: &str, product: &str, quantity: &str, unit: &str, movement: &str) -> Self {
        let id = self.id("st");
        self.raw.stock_transactions.push(RawStockTransaction {
            id,
            date: date.into(),
            product: product.into(),
            quantity: quantity.into(),
            unit: unit.into(),
            movement: movement.into(),
            ..RawStockTransaction::default()
        });
        self
    }

    fn account_transaction(mut self, date: &str, account_id: &str, amount: &str, direction: &str) -> Self {
        let id = self.id("t");
        self.raw.account_transactions.push(RawAccountTransaction {
            id,
            date: date.into(),
            account_id: account_id.into(),
            amount: amount.into(),
            direction: direction.into(),
            description: String::new(),
        });
        self
    }

    /// Adds money into an account
    pub fn credit(self, date: &str, account_id: &str, amount: &str) -> Self {
        self.account_transaction(date, account_id, amount, "Credit")
    }

    /// Adds money out of an account
    pub fn debit(self, date: &str, account_id: &str, amount: &str) -> Self {
        self.account_transaction(date, account_id, amount, "Debit")
    }

    /// Returns the raw snapshot
    pub fn build_raw(self) -> RawSnapshot {
        self.raw
    }

    /// Returns the canonical snapshot
    pub fn build(self) -> Snapshot {
        Snapshot::from_raw(self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assigns_unique_ids() {
        let raw = SnapshotBuilder::new()
            .sale("2024-01-01", "c1", "Cement • 1 bags", "10")
            .sale("2024-01-01", "c1", "Cement • 1 bags", "10")
            .payment("2024-01-02", "c1", "5")
            .build_raw();

        assert_ne!(raw.sales[0].id, raw.sales[1].id);
        assert_ne!(raw.sales[0].id, raw.payments[0].id);
    }

    #[test]
    fn test_internal_transfers_do_not_reach_the_snapshot() {
        let snapshot = SnapshotBuilder::new().internal_transfer("2024-01-01", "50").build();
        assert_eq!(snapshot.payments().count(), 0);
    }
}

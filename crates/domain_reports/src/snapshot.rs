//! Immutable input snapshot
//!
//! [`RawSnapshot`] is what the data store hands over. [`Snapshot::from_raw`]
//! canonicalizes it once; every report then reads the canonical snapshot and
//! nothing re-parses text mid-pipeline. Payments flagged as internal
//! transfers are dropped at this boundary.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::CustomerId;

use crate::canonical::{Canonicalizer, Diagnostics};
use crate::error::ReportError;
use crate::party::{Account, Customer, RawAccount, RawCustomer, RawSettings, Settings};
use crate::records::{
    AccountTransaction, Expense, Payment, Purchase, RawAccountTransaction, RawExpense, RawPayment,
    RawPurchase, RawSale, RawStockTransaction, Sale, StockTransaction, TransactionRecord,
};

/// The snapshot as delivered by the data store
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSnapshot {
    /// Store-issued version; derived from the content when absent
    pub version: Option<String>,
    pub sales: Vec<RawSale>,
    pub payments: Vec<RawPayment>,
    pub purchases: Vec<RawPurchase>,
    pub expenses: Vec<RawExpense>,
    pub stock_transactions: Vec<RawStockTransaction>,
    pub account_transactions: Vec<RawAccountTransaction>,
    pub customers: Vec<RawCustomer>,
    pub accounts: Vec<RawAccount>,
    pub settings: RawSettings,
}

impl RawSnapshot {
    /// Content fingerprint used as the version when the store supplies none
    pub fn fingerprint(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

/// The canonical, read-only snapshot every report is computed from
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: String,
    records: Vec<TransactionRecord>,
    customers: Vec<Customer>,
    accounts: Vec<Account>,
    settings: Settings,
    diagnostics: Diagnostics,
    customers_by_id: HashMap<CustomerId, usize>,
    customers_by_name: HashMap<String, usize>,
}

impl Snapshot {
    /// Canonicalizes a raw snapshot
    pub fn from_raw(raw: RawSnapshot) -> Self {
        let version = raw.version.clone().unwrap_or_else(|| raw.fingerprint());
        let mut canon = Canonicalizer::new();

        let transfers = raw.payments.iter().filter(|p| p.is_internal_transfer).count();

        let mut records = Vec::with_capacity(
            raw.sales.len()
                + raw.payments.len()
                + raw.purchases.len()
                + raw.expenses.len()
                + raw.stock_transactions.len()
                + raw.account_transactions.len(),
        );
        records.extend(raw.sales.iter().map(|r| TransactionRecord::Sale(canon.sale(r))));
        records.extend(
            raw.payments
                .iter()
                .filter(|p| !p.is_internal_transfer)
                .map(|r| TransactionRecord::Payment(canon.payment(r))),
        );
        records.extend(raw.purchases.iter().map(|r| TransactionRecord::Purchase(canon.purchase(r))));
        records.extend(raw.expenses.iter().map(|r| TransactionRecord::Expense(canon.expense(r))));
        records.extend(
            raw.stock_transactions
                .iter()
                .map(|r| TransactionRecord::StockTransaction(canon.stock_transaction(r))),
        );
        records.extend(
            raw.account_transactions
                .iter()
                .map(|r| TransactionRecord::AccountTransaction(canon.account_transaction(r))),
        );

        let customers: Vec<Customer> = raw.customers.iter().map(|c| canon.customer(c)).collect();
        let accounts: Vec<Account> = raw.accounts.iter().map(|a| canon.account(a)).collect();
        let settings = canon.settings(&raw.settings);
        let diagnostics = canon.diagnostics();

        let mut customers_by_id = HashMap::new();
        let mut customers_by_name = HashMap::new();
        for (index, customer) in customers.iter().enumerate() {
            if !customer.id.is_empty() {
                customers_by_id.entry(customer.id.clone()).or_insert(index);
            }
            if !customer.name.is_empty() {
                customers_by_name
                    .entry(customer.name.to_lowercase())
                    .or_insert(index);
            }
        }

        debug!(
            %version,
            records = records.len(),
            customers = customers.len(),
            accounts = accounts.len(),
            internal_transfers = transfers,
            "snapshot canonicalized"
        );
        if !diagnostics.is_clean() {
            warn!(
                malformed_dates = diagnostics.malformed_dates,
                missing_dates = diagnostics.missing_dates,
                malformed_amounts = diagnostics.malformed_amounts,
                unknown_directions = diagnostics.unknown_directions,
                "snapshot contains coerced fields; totals may be understated"
            );
        }

        Self {
            version,
            records,
            customers,
            accounts,
            settings,
            diagnostics,
            customers_by_id,
            customers_by_name,
        }
    }

    /// Decodes and canonicalizes a JSON snapshot
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Snapshot`] when the document is not valid JSON
    /// or does not have the snapshot shape
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn sales(&self) -> impl Iterator<Item = &Sale> {
        self.records.iter().filter_map(TransactionRecord::as_sale)
    }

    /// Customer payments, internal transfers excluded
    pub fn payments(&self) -> impl Iterator<Item = &Payment> {
        self.records.iter().filter_map(TransactionRecord::as_payment)
    }

    pub fn purchases(&self) -> impl Iterator<Item = &Purchase> {
        self.records.iter().filter_map(TransactionRecord::as_purchase)
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Expense> {
        self.records.iter().filter_map(TransactionRecord::as_expense)
    }

    pub fn stock_transactions(&self) -> impl Iterator<Item = &StockTransaction> {
        self.records.iter().filter_map(TransactionRecord::as_stock_transaction)
    }

    pub fn account_transactions(&self) -> impl Iterator<Item = &AccountTransaction> {
        self.records
            .iter()
            .filter_map(TransactionRecord::as_account_transaction)
    }

    /// Resolves a transaction's customer reference
    ///
    /// The id is tried first, then a case-insensitive name match. `None`
    /// means the record renders with its own (possibly empty) name.
    pub fn resolve_customer(&self, id: &CustomerId, name: &str) -> Option<&Customer> {
        let by_id = (!id.is_empty())
            .then(|| self.customers_by_id.get(id))
            .flatten();
        let index = by_id.or_else(|| self.customers_by_name.get(&name.trim().to_lowercase()))?;
        self.customers.get(*index)
    }

    /// Returns true when a record referencing `id` / `name` belongs to
    /// `customer`
    ///
    /// The name is only consulted when the id is empty or names no known
    /// customer, so a record is never attributed to two customers.
    pub fn is_owned_by(&self, customer: &Customer, id: &CustomerId, name: &str) -> bool {
        self.resolve_customer(id, name)
            .is_some_and(|resolved| resolved.id == customer.id)
    }

    /// Finds a customer selected by id or name
    pub fn find_customer(&self, selection: &str) -> Option<&Customer> {
        self.resolve_customer(&CustomerId::new(selection), selection)
    }

    /// Finds an account selected by id or name
    pub fn find_account(&self, selection: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.is_selected_by(selection))
    }
}

impl From<RawSnapshot> for Snapshot {
    fn from(raw: RawSnapshot) -> Self {
        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawSnapshot {
        RawSnapshot {
            customers: vec![RawCustomer {
                id: "c1".into(),
                name: "Meena Stores".into(),
                ..RawCustomer::default()
            }],
            payments: vec![
                RawPayment {
                    id: "p1".into(),
                    date: "2024-01-02".into(),
                    amount: "100".into(),
                    ..RawPayment::default()
                },
                RawPayment {
                    id: "p2".into(),
                    date: "2024-01-02".into(),
                    amount: "900".into(),
                    is_internal_transfer: true,
                    ..RawPayment::default()
                },
            ],
            ..RawSnapshot::default()
        }
    }

    #[test]
    fn test_internal_transfers_are_excluded() {
        let snapshot = Snapshot::from_raw(raw());
        let ids: Vec<_> = snapshot.payments().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1"]);
    }

    #[test]
    fn test_version_falls_back_to_fingerprint() {
        let a = Snapshot::from_raw(raw());
        let b = Snapshot::from_raw(raw());
        assert_eq!(a.version(), b.version());
        assert_eq!(a.version().len(), 16);

        let mut changed = raw();
        changed.payments[0].amount = "101".into();
        assert_ne!(Snapshot::from_raw(changed).version(), a.version());
    }

    #[test]
    fn test_resolve_customer_by_id_then_name() {
        let snapshot = Snapshot::from_raw(raw());
        assert!(snapshot.resolve_customer(&CustomerId::new("c1"), "").is_some());
        assert!(snapshot
            .resolve_customer(&CustomerId::new("gone"), "MEENA STORES")
            .is_some());
        assert!(snapshot.resolve_customer(&CustomerId::new("gone"), "Other").is_none());
    }

    #[test]
    fn test_ownership_prefers_a_known_id_over_the_name() {
        let snapshot = Snapshot::from_raw(raw());
        let meena = snapshot.find_customer("c1").cloned().unwrap();

        assert!(snapshot.is_owned_by(&meena, &CustomerId::new("c1"), "someone else"));
        assert!(snapshot.is_owned_by(&meena, &CustomerId::new("gone"), "  meena stores "));
        assert!(!snapshot.is_owned_by(&meena, &CustomerId::new(""), ""));
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        assert!(matches!(
            Snapshot::from_json("[1, 2, 3]"),
            Err(ReportError::Snapshot(_))
        ));
    }
}

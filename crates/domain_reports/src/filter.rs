//! Report filters and range membership
//!
//! A [`ReportFilter`] combines a date range with optional scalar
//! predicates. All predicates are conjunctive. A scalar predicate only
//! constrains record kinds that carry the field it names: a product filter
//! narrows sales, purchases and stock movements but leaves expenses alone.

use serde::{Deserialize, Serialize};

use core_kernel::{CalendarDate, CoreError, DateRange, UnitMetric};

use crate::error::ReportError;
use crate::party::names_match;
use crate::records::TransactionRecord;
use crate::snapshot::Snapshot;

/// Selection value meaning "no constraint"
const ALL: &str = "all";

/// Range membership for a single date
///
/// True when either bound is unset or `from <= date <= to`. A record whose
/// date failed to parse is never in range.
pub fn in_range(date: Option<CalendarDate>, from: Option<CalendarDate>, to: Option<CalendarDate>) -> bool {
    DateRange::new(from, to).contains(date)
}

/// Filter applied to a report computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFilter {
    pub range: DateRange,
    /// Customer id or name
    pub customer: Option<String>,
    pub product: Option<String>,
    pub category: Option<String>,
    /// Account id or name
    pub account: Option<String>,
    /// Case-insensitive free-text search
    pub search: Option<String>,
    /// Display metric for bag/ton quantities
    pub metric: Option<UnitMetric>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the date range from canonical bounds
    pub fn between(mut self, from: Option<CalendarDate>, to: Option<CalendarDate>) -> Self {
        self.range = DateRange::new(from, to);
        self
    }

    /// Sets the date range from raw text; empty or malformed bounds stay open
    pub fn between_raw(mut self, from: &str, to: &str) -> Self {
        self.range = DateRange::from_raw(from, to);
        self
    }

    /// Sets the date range from raw text, rejecting malformed bounds
    ///
    /// Empty text still means "unbounded".
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Core`] when a non-empty bound does not parse
    pub fn try_between(self, from: &str, to: &str) -> Result<Self, ReportError> {
        let parse = |raw: &str| -> Result<Option<CalendarDate>, ReportError> {
            if raw.trim().is_empty() {
                return Ok(None);
            }
            CalendarDate::parse(raw)
                .map(Some)
                .map_err(|e| ReportError::Core(CoreError::from(e)))
        };
        let (from, to) = (parse(from)?, parse(to)?);
        Ok(self.between(from, to))
    }

    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn metric(mut self, metric: UnitMetric) -> Self {
        self.metric = Some(metric);
        self
    }

    pub fn from(&self) -> Option<CalendarDate> {
        self.range.from
    }

    pub fn to(&self) -> Option<CalendarDate> {
        self.range.to
    }

    /// Active customer selection, if any
    pub fn customer_selection(&self) -> Option<&str> {
        selection(&self.customer)
    }

    /// Active product selection, if any
    pub fn product_selection(&self) -> Option<&str> {
        selection(&self.product)
    }

    /// Active category selection, if any
    pub fn category_selection(&self) -> Option<&str> {
        selection(&self.category)
    }

    /// Active account selection, if any
    pub fn account_selection(&self) -> Option<&str> {
        selection(&self.account)
    }

    /// Active search needle, lowercased
    pub fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Full membership test: date range, scalar predicates, then search
    pub fn matches(&self, record: &TransactionRecord, snapshot: &Snapshot) -> bool {
        self.range.contains(record.date())
            && self.matches_predicates(record, snapshot)
            && self.matches_search(record)
    }

    /// Equality predicates on customer, product, category and account
    pub fn matches_predicates(&self, record: &TransactionRecord, snapshot: &Snapshot) -> bool {
        if let Some(customer) = self.customer_selection() {
            let selected = snapshot.find_customer(customer);
            let keep = match record {
                TransactionRecord::Sale(s) => {
                    party_matches(snapshot, selected, customer, &s.customer_id, &s.customer_name)
                }
                TransactionRecord::Payment(p) => {
                    party_matches(snapshot, selected, customer, &p.customer_id, &p.customer_name)
                }
                _ => true,
            };
            if !keep {
                return false;
            }
        }

        if let Some(product) = self.product_selection() {
            let keep = match record {
                TransactionRecord::Sale(s) => names_match(&s.product.name, product),
                TransactionRecord::Purchase(p) => names_match(&p.product, product),
                TransactionRecord::StockTransaction(s) => names_match(&s.product, product),
                _ => true,
            };
            if !keep {
                return false;
            }
        }

        if let Some(category) = self.category_selection() {
            let customer_category = |id, name: &str| {
                snapshot
                    .resolve_customer(id, name)
                    .is_some_and(|c| names_match(&c.category, category))
            };
            let keep = match record {
                TransactionRecord::Sale(s) => customer_category(&s.customer_id, &s.customer_name),
                TransactionRecord::Payment(p) => customer_category(&p.customer_id, &p.customer_name),
                TransactionRecord::Expense(e) => names_match(&e.category, category),
                TransactionRecord::Purchase(p) => p
                    .sub_category
                    .is_some_and(|c| names_match(c.label(), category)),
                _ => true,
            };
            if !keep {
                return false;
            }
        }

        if let Some(account) = self.account_selection() {
            if let TransactionRecord::AccountTransaction(t) = record {
                let by_id = t.account_id.as_str() == account.trim();
                let by_name = snapshot
                    .find_account(account)
                    .is_some_and(|a| a.id == t.account_id);
                if !(by_id || by_name) {
                    return false;
                }
            }
        }

        true
    }

    /// Case-insensitive substring match against the record's searchable
    /// fields
    pub fn matches_search(&self, record: &TransactionRecord) -> bool {
        let Some(needle) = self.search_needle() else {
            return true;
        };
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Records of the snapshot passing this filter, in snapshot order
    pub fn apply<'a>(&'a self, snapshot: &'a Snapshot) -> impl Iterator<Item = &'a TransactionRecord> + 'a {
        snapshot
            .records()
            .iter()
            .filter(move |record| self.matches(record, snapshot))
    }
}

fn selection(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL))
}

/// A record's own name only counts when its id resolves to no customer
fn party_matches(
    snapshot: &Snapshot,
    selected: Option<&crate::party::Customer>,
    selection: &str,
    id: &core_kernel::CustomerId,
    name: &str,
) -> bool {
    match selected {
        Some(customer) => snapshot.is_owned_by(customer, id, name),
        None => {
            id.as_str() == selection
                || (snapshot.resolve_customer(id, name).is_none() && names_match(name, selection))
        }
    }
}

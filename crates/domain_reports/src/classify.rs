//! Balance and activity classification
//!
//! Customers are labelled along two independent axes: what their balance
//! says (owes money, overpaid, even) and how recently they transacted.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CalendarDate, CustomerId, Money};

use crate::filter::ReportFilter;
use crate::party::{names_match, Customer};
use crate::snapshot::Snapshot;

/// Customers with a transaction within this many days are active
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

/// Classification of a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceStatus {
    /// Positive balance: the customer owes money
    Due,
    /// Negative balance: the customer has paid in advance
    Advance,
    Settled,
}

impl BalanceStatus {
    pub fn from_balance(balance: Money) -> Self {
        if balance.is_positive() {
            BalanceStatus::Due
        } else if balance.is_negative() {
            BalanceStatus::Advance
        } else {
            BalanceStatus::Settled
        }
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BalanceStatus::Due => "Due",
            BalanceStatus::Advance => "Advance",
            BalanceStatus::Settled => "Settled",
        };
        f.write_str(label)
    }
}

/// Recency of a customer's last transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Active,
    Inactive,
    NoTransactions,
}

impl Activity {
    /// Classifies the latest transaction date relative to `today`
    pub fn classify(today: CalendarDate, last: Option<CalendarDate>) -> Self {
        match last {
            None => Activity::NoTransactions,
            Some(last) if days_since(today, last) <= ACTIVE_WINDOW_DAYS => Activity::Active,
            Some(_) => Activity::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Activity::Active)
    }
}

/// Whole days between `last` and `today`
///
/// Dates carry no time of day, so the difference is already whole. A
/// future-dated `last` gives a negative count.
pub fn days_since(today: CalendarDate, last: CalendarDate) -> i64 {
    last.days_until(today)
}

/// One customer in the status report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStatusRow {
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: String,
    pub category: String,
    pub opening_balance: Money,
    pub total_debit: Money,
    pub total_credit: Money,
    /// `opening + debit − credit` over every transaction ever recorded
    pub balance: Money,
    pub status: BalanceStatus,
    pub last_transaction: Option<CalendarDate>,
    pub days_since_last: Option<i64>,
    pub activity: Activity,
}

/// Totals of the status report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStatusSummary {
    pub customers: usize,
    pub due: usize,
    pub advance: usize,
    pub settled: usize,
    pub active: usize,
    pub inactive: usize,
    pub no_transactions: usize,
    pub total_due: Money,
    /// Magnitude of all advance balances
    pub total_advance: Money,
}

/// Classifies one customer against every sale and payment in the snapshot
pub fn classify_customer(snapshot: &Snapshot, customer: &Customer, today: CalendarDate) -> CustomerStatusRow {
    let mut total_debit = Money::ZERO;
    let mut total_credit = Money::ZERO;
    let mut last: Option<CalendarDate> = None;

    for sale in snapshot
        .sales()
        .filter(|s| snapshot.is_owned_by(customer, &s.customer_id, &s.customer_name))
    {
        total_debit += sale.amount;
        last = last.max(sale.date);
    }
    for payment in snapshot
        .payments()
        .filter(|p| snapshot.is_owned_by(customer, &p.customer_id, &p.customer_name))
    {
        total_credit += payment.amount;
        last = last.max(payment.date);
    }

    let balance = customer.opening_balance + total_debit - total_credit;

    CustomerStatusRow {
        customer_id: customer.id.clone(),
        name: customer.name.clone(),
        phone: customer.phone.clone(),
        category: customer.category.clone(),
        opening_balance: customer.opening_balance,
        total_debit,
        total_credit,
        balance,
        status: BalanceStatus::from_balance(balance),
        last_transaction: last,
        days_since_last: last.map(|d| days_since(today, d)),
        activity: Activity::classify(today, last),
    }
}

/// Status rows for every customer passing the filter, sorted by name
///
/// Balances are all-time; the date range does not apply. The customer,
/// category and search selections narrow which customers are listed.
pub fn customer_status(
    snapshot: &Snapshot,
    filter: &ReportFilter,
    today: CalendarDate,
) -> (Vec<CustomerStatusRow>, CustomerStatusSummary) {
    let needle = filter.search_needle();
    let selected = filter.customer_selection();
    let category = filter.category_selection();

    let mut rows: Vec<CustomerStatusRow> = snapshot
        .customers()
        .iter()
        .filter(|c| selected.map_or(true, |s| c.id.as_str() == s || names_match(&c.name, s)))
        .filter(|c| category.map_or(true, |cat| names_match(&c.category, cat)))
        .filter(|c| {
            needle.as_deref().map_or(true, |n| {
                c.name.to_lowercase().contains(n) || c.phone.contains(n)
            })
        })
        .map(|c| classify_customer(snapshot, c, today))
        .collect();

    rows.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.customer_id.as_str().cmp(b.customer_id.as_str()))
    });

    let mut summary = CustomerStatusSummary {
        customers: rows.len(),
        ..CustomerStatusSummary::default()
    };
    for row in &rows {
        match row.status {
            BalanceStatus::Due => {
                summary.due += 1;
                summary.total_due += row.balance;
            }
            BalanceStatus::Advance => {
                summary.advance += 1;
                summary.total_advance += row.balance.abs();
            }
            BalanceStatus::Settled => summary.settled += 1,
        }
        match row.activity {
            Activity::Active => summary.active += 1,
            Activity::Inactive => summary.inactive += 1,
            Activity::NoTransactions => summary.no_transactions += 1,
        }
    }

    (rows, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(raw: &str) -> CalendarDate {
        CalendarDate::parse(raw).unwrap()
    }

    #[test]
    fn test_balance_status() {
        assert_eq!(BalanceStatus::from_balance(Money::new(dec!(0.01))), BalanceStatus::Due);
        assert_eq!(BalanceStatus::from_balance(Money::new(dec!(-5))), BalanceStatus::Advance);
        assert_eq!(BalanceStatus::from_balance(Money::ZERO), BalanceStatus::Settled);
    }

    #[test]
    fn test_activity_window_is_inclusive() {
        let today = date("2024-03-31");
        assert_eq!(Activity::classify(today, Some(date("2024-03-01"))), Activity::Active);
        assert_eq!(Activity::classify(today, Some(date("2024-02-29"))), Activity::Inactive);
        assert_eq!(Activity::classify(today, None), Activity::NoTransactions);
    }

    #[test]
    fn test_days_since() {
        assert_eq!(days_since(date("2024-01-31"), date("2024-01-01")), 30);
        assert_eq!(days_since(date("2024-01-01"), date("2024-01-03")), -2);
    }
}

//! Running-balance reconstruction
//!
//! Two ledgers are rebuilt from the snapshot, each anchored differently:
//!
//! - An **account ledger** only knows the balance *now*. Its opening balance
//!   is derived backwards from the stored balance and the selected
//!   transactions, then walked forward, so the last running balance always
//!   equals the stored balance.
//! - A **customer ledger** knows the balance at its opening date. When a
//!   date range starts later, every entry before the range is folded into an
//!   effective opening balance and the range start becomes the displayed
//!   opening date.
//!
//! # Invariants
//!
//! - Every entry carries exactly one nonzero side (debit or credit)
//! - `closing = opening + Σdebit − Σcredit` for customer ledgers
//! - `closing = opening + Σcredit − Σdebit` for account ledgers

use serde::Serialize;
use tracing::{debug, warn};

use core_kernel::{AccountId, CalendarDate, CustomerId, Money, MonthKey, RecordId};

use crate::filter::ReportFilter;
use crate::party::Customer;
use crate::records::{AccountTransaction, Direction, Payment, Sale};
use crate::snapshot::Snapshot;

/// One line of a reconstructed ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub record_id: RecordId,
    pub date: CalendarDate,
    pub description: String,
    pub debit: Money,
    pub credit: Money,
    /// Balance after this entry
    pub balance: Money,
}

/// Totals of an account ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLedgerSummary {
    pub account_id: Option<AccountId>,
    pub account_name: String,
    pub opening_balance: Money,
    pub total_debit: Money,
    pub total_credit: Money,
    pub closing_balance: Money,
    /// Set when a selected transaction is dated after today; the stored
    /// balance may not yet include it, so the derived opening may be off
    pub anchor_may_be_stale: bool,
}

/// A reconstructed account ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLedger {
    pub entries: Vec<LedgerEntry>,
    pub summary: AccountLedgerSummary,
}

/// One calendar month of a customer ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMonth {
    pub month: MonthKey,
    /// Long label, e.g. `January 2024`
    pub display_month: String,
    pub entries: Vec<LedgerEntry>,
    pub total_debit: Money,
    pub total_credit: Money,
    /// Running balance after the month's last entry
    pub closing_balance: Money,
}

/// Totals of a customer ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLedgerSummary {
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub opening_balance: Money,
    pub opening_date: Option<CalendarDate>,
    pub total_debit: Money,
    pub total_credit: Money,
    pub closing_balance: Money,
}

/// A reconstructed customer ledger, grouped by month
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLedger {
    pub months: Vec<LedgerMonth>,
    pub summary: CustomerLedgerSummary,
}

impl CustomerLedger {
    /// Entries across all months in display order
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.months.iter().flat_map(|m| m.entries.iter())
    }
}

/// Rebuilds the ledger of the account named by `filter.account`
///
/// Transactions outside the filter's date range are not shown and do not
/// take part in deriving the opening balance. Transactions with an
/// unrecognized direction are skipped. No selection, or an unknown account,
/// yields an empty ledger.
pub fn account_ledger(snapshot: &Snapshot, filter: &ReportFilter, today: CalendarDate) -> AccountLedger {
    let Some(account) = filter
        .account_selection()
        .and_then(|selection| snapshot.find_account(selection))
    else {
        debug!(selection = ?filter.account, "account ledger without a known account");
        return AccountLedger::default();
    };

    let mut selected: Vec<(CalendarDate, Direction, &AccountTransaction)> = snapshot
        .account_transactions()
        .filter(|t| t.account_id == account.id)
        .filter_map(|t| {
            let date = t.date.filter(|d| filter.range.contains(Some(*d)))?;
            let direction = t.direction?;
            Some((date, direction, t))
        })
        .collect();
    selected.sort_by_key(|(date, _, _)| *date);

    let (credits, debits) = selected.iter().fold(
        (Money::ZERO, Money::ZERO),
        |(credits, debits), (_, direction, t)| match direction {
            Direction::Credit => (credits + t.amount, debits),
            Direction::Debit => (credits, debits + t.amount),
        },
    );
    let opening = account.balance - credits + debits;

    let anchor_may_be_stale = selected.iter().any(|(date, _, _)| *date > today);
    if anchor_may_be_stale {
        warn!(
            account = %account.id,
            %today,
            "account has transactions dated after today; opening balance may be stale"
        );
    }

    let mut balance = opening;
    let entries: Vec<LedgerEntry> = selected
        .into_iter()
        .map(|(date, direction, t)| {
            let (debit, credit) = match direction {
                Direction::Credit => {
                    balance += t.amount;
                    (Money::ZERO, t.amount)
                }
                Direction::Debit => {
                    balance -= t.amount;
                    (t.amount, Money::ZERO)
                }
            };
            LedgerEntry {
                record_id: t.id.clone(),
                date,
                description: t.description.clone(),
                debit,
                credit,
                balance,
            }
        })
        .collect();

    debug!(account = %account.id, entries = entries.len(), "account ledger rebuilt");

    AccountLedger {
        entries,
        summary: AccountLedgerSummary {
            account_id: Some(account.id.clone()),
            account_name: account.name.clone(),
            opening_balance: opening,
            total_debit: debits,
            total_credit: credits,
            closing_balance: balance,
            anchor_may_be_stale,
        },
    }
}

/// A dated debit or credit against a customer, before the walk
#[derive(Debug, Clone)]
struct Movement {
    record_id: RecordId,
    date: CalendarDate,
    description: String,
    debit: Money,
    credit: Money,
}

impl Movement {
    fn from_sale(sale: &Sale, date: CalendarDate) -> Self {
        let mut description = format!("Sale: {}", sale.product);
        if !sale.bill_number.is_empty() {
            description.push_str(&format!(" (Bill {})", sale.bill_number));
        }
        Self {
            record_id: sale.id.clone(),
            date,
            description,
            debit: sale.amount,
            credit: Money::ZERO,
        }
    }

    fn from_payment(payment: &Payment, date: CalendarDate) -> Self {
        let description = match payment.mode.as_str() {
            "" => "Payment received".to_string(),
            mode => format!("Payment received ({mode})"),
        };
        Self {
            record_id: payment.id.clone(),
            date,
            description,
            debit: Money::ZERO,
            credit: payment.amount,
        }
    }
}

/// Sales (debits) and payments (credits) of one customer in date order
///
/// Records without a usable date cannot be placed and are left out.
fn customer_movements(snapshot: &Snapshot, customer: &Customer) -> Vec<Movement> {
    let sales = snapshot
        .sales()
        .filter(|s| snapshot.is_owned_by(customer, &s.customer_id, &s.customer_name))
        .filter_map(|s| s.date.map(|d| Movement::from_sale(s, d)));
    let payments = snapshot
        .payments()
        .filter(|p| snapshot.is_owned_by(customer, &p.customer_id, &p.customer_name))
        .filter_map(|p| p.date.map(|d| Movement::from_payment(p, d)));

    let mut movements: Vec<Movement> = sales.chain(payments).collect();
    movements.sort_by_key(|m| m.date);
    movements
}

/// Rebuilds the ledger of the customer named by `filter.customer`
///
/// `from` and `to` are applied independently and inclusively: with only
/// `from` set, everything from that day on is shown. No selection, or an
/// unknown customer, yields an empty ledger.
pub fn customer_ledger(snapshot: &Snapshot, filter: &ReportFilter) -> CustomerLedger {
    let Some(customer) = filter
        .customer_selection()
        .and_then(|selection| snapshot.find_customer(selection))
    else {
        debug!(selection = ?filter.customer, "customer ledger without a known customer");
        return CustomerLedger::default();
    };

    let (from, to) = (filter.from(), filter.to());
    let movements = customer_movements(snapshot, customer);

    let mut opening = customer.opening_balance;
    let mut opening_date = customer.opening_balance_date;
    if let Some(from) = from {
        opening = movements
            .iter()
            .filter(|m| m.date < from)
            .fold(opening, |acc, m| acc + m.debit - m.credit);
        opening_date = Some(from);
    }

    let visible = movements.into_iter().filter(|m| {
        from.map_or(true, |f| m.date >= f) && to.map_or(true, |t| m.date <= t)
    });

    let mut balance = opening;
    let mut total_debit = Money::ZERO;
    let mut total_credit = Money::ZERO;
    let mut months: Vec<LedgerMonth> = Vec::new();

    for m in visible {
        balance += m.debit - m.credit;
        total_debit += m.debit;
        total_credit += m.credit;

        let key = m.date.month_key();
        let entry = LedgerEntry {
            record_id: m.record_id,
            date: m.date,
            description: m.description,
            debit: m.debit,
            credit: m.credit,
            balance,
        };

        match months.last_mut() {
            Some(month) if month.month == key => {
                month.total_debit += entry.debit;
                month.total_credit += entry.credit;
                month.closing_balance = balance;
                month.entries.push(entry);
            }
            _ => months.push(LedgerMonth {
                month: key,
                display_month: key.label(),
                total_debit: entry.debit,
                total_credit: entry.credit,
                closing_balance: balance,
                entries: vec![entry],
            }),
        }
    }

    debug!(
        customer = %customer.id,
        months = months.len(),
        opening = %opening,
        closing = %balance,
        "customer ledger rebuilt"
    );

    CustomerLedger {
        months,
        summary: CustomerLedgerSummary {
            customer_id: Some(customer.id.clone()),
            customer_name: customer.name.clone(),
            opening_balance: opening,
            opening_date,
            total_debit,
            total_credit,
            closing_balance: balance,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::{RawAccount, RawCustomer};
    use crate::records::{RawAccountTransaction, RawPayment, RawSale};
    use crate::snapshot::RawSnapshot;
    use rust_decimal_macros::dec;

    fn date(raw: &str) -> CalendarDate {
        CalendarDate::parse(raw).unwrap()
    }

    fn account_txn(id: &str, day: &str, amount: &str, kind: &str) -> RawAccountTransaction {
        RawAccountTransaction {
            id: id.into(),
            date: day.into(),
            account_id: "a1".into(),
            amount: amount.into(),
            direction: kind.into(),
            description: String::new(),
        }
    }

    fn account_snapshot() -> Snapshot {
        Snapshot::from_raw(RawSnapshot {
            accounts: vec![RawAccount {
                id: "a1".into(),
                name: "Cash".into(),
                balance: "1000".into(),
            }],
            account_transactions: vec![
                account_txn("t2", "2024-01-05", "50", "Debit"),
                account_txn("t1", "2024-01-02", "200", "Credit"),
            ],
            ..RawSnapshot::default()
        })
    }

    #[test]
    fn test_account_ledger_closes_on_stored_balance() {
        let ledger = account_ledger(
            &account_snapshot(),
            &ReportFilter::new().account("a1"),
            date("2024-02-01"),
        );

        assert_eq!(ledger.summary.opening_balance.amount(), dec!(850));
        let balances: Vec<_> = ledger.entries.iter().map(|e| e.balance.amount()).collect();
        assert_eq!(balances, vec![dec!(1050), dec!(1000)]);
        assert_eq!(ledger.summary.closing_balance.amount(), dec!(1000));
        assert!(!ledger.summary.anchor_may_be_stale);
    }

    #[test]
    fn test_account_ledger_flags_future_transactions() {
        let ledger = account_ledger(
            &account_snapshot(),
            &ReportFilter::new().account("Cash"),
            date("2024-01-03"),
        );
        assert!(ledger.summary.anchor_may_be_stale);
    }

    #[test]
    fn test_account_ledger_without_selection_is_empty() {
        let ledger = account_ledger(&account_snapshot(), &ReportFilter::new(), date("2024-02-01"));
        assert!(ledger.entries.is_empty());
        assert_eq!(ledger.summary, AccountLedgerSummary::default());
    }

    fn customer_snapshot() -> Snapshot {
        Snapshot::from_raw(RawSnapshot {
            customers: vec![RawCustomer {
                id: "c1".into(),
                name: "Asha".into(),
                opening_balance: "500".into(),
                opening_balance_date: "01-01-2024".into(),
                ..RawCustomer::default()
            }],
            sales: vec![RawSale {
                id: "s1".into(),
                date: "10-01-2024".into(),
                customer_id: "c1".into(),
                product: "Cement • 6 bags".into(),
                amount: "300".into(),
                ..RawSale::default()
            }],
            payments: vec![RawPayment {
                id: "p1".into(),
                date: "2024-01-20".into(),
                customer_name: "asha".into(),
                amount: "100".into(),
                ..RawPayment::default()
            }],
            ..RawSnapshot::default()
        })
    }

    #[test]
    fn test_customer_ledger_folds_entries_before_range() {
        let filter = ReportFilter::new().customer("c1").between(Some(date("15-01-2024")), None);
        let ledger = customer_ledger(&customer_snapshot(), &filter);

        assert_eq!(ledger.summary.opening_balance.amount(), dec!(800));
        assert_eq!(ledger.summary.opening_date.map(|d| d.to_string()).as_deref(), Some("15-01-2024"));
        assert_eq!(ledger.entries().count(), 1);
        assert_eq!(ledger.summary.closing_balance.amount(), dec!(700));
    }

    #[test]
    fn test_customer_ledger_groups_by_month() {
        let ledger = customer_ledger(&customer_snapshot(), &ReportFilter::new().customer("Asha"));

        assert_eq!(ledger.months.len(), 1);
        let january = &ledger.months[0];
        assert_eq!(january.display_month, "January 2024");
        assert_eq!(january.total_debit.amount(), dec!(300));
        assert_eq!(january.total_credit.amount(), dec!(100));
        assert_eq!(january.closing_balance.amount(), dec!(700));
        assert_eq!(ledger.summary.opening_date, Some(date("2024-01-01")));
    }
}

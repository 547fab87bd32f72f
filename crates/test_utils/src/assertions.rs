//! Custom Test Assertions
//!
//! Provides assertion helpers for report outputs that give more meaningful
//! failure messages than a bare `assert_eq!` on nested structures.

use core_kernel::{Money, Quantity};
use domain_reports::{AccountLedger, CustomerLedger};
use rust_decimal::Decimal;

/// Asserts that a Money value equals an expected decimal amount
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Money mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that a Quantity equals an expected decimal value
pub fn assert_quantity_eq(actual: Quantity, expected: Decimal) {
    assert_eq!(
        actual.value(),
        expected,
        "Quantity mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that every customer ledger entry is one-sided and that the
/// running balance telescopes to the closing balance
pub fn assert_customer_ledger_consistent(ledger: &CustomerLedger) {
    let summary = &ledger.summary;
    let mut balance = summary.opening_balance;
    for entry in ledger.entries() {
        assert!(
            entry.debit.is_zero() || entry.credit.is_zero(),
            "Entry {} has both a debit and a credit",
            entry.record_id
        );
        balance += entry.debit - entry.credit;
        assert_eq!(
            entry.balance, balance,
            "Running balance broken at entry {}",
            entry.record_id
        );
    }
    assert_eq!(
        summary.closing_balance,
        summary.opening_balance + summary.total_debit - summary.total_credit,
        "closing != opening + debit - credit"
    );
    assert_eq!(summary.closing_balance, balance, "closing differs from last running balance");
}

/// Asserts that an account ledger's running balances walk from the opening
/// balance to the closing balance
pub fn assert_account_ledger_consistent(ledger: &AccountLedger) {
    let summary = &ledger.summary;
    let mut balance = summary.opening_balance;
    for entry in &ledger.entries {
        balance += entry.credit - entry.debit;
        assert_eq!(
            entry.balance, balance,
            "Running balance broken at entry {}",
            entry.record_id
        );
    }
    assert_eq!(summary.closing_balance, balance, "closing differs from last running balance");
}

/// Asserts that values are in non-increasing order
pub fn assert_sorted_desc<T: PartialOrd + std::fmt::Debug>(values: &[T]) {
    for pair in values.windows(2) {
        assert!(pair[0] >= pair[1], "Not descending: {:?} before {:?}", pair[0], pair[1]);
    }
}

/// Asserts that values are in non-decreasing order
pub fn assert_sorted_asc<T: PartialOrd + std::fmt::Debug>(values: &[T]) {
    for pair in values.windows(2) {
        assert!(pair[0] <= pair[1], "Not ascending: {:?} before {:?}", pair[0], pair[1]);
    }
}

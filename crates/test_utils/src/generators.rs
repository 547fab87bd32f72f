//! Property-Based Test Generators
//!
//! Provides proptest strategies for raw text fields and whole snapshots.
//! Generated snapshots only use well-formed text so properties can reason
//! about exact totals.

use core_kernel::{CalendarDate, Money};
use domain_reports::party::RawCustomer;
use domain_reports::records::{RawPayment, RawPurchase, RawSale};
use domain_reports::RawSnapshot;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for non-negative amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for signed Money values
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (-10_000_000i64..10_000_000i64).prop_map(|n| Money::new(Decimal::new(n, 2)))
}

/// Strategy for whole quantities
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..500i64).prop_map(Decimal::from)
}

/// Strategy for calendar dates between 2020 and 2026
pub fn date_strategy() -> impl Strategy<Value = CalendarDate> {
    (2020i32..2027, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| CalendarDate::from_ymd(y, m, d).expect("day <= 28 is always valid"))
}

/// Strategy for dates within January 2024, so ranges overlap often
pub fn january_date_strategy() -> impl Strategy<Value = CalendarDate> {
    (1u32..=31).prop_map(|d| CalendarDate::from_ymd(2024, 1, d).expect("January has 31 days"))
}

/// A date rendered in either accepted text format
pub fn date_text_strategy() -> impl Strategy<Value = (CalendarDate, String)> {
    (date_strategy(), any::<bool>()).prop_map(|(date, iso)| {
        let text = if iso { date.iso() } else { date.display() };
        (date, text)
    })
}

/// Optional range bound within January 2024
pub fn bound_strategy() -> impl Strategy<Value = Option<CalendarDate>> {
    prop::option::of(january_date_strategy())
}

/// Snapshot with one customer `c1` and random sales and payments in
/// January 2024
pub fn customer_ledger_snapshot_strategy() -> impl Strategy<Value = RawSnapshot> {
    let movement = (january_date_strategy(), amount_strategy(), any::<bool>());
    (amount_strategy(), prop::collection::vec(movement, 0..30)).prop_map(|(opening, movements)| {
        let mut raw = RawSnapshot {
            customers: vec![RawCustomer {
                id: "c1".into(),
                name: "Asha Traders".into(),
                opening_balance: opening.to_string(),
                opening_balance_date: "2023-12-31".into(),
                ..RawCustomer::default()
            }],
            ..RawSnapshot::default()
        };
        for (i, (date, amount, is_sale)) in movements.into_iter().enumerate() {
            if is_sale {
                raw.sales.push(RawSale {
                    id: format!("s{i}"),
                    date: date.iso(),
                    customer_id: "c1".into(),
                    product: "Cement • 1 bags".into(),
                    amount: amount.to_string(),
                    ..RawSale::default()
                });
            } else {
                raw.payments.push(RawPayment {
                    id: format!("p{i}"),
                    date: date.display(),
                    customer_id: "c1".into(),
                    amount: amount.to_string(),
                    ..RawPayment::default()
                });
            }
        }
        raw
    })
}

/// Snapshot with sub-category purchases and sales of a few products in
/// January 2024, all in bags
pub fn sub_category_snapshot_strategy() -> impl Strategy<Value = RawSnapshot> {
    let product = prop::sample::select(vec!["Cement", "Steel", "Sand"]);
    let category = prop::sample::select(vec!["GL", "GV", "Direct"]);
    let purchase = (january_date_strategy(), product.clone(), quantity_strategy(), category);
    let sale = (january_date_strategy(), product, quantity_strategy(), any::<bool>());

    (
        prop::collection::vec(purchase, 0..20),
        prop::collection::vec(sale, 0..20),
    )
        .prop_map(|(purchases, sales)| {
            let mut raw = RawSnapshot::default();
            for (i, (date, product, quantity, category)) in purchases.into_iter().enumerate() {
                raw.purchases.push(RawPurchase {
                    id: format!("pu{i}"),
                    date: date.iso(),
                    vendor: "Depot".into(),
                    product: product.into(),
                    quantity: quantity.to_string(),
                    unit: "bags".into(),
                    amount: "0".into(),
                    sub_category: category.into(),
                });
            }
            for (i, (date, product, quantity, direct)) in sales.into_iter().enumerate() {
                raw.sales.push(RawSale {
                    id: format!("s{i}"),
                    date: date.iso(),
                    product: format!("{product} • {quantity} bags"),
                    amount: "0".into(),
                    sub_category: if direct { "Direct".into() } else { String::new() },
                    ..RawSale::default()
                });
            }
            raw
        })
}

//! Integration tests for running-balance ledgers and the sub-category
//! carry-forward

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CalendarDate, Money, Quantity, UnitMetric};
use domain_reports::balance::{account_ledger, customer_ledger};
use domain_reports::carry_forward::reconcile;
use domain_reports::records::RawSale;
use domain_reports::{ReportFilter, ReportId, ReportOutput, Snapshot};
use test_utils::{
    amount_strategy, assert_account_ledger_consistent, assert_customer_ledger_consistent, assert_money_eq,
    assert_quantity_eq, bound_strategy, customer_ledger_snapshot_strategy, january_date_strategy,
    sub_category_snapshot_strategy, DateFixtures, SnapshotBuilder, SnapshotFixtures,
};

// ============================================================================
// Account Ledger Tests
// ============================================================================

mod account_ledger_tests {
    use super::*;

    #[test]
    fn test_anchor_and_running_balances() {
        let snapshot = SnapshotFixtures::account_scenario();
        let ledger = account_ledger(&snapshot, &ReportFilter::new().account("a1"), DateFixtures::today());

        assert_money_eq(ledger.summary.opening_balance, dec!(850));
        let balances: Vec<_> = ledger.entries.iter().map(|e| e.balance.amount()).collect();
        assert_eq!(balances, vec![dec!(1050), dec!(1000)]);
        assert_money_eq(ledger.summary.total_credit, dec!(200));
        assert_money_eq(ledger.summary.total_debit, dec!(50));
        assert_money_eq(ledger.summary.closing_balance, dec!(1000));
        assert_eq!(ledger.summary.account_name, "Cash in Hand");
        assert_account_ledger_consistent(&ledger);
    }

    #[test]
    fn test_entries_are_in_date_order() {
        let snapshot = SnapshotFixtures::account_scenario();
        let ledger = account_ledger(&snapshot, &ReportFilter::new().account("cash in hand"), DateFixtures::today());

        let dates: Vec<_> = ledger.entries.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["02-01-2024", "05-01-2024"]);
        assert!(ledger.entries[0].debit.is_zero());
        assert!(ledger.entries[1].credit.is_zero());
    }

    #[test]
    fn test_range_limits_entries_and_anchor() {
        let snapshot = SnapshotFixtures::account_scenario();
        let filter = ReportFilter::new().account("a1").between_raw("2024-01-04", "2024-01-31");
        let ledger = account_ledger(&snapshot, &filter, DateFixtures::today());

        assert_eq!(ledger.entries.len(), 1);
        assert_money_eq(ledger.summary.opening_balance, dec!(1050));
        assert_money_eq(ledger.summary.closing_balance, dec!(1000));
    }

    #[test]
    fn test_future_dated_transactions_flag_the_anchor() {
        let snapshot = SnapshotFixtures::account_scenario();
        let ledger = account_ledger(
            &snapshot,
            &ReportFilter::new().account("a1"),
            DateFixtures::ymd(2024, 1, 4),
        );
        assert!(ledger.summary.anchor_may_be_stale);
    }

    #[test]
    fn test_unknown_account_gives_empty_ledger() {
        let snapshot = SnapshotFixtures::account_scenario();
        let ledger = account_ledger(&snapshot, &ReportFilter::new().account("Savings"), DateFixtures::today());
        assert!(ledger.entries.is_empty());
        assert!(ledger.summary.account_id.is_none());
    }

    proptest! {
        #[test]
        fn prop_account_ledger_closes_on_stored_balance(
            stored in amount_strategy(),
            txns in prop::collection::vec((january_date_strategy(), amount_strategy(), any::<bool>()), 0..25),
        ) {
            let mut builder = SnapshotBuilder::new().account("a1", "Cash", &stored.to_string());
            for (date, amount, credit) in &txns {
                builder = if *credit {
                    builder.credit(&date.iso(), "a1", &amount.to_string())
                } else {
                    builder.debit(&date.display(), "a1", &amount.to_string())
                };
            }
            let snapshot = builder.build();
            let ledger = account_ledger(&snapshot, &ReportFilter::new().account("a1"), DateFixtures::today());

            prop_assert_eq!(ledger.entries.len(), txns.len());
            prop_assert_eq!(ledger.summary.closing_balance.amount(), stored);
            if let Some(last) = ledger.entries.last() {
                prop_assert_eq!(last.balance.amount(), stored);
            }
            assert_account_ledger_consistent(&ledger);
        }
    }
}

// ============================================================================
// Customer Ledger Tests
// ============================================================================

mod customer_ledger_tests {
    use super::*;

    #[test]
    fn test_opening_balance_folds_earlier_entries() {
        let snapshot = SnapshotFixtures::customer_scenario();
        let filter = ReportFilter::new().customer("c1").between_raw("15-01-2024", "");
        let ledger = customer_ledger(&snapshot, &filter);

        assert_money_eq(ledger.summary.opening_balance, dec!(800));
        assert_eq!(
            ledger.summary.opening_date.map(|d| d.to_string()),
            Some("15-01-2024".to_string())
        );
        assert_eq!(ledger.entries().count(), 1);
        assert_money_eq(ledger.summary.total_credit, dec!(100));
        assert_money_eq(ledger.summary.closing_balance, dec!(700));
        assert_customer_ledger_consistent(&ledger);
    }

    #[test]
    fn test_unbounded_ledger_starts_at_stored_opening() {
        let snapshot = SnapshotFixtures::customer_scenario();
        let ledger = customer_ledger(&snapshot, &ReportFilter::new().customer("Asha Traders"));

        assert_money_eq(ledger.summary.opening_balance, dec!(500));
        assert_eq!(ledger.summary.opening_date, Some(DateFixtures::ymd(2024, 1, 1)));
        let balances: Vec<_> = ledger.entries().map(|e| e.balance.amount()).collect();
        assert_eq!(balances, vec![dec!(800), dec!(700)]);
        assert!(ledger.entries().next().is_some_and(|e| e.description.starts_with("Sale: Cement")));
    }

    #[test]
    fn test_to_bound_applies_alone() {
        let snapshot = SnapshotFixtures::customer_scenario();
        let filter = ReportFilter::new().customer("c1").between_raw("", "2024-01-15");
        let ledger = customer_ledger(&snapshot, &filter);

        assert_eq!(ledger.entries().count(), 1);
        assert_money_eq(ledger.summary.opening_balance, dec!(500));
        assert_money_eq(ledger.summary.closing_balance, dec!(800));
    }

    #[test]
    fn test_months_carry_subtotals() {
        let snapshot = SnapshotBuilder::new()
            .customer("c1", "Asha")
            .sale("2024-01-30", "c1", "Cement • 1 bags", "100")
            .sale("2024-02-02", "c1", "Cement • 1 bags", "200")
            .payment("2024-02-03", "c1", "50")
            .build();
        let ledger = customer_ledger(&snapshot, &ReportFilter::new().customer("c1"));

        let labels: Vec<_> = ledger.months.iter().map(|m| m.display_month.as_str()).collect();
        assert_eq!(labels, vec!["January 2024", "February 2024"]);
        assert_money_eq(ledger.months[1].total_debit, dec!(200));
        assert_money_eq(ledger.months[1].total_credit, dec!(50));
        // running balance continues across month boundaries
        assert_money_eq(ledger.months[1].closing_balance, dec!(250));
    }

    #[test]
    fn test_other_customers_are_excluded() {
        let snapshot = SnapshotFixtures::customer_scenario();
        let ledger = customer_ledger(&snapshot, &ReportFilter::new().customer("c2"));
        assert_eq!(ledger.entries().count(), 1);
        assert_money_eq(ledger.summary.closing_balance, dec!(900));
    }

    #[test]
    fn test_known_id_wins_over_a_conflicting_name() {
        let sale = |id: &str, customer_id: &str| RawSale {
            id: id.into(),
            date: "2024-01-10".into(),
            customer_id: customer_id.into(),
            customer_name: "Asha".into(),
            product: "Cement • 2 bags".into(),
            amount: "100".into(),
            ..RawSale::default()
        };
        let snapshot = SnapshotBuilder::new()
            .customer("c1", "Asha")
            .customer("c2", "Ravi")
            .push_sale(sale("s-known", "c2"))
            .push_sale(sale("s-stale", "gone"))
            .build();

        let asha = customer_ledger(&snapshot, &ReportFilter::new().customer("c1"));
        let ravi = customer_ledger(&snapshot, &ReportFilter::new().customer("c2"));
        let asha_ids: Vec<_> = asha.entries().map(|e| e.record_id.as_str()).collect();
        assert_eq!(asha_ids, vec!["s-stale"]);
        assert_money_eq(ravi.summary.total_debit, dec!(100));

        let ReportOutput::CustomerStatus(status) = SnapshotFixtures::engine().generate(
            &snapshot,
            ReportId::CustomerStatus,
            &ReportFilter::new(),
        ) else {
            panic!("wrong report");
        };
        assert_money_eq(status.summary.total_due, dec!(200));
        assert_money_eq(status.rows[0].total_debit, dec!(100));
        assert_money_eq(status.rows[1].total_debit, dec!(100));

        let filtered = SnapshotFixtures::engine().generate(
            &snapshot,
            ReportId::ItemByParty,
            &ReportFilter::new().customer("Asha"),
        );
        assert_eq!(filtered.row_count(), 1);
    }

    #[test]
    fn test_generated_through_engine() {
        let snapshot = SnapshotFixtures::customer_scenario();
        let output = SnapshotFixtures::engine().generate(
            &snapshot,
            ReportId::CustomerLedger,
            &ReportFilter::new().customer("c1"),
        );
        let ReportOutput::CustomerLedger(ledger) = output else {
            panic!("wrong report");
        };
        assert_money_eq(ledger.summary.closing_balance, dec!(700));
    }

    proptest! {
        #[test]
        fn prop_closing_equals_opening_plus_debit_minus_credit(
            raw in customer_ledger_snapshot_strategy(),
            from in bound_strategy(),
            to in bound_strategy(),
        ) {
            let snapshot = Snapshot::from_raw(raw);
            let filter = ReportFilter::new().customer("c1").between(from, to);
            let ledger = customer_ledger(&snapshot, &filter);

            let s = &ledger.summary;
            prop_assert_eq!(s.closing_balance, s.opening_balance + s.total_debit - s.total_credit);
            assert_customer_ledger_consistent(&ledger);
        }

        #[test]
        fn prop_from_bound_does_not_change_closing(
            raw in customer_ledger_snapshot_strategy(),
            from in january_date_strategy(),
        ) {
            let snapshot = Snapshot::from_raw(raw);
            let all = customer_ledger(&snapshot, &ReportFilter::new().customer("c1"));
            let ranged = customer_ledger(
                &snapshot,
                &ReportFilter::new().customer("c1").between(Some(from), None),
            );

            prop_assert_eq!(all.summary.closing_balance, ranged.summary.closing_balance);
            prop_assert_eq!(ranged.summary.opening_date, Some(from));
        }

        #[test]
        fn prop_unbounded_ledger_covers_every_movement(raw in customer_ledger_snapshot_strategy()) {
            let snapshot = Snapshot::from_raw(raw);
            let ledger = customer_ledger(&snapshot, &ReportFilter::new().customer("c1"));

            let sales: Money = snapshot.sales().map(|s| s.amount).sum();
            let payments: Money = snapshot.payments().map(|p| p.amount).sum();
            prop_assert_eq!(ledger.summary.total_debit, sales);
            prop_assert_eq!(ledger.summary.total_credit, payments);
            prop_assert_eq!(
                ledger.entries().count(),
                snapshot.sales().count() + snapshot.payments().count()
            );
        }
    }
}

// ============================================================================
// Carry-Forward Tests
// ============================================================================

mod carry_forward_tests {
    use super::*;

    #[test]
    fn test_unbilled_carries_forward() {
        let snapshot = SnapshotFixtures::sub_category_scenario();
        let report = reconcile(&snapshot, &ReportFilter::new());

        assert_eq!(report.rows.len(), 2);
        let carries: Vec<_> = report.rows.iter().map(|r| r.carry_forward.value()).collect();
        assert_eq!(carries, vec![dec!(10), dec!(3)]);

        let first = &report.rows[0];
        assert_quantity_eq(first.gl, dec!(10));
        assert_quantity_eq(first.direct, dec!(4));
        assert_quantity_eq(report.rows[1].billed, dec!(7));

        assert_quantity_eq(report.totals.direct, dec!(4));
        assert_quantity_eq(report.totals.billed, dec!(7));
        assert_quantity_eq(report.totals.total_unbilled, dec!(3));
    }

    #[test]
    fn test_gv_inflow_billed_on_the_same_row() {
        let snapshot = SnapshotBuilder::new()
            .purchase("2024-04-01", "Depot", "Cement", "10", "bags", "0", "GL")
            .purchase("2024-04-02", "Depot", "Cement", "5", "bags", "0", "GV")
            .sale_to_name("2024-04-02", "Asha Traders", "Cement • 12 bags", "4200")
            .build();
        let report = reconcile(&snapshot, &ReportFilter::new());

        assert_eq!(report.rows.len(), 2);
        let carries: Vec<_> = report.rows.iter().map(|r| r.carry_forward.value()).collect();
        assert_eq!(carries, vec![dec!(10), dec!(3)]);

        let second = &report.rows[1];
        assert_quantity_eq(second.gl, dec!(0));
        assert_quantity_eq(second.gv, dec!(5));
        assert_quantity_eq(second.billed, dec!(12));
        assert_quantity_eq(second.unbilled, dec!(-7));

        assert_quantity_eq(report.totals.gl, dec!(10));
        assert_quantity_eq(report.totals.gv, dec!(5));
        assert_quantity_eq(report.totals.billed, dec!(12));
        assert_quantity_eq(report.totals.total_unbilled, dec!(3));
    }

    #[test]
    fn test_display_metric_converts_bags_to_tons() {
        let snapshot = SnapshotFixtures::sub_category_scenario();
        let report = reconcile(&snapshot, &ReportFilter::new().metric(UnitMetric::Tons));

        assert_eq!(report.metric, UnitMetric::Tons);
        assert_quantity_eq(report.rows[0].gl, dec!(0.5));
        assert_quantity_eq(report.rows[1].billed, dec!(0.35));
        assert_quantity_eq(report.totals.total_unbilled, dec!(0.15));
    }

    #[test]
    fn test_tons_purchase_in_bags() {
        let snapshot = SnapshotBuilder::new()
            .bags_per_ton("25")
            .purchase("2024-03-01", "Depot", "Cement", "2", "tons", "0", "GV")
            .build();
        let report = reconcile(&snapshot, &ReportFilter::new().metric(UnitMetric::Bags));
        assert_quantity_eq(report.rows[0].gv, dec!(50));
        assert_quantity_eq(report.totals.total_unbilled, dec!(50));
    }

    #[test]
    fn test_rows_are_in_date_order() {
        let snapshot = SnapshotBuilder::new()
            .purchase("05-03-2024", "Depot", "Steel", "1", "bags", "0", "GL")
            .purchase("2024-03-01", "Depot", "Cement", "1", "bags", "0", "GL")
            .purchase("2024-03-01", "Depot", "Brick", "1", "bags", "0", "GV")
            .build();
        let report = reconcile(&snapshot, &ReportFilter::new());

        let keys: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.date.to_string(), r.product.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("01-03-2024".to_string(), "Brick".to_string()),
                ("01-03-2024".to_string(), "Cement".to_string()),
                ("05-03-2024".to_string(), "Steel".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_report_has_zero_totals() {
        let report = reconcile(&Snapshot::from_raw(Default::default()), &ReportFilter::new());
        assert!(report.rows.is_empty());
        assert!(report.totals.total_unbilled.is_zero());
    }

    proptest! {
        #[test]
        fn prop_carry_forward_telescopes(raw in sub_category_snapshot_strategy()) {
            let snapshot = Snapshot::from_raw(raw);
            let report = reconcile(&snapshot, &ReportFilter::new());

            let mut carry = Quantity::ZERO;
            let mut previous: Option<(CalendarDate, String)> = None;
            for row in &report.rows {
                carry += row.gl + row.gv - row.billed;
                prop_assert_eq!(row.carry_forward, carry);

                let key = (row.date, row.product.to_lowercase());
                if let Some(prev) = &previous {
                    prop_assert!(prev < &key, "rows out of order");
                }
                previous = Some(key);
            }

            let t = &report.totals;
            prop_assert_eq!(t.total_unbilled, t.gl + t.gv - t.billed);
            prop_assert_eq!(t.total_unbilled, carry);
        }

        #[test]
        fn prop_direct_never_enters_the_carry(raw in sub_category_snapshot_strategy()) {
            let snapshot = Snapshot::from_raw(raw);
            let report = reconcile(&snapshot, &ReportFilter::new());
            let gl_gv: Decimal = report.rows.iter().map(|r| (r.gl + r.gv).value()).sum();
            let billed: Decimal = report.rows.iter().map(|r| r.billed.value()).sum();
            prop_assert_eq!(report.totals.total_unbilled.value(), gl_gv - billed);
        }
    }
}

//! Pre-built Test Fixtures
//!
//! Provides ready-to-use snapshots and dates for the reporting engine.
//! The scenario snapshots have hand-checked expected outputs, noted on each.

use core_kernel::{CalendarDate, Money};
use domain_reports::{ReportEngine, Snapshot};
use rust_decimal_macros::dec;

use crate::builders::SnapshotBuilder;

/// Fixture for calendar dates
pub struct DateFixtures;

impl DateFixtures {
    /// The date fixtures treat as today
    pub fn today() -> CalendarDate {
        Self::ymd(2024, 3, 31)
    }

    /// A date from its components
    ///
    /// # Panics
    ///
    /// Panics on an impossible date
    pub fn ymd(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::from_ymd(year, month, day).expect("valid fixture date")
    }

    /// Parses a fixture date in either accepted format
    ///
    /// # Panics
    ///
    /// Panics on malformed text
    pub fn parse(raw: &str) -> CalendarDate {
        CalendarDate::parse(raw).expect("valid fixture date")
    }
}

/// Fixture for money amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn rupees(amount: i64) -> Money {
        Money::new(amount.into())
    }

    pub fn one_thousand() -> Money {
        Money::new(dec!(1000))
    }
}

/// Fixture for whole snapshots
pub struct SnapshotFixtures;

impl SnapshotFixtures {
    /// An engine whose today is [`DateFixtures::today`]
    pub fn engine() -> ReportEngine {
        ReportEngine::new(DateFixtures::today())
    }

    /// Account `a1` "Cash in Hand" holding 1000 now, after a credit of 200
    /// on 02-01-2024 and a debit of 50 on 05-01-2024
    ///
    /// Expected ledger: opening 850, running balances 1050 then 1000.
    pub fn account_scenario() -> Snapshot {
        SnapshotBuilder::new()
            .account("a1", "Cash in Hand", "1,000")
            .account("a2", "Bank", "0")
            .debit("05-01-2024", "a1", "50")
            .credit("2024-01-02", "a1", "200")
            .credit("2024-01-03", "a2", "75")
            .build()
    }

    /// Customer `c1` "Asha Traders" with opening balance 500 on 01-01-2024,
    /// a sale of 300 on 10-01-2024 and a payment of 100 on 20-01-2024
    ///
    /// Expected ledger from 15-01-2024: opening 800 dated 15-01-2024,
    /// closing 700.
    pub fn customer_scenario() -> Snapshot {
        SnapshotBuilder::new()
            .customer_with_opening("c1", "Asha Traders", "500", "01-01-2024")
            .customer("c2", "Bharat Hardware")
            .sale("2024-01-10", "c1", "Cement • 6 bags", "300")
            .payment("20-01-2024", "c1", "100")
            .sale("2024-01-12", "c2", "Steel • 1 tons", "900")
            .build()
    }

    /// Cement bought as GL (10 bags) on 01-02-2024 and 7 bags billed on
    /// 02-02-2024
    ///
    /// Expected carry-forward: 10 then 3.
    pub fn sub_category_scenario() -> Snapshot {
        SnapshotBuilder::new()
            .purchase("2024-02-01", "Ultra Depot", "Cement", "10", "bags", "3500", "GL")
            .purchase("2024-02-01", "Ultra Depot", "Cement", "4", "bags", "1400", "Direct")
            .sale_to_name("2024-02-02", "Asha Traders", "Cement • 7 bags", "2450")
            .tagged_sale("2024-02-02", "Cement • 4 bags", "Direct")
            .sale_to_name("2024-02-02", "Asha Traders", "Sand • 2 bags", "100")
            .build()
    }

    /// A small shop's quarter across every record kind
    pub fn retail() -> Snapshot {
        SnapshotBuilder::new()
            .version("retail-v1")
            .customer_in("c1", "Asha Traders", "Dealer")
            .customer_with_opening("c2", "Bharat Hardware", "250", "2023-12-01")
            .customer("c3", "Chandra Builders")
            .account("a1", "Cash in Hand", "5,000")
            .sale("2024-01-05", "c1", "Cement • 10 bags", "3,500")
            .sale("2024-01-20", "c2", "Cement • 1 tons", "7,000")
            .sale("2024-02-10", "c1", "Steel • 2 tons", "12,000")
            .sale_to_name("2024-03-15", "bharat hardware", "Cement • 5 bags", "1,750")
            .payment("2024-01-25", "c1", "3,500")
            .payment("2024-02-28", "c2", "10,000")
            .internal_transfer("2024-02-28", "2,000")
            .purchase("2024-01-02", "Ultra Depot", "Cement", "2", "tons", "9,000", "GL")
            .purchase("2024-02-01", "Steel Mart", "Steel", "3", "tons", "15,000", "GV")
            .expense("2024-01-31", "Rent", "4,000")
            .expense("2024-02-29", "Rent", "4,000")
            .expense("2024-02-15", "", "500")
            .stock("2024-01-02", "Cement", "40", "bags", "in")
            .stock("2024-01-05", "Cement", "10", "bags", "out")
            .credit("2024-01-25", "a1", "3,500")
            .debit("2024-01-31", "a1", "4,000")
            .build()
    }
}

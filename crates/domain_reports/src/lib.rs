//! Reports Domain - Ledger & Report Aggregation Engine
//!
//! This crate turns an in-memory snapshot of a retail/distribution ledger
//! (sales, purchases, payments, expenses, stock movements and account
//! transactions) into fully computed report rows.
//!
//! # Pipeline
//!
//! 1. **Canonicalize** - [`Snapshot::from_raw`] parses every date and amount
//!    once; anomalies are counted, never fatal
//! 2. **Filter** - [`ReportFilter`] applies the date range and the
//!    customer / product / category / account / search predicates
//! 3. **Reduce** - grouped aggregates, running-balance ledgers and the
//!    sub-category carry-forward
//! 4. **Classify** - Due / Advance / Settled and activity recency
//!
//! Everything is synchronous and side-effect free over an immutable
//! snapshot; [`ReportCache`] optionally memoizes outputs.
//!
//! # Example
//!
//! ```rust
//! use core_kernel::CalendarDate;
//! use domain_reports::{ReportEngine, ReportFilter, ReportId, Snapshot};
//!
//! let snapshot = Snapshot::from_json(r#"{
//!     "sales": [{"id": "s1", "date": "2024-01-10", "customerName": "Asha",
//!                "product": "Cement • 10 bags", "amount": "3,500"}]
//! }"#).unwrap();
//!
//! let engine = ReportEngine::new(CalendarDate::parse("31-01-2024").unwrap());
//! let output = engine.generate(&snapshot, ReportId::ItemSummary, &ReportFilter::new());
//! assert_eq!(output.row_count(), 1);
//! ```

pub mod records;
pub mod party;
pub mod canonical;
pub mod snapshot;
pub mod filter;
pub mod aggregation;
pub mod balance;
pub mod carry_forward;
pub mod classify;
pub mod report;
pub mod cache;
pub mod access;
pub mod error;

pub use records::{
    Direction, ProductDescriptor, RecordKind, StockMovement, SubCategory, TransactionRecord,
};
pub use party::{Account, Customer, Settings};
pub use canonical::Diagnostics;
pub use snapshot::{RawSnapshot, Snapshot};
pub use filter::{in_range, ReportFilter};
pub use balance::{AccountLedger, CustomerLedger, LedgerEntry, LedgerMonth};
pub use carry_forward::{SubCategoryReport, SubCategoryRow};
pub use classify::{days_since, Activity, BalanceStatus, ACTIVE_WINDOW_DAYS};
pub use report::{ReportData, ReportEngine, ReportId, ReportOutput};
pub use cache::ReportCache;
pub use access::{hash_password, AccessGate, GateOutcome};
pub use error::ReportError;

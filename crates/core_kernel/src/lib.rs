//! Core Kernel - Canonical value types for the reporting engine
//!
//! This crate provides the building blocks every report is computed from:
//! - Money and quantities parsed leniently from loosely formatted text
//! - Calendar dates accepting both `YYYY-MM-DD` and `DD-MM-YYYY`
//! - Opaque identifiers for customers, accounts and records

pub mod money;
pub mod quantity;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, MoneyError, Rate};
pub use quantity::{Quantity, UnitMetric};
pub use temporal::{CalendarDate, DateParseError, DateRange, MonthKey, Timezone};
pub use identifiers::{AccountId, CustomerId, RecordId};
pub use error::CoreError;

//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! reporting engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built snapshots with hand-checked expected outputs
//! - `builders`: Builder for raw snapshots
//! - `assertions`: Custom assertion helpers for report outputs
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;

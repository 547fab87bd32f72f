//! Reporting engine errors
//!
//! Report computation itself never fails: malformed fields are coerced and
//! missing relations fall back to default labels. These errors only arise at
//! the boundaries, decoding a snapshot or naming a report.

use thiserror::Error;

use core_kernel::CoreError;

/// Errors raised at the engine's boundaries
#[derive(Debug, Error)]
pub enum ReportError {
    /// The snapshot document could not be decoded
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// No report is registered under the given id
    #[error("Unknown report: {0}")]
    UnknownReport(String),

    /// A kernel-level validation failure
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ReportError {
    pub fn unknown_report(id: impl Into<String>) -> Self {
        ReportError::UnknownReport(id.into())
    }
}

//! Report memoization using Moka.
//!
//! Outputs are keyed by report id, filter, snapshot version and the engine's
//! today. A new snapshot version or a new day never matches an old entry, so
//! stale outputs simply age out of the bounded cache.

use core_kernel::CalendarDate;
use moka::sync::Cache;
use std::sync::Arc;

use crate::filter::ReportFilter;
use crate::report::{ReportEngine, ReportId, ReportOutput};
use crate::snapshot::Snapshot;

/// Default cache capacity (number of entries).
pub const DEFAULT_CACHE_CAPACITY: u64 = 64;

/// What identifies a computed report
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub report: ReportId,
    pub filter: ReportFilter,
    pub version: String,
    /// Activity and age columns depend on the day the report is run
    pub today: CalendarDate,
}

impl Fingerprint {
    pub fn new(engine: &ReportEngine, snapshot: &Snapshot, report: ReportId, filter: &ReportFilter) -> Self {
        Self {
            report,
            filter: filter.clone(),
            version: snapshot.version().to_string(),
            today: engine.today(),
        }
    }
}

/// Bounded cache of report outputs
///
/// Thread-safe; clones share the same storage.
#[derive(Clone)]
pub struct ReportCache {
    cache: Cache<Fingerprint, Arc<ReportOutput>>,
}

impl ReportCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Generates a report, returning the cached output when the same
    /// report, filter, snapshot version and day were computed before
    pub fn generate(
        &self,
        engine: &ReportEngine,
        snapshot: &Snapshot,
        report: ReportId,
        filter: &ReportFilter,
    ) -> Arc<ReportOutput> {
        let key = Fingerprint::new(engine, snapshot, report, filter);
        self.cache
            .get_with(key, || Arc::new(engine.generate(snapshot, report, filter)))
    }

    /// Returns true when an output for this fingerprint is cached
    pub fn contains(
        &self,
        engine: &ReportEngine,
        snapshot: &Snapshot,
        report: ReportId,
        filter: &ReportFilter,
    ) -> bool {
        self.cache
            .contains_key(&Fingerprint::new(engine, snapshot, report, filter))
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of cached outputs
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}

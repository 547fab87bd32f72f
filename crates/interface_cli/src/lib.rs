//! Command-line front end for the reporting engine
//!
//! Loads a snapshot document, checks the access gate, builds a filter from
//! the arguments and renders the requested report as pretty JSON.
//!
//! # Example
//!
//! ```bash
//! ledger-reports --snapshot shop.json --report customer-ledger \
//!     --customer "Asha Traders" --from 01-01-2024
//! ```

pub mod args;
pub mod config;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_reports::{AccessGate, ReportCache, ReportEngine, ReportId, Snapshot};

pub use args::Args;
pub use config::CliConfig;

/// Initializes the tracing subscriber for structured logging
///
/// Logs go to stderr so stdout carries only the report.
pub fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// One line per report: id and title
pub fn catalogue() -> String {
    ReportId::ALL
        .iter()
        .map(|id| format!("{:<18}{}", id.as_str(), id.title()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads and canonicalizes a snapshot file
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    Snapshot::from_json(&json).with_context(|| format!("failed to load snapshot {}", path.display()))
}

/// Renders the report selected by `args` from an already loaded snapshot
///
/// # Errors
///
/// Fails when the access gate denies the password, no report was named, or
/// a date bound is malformed.
pub fn render(args: &Args, config: &CliConfig, cache: &ReportCache, snapshot: &Snapshot) -> Result<String> {
    let gate = AccessGate::new(config.password_hash.clone());
    let outcome = gate.verify(args.password.as_deref().unwrap_or_default());
    if !outcome.granted {
        bail!("access denied: {}", outcome.message);
    }

    let Some(report) = args.report else {
        bail!("no report selected; use --list to see the available reports");
    };
    let filter = args.filter().context("invalid filter")?;
    let engine = match args.today {
        Some(today) => ReportEngine::new(today),
        None => ReportEngine::in_timezone(&config.timezone),
    };

    let output = cache.generate(&engine, snapshot, report, &filter);
    info!(
        report = %report,
        version = snapshot.version(),
        rows = output.row_count(),
        "report rendered"
    );
    serde_json::to_string_pretty(&*output).context("failed to serialize report")
}

/// Runs the command end to end and returns what should be printed
pub fn run(args: &Args, config: &CliConfig) -> Result<String> {
    if args.list {
        return Ok(catalogue());
    }
    let Some(path) = args.snapshot.as_deref() else {
        bail!("--snapshot is required");
    };
    let snapshot = load_snapshot(path)?;
    let cache = ReportCache::with_capacity(config.cache_capacity);
    render(args, config, &cache, &snapshot)
}

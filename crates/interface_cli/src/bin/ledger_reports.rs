//! Ledger Reports - command-line binary
//!
//! # Usage
//!
//! ```bash
//! ledger-reports --list
//! ledger-reports -s shop.json -r party-wise --from 2024-01-01 --to 2024-03-31
//! REPORTS_TIMEZONE=Asia/Kolkata ledger-reports -s shop.json -r customer-status
//! ```
//!
//! # Environment Variables
//!
//! * `REPORTS_LOG_LEVEL` - Log filter (default: info)
//! * `REPORTS_LOG_JSON` - Emit JSON log lines (default: false)
//! * `REPORTS_TIMEZONE` - IANA timezone deciding today's date (default: UTC)
//! * `REPORTS_PASSWORD_HASH` - SHA-256 hex of the access password
//! * `REPORTS_CACHE_CAPACITY` - Maximum cached report outputs (default: 64)

use std::process::ExitCode;

use clap::Parser;

use interface_cli::{init_tracing, run, Args, CliConfig};

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };
    init_tracing(&config);

    match run(&args, &config) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

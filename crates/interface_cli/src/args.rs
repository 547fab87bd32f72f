//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use core_kernel::{CalendarDate, UnitMetric};
use domain_reports::{ReportError, ReportFilter, ReportId};

/// Render a report from a snapshot file as JSON.
#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-reports")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Snapshot document (JSON)
    #[arg(short, long, value_name = "FILE", required_unless_present = "list")]
    pub snapshot: Option<PathBuf>,

    /// Report id, e.g. `party-wise` or `customer-ledger`
    #[arg(short, long, value_name = "ID", required_unless_present = "list")]
    pub report: Option<ReportId>,

    /// First day of the range (YYYY-MM-DD or DD-MM-YYYY)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Last day of the range (YYYY-MM-DD or DD-MM-YYYY)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Customer id or name
    #[arg(long)]
    pub customer: Option<String>,

    #[arg(long)]
    pub product: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Account id or name
    #[arg(long)]
    pub account: Option<String>,

    /// Case-insensitive text search
    #[arg(long)]
    pub search: Option<String>,

    /// Display quantities in bags or tons
    #[arg(long, value_name = "bags|tons")]
    pub metric: Option<UnitMetric>,

    /// Override today's date
    #[arg(long, value_name = "DATE")]
    pub today: Option<CalendarDate>,

    /// Password for a protected report store
    #[arg(long)]
    pub password: Option<String>,

    /// List the available reports and exit
    #[arg(long)]
    pub list: bool,
}

impl Args {
    /// Builds the report filter from the selection arguments
    ///
    /// # Errors
    ///
    /// Returns an error when a non-empty date bound cannot be parsed
    pub fn filter(&self) -> Result<ReportFilter, ReportError> {
        let mut filter = ReportFilter::new().try_between(
            self.from.as_deref().unwrap_or_default(),
            self.to.as_deref().unwrap_or_default(),
        )?;
        if let Some(customer) = &self.customer {
            filter = filter.customer(customer.as_str());
        }
        if let Some(product) = &self.product {
            filter = filter.product(product.as_str());
        }
        if let Some(category) = &self.category {
            filter = filter.category(category.as_str());
        }
        if let Some(account) = &self.account {
            filter = filter.account(account.as_str());
        }
        if let Some(search) = &self.search {
            filter = filter.search(search.as_str());
        }
        if let Some(metric) = self.metric {
            filter = filter.metric(metric);
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("ledger-reports").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_report_and_snapshot_required() {
        assert!(Args::try_parse_from(["ledger-reports", "--report", "party-wise"]).is_err());
        assert!(Args::try_parse_from(["ledger-reports", "--list"]).is_ok());
    }

    #[test]
    fn test_parses_report_and_metric() {
        let args = parse(&["-s", "snap.json", "-r", "sub_category", "--metric", "tons"]);
        assert_eq!(args.report, Some(ReportId::SubCategory));
        assert_eq!(args.metric, Some(UnitMetric::Tons));
    }

    #[test]
    fn test_unknown_report_is_rejected() {
        assert!(Args::try_parse_from(["ledger-reports", "-s", "x.json", "-r", "balance-sheet"]).is_err());
    }

    #[test]
    fn test_filter_from_arguments() {
        let args = parse(&[
            "-s", "snap.json", "-r", "customer-ledger",
            "--customer", "c1",
            "--from", "15-01-2024",
        ]);
        let filter = args.filter().unwrap();
        assert_eq!(filter.customer_selection(), Some("c1"));
        assert_eq!(filter.from(), CalendarDate::parse_opt("2024-01-15"));
        assert_eq!(filter.to(), None);
    }

    #[test]
    fn test_malformed_bound_is_an_error() {
        let args = parse(&["-s", "snap.json", "-r", "party-wise", "--to", "31/13/2024"]);
        assert!(args.filter().is_err());
    }
}

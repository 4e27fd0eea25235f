//! Command-line parsing for the trends panel collector.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! collection and merge code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{EmptyResultPolicy, JoinPolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "trends", version, about = "Search-interest panel collector (Google Trends)")]
pub struct Cli {
    /// Enable info-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query every keyword × geography pair and write the merged panel to CSV.
    Collect(CollectArgs),
    /// Print per-geography statistics for a previously written panel CSV.
    Summary(SummaryArgs),
}

/// Whether `--geo` codes are countries or states under `--country`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Country,
    State,
}

#[derive(Debug, Parser, Clone)]
pub struct CollectArgs {
    /// First day of the window (inclusive, YYYY-MM-DD).
    #[arg(long, default_value = "2022-03-01")]
    pub start: NaiveDate,

    /// End of the window (exclusive, YYYY-MM-DD).
    #[arg(long, default_value = "2022-04-01")]
    pub end: NaiveDate,

    /// Search term; repeat for several. Column order follows flag order.
    #[arg(
        short = 'k',
        long = "keyword",
        default_values_t = ["unemployment".to_string(), "inflation".to_string(), "economy".to_string()]
    )]
    pub keywords: Vec<String>,

    /// Geography code; repeat for several. Queried in flag order.
    #[arg(short = 'g', long = "geo", default_values_t = ["US".to_string(), "UK".to_string()])]
    pub geographies: Vec<String>,

    /// How to interpret `--geo` codes.
    #[arg(long, value_enum, default_value_t = ScopeArg::Country)]
    pub scope: ScopeArg,

    /// Parent country for `--scope state` (codes are queried as COUNTRY-STATE).
    #[arg(long, default_value = "US")]
    pub country: String,

    /// Minimum seconds between consecutive requests.
    #[arg(long, default_value_t = 5.0)]
    pub interval_secs: f64,

    /// Extra random delay (0..=N ms) added to each wait.
    #[arg(long, default_value_t = 0)]
    pub jitter_ms: u64,

    /// How each keyword is joined into the panel (`right` reproduces the historical output).
    #[arg(long, value_enum, default_value_t = JoinPolicy::Full)]
    pub join: JoinPolicy,

    /// What to do when a keyword returns no rows at all.
    #[arg(long = "on-empty", value_enum, default_value_t = EmptyResultPolicy::Skip)]
    pub on_empty: EmptyResultPolicy,

    /// Divide every other keyword by this keyword after assembly.
    #[arg(long)]
    pub ratio_denominator: Option<String>,

    /// With --ratio-denominator, keep rows whose denominator is missing.
    #[arg(long)]
    pub keep_missing_denominator: bool,

    /// Panel CSV output path.
    #[arg(short, long, default_value = "trends.csv")]
    pub output: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Panel CSV produced by `trends collect`.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_defaults_match_the_international_run() {
        let cli = Cli::parse_from(["trends", "collect"]);
        let Command::Collect(args) = cli.command else {
            panic!("expected collect");
        };
        assert_eq!(args.keywords, vec!["unemployment", "inflation", "economy"]);
        assert_eq!(args.geographies, vec!["US", "UK"]);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2022, 3, 1).unwrap());
        assert_eq!(args.join, JoinPolicy::Full);
        assert_eq!(args.on_empty, EmptyResultPolicy::Skip);
        assert_eq!(args.interval_secs, 5.0);
    }

    #[test]
    fn repeated_flags_keep_order() {
        let cli = Cli::parse_from([
            "trends", "-v", "collect", "--scope", "state", "-g", "WV", "-g", "AL", "-k", "economy",
            "--join", "right", "--on-empty", "abort",
        ]);
        assert!(cli.verbose);
        let Command::Collect(args) = cli.command else {
            panic!("expected collect");
        };
        assert_eq!(args.geographies, vec!["WV", "AL"]);
        assert_eq!(args.keywords, vec!["economy"]);
        assert_eq!(args.scope, ScopeArg::State);
        assert_eq!(args.join, JoinPolicy::Right);
        assert_eq!(args.on_empty, EmptyResultPolicy::Abort);
    }
}

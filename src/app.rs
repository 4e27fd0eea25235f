//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - builds the trends client and request pacer
//! - runs the collection pipeline
//! - writes the panel CSV and prints summaries

use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::cli::{CollectArgs, Command, ScopeArg, SummaryArgs};
use crate::data::{GoogleTrendsClient, Pacing, QueryPacer};
use crate::domain::{CollectConfig, DateWindow, GeoScope};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `trends` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Collect(args) => handle_collect(args),
        Command::Summary(args) => handle_summary(args),
    }
}

fn handle_collect(args: CollectArgs) -> Result<(), AppError> {
    let config = collect_config_from_args(&args)?;
    let pacing = pacing_from_args(&args)?;

    let client = GoogleTrendsClient::from_env()?;
    let mut pacer = QueryPacer::new(client, pacing);
    let run = pipeline::run_collect(&config, &mut pacer)?;

    crate::io::export::write_panel_csv(&args.output, &run.assembly.panel)?;
    info!(
        action = "write",
        component = "export",
        path = %args.output.display(),
        rows = run.assembly.panel.len(),
        "Panel written"
    );

    println!(
        "{}",
        crate::report::format_run_summary(&config, &run.assembly, run.requests)
    );
    println!(
        "{}",
        crate::report::format_panel_summary(&run.assembly.panel, Some(config.window.months().len()))
    );
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let panel = crate::io::export::read_panel_csv(&args.input)?;
    println!(
        "{} rows x {} keyword columns ({})\n",
        panel.len(),
        panel.keywords().len(),
        panel.keywords().join(", ")
    );
    println!("{}", crate::report::format_panel_summary(&panel, None));
    Ok(())
}

pub fn collect_config_from_args(args: &CollectArgs) -> Result<CollectConfig, AppError> {
    let scope = match args.scope {
        ScopeArg::Country => GeoScope::Country,
        ScopeArg::State => GeoScope::State {
            country: args.country.trim().to_string(),
        },
    };
    let geographies = scope.geographies(&args.geographies)?;
    let window = DateWindow::new(args.start, args.end)?;

    let config = CollectConfig {
        scope,
        geographies,
        keywords: args.keywords.iter().map(|k| k.trim().to_string()).collect(),
        window,
        join: args.join,
        on_empty: args.on_empty,
        ratio_denominator: args.ratio_denominator.as_ref().map(|d| d.trim().to_string()),
        drop_missing_denominator: !args.keep_missing_denominator,
    };
    config.validate()?;
    Ok(config)
}

pub fn pacing_from_args(args: &CollectArgs) -> Result<Pacing, AppError> {
    let interval = Duration::try_from_secs_f64(args.interval_secs).map_err(|_| {
        AppError::invalid_input(format!(
            "--interval-secs must be a non-negative number (got {}).",
            args.interval_secs
        ))
    })?;
    Ok(Pacing::new(interval, Duration::from_millis(args.jitter_ms)))
}

//! Elective Allot - Binary Entry Point
//!
//! Loads a cohort fixture (or the built-in demo cohort), runs one allocation
//! round and prints the summary, report and run receipt as JSON on stdout.
//! Logs go to stderr and follow `RUST_LOG`, falling back to the configured
//! level.

use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use elective_allot::config::{load_config, Cli};
use elective_allot::fixture::Fixture;
use elective_allot::{AllocError, Database, Result};

fn init_tracing(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    init_tracing(&config.log_level);
    if let Some(path) = &cli.config_path {
        info!("loaded config from {}", path.display());
    }
    info!(?config, "configuration resolved");

    let fixture = match &cli.fixture {
        Some(path) => {
            info!("loading fixture from {}", path.display());
            Fixture::from_json_file(path)?
        }
        None => {
            info!("no fixture given, using the demo cohort");
            Fixture::demo()
        }
    };

    let cohort_id = cli
        .cohort
        .or_else(|| fixture.first_cohort())
        .ok_or_else(|| AllocError::Config("fixture contains no cohort".to_string()))?;
    let round = config.default_round;
    let timestamp = cli.timestamp.unwrap_or(0);

    let db = Database::with_config(&config);
    fixture.load_into(&db)?;

    let summary = db.run_allocation(cohort_id, round, timestamp)?;
    let report = db.report(cohort_id, round)?;
    let receipt = db.receipt(cohort_id, round, timestamp)?;

    let output = json!({
        "summary": summary,
        "report": report,
        "receipt": {
            "cohort_id": receipt.cohort_id,
            "round": receipt.round,
            "students_processed": receipt.students_processed,
            "allocated": receipt.allocated,
            "waitlisted": receipt.waitlisted,
            "state_root": receipt.state_root_hex(),
            "timestamp": receipt.timestamp,
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

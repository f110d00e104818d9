//! Logz.io Search Export CLI
//!
//! One-shot exporter: builds the query from the command line (or stdin),
//! walks the scroll API, and streams matching records to a file or stdout
//! in the selected format. Diagnostics and progress go to stderr so the
//! exported data stream stays clean.

use std::process;

use clap::Parser;
use nu_ansi_term::Color::{Green, Red, Yellow};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug};

use logzex::cli::CliArgs;
use logzex::client::ScrollClient;
use logzex::config::ExportConfig;
use logzex::error::Result;
use logzex::export::{ExportDriver, ProgressTracker, create_writer, open_sink};
use logzex::query;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}", Red.paint(e.to_string()));
        process::exit(1);
    }
}

/// Main application logic
///
/// Orchestrates a single export run:
/// 1. Parse command-line arguments and initialize logging
/// 2. Resolve configuration and build the initial query
/// 3. Open the destination and select the format writer
/// 4. Drive the scroll traversal to completion
async fn run() -> Result<()> {
    let args = CliArgs::parse();
    initialize_logging(&args);

    let config = ExportConfig::resolve(&args)?;
    let query = build_query(&args).await?;

    debug!("Format configured: {}", config.format);

    let sink = open_sink(config.output.as_deref()).await?;
    let writer = create_writer(config.format, sink);
    let client = ScrollClient::new(&config, query)?;

    let cancel_token = CancellationToken::new();
    spawn_ctrl_c_listener(cancel_token.clone());

    let mut driver = ExportDriver::new(Box::new(client), writer, ProgressTracker::new(true))
        .with_cancellation(cancel_token);
    let outcome = driver.execute().await?;

    if outcome.cancelled {
        eprintln!(
            "{}: Exported {} log entries before interrupt",
            Yellow.paint("CANCELLED"),
            outcome.records_exported
        );
    } else {
        eprintln!(
            "{}: Exported {} log entries",
            Green.paint("SUCCESS"),
            outcome.records_exported
        );
    }
    Ok(())
}

/// Build the initial query from the search flag, or from a raw query
/// object piped in via stdin when no search term was given.
async fn build_query(args: &CliArgs) -> Result<serde_json::Value> {
    match args.search.as_deref() {
        Some(term) => {
            debug!(
                "Searching: {} in time range: {} => {}",
                term, args.start, args.end
            );
            Ok(query::from_term(term, &args.start, &args.end, &args.extract))
        }
        None => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            let built = query::from_raw(&raw, &args.extract)?;
            debug!("Search query provided via stdin");
            Ok(built)
        }
    }
}

/// Cancel the export when Ctrl-C arrives. The driver notices between
/// batches and finalizes the output before the process exits.
fn spawn_ctrl_c_listener(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => token.cancel(),
            Err(err) => eprintln!("Failed to listen for Ctrl+C: {err}"),
        }
    });
}

/// Initialize logging based on verbosity. Diagnostics always go to stderr;
/// stdout is reserved for exported data.
fn initialize_logging(args: &CliArgs) {
    let level = if args.very_verbose {
        Level::TRACE
    } else if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

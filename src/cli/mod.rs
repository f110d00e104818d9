//! Command-line interface for logzex
//!
//! This module handles command-line argument parsing using clap. Values
//! that need merging with the environment (API token, region) are resolved
//! into an [`crate::config::ExportConfig`] afterwards.

use clap::Parser;
use std::path::PathBuf;

/// Logz.io search export - stream matching log records to JSON or CSV
#[derive(Parser, Debug)]
#[command(
    name = "logzex",
    version,
    about = "Export Logz.io search results via the scroll API",
    long_about = "Exports every log record matching a query from the Logz.io search API,
walking the scroll (cursor) endpoint page by page and streaming each record
to the destination. For complex queries pipe a raw JSON query object in via
stdin instead of using --search."
)]
pub struct CliArgs {
    /// Logz.io API token [envvar: LOGZIO_API_TOKEN]
    #[arg(short = 't', long, value_name = "TOKEN")]
    pub api_token: Option<String>,

    /// Logz.io region for account, defaults to eu [envvar: LOGZIO_API_REGION]
    #[arg(short = 'r', long, value_name = "REGION")]
    pub region: Option<String>,

    /// A simple search term. For more complex queries pipe one in via stdin
    #[arg(short = 's', long, value_name = "TERM")]
    pub search: Option<String>,

    /// Log entry fields to extract in output (can be provided multiple
    /// times; default: all fields are returned)
    #[arg(short = 'e', long, value_name = "FIELD")]
    pub extract: Vec<String>,

    /// A Logz.io compatible query start time
    #[arg(long, value_name = "TIME", default_value = "now-5m")]
    pub start: String,

    /// A Logz.io compatible query end time
    #[arg(long, value_name = "TIME", default_value = "now")]
    pub end: String,

    /// Output format (json, csv)
    #[arg(short = 'f', long, value_name = "FORMAT", default_value = "json")]
    pub format: String,

    /// Output file to write results to (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["logzex"]);
        assert_eq!(args.start, "now-5m");
        assert_eq!(args.end, "now");
        assert_eq!(args.format, "json");
        assert!(args.api_token.is_none());
        assert!(args.search.is_none());
        assert!(args.output.is_none());
        assert!(args.extract.is_empty());
    }

    #[test]
    fn test_extract_is_repeatable() {
        let args = CliArgs::parse_from(["logzex", "-e", "message", "-e", "host"]);
        assert_eq!(args.extract, vec!["message", "host"]);
    }

    #[test]
    fn test_output_and_format() {
        let args = CliArgs::parse_from(["logzex", "-f", "csv", "-o", "out.csv"]);
        assert_eq!(args.format, "csv");
        assert_eq!(args.output, Some(PathBuf::from("out.csv")));
    }
}

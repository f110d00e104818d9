//! Run configuration for the exporter
//!
//! Configuration is resolved once at startup from command-line arguments
//! and environment variables into an immutable [`ExportConfig`] consumed by
//! the rest of the program.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Built-in defaults

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};

/// Environment variable consulted when `--api-token` is absent.
pub const TOKEN_ENV: &str = "LOGZIO_API_TOKEN";

/// Environment variable consulted when `--region` is absent.
pub const REGION_ENV: &str = "LOGZIO_API_REGION";

const DEFAULT_REGION: &str = "eu";

/// Output format options.
///
/// The selector is parsed exactly once while resolving configuration, so an
/// unrecognized format fails the run before any output is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single JSON array containing every exported record.
    Json,

    /// A header row derived from the first record, then one row per record.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Resolved, immutable configuration for a single export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// API token sent as the `X-API-TOKEN` header on every request.
    pub token: String,

    /// Base URL of the search API, derived from the account region.
    pub base_url: String,

    /// Selected output format.
    pub format: OutputFormat,

    /// Destination file; stdout when `None`.
    pub output: Option<PathBuf>,
}

impl ExportConfig {
    /// Resolve configuration from parsed arguments and the process
    /// environment.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        Self::resolve_with(args, env::var(TOKEN_ENV).ok(), env::var(REGION_ENV).ok())
    }

    /// Resolution seam with environment values injected, so tests don't
    /// have to mutate process env.
    fn resolve_with(
        args: &CliArgs,
        env_token: Option<String>,
        env_region: Option<String>,
    ) -> Result<Self> {
        let token = args
            .api_token
            .clone()
            .or(env_token)
            .ok_or(ConfigError::MissingToken)?;

        let region = args
            .region
            .clone()
            .or(env_region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let format = args.format.parse::<OutputFormat>()?;

        Ok(Self {
            token,
            base_url: base_url_for(&region),
            format,
            output: args.output.clone(),
        })
    }
}

/// Map a region selector to the API base URL.
fn base_url_for(region: &str) -> String {
    if region == "us" {
        "https://api.logz.io".to_string()
    } else {
        format!("https://api-{region}.logz.io")
    }
}

//! Logz.io Search Export Library
//!
//! This library provides the core functionality for logzex, a one-shot
//! exporter for Logz.io search results. It walks the scroll (cursor)
//! endpoint page by page and streams each matching record straight to a
//! JSON or CSV destination, so the full result set is never held in memory.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Run configuration resolved from arguments and environment
//! - `client`: HTTP transport for the scroll endpoint
//! - `query`: Initial query construction
//! - `export`: Scroll driver, format writers, and progress display
//! - `error`: Error types and handling

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod query;

// Re-export commonly used types
pub use client::{Record, ScrollBatch, ScrollClient, ScrollSource};
pub use config::{ExportConfig, OutputFormat};
pub use error::{ExportError, Result};
pub use export::{ExportDriver, ExportOutcome, ProgressTracker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

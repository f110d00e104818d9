//! Error handling for export operations.
//!
//! Every failure in this tool is fatal by design: errors are surfaced once
//! at the point of detection, reported to stderr, and terminate the process
//! with a non-zero exit code. There is no retry or recoverable category,
//! which keeps a one-shot export run easy to reason about.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, ExportError, Result, TransportError};

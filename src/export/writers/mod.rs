//! Format writers for the export stream
//!
//! Writers receive records one at a time and own the destination sink.
//! Each writer is a small state machine: `Uninitialized` until the first
//! record arrives (CSV captures its column schema at that transition),
//! `Active` while records stream through, and `Finalized` once
//! [`RecordWriter::finish`] has run. `finish` is idempotent, so cleanup
//! paths may invoke it again without corrupting the output, and it shuts
//! the sink down itself so writer finalization always precedes destination
//! close.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, BufWriter};
use tracing::debug;

use crate::client::Record;
use crate::config::OutputFormat;
use crate::error::{ConfigError, ExportError, Result};

pub mod csv;
pub mod json;

pub use csv::CsvWriter;
pub use json::JsonArrayWriter;

/// Destination sink: a newly created file or stdout, behind one buffered
/// writer exclusively owned by the format writer.
pub type Sink = BufWriter<Box<dyn AsyncWrite + Send + Unpin>>;

/// Writer lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// No record seen yet; framing/schema not yet emitted.
    Uninitialized,

    /// At least one record written.
    Active,

    /// Output framed, flushed and closed. Terminal.
    Finalized,
}

/// Trait for streaming records into an output format.
#[async_trait]
pub trait RecordWriter: Send {
    /// Serialize one record to the destination.
    ///
    /// Transport-only metadata never reaches the output: JSON writes the
    /// record's sanitized field mapping, CSV writes its source fields.
    async fn write(&mut self, record: &Record) -> Result<()>;

    /// Close the format framing, flush, and shut the sink down.
    ///
    /// Idempotent: the first call finalizes, later calls are no-ops.
    async fn finish(&mut self) -> Result<()>;
}

/// Select the writer implementation for a format.
pub fn create_writer(format: OutputFormat, sink: Sink) -> Box<dyn RecordWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonArrayWriter::new(sink)),
        OutputFormat::Csv => Box::new(CsvWriter::new(sink)),
    }
}

/// Buffer size for the destination sink.
const SINK_BUFFER_SIZE: usize = 8 * 1024 * 1024; // 8MB

/// Open the destination sink: the given path, which must not already
/// exist, or stdout when no path is configured.
pub async fn open_sink(path: Option<&Path>) -> Result<Sink> {
    let inner: Box<dyn AsyncWrite + Send + Unpin> = match path {
        Some(path) => {
            if let Ok(meta) = tokio::fs::metadata(path).await {
                return Err(if meta.is_file() {
                    ConfigError::OutputExists(path.to_path_buf())
                } else {
                    ConfigError::OutputNotAFile(path.to_path_buf())
                }
                .into());
            }

            debug!("Output set to: {}", path.display());
            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .await
                .map_err(|e| match e.kind() {
                    io::ErrorKind::AlreadyExists => {
                        ConfigError::OutputExists(path.to_path_buf()).into()
                    }
                    _ => ExportError::Io(e),
                })?;
            Box::new(file)
        }
        None => {
            debug!("Outputting to stdout");
            Box::new(tokio::io::stdout())
        }
    };

    Ok(BufWriter::with_capacity(SINK_BUFFER_SIZE, inner))
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_path;
    use super::*;

    #[tokio::test]
    async fn test_open_sink_rejects_existing_file() {
        let path = temp_path("existing-file");
        tokio::fs::write(&path, b"occupied").await.unwrap();

        let result = open_sink(Some(&path)).await;
        assert!(matches!(
            result,
            Err(ExportError::Config(ConfigError::OutputExists(_)))
        ));

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_open_sink_rejects_directory() {
        let path = temp_path("existing-dir");
        tokio::fs::create_dir_all(&path).await.unwrap();

        let result = open_sink(Some(&path)).await;
        assert!(matches!(
            result,
            Err(ExportError::Config(ConfigError::OutputNotAFile(_)))
        ));

        tokio::fs::remove_dir(&path).await.ok();
    }

    #[tokio::test]
    async fn test_open_sink_creates_new_file() {
        let path = temp_path("fresh-file");
        tokio::fs::remove_file(&path).await.ok();

        let sink = open_sink(Some(&path)).await;
        assert!(sink.is_ok());
        assert!(tokio::fs::metadata(&path).await.unwrap().is_file());

        tokio::fs::remove_file(&path).await.ok();
    }
}

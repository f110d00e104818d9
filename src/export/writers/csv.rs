//! CSV writer
//!
//! Rows are built from each record's source fields only; hit-level
//! transport metadata never appears. The column schema is captured from the
//! first record and fixed for the rest of the run, so the header always
//! matches the data that follows and every row has the same column count.
//! Fields missing from later records become empty cells.

use std::collections::BTreeSet;
use std::io;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::client::Record;
use crate::error::Result;

use super::{RecordWriter, Sink, WriterState};

/// Writer producing a CSV header plus one row per record.
pub struct CsvWriter {
    sink: Sink,
    state: WriterState,
    /// Column schema, captured from the first record's source fields.
    columns: Vec<String>,
    written: u64,
}

impl CsvWriter {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            state: WriterState::Uninitialized,
            columns: Vec::new(),
            written: 0,
        }
    }

    /// Capture the column schema from the first record and emit the header
    /// row. Field names are sorted for a deterministic column order.
    async fn write_header(&mut self, fields: Option<&Map<String, Value>>) -> Result<()> {
        self.columns = match fields {
            Some(map) => {
                let names: BTreeSet<String> = map.keys().cloned().collect();
                names.into_iter().collect()
            }
            None => Vec::new(),
        };

        let header = self
            .columns
            .iter()
            .map(|name| escape_csv_value(name))
            .collect::<Vec<_>>()
            .join(",");
        self.sink.write_all(header.as_bytes()).await?;
        self.sink.write_all(b"\n").await?;

        debug!("Wrote CSV header: {} fields", self.columns.len());
        Ok(())
    }

    async fn write_row(&mut self, fields: Option<&Map<String, Value>>) -> Result<()> {
        let row = self
            .columns
            .iter()
            .map(|column| {
                let value = fields.and_then(|map| map.get(column));
                escape_csv_value(&csv_field(value))
            })
            .collect::<Vec<_>>()
            .join(",");
        self.sink.write_all(row.as_bytes()).await?;
        self.sink.write_all(b"\n").await?;
        Ok(())
    }
}

/// Render a field value as CSV cell text. Strings are written bare; other
/// values keep their JSON rendering.
fn csv_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Quote a CSV cell when it contains a delimiter, quote or line break,
/// doubling internal quotes.
fn escape_csv_value(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[async_trait]
impl RecordWriter for CsvWriter {
    async fn write(&mut self, record: &Record) -> Result<()> {
        if self.state == WriterState::Finalized {
            return Err(io::Error::other("record written after finalization").into());
        }

        let fields = record.source_fields();
        if self.state == WriterState::Uninitialized {
            self.write_header(fields).await?;
            self.state = WriterState::Active;
        }

        self.write_row(fields).await?;
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        if self.state == WriterState::Finalized {
            return Ok(());
        }

        self.sink.shutdown().await?;
        self.state = WriterState::Finalized;

        debug!("Finalized CSV output ({} records)", self.written);
        Ok(())
    }
}

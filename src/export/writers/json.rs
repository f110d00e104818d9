//! JSON array writer
//!
//! Emits every exported record as an element of a single JSON array, so the
//! finished output parses as one document. Framing is incremental: `[`
//! before the first record, `,` before each subsequent one, and `]` exactly
//! once at finalization. A run with zero records still produces `[]`.

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::client::Record;
use crate::error::Result;

use super::{RecordWriter, Sink, WriterState};

/// Writer producing one JSON array of records.
///
/// Each record is the raw hit minus transport metadata, serialized
/// compactly on its own line.
pub struct JsonArrayWriter {
    sink: Sink,
    state: WriterState,
    written: u64,
}

impl JsonArrayWriter {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            state: WriterState::Uninitialized,
            written: 0,
        }
    }
}

#[async_trait]
impl RecordWriter for JsonArrayWriter {
    async fn write(&mut self, record: &Record) -> Result<()> {
        match self.state {
            WriterState::Uninitialized => {
                self.sink.write_all(b"[").await?;
                self.state = WriterState::Active;
            }
            WriterState::Active => self.sink.write_all(b",").await?,
            WriterState::Finalized => {
                return Err(io::Error::other("record written after finalization").into());
            }
        }

        self.sink.write_all(b"\n").await?;
        let json = serde_json::to_vec(&record.sanitized())?;
        self.sink.write_all(&json).await?;
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        if self.state == WriterState::Finalized {
            return Ok(());
        }

        // Zero records still produce a valid, empty array.
        if self.state == WriterState::Uninitialized {
            self.sink.write_all(b"[").await?;
        }
        self.sink.write_all(b"]").await?;
        self.sink.shutdown().await?;
        self.state = WriterState::Finalized;

        debug!("Finalized JSON output ({} records)", self.written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::temp_path;
    use super::super::open_sink;
    use super::*;
    use serde_json::{Value, json};

    fn record(raw: Value) -> Record {
        Record(raw.as_object().unwrap().clone())
    }

    async fn read_back(path: &std::path::Path) -> String {
        let content = tokio::fs::read_to_string(path).await.unwrap();
        tokio::fs::remove_file(path).await.ok();
        content
    }

    #[tokio::test]
    async fn test_zero_records_produce_empty_array() {
        let path = temp_path("json-empty");
        let mut writer = JsonArrayWriter::new(open_sink(Some(&path)).await.unwrap());

        writer.finish().await.unwrap();

        assert_eq!(read_back(&path).await, "[]");
    }

    #[tokio::test]
    async fn test_records_form_one_valid_array() {
        let path = temp_path("json-three");
        let mut writer = JsonArrayWriter::new(open_sink(Some(&path)).await.unwrap());

        for i in 0..3 {
            writer
                .write(&record(json!({
                    "_score": 1.0,
                    "sort": [i],
                    "_source": {"message": format!("line {i}")},
                })))
                .await
                .unwrap();
        }
        writer.finish().await.unwrap();

        let parsed: Value = serde_json::from_str(&read_back(&path).await).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1]["_source"]["message"], "line 1");
    }

    #[tokio::test]
    async fn test_transport_metadata_absent_from_output() {
        let path = temp_path("json-sanitized");
        let mut writer = JsonArrayWriter::new(open_sink(Some(&path)).await.unwrap());

        writer
            .write(&record(json!({
                "_score": 2.5,
                "sort": [42],
                "_source": {"message": "hello"},
            })))
            .await
            .unwrap();
        writer.finish().await.unwrap();

        let parsed: Value = serde_json::from_str(&read_back(&path).await).unwrap();
        assert!(parsed[0].get("_score").is_none());
        assert!(parsed[0].get("sort").is_none());
        assert_eq!(parsed[0]["_source"]["message"], "hello");
    }

    #[tokio::test]
    async fn test_finish_is_idempotent() {
        let path = temp_path("json-idempotent");
        let mut writer = JsonArrayWriter::new(open_sink(Some(&path)).await.unwrap());

        writer
            .write(&record(json!({"_source": {"message": "only"}})))
            .await
            .unwrap();
        writer.finish().await.unwrap();
        writer.finish().await.unwrap();

        // A second finish must not append another closing bracket.
        let content = read_back(&path).await;
        assert!(content.ends_with(']'));
        assert!(!content.ends_with("]]"));
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_after_finish_fails() {
        let path = temp_path("json-closed");
        let mut writer = JsonArrayWriter::new(open_sink(Some(&path)).await.unwrap());

        writer.finish().await.unwrap();
        let result = writer.write(&record(json!({"_source": {}}))).await;
        assert!(result.is_err());

        tokio::fs::remove_file(&path).await.ok();
    }
}

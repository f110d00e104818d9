//! Scroll driver
//!
//! Pulls batches from a [`ScrollSource`] until the backend returns an empty
//! page, streaming every record into a [`RecordWriter`] and updating the
//! progress display once per batch. The traversal state lives in an
//! explicit [`ExportSession`] owned by the driver, so nothing about the
//! loop is ambient.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::ScrollSource;
use crate::error::Result;

use super::progress::ProgressTracker;
use super::writers::RecordWriter;

/// Traversal state carried across loop iterations.
///
/// The cursor is captured from the first response and echoed unchanged on
/// every later call; the offset counts records handed to the writer.
#[derive(Debug)]
struct ExportSession {
    cursor: Option<String>,
    offset: u64,
    started: Instant,
}

impl ExportSession {
    fn new() -> Self {
        Self {
            cursor: None,
            offset: 0,
            started: Instant::now(),
        }
    }

    /// Records exported per elapsed wall-clock second, floored. Falls back
    /// to the raw offset before a whole second has elapsed.
    fn throughput(&self) -> u64 {
        let secs = self.started.elapsed().as_secs();
        if secs > 0 { self.offset / secs } else { self.offset }
    }
}

/// Result of a completed export run.
#[derive(Debug)]
pub struct ExportOutcome {
    /// Number of records exported.
    pub records_exported: u64,

    /// Wall-clock time for the run.
    pub elapsed_ms: u64,

    /// Whether the run was interrupted rather than drained.
    pub cancelled: bool,
}

/// Drives scroll pagination from source to writer.
pub struct ExportDriver {
    source: Box<dyn ScrollSource>,
    writer: Box<dyn RecordWriter>,
    progress: ProgressTracker,
    cancel_token: Option<CancellationToken>,
}

impl ExportDriver {
    /// Create a new export driver.
    pub fn new(
        source: Box<dyn ScrollSource>,
        writer: Box<dyn RecordWriter>,
        progress: ProgressTracker,
    ) -> Self {
        Self {
            source,
            writer,
            progress,
            cancel_token: None,
        }
    }

    /// Set a cancellation token, checked between batches.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Run the traversal to completion.
    ///
    /// However the loop ends (drained, error, cancellation), the progress
    /// bar is cleared and the writer finalized before this returns, so
    /// output already written is flushed and the destination closed exactly
    /// once.
    pub async fn execute(&mut self) -> Result<ExportOutcome> {
        let mut session = ExportSession::new();

        info!("Starting export");
        let driven = self.drive(&mut session).await;

        self.progress.finish();
        let finished = self.writer.finish().await;

        let cancelled = driven?;
        finished?;

        let elapsed_ms = session.started.elapsed().as_millis() as u64;
        info!(
            "Export finished: {} records in {} ms",
            session.offset, elapsed_ms
        );

        Ok(ExportOutcome {
            records_exported: session.offset,
            elapsed_ms,
            cancelled,
        })
    }

    /// The scroll loop proper. Returns whether the run was cancelled.
    async fn drive(&mut self, session: &mut ExportSession) -> Result<bool> {
        loop {
            if let Some(ref token) = self.cancel_token {
                if token.is_cancelled() {
                    info!("Export cancelled after {} records", session.offset);
                    return Ok(true);
                }
            }

            let batch = self.source.next_batch(session.cursor.as_deref()).await?;

            if session.cursor.is_none() {
                // First response: all later calls echo this cursor, and the
                // reported total seeds the progress display. The total is
                // an estimate; only an empty batch ends the traversal.
                session.cursor = Some(batch.cursor.clone());
                self.progress.begin(batch.total);
                debug!("Scroll started: ~{} matching records", batch.total);
            }

            for record in &batch.records {
                self.writer.write(record).await?;
                session.offset += 1;
            }

            self.progress.update(session.offset, session.throughput());

            if batch.records.is_empty() {
                debug!("Empty batch received, traversal complete");
                return Ok(false);
            }
        }
    }
}

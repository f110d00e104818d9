//! Streaming export pipeline
//!
//! The pipeline is built from three components:
//!
//! 1. **ExportDriver**: pulls batches from a [`crate::client::ScrollSource`]
//!    until the backend returns an empty page, owning the traversal state
//!    (cursor, offset) for the run.
//! 2. **RecordWriter**: serializes records one at a time in the selected
//!    format, framing the output so the finished result is valid as a whole.
//! 3. **ProgressTracker**: per-batch progress feedback on stderr.
//!
//! Records are never buffered as a full result set; each one is handed to
//! the writer the moment it arrives.

pub mod driver;
pub mod progress;
pub mod writers;

pub use driver::{ExportDriver, ExportOutcome};
pub use progress::ProgressTracker;
pub use writers::{CsvWriter, JsonArrayWriter, RecordWriter, create_writer, open_sink};

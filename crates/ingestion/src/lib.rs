//! # Ingestion
//!
//! Per-cycle signal input for the monitor.
//!
//! Responsibilities:
//! - Hold the latest decoded value of each blind-spot signal
//! - Assign cycle indices
//! - Replay recorded drives from JSON lines
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{ReplaySource, SnapshotSource};
//!
//! let mut source = ReplaySource::from_path(Path::new("drive.jsonl"))?;
//! while let Some(input) = source.next_input() {
//!     let outcome = controller.update(&input);
//! }
//! ```

mod error;
mod latch;
mod replay;
mod scripted;
mod source;

// Re-exports
pub use contracts::{CycleInput, SignalSnapshot, SignalUpdate};
pub use error::{IngestionError, Result};
pub use latch::SignalLatch;
pub use replay::ReplaySource;
pub use scripted::{ScriptStep, ScriptedSource};
pub use source::SnapshotSource;

//! Snapshot source trait

use contracts::CycleInput;

/// Per-cycle input source for the control loop
///
/// Implementations assign monotonically increasing cycle indices and return
/// `None` once exhausted.
pub trait SnapshotSource: Send {
    /// Source name (for logs)
    fn name(&self) -> &str;

    /// Input for the next control cycle
    fn next_input(&mut self) -> Option<CycleInput>;
}

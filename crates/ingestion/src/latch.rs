//! Latest-value latch over decoded signal updates.

use contracts::{SignalSnapshot, SignalUpdate};

/// Keeps the most recent value of each monitored signal
///
/// A value, once received, stays in the snapshot until overwritten; cycles
/// without a new message re-present the previous values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalLatch {
    snapshot: SignalSnapshot,
}

impl SignalLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the fields present in `update`
    pub fn apply(&mut self, update: &SignalUpdate) {
        if let Some(d1) = update.distance_1 {
            self.snapshot.distance_1 = Some(d1);
        }
        if let Some(d2) = update.distance_2 {
            self.snapshot.distance_2 = Some(d2);
        }
        if let Some(side) = update.side_indicator {
            self.snapshot.side_indicator = Some(side);
        }
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        self.snapshot
    }
}

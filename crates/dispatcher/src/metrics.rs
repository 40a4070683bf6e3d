//! Per-sink delivery counters
//!
//! Frames are handed to sinks without retry, so every frame ends in exactly
//! one [`Delivery`] state. Counters are kept per request kind; frames that do
//! not decode to a request are counted separately.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use contracts::CommandKind;

/// Final state of one frame handed to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written by the sink
    Written,
    /// The sink returned an error
    Failed,
    /// The sink queue was full or closed
    Dropped,
}

/// Counts split by request kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub enable: u64,
    pub disable: u64,
    pub poll: u64,
    /// Frames that are not blind-spot requests
    pub other: u64,
}

impl KindCounts {
    pub fn total(&self) -> u64 {
        self.enable + self.disable + self.poll + self.other
    }

    /// Non-zero entries, labelled for logs and metrics
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, u64)> {
        [
            (CommandKind::Enable.as_str(), self.enable),
            (CommandKind::Disable.as_str(), self.disable),
            (CommandKind::Poll.as_str(), self.poll),
            ("other", self.other),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
    }
}

const SLOTS: usize = 4;

fn slot(kind: Option<CommandKind>) -> usize {
    match kind {
        Some(CommandKind::Enable) => 0,
        Some(CommandKind::Disable) => 1,
        Some(CommandKind::Poll) => 2,
        None => 3,
    }
}

#[derive(Debug, Default)]
struct KindCounters([AtomicU64; SLOTS]);

impl KindCounters {
    fn bump(&self, kind: Option<CommandKind>) {
        self.0[slot(kind)].fetch_add(1, Ordering::Relaxed);
    }

    fn load(&self) -> KindCounts {
        let read = |i: usize| self.0[i].load(Ordering::Relaxed);
        KindCounts {
            enable: read(0),
            disable: read(1),
            poll: read(2),
            other: read(3),
        }
    }
}

/// Shared between a [`SinkHandle`](crate::SinkHandle) and its worker
#[derive(Debug, Default)]
pub struct SinkMetrics {
    written: KindCounters,
    failed: KindCounters,
    dropped: KindCounters,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame of the given kind in its final state
    pub fn record(&self, delivery: Delivery, kind: Option<CommandKind>) {
        match delivery {
            Delivery::Written => self.written.bump(kind),
            Delivery::Failed => self.failed.bump(kind),
            Delivery::Dropped => self.dropped.bump(kind),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let written = self.written.load();
        let failed = self.failed.load();
        let dropped = self.dropped.load();
        MetricsSnapshot {
            write_count: written.total(),
            failure_count: failed.total(),
            dropped_count: dropped.total(),
            written,
            failed,
            dropped,
        }
    }
}

/// Point-in-time copy of a sink's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
    pub written: KindCounts,
    pub failed: KindCounts,
    pub dropped: KindCounts,
}

impl MetricsSnapshot {
    /// Frames handed to this sink, whether or not they made it out
    pub fn offered(&self) -> u64 {
        self.write_count + self.failure_count + self.dropped_count
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "written={} failed={} dropped={}",
            self.write_count, self.failure_count, self.dropped_count
        )?;
        let mut lost = self.dropped.labelled().peekable();
        if lost.peek().is_some() {
            let parts: Vec<String> = lost.map(|(kind, n)| format!("{kind}={n}")).collect();
            write!(f, " (dropped {})", parts.join(" "))?;
        }
        Ok(())
    }
}

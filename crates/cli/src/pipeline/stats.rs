//! Control loop statistics.

use std::fmt;
use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::RunAggregator;

/// Why the control loop stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    #[default]
    EndOfInput,
    MaxCycles,
    Signal,
    DispatcherClosed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::EndOfInput => "end of input",
            StopReason::MaxCycles => "max cycles reached",
            StopReason::Signal => "shutdown signal",
            StopReason::DispatcherClosed => "dispatcher closed",
        })
    }
}

/// Statistics from a control loop run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Signal source name
    pub source: String,

    /// Cycles stepped
    pub cycles: u64,

    /// Request frames handed to the dispatcher, shutdown frames included
    pub frames_sent: u64,

    /// Disable frames sent by the shutdown policy
    pub shutdown_frames: u64,

    /// Number of configured sinks
    pub active_sinks: usize,

    /// Wall time of the run
    pub duration: Duration,

    pub stop_reason: StopReason,

    /// Monitor run totals
    pub run: RunAggregator,

    /// Final per-sink delivery counters
    pub sinks: Vec<(String, MetricsSnapshot)>,
}

impl PipelineStats {
    /// Cycles per second throughput
    pub fn cycles_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.cycles as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Control Loop Statistics ===\n");
        println!("Source: {}", self.source);
        println!("Stopped by: {}", self.stop_reason);
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Cycles: {} ({:.1}/s)", self.cycles, self.cycles_per_sec());
        println!(
            "Frames sent: {} ({} on shutdown)",
            self.frames_sent, self.shutdown_frames
        );

        if self.sinks.is_empty() {
            println!("Sinks: none");
        } else {
            println!("Sinks ({}):", self.active_sinks);
            for (name, snapshot) in &self.sinks {
                println!("  - {}: {}", name, snapshot);
            }
        }

        println!("\n{}", self.run.summary());
    }
}

//! # BSM Engine
//!
//! Debounced dual-channel blind-spot monitor with a session-based polling
//! protocol.
//!
//! Responsibilities:
//! - Session lifecycle per channel (enable / idle disable)
//! - Rate-gated, phase-interleaved polling
//! - Threshold detection with a freshness watchdog
//! - Ordered logical `Command` output per cycle
//!
//! ## Usage
//!
//! ```ignore
//! use bsm_engine::{Monitor, MonitorConfig};
//!
//! let mut monitor = Monitor::new(MonitorConfig::default());
//!
//! // Once per control cycle
//! let outcome = monitor.step(cycle, &snapshot, vego, true);
//! for command in &outcome.commands {
//!     // Hand to the emitter
//! }
//! ```

mod controller;
mod filter;
mod monitor;
mod poll;
mod session;

pub use controller::BsmController;
pub use filter::{apply_reading, DebounceFilter, FilterOutcome, FilterState};
pub use monitor::{Monitor, MonitorDiagnostics};
pub use poll::{decide_poll, PollState};
pub use session::{decide_session, SessionState};

// Re-export contracts types
pub use contracts::{
    CapabilityFlags, Channel, ChannelMap, Command, CycleInput, MonitorConfig, SignalSnapshot,
    StepMeta, StepOutcome,
};

//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Cycle Model
//! - The monitor is stepped once per control cycle by an external fixed-rate loop
//! - `cycle_index` is the only clock; it is monotonic and never wraps in practice

mod blueprint;
mod channel;
mod command;
mod error;
mod frame;
mod monitor_config;
mod outcome;
mod signal;
mod sink;

pub use blueprint::*;
pub use channel::{Channel, ChannelMap};
pub use command::{Command, CommandKind};
pub use error::*;
pub use frame::BusFrame;
pub use monitor_config::{CapabilityFlags, MonitorConfig};
pub use outcome::{StepMeta, StepOutcome};
pub use signal::{CycleInput, SignalSnapshot, SignalUpdate};
pub use sink::*;

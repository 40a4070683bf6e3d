//! StepOutcome - Monitor output
//!
//! Result of one control cycle: ordered commands, published warnings, and
//! step metadata for diagnostics.

use serde::{Deserialize, Serialize};

use crate::{Channel, ChannelMap, Command};

/// Output of one monitor step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Cycle this outcome belongs to
    pub cycle_index: u64,

    /// Commands in emission order
    pub commands: Vec<Command>,

    /// Warning per channel at the end of the cycle
    pub warnings: ChannelMap<bool>,

    /// Step metadata
    pub meta: StepMeta,
}

impl StepOutcome {
    pub fn left_warning(&self) -> bool {
        self.warnings[Channel::Left]
    }

    pub fn right_warning(&self) -> bool {
        self.warnings[Channel::Right]
    }
}

/// Internal conditions observed while stepping
///
/// None of these are errors; they are reported for logs and metrics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMeta {
    /// A required signal was absent, the filter was not updated
    pub signal_absent: bool,

    /// The cycle index was already processed, nothing was mutated
    pub duplicate: bool,

    /// Channel whose hold timer was refreshed by a changed reading
    pub refreshed: Option<Channel>,

    /// Channels whose hold timer ran out this cycle
    pub stale: ChannelMap<bool>,
}

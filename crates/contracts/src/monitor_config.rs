//! Monitor configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

use crate::Channel;

/// Tunables of the blind-spot monitor core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Cycles between two polls of the same channel
    pub poll_period: u64,

    /// Cycles after the last session toggle before an auto-disable
    pub idle_timeout: u64,

    /// Cycles a fresh reading is held before it is treated as stale
    pub decay_reset: u32,

    /// A distance strictly above this raises the warning
    pub distance_threshold: f64,

    /// Speed strictly above this enables a session when not always-on
    pub speed_enable_threshold: f64,

    /// Keep sessions enabled regardless of speed, never auto-disable
    pub always_on: bool,

    /// Poll phase of the LEFT channel (default 0)
    pub left_phase: Option<u64>,

    /// Poll phase of the RIGHT channel (default `poll_period / 2`)
    pub right_phase: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_period: 20,
            idle_timeout: 50,
            decay_reset: 100,
            distance_threshold: 10.0,
            speed_enable_threshold: 6.0,
            always_on: true,
            left_phase: None,
            right_phase: None,
        }
    }
}

impl MonitorConfig {
    /// Effective poll phase offset for a channel
    ///
    /// Channels default to opposite halves of the poll period so their
    /// polls never share a cycle.
    pub fn phase_offset(&self, channel: Channel) -> u64 {
        match channel {
            Channel::Left => self.left_phase.unwrap_or(0),
            Channel::Right => self.right_phase.unwrap_or(self.poll_period / 2),
        }
    }
}

/// Vehicle capability bitmask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityFlags(pub u32);

impl CapabilityFlags {
    /// Vehicle supports the extended blind-spot session protocol
    pub const ENHANCED_BSM: CapabilityFlags = CapabilityFlags(1);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: CapabilityFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CapabilityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

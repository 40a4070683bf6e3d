//! Decoded signal values consumed by the monitor each cycle.

use serde::{Deserialize, Serialize};

/// Latest known values of the monitored signals
///
/// Every field is `None` until the decoder has seen at least one message
/// carrying it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    /// First raw distance reading
    pub distance_1: Option<f64>,
    /// Second raw distance reading
    pub distance_2: Option<f64>,
    /// Side marker of the channel the readings belong to
    pub side_indicator: Option<u8>,
}

impl SignalSnapshot {
    /// Snapshot with all three signals present
    pub fn new(distance_1: f64, distance_2: f64, side_indicator: u8) -> Self {
        Self {
            distance_1: Some(distance_1),
            distance_2: Some(distance_2),
            side_indicator: Some(side_indicator),
        }
    }

    /// Returns the three values only when all of them are known
    pub fn complete(&self) -> Option<(f64, f64, u8)> {
        Some((self.distance_1?, self.distance_2?, self.side_indicator?))
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }
}

/// Partial signal update delivered when one bus message is decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_2: Option<f64>,
    #[serde(default, alias = "side", skip_serializing_if = "Option::is_none")]
    pub side_indicator: Option<u8>,
}

impl SignalUpdate {
    /// Update carrying all three signals
    pub fn reading(distance_1: f64, distance_2: f64, side_indicator: u8) -> Self {
        Self {
            distance_1: Some(distance_1),
            distance_2: Some(distance_2),
            side_indicator: Some(side_indicator),
        }
    }

    /// Cycle without any new message
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.distance_1.is_none() && self.distance_2.is_none() && self.side_indicator.is_none()
    }
}

/// Everything the monitor is given for one control cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleInput {
    /// Monotonic control-cycle counter
    pub cycle_index: u64,
    /// Decoded signal snapshot as of this cycle
    pub snapshot: SignalSnapshot,
    /// Vehicle speed
    pub vego: f64,
}

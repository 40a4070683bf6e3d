//! MonitorBlueprint - Config Loader output
//!
//! Full runtime configuration: monitor tunables, vehicle capabilities,
//! control loop pacing, and output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CapabilityFlags, MonitorConfig};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete monitor blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Core tunables
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Vehicle capabilities
    #[serde(default)]
    pub vehicle: VehicleConfig,

    /// Control loop settings
    #[serde(default)]
    pub control_loop: ControlLoopConfig,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Vehicle capability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Capability bitmask, see [`CapabilityFlags`]
    #[serde(default = "default_capability_flags")]
    pub capability_flags: CapabilityFlags,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            capability_flags: default_capability_flags(),
        }
    }
}

fn default_capability_flags() -> CapabilityFlags {
    CapabilityFlags::ENHANCED_BSM
}

/// Control loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlLoopConfig {
    /// Cycle rate in Hz (realtime pacing only)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// Disable active sessions when the loop stops
    #[serde(default = "default_disable_on_shutdown")]
    pub disable_on_shutdown: bool,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            disable_on_shutdown: default_disable_on_shutdown(),
        }
    }
}

fn default_rate_hz() -> f64 {
    100.0
}

fn default_disable_on_shutdown() -> bool {
    true
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Sink-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    64
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log every frame through tracing
    Log,
    /// Append candump-style lines to a file
    File,
}

//! Capability-gated front end of the monitor.

use contracts::{CapabilityFlags, ChannelMap, Command, CycleInput, MonitorConfig, StepOutcome};
use tracing::info;

use crate::monitor::Monitor;

/// Runs the monitor only on vehicles that support the extended session
/// protocol, and keeps the last published warnings.
#[derive(Debug, Clone)]
pub struct BsmController {
    monitor: Monitor,
    enabled: bool,
    warnings: ChannelMap<bool>,
}

impl BsmController {
    pub fn new(config: MonitorConfig, capabilities: CapabilityFlags) -> Self {
        let enabled = capabilities.contains(CapabilityFlags::ENHANCED_BSM);
        info!(
            enabled,
            capability_flags = capabilities.0,
            poll_period = config.poll_period,
            always_on = config.always_on,
            "blind-spot controller created"
        );
        Self {
            monitor: Monitor::new(config),
            enabled,
            warnings: ChannelMap::default(),
        }
    }

    /// Whether the vehicle supports the protocol
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Run one cycle
    ///
    /// On unsupported vehicles no command is produced and both warnings stay
    /// false.
    pub fn update(&mut self, input: &CycleInput) -> StepOutcome {
        if !self.enabled {
            return StepOutcome {
                cycle_index: input.cycle_index,
                ..Default::default()
            };
        }
        let outcome = self.monitor.step_input(input);
        self.warnings = outcome.warnings;
        outcome
    }

    /// Last published warnings
    pub fn warnings(&self) -> ChannelMap<bool> {
        self.warnings
    }

    /// Disable active sessions (nothing to do when not enabled)
    pub fn shutdown(&mut self) -> Vec<Command> {
        if !self.enabled {
            return Vec::new();
        }
        self.monitor.shutdown()
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }
}

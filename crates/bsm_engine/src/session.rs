//! Session controller: extended reporting mode lifecycle per channel.

use contracts::{Channel, Command, MonitorConfig};
use serde::Serialize;

/// Session state of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// Sensor is in extended reporting mode
    pub active: bool,
    /// Cycle of the last enable/disable command
    pub last_toggle_cycle: u64,
}

/// Decide whether a mode toggle is due for `channel` this cycle
///
/// Enables when inactive and either `always_on` is set or `vego` exceeds the
/// speed threshold. Disables when active, not `always_on`, and more than
/// `idle_timeout` cycles passed since the last toggle.
pub fn decide_session(
    channel: Channel,
    state: &mut SessionState,
    cycle_index: u64,
    vego: f64,
    always_on: bool,
    config: &MonitorConfig,
) -> Option<Command> {
    if !state.active {
        if always_on || vego > config.speed_enable_threshold {
            state.active = true;
            state.last_toggle_cycle = cycle_index;
            return Some(Command::EnableSession(channel));
        }
        return None;
    }

    let idle = cycle_index.saturating_sub(state.last_toggle_cycle);
    if !always_on && idle > config.idle_timeout {
        state.active = false;
        state.last_toggle_cycle = cycle_index;
        return Some(Command::DisableSession(channel));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditional_config() -> MonitorConfig {
        MonitorConfig {
            always_on: false,
            ..Default::default()
        }
    }

    fn decide(
        state: &mut SessionState,
        cycle: u64,
        vego: f64,
        config: &MonitorConfig,
    ) -> Option<Command> {
        decide_session(Channel::Left, state, cycle, vego, config.always_on, config)
    }

    #[test]
    fn test_always_on_enables_immediately() {
        let mut state = SessionState::default();
        let cmd = decide(&mut state, 7, 0.0, &MonitorConfig::default());
        assert_eq!(cmd, Some(Command::EnableSession(Channel::Left)));
        assert!(state.active);
        assert_eq!(state.last_toggle_cycle, 7);
    }

    #[test]
    fn test_speed_threshold_is_strict() {
        let config = conditional_config();
        let mut state = SessionState::default();
        assert_eq!(decide(&mut state, 0, 6.0, &config), None);
        assert!(!state.active);

        let cmd = decide_session(Channel::Right, &mut state, 1, 6.5, false, &config);
        assert_eq!(cmd, Some(Command::EnableSession(Channel::Right)));
    }

    #[test]
    fn test_idle_timeout_disables_after_bound() {
        let config = conditional_config();
        let mut state = SessionState {
            active: true,
            last_toggle_cycle: 100,
        };

        assert_eq!(decide(&mut state, 150, 0.0, &config), None);
        let cmd = decide(&mut state, 151, 0.0, &config);
        assert_eq!(cmd, Some(Command::DisableSession(Channel::Left)));
        assert!(!state.active);
        assert_eq!(state.last_toggle_cycle, 151);
    }

    #[test]
    fn test_idle_reference_moves_only_on_toggle() {
        let config = conditional_config();
        let fast = config.speed_enable_threshold + 10.0;
        let mut state = SessionState::default();

        assert_eq!(
            decide(&mut state, 0, fast, &config),
            Some(Command::EnableSession(Channel::Left))
        );
        // Speed stays high, yet the session still times out and re-arms.
        for cycle in 1..=config.idle_timeout {
            assert_eq!(decide(&mut state, cycle, fast, &config), None);
        }
        let timeout = config.idle_timeout + 1;
        assert_eq!(
            decide(&mut state, timeout, fast, &config),
            Some(Command::DisableSession(Channel::Left))
        );
        assert_eq!(
            decide(&mut state, timeout + 1, fast, &config),
            Some(Command::EnableSession(Channel::Left))
        );
        assert_eq!(state.last_toggle_cycle, timeout + 1);
    }

    #[test]
    fn test_always_on_never_disables() {
        let mut state = SessionState {
            active: true,
            last_toggle_cycle: 0,
        };
        let config = MonitorConfig::default();
        for cycle in 0..1_000 {
            assert_eq!(decide(&mut state, cycle, 0.0, &config), None);
        }
        assert!(state.active);
    }

    #[test]
    fn test_policy_argument_overrides_config() {
        let config = MonitorConfig::default();
        let mut state = SessionState::default();
        assert_eq!(decide_session(Channel::Right, &mut state, 0, 0.0, false, &config), None);
    }
}

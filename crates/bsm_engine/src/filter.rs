//! Debounce filter: level-triggered threshold detector with a freshness
//! watchdog.
//!
//! A single over-threshold sample raises the warning immediately. The warning
//! is retracted when the reading drops below the threshold, and independently
//! when the reading has not changed for `decay_reset` cycles.

use contracts::{Channel, ChannelMap, MonitorConfig, SignalSnapshot};
use serde::Serialize;

/// Filter state of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FilterState {
    /// Last stored first distance (0 after a stale reset)
    pub last_d1: f64,
    /// Last stored second distance (0 after a stale reset)
    pub last_d2: f64,
    /// Cycles left before the reading is considered stale
    pub decay_counter: u32,
    /// Published warning
    pub warning: bool,
}

/// Result of feeding one snapshot to the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// A required signal is absent; no state changed
    SignalAbsent,
    /// Snapshot applied
    Applied {
        /// Channel whose hold timer was refreshed
        refreshed: Option<Channel>,
        /// Channels that went stale this cycle
        stale: ChannelMap<bool>,
    },
}

/// Apply a reading addressed to `channel`
///
/// Any change of either distance refreshes the hold timer, whether or not it
/// crosses the threshold. Returns true when the timer was refreshed.
pub fn apply_reading(
    state: &mut FilterState,
    distance_1: f64,
    distance_2: f64,
    decay_reset: u32,
    threshold: f64,
) -> bool {
    let changed = distance_1 != state.last_d1 || distance_2 != state.last_d2;
    if changed {
        state.last_d1 = distance_1;
        state.last_d2 = distance_2;
        state.decay_counter = decay_reset;
    }
    state.warning = distance_1 > threshold || distance_2 > threshold;
    changed
}

/// Retract the warning of a channel whose hold timer is exhausted
///
/// Returns true when the state was live before this call.
fn retract_if_stale(state: &mut FilterState, was_live: bool) -> bool {
    if state.decay_counter > 0 {
        return false;
    }
    state.warning = false;
    state.last_d1 = 0.0;
    state.last_d2 = 0.0;
    was_live
}

/// Per-channel debounce filter
#[derive(Debug, Clone)]
pub struct DebounceFilter {
    states: ChannelMap<FilterState>,
    decay_reset: u32,
    threshold: f64,
}

impl DebounceFilter {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            states: ChannelMap::default(),
            decay_reset: config.decay_reset,
            threshold: config.distance_threshold,
        }
    }

    /// Feed the snapshot of one cycle
    ///
    /// Both hold timers age by one cycle, then the reading is applied to the
    /// channel named by the side indicator. A timer that reaches zero forces
    /// the warning off and clears the stored distances. Indicators naming
    /// neither channel still age both timers.
    pub fn update(&mut self, snapshot: &SignalSnapshot) -> FilterOutcome {
        let Some((distance_1, distance_2, side)) = snapshot.complete() else {
            return FilterOutcome::SignalAbsent;
        };

        let was_live = self.states.map(|s| s.decay_counter > 0);
        for (_, state) in self.states.iter_mut() {
            state.decay_counter = state.decay_counter.saturating_sub(1);
        }

        let mut refreshed = None;
        if let Some(channel) = Channel::from_marker(side) {
            let state = &mut self.states[channel];
            if apply_reading(state, distance_1, distance_2, self.decay_reset, self.threshold) {
                refreshed = Some(channel);
            }
        }

        let mut stale = ChannelMap::default();
        for (channel, state) in self.states.iter_mut() {
            stale[channel] = retract_if_stale(state, was_live[channel]);
        }

        FilterOutcome::Applied { refreshed, stale }
    }

    pub fn state(&self, channel: Channel) -> &FilterState {
        &self.states[channel]
    }

    pub fn states(&self) -> &ChannelMap<FilterState> {
        &self.states
    }

    pub fn warnings(&self) -> ChannelMap<bool> {
        self.states.map(|s| s.warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: u8 = 0x41;
    const RIGHT: u8 = 0x42;

    fn filter() -> DebounceFilter {
        DebounceFilter::new(&MonitorConfig::default())
    }

    #[test]
    fn test_absent_signal_keeps_state() {
        let mut f = filter();
        f.update(&SignalSnapshot::new(12.0, 3.0, LEFT));
        let before = *f.state(Channel::Left);

        let partial = SignalSnapshot {
            distance_1: Some(1.0),
            distance_2: None,
            side_indicator: Some(LEFT),
        };
        assert_eq!(f.update(&partial), FilterOutcome::SignalAbsent);
        assert_eq!(*f.state(Channel::Left), before);
    }

    #[test]
    fn test_single_sample_raises_warning_immediately() {
        let mut f = filter();
        let outcome = f.update(&SignalSnapshot::new(12.0, 3.0, LEFT));

        assert!(matches!(
            outcome,
            FilterOutcome::Applied {
                refreshed: Some(Channel::Left),
                ..
            }
        ));
        let left = f.state(Channel::Left);
        assert!(left.warning);
        assert_eq!(left.decay_counter, 100);
        assert!(!f.state(Channel::Right).warning);
    }

    #[test]
    fn test_below_threshold_change_refreshes_without_warning() {
        let mut f = filter();
        f.update(&SignalSnapshot::new(12.0, 3.0, RIGHT));
        f.update(&SignalSnapshot::new(4.0, 3.0, RIGHT));

        let right = f.state(Channel::Right);
        assert!(!right.warning);
        assert_eq!(right.decay_counter, 100);
        assert_eq!(right.last_d1, 4.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut f = filter();
        f.update(&SignalSnapshot::new(10.0, 10.0, LEFT));
        assert!(!f.state(Channel::Left).warning);
    }

    #[test]
    fn test_unchanged_reading_goes_stale() {
        let mut f = filter();
        let snapshot = SignalSnapshot::new(12.0, 3.0, LEFT);
        f.update(&snapshot);

        for _ in 1..100 {
            f.update(&snapshot);
            assert!(f.state(Channel::Left).warning);
        }

        let outcome = f.update(&snapshot);
        let left = f.state(Channel::Left);
        assert!(!left.warning);
        assert_eq!(left.decay_counter, 0);
        assert_eq!(left.last_d1, 0.0);
        assert_eq!(left.last_d2, 0.0);
        match outcome {
            FilterOutcome::Applied { stale, .. } => {
                assert!(stale[Channel::Left]);
                assert!(!stale[Channel::Right]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_other_side_readings_age_channel() {
        let mut f = filter();
        f.update(&SignalSnapshot::new(15.0, 0.0, LEFT));

        for i in 0..99 {
            f.update(&SignalSnapshot::new(f64::from(i), 1.0, RIGHT));
        }
        assert_eq!(f.state(Channel::Left).decay_counter, 1);
        assert!(f.state(Channel::Left).warning);

        f.update(&SignalSnapshot::new(99.0, 1.0, RIGHT));
        assert!(!f.state(Channel::Left).warning);
        assert!(f.state(Channel::Right).warning);
    }

    #[test]
    fn test_unknown_side_only_ages() {
        let mut f = filter();
        f.update(&SignalSnapshot::new(12.0, 0.0, LEFT));
        let outcome = f.update(&SignalSnapshot::new(50.0, 50.0, 0x43));

        assert!(matches!(
            outcome,
            FilterOutcome::Applied { refreshed: None, .. }
        ));
        assert_eq!(f.state(Channel::Left).decay_counter, 99);
        assert_eq!(f.state(Channel::Left).last_d1, 12.0);
        assert!(!f.state(Channel::Right).warning);
    }

    #[test]
    fn test_stale_reading_retriggers_after_reset() {
        let mut f = filter();
        let snapshot = SignalSnapshot::new(12.0, 3.0, LEFT);
        for _ in 0..=100 {
            f.update(&snapshot);
        }
        assert!(!f.state(Channel::Left).warning);

        // Stored distances were cleared, so the same reading counts as a change.
        f.update(&snapshot);
        assert!(f.state(Channel::Left).warning);
        assert_eq!(f.state(Channel::Left).decay_counter, 100);
    }
}

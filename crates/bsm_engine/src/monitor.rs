//! Monitor: per-cycle composition of session, poll, and filter logic.

use contracts::{
    Channel, ChannelMap, Command, CycleInput, MonitorConfig, SignalSnapshot, StepMeta,
    StepOutcome,
};
use serde::Serialize;
use tracing::{debug, info, instrument, trace};

use crate::filter::{DebounceFilter, FilterOutcome, FilterState};
use crate::poll::{decide_poll, PollState};
use crate::session::{decide_session, SessionState};

/// Point-in-time copy of all per-channel state
#[derive(Debug, Clone, Serialize)]
pub struct MonitorDiagnostics {
    pub last_cycle: Option<u64>,
    pub sessions: ChannelMap<SessionState>,
    pub polls: ChannelMap<PollState>,
    pub filters: ChannelMap<FilterState>,
}

/// Dual-channel blind-spot monitor
///
/// Owns all per-channel state exclusively. Driven by exactly one caller that
/// invokes [`Monitor::step`] once per control cycle.
#[derive(Debug, Clone)]
pub struct Monitor {
    config: MonitorConfig,
    sessions: ChannelMap<SessionState>,
    polls: ChannelMap<PollState>,
    filter: DebounceFilter,
    /// Last processed cycle (duplicate guard)
    last_cycle: Option<u64>,
}

impl Monitor {
    /// Create a monitor with inactive sessions and zeroed filters
    pub fn new(config: MonitorConfig) -> Self {
        let filter = DebounceFilter::new(&config);
        Self {
            config,
            sessions: ChannelMap::default(),
            polls: ChannelMap::default(),
            filter,
            last_cycle: None,
        }
    }

    /// Step with the configured `always_on` policy
    pub fn step_input(&mut self, input: &CycleInput) -> StepOutcome {
        let always_on = self.config.always_on;
        self.step(input.cycle_index, &input.snapshot, input.vego, always_on)
    }

    /// Run one control cycle
    ///
    /// Session then poll for LEFT, the same pair for RIGHT, then the filter
    /// once over the snapshot. A `cycle_index` that is not newer than the last
    /// processed one changes nothing and emits nothing.
    #[instrument(
        level = "trace",
        name = "monitor_step",
        skip(self, snapshot),
        fields(cycle = cycle_index)
    )]
    pub fn step(
        &mut self,
        cycle_index: u64,
        snapshot: &SignalSnapshot,
        vego: f64,
        always_on: bool,
    ) -> StepOutcome {
        if self.last_cycle.is_some_and(|last| cycle_index <= last) {
            debug!(
                cycle = cycle_index,
                last_cycle = ?self.last_cycle,
                "cycle already processed, skipping"
            );
            return StepOutcome {
                cycle_index,
                commands: Vec::new(),
                warnings: self.filter.warnings(),
                meta: StepMeta {
                    duplicate: true,
                    ..Default::default()
                },
            };
        }
        self.last_cycle = Some(cycle_index);

        let mut commands = Vec::with_capacity(4);
        for channel in Channel::ALL {
            self.step_channel(channel, cycle_index, vego, always_on, &mut commands);
        }

        let meta = self.update_filter(snapshot);

        StepOutcome {
            cycle_index,
            commands,
            warnings: self.filter.warnings(),
            meta,
        }
    }

    fn step_channel(
        &mut self,
        channel: Channel,
        cycle_index: u64,
        vego: f64,
        always_on: bool,
        commands: &mut Vec<Command>,
    ) {
        let session = &mut self.sessions[channel];
        if let Some(command) =
            decide_session(channel, session, cycle_index, vego, always_on, &self.config)
        {
            info!(
                channel = %channel,
                command = %command,
                cycle = cycle_index,
                vego,
                "session toggled"
            );
            record_session_gauge(channel, session.active);
            commands.push(command);
        }

        if !session.active {
            return;
        }

        if let Some(command) = decide_poll(
            channel,
            &mut self.polls[channel],
            cycle_index,
            self.config.poll_period,
            self.config.phase_offset(channel),
        ) {
            trace!(channel = %channel, cycle = cycle_index, "poll due");
            commands.push(command);
        }
    }

    fn update_filter(&mut self, snapshot: &SignalSnapshot) -> StepMeta {
        match self.filter.update(snapshot) {
            FilterOutcome::SignalAbsent => {
                trace!("blind-spot signals not yet received");
                StepMeta {
                    signal_absent: true,
                    ..Default::default()
                }
            }
            FilterOutcome::Applied { refreshed, stale } => {
                for (channel, went_stale) in stale.iter() {
                    if *went_stale {
                        debug!(channel = %channel, "reading went stale, warning retracted");
                    }
                }
                StepMeta {
                    refreshed,
                    stale,
                    ..Default::default()
                }
            }
        }
    }

    /// Disable every active session
    ///
    /// Returns the disable commands, LEFT first. Filter state is untouched.
    #[instrument(name = "monitor_shutdown", skip(self))]
    pub fn shutdown(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        for (channel, session) in self.sessions.iter_mut() {
            if !session.active {
                continue;
            }
            session.active = false;
            if let Some(last) = self.last_cycle {
                session.last_toggle_cycle = last;
            }
            record_session_gauge(channel, false);
            commands.push(Command::DisableSession(channel));
        }
        info!(disabled = commands.len(), "monitor shut down");
        commands
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn session(&self, channel: Channel) -> &SessionState {
        &self.sessions[channel]
    }

    pub fn poll_state(&self, channel: Channel) -> &PollState {
        &self.polls[channel]
    }

    pub fn filter_state(&self, channel: Channel) -> &FilterState {
        self.filter.state(channel)
    }

    /// Current warnings, LEFT and RIGHT
    pub fn warnings(&self) -> ChannelMap<bool> {
        self.filter.warnings()
    }

    pub fn last_cycle(&self) -> Option<u64> {
        self.last_cycle
    }

    pub fn diagnostics(&self) -> MonitorDiagnostics {
        MonitorDiagnostics {
            last_cycle: self.last_cycle,
            sessions: self.sessions,
            polls: self.polls,
            filters: *self.filter.states(),
        }
    }
}

fn record_session_gauge(channel: Channel, active: bool) {
    metrics::gauge!("bsm_session_active", "channel" => channel.as_str())
        .set(if active { 1.0 } else { 0.0 });
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: u8 = 0x41;
    const RIGHT: u8 = 0x42;

    fn no_signal() -> SignalSnapshot {
        SignalSnapshot::default()
    }

    fn polls(outcome: &StepOutcome) -> Vec<Channel> {
        outcome
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Poll(channel) => Some(*channel),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_cycle_enables_and_polls_left() {
        let mut monitor = Monitor::new(MonitorConfig::default());
        let outcome = monitor.step(0, &no_signal(), 0.0, true);

        assert_eq!(
            outcome.commands,
            vec![
                Command::EnableSession(Channel::Left),
                Command::Poll(Channel::Left),
                Command::EnableSession(Channel::Right),
            ]
        );
        assert!(outcome.meta.signal_absent);
        assert!(!outcome.left_warning());
        assert!(!outcome.right_warning());
    }

    #[test]
    fn test_polls_every_period_with_interleaved_phases() {
        let mut monitor = Monitor::new(MonitorConfig::default());
        let mut left = Vec::new();
        let mut right = Vec::new();

        for cycle in 0..100 {
            let outcome = monitor.step(cycle, &no_signal(), 0.0, true);
            for channel in polls(&outcome) {
                match channel {
                    Channel::Left => left.push(cycle),
                    Channel::Right => right.push(cycle),
                }
            }
        }

        assert_eq!(left, vec![0, 20, 40, 60, 80]);
        assert_eq!(right, vec![10, 30, 50, 70, 90]);
    }

    #[test]
    fn test_low_speed_without_always_on_never_enables() {
        let mut monitor = Monitor::new(MonitorConfig::default());
        for cycle in 0..500 {
            let outcome = monitor.step(cycle, &no_signal(), 0.0, false);
            assert!(outcome.commands.is_empty(), "cycle {cycle}: {:?}", outcome.commands);
        }
        assert!(!monitor.session(Channel::Left).active);
    }

    #[test]
    fn test_disable_after_idle_timeout() {
        let mut monitor = Monitor::new(MonitorConfig::default());
        let first = monitor.step(0, &no_signal(), 10.0, false);
        assert!(first.commands.contains(&Command::EnableSession(Channel::Left)));

        for cycle in 1..=50 {
            let outcome = monitor.step(cycle, &no_signal(), 0.0, false);
            assert!(!outcome
                .commands
                .iter()
                .any(|c| matches!(c, Command::DisableSession(_))));
        }

        let outcome = monitor.step(51, &no_signal(), 0.0, false);
        assert_eq!(
            outcome.commands,
            vec![
                Command::DisableSession(Channel::Left),
                Command::DisableSession(Channel::Right),
            ]
        );
        assert!(!monitor.session(Channel::Right).active);
    }

    #[test]
    fn test_no_poll_after_disable_in_same_cycle() {
        let config = MonitorConfig {
            poll_period: 10,
            idle_timeout: 19,
            ..Default::default()
        };
        let mut monitor = Monitor::new(config);
        monitor.step(0, &no_signal(), 10.0, false);
        for cycle in 1..20 {
            monitor.step(cycle, &no_signal(), 0.0, false);
        }

        // Cycle 20 is a LEFT poll phase, but the session closes first.
        let outcome = monitor.step(20, &no_signal(), 0.0, false);
        assert!(polls(&outcome).is_empty());
        assert!(outcome
            .commands
            .contains(&Command::DisableSession(Channel::Left)));
    }

    #[test]
    fn test_detection_scenario_with_stale_retraction() {
        let mut monitor = Monitor::new(MonitorConfig::default());
        let snapshot = SignalSnapshot::new(12.0, 3.0, LEFT);

        let outcome = monitor.step(0, &snapshot, 0.0, true);
        assert!(outcome.left_warning());
        assert_eq!(outcome.meta.refreshed, Some(Channel::Left));
        assert_eq!(monitor.filter_state(Channel::Left).decay_counter, 100);

        for cycle in 1..100 {
            assert!(monitor.step(cycle, &snapshot, 0.0, true).left_warning());
        }

        let outcome = monitor.step(100, &snapshot, 0.0, true);
        assert!(!outcome.left_warning());
        assert!(outcome.meta.stale[Channel::Left]);
        let left = monitor.filter_state(Channel::Left);
        assert_eq!(left.last_d1, 0.0);
        assert_eq!(left.last_d2, 0.0);
    }

    #[test]
    fn test_duplicate_cycle_does_not_decrement_twice() {
        let mut monitor = Monitor::new(MonitorConfig::default());
        let snapshot = SignalSnapshot::new(20.0, 0.0, RIGHT);

        monitor.step(0, &snapshot, 0.0, true);
        monitor.step(1, &snapshot, 0.0, true);
        assert_eq!(monitor.filter_state(Channel::Right).decay_counter, 99);

        let repeated = monitor.step(1, &snapshot, 0.0, true);
        assert!(repeated.meta.duplicate);
        assert!(repeated.commands.is_empty());
        assert!(repeated.right_warning());
        assert_eq!(monitor.filter_state(Channel::Right).decay_counter, 99);
    }

    #[test]
    fn test_shutdown_disables_active_sessions() {
        let mut monitor = Monitor::new(MonitorConfig::default());
        monitor.step(0, &no_signal(), 0.0, true);

        let commands = monitor.shutdown();
        assert_eq!(
            commands,
            vec![
                Command::DisableSession(Channel::Left),
                Command::DisableSession(Channel::Right),
            ]
        );
        assert!(monitor.shutdown().is_empty());
    }

    #[test]
    fn test_step_input_uses_configured_policy() {
        let config = MonitorConfig {
            always_on: false,
            ..Default::default()
        };
        let mut monitor = Monitor::new(config);
        let outcome = monitor.step_input(&CycleInput {
            cycle_index: 0,
            snapshot: no_signal(),
            vego: 1.0,
        });
        assert!(outcome.commands.is_empty());
    }

    #[test]
    fn test_channels_hold_independent_state() {
        let mut monitor = Monitor::new(MonitorConfig::default());
        monitor.step(0, &SignalSnapshot::new(30.0, 0.0, LEFT), 0.0, true);
        let outcome = monitor.step(1, &SignalSnapshot::new(2.0, 1.0, RIGHT), 0.0, true);

        assert!(outcome.left_warning());
        assert!(!outcome.right_warning());
        let diag = monitor.diagnostics();
        assert_eq!(diag.filters[Channel::Left].last_d1, 30.0);
        assert_eq!(diag.filters[Channel::Right].last_d1, 2.0);
        assert_eq!(diag.last_cycle, Some(1));
    }
}

//! Monitor metric recorders and run aggregation
//!
//! Step outcomes feed both the `metrics` facade (exported by Prometheus when
//! enabled) and an in-memory [`RunAggregator`] used for the end-of-run report.

use contracts::{Channel, ChannelMap, CommandKind, StepOutcome};
use metrics::{counter, gauge, histogram};

/// Record the metrics for one monitor step
pub fn record_step_metrics(outcome: &StepOutcome) {
    if outcome.meta.duplicate {
        counter!("bsm_duplicate_cycles_total").increment(1);
        return;
    }

    counter!("bsm_cycles_total").increment(1);
    gauge!("bsm_last_cycle_index").set(outcome.cycle_index as f64);

    for command in &outcome.commands {
        counter!(
            "bsm_commands_total",
            "channel" => command.channel().as_str(),
            "kind" => command.kind().as_str()
        )
        .increment(1);
    }

    for (channel, warning) in outcome.warnings.iter() {
        gauge!("bsm_warning_active", "channel" => channel.as_str())
            .set(if *warning { 1.0 } else { 0.0 });
    }

    for (channel, stale) in outcome.meta.stale.iter() {
        if *stale {
            counter!("bsm_stale_resets_total", "channel" => channel.as_str()).increment(1);
        }
    }

    if outcome.meta.signal_absent {
        counter!("bsm_signal_absent_cycles_total").increment(1);
    }
}

/// Record a sink's delivery totals once its worker has drained
pub fn record_frames_dispatched(sink_name: &str, written: u64, failed: u64) {
    for (status, count) in [("success", written), ("failure", failed)] {
        if count > 0 {
            counter!(
                "bsm_frames_dispatched_total",
                "sink" => sink_name.to_string(),
                "status" => status
            )
            .increment(count);
        }
    }
}

/// Record requests a sink discarded because its queue was full
pub fn record_frames_dropped(sink_name: &str, kind: &'static str, count: u64) {
    counter!(
        "bsm_frames_dropped_total",
        "sink" => sink_name.to_string(),
        "kind" => kind
    )
    .increment(count);
}

/// Record how long one control cycle took
pub fn record_step_latency_us(latency_us: f64) {
    histogram!("bsm_step_latency_us").record(latency_us);
}

/// Command totals by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandTotals {
    pub enable: u64,
    pub disable: u64,
    pub poll: u64,
}

impl CommandTotals {
    fn bump(&mut self, kind: CommandKind) {
        match kind {
            CommandKind::Enable => self.enable += 1,
            CommandKind::Disable => self.disable += 1,
            CommandKind::Poll => self.poll += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.enable + self.disable + self.poll
    }
}

/// Warning activity of one channel over a run
#[derive(Debug, Clone, Default)]
pub struct WarningTotals {
    /// Cycles that ended with the warning raised
    pub active_cycles: u64,
    /// Transitions from clear to raised
    pub rising_edges: u64,
    /// Hold timer expiries
    pub stale_resets: u64,
    /// Length in cycles of each completed warning episode
    pub episodes: RunningStats,
}

/// In-memory run totals
#[derive(Debug, Clone, Default)]
pub struct RunAggregator {
    cycles: u64,
    duplicates: u64,
    signal_absent: u64,
    commands: ChannelMap<CommandTotals>,
    warnings: ChannelMap<WarningTotals>,
    previous: ChannelMap<bool>,
    episode_len: ChannelMap<u64>,
    latency_us: RunningStats,
}

impl RunAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one step outcome into the totals
    pub fn update(&mut self, outcome: &StepOutcome) {
        if outcome.meta.duplicate {
            self.duplicates += 1;
            return;
        }

        self.cycles += 1;
        if outcome.meta.signal_absent {
            self.signal_absent += 1;
        }

        for command in &outcome.commands {
            self.commands[command.channel()].bump(command.kind());
        }

        for channel in Channel::ALL {
            let raised = outcome.warnings[channel];
            let totals = &mut self.warnings[channel];

            if outcome.meta.stale[channel] {
                totals.stale_resets += 1;
            }

            if raised {
                totals.active_cycles += 1;
                self.episode_len[channel] += 1;
                if !self.previous[channel] {
                    totals.rising_edges += 1;
                }
            } else if self.previous[channel] {
                totals.episodes.push(self.episode_len[channel] as f64);
                self.episode_len[channel] = 0;
            }

            self.previous[channel] = raised;
        }
    }

    /// Record the wall time spent in one control cycle
    pub fn record_latency_us(&mut self, latency_us: f64) {
        self.latency_us.push(latency_us);
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn commands(&self, channel: Channel) -> CommandTotals {
        self.commands[channel]
    }

    pub fn warnings(&self, channel: Channel) -> &WarningTotals {
        &self.warnings[channel]
    }

    /// Generate the end-of-run report
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.cycles,
            duplicates: self.duplicates,
            signal_absent: self.signal_absent,
            commands: self.commands,
            warnings: self.warnings.map(|totals| ChannelReport {
                active_cycles: totals.active_cycles,
                rising_edges: totals.rising_edges,
                stale_resets: totals.stale_resets,
                episode_cycles: StatsSummary::from(&totals.episodes),
            }),
            step_latency_us: StatsSummary::from(&self.latency_us),
        }
    }
}

/// Per-channel part of [`RunSummary`]
#[derive(Debug, Clone, Default)]
pub struct ChannelReport {
    pub active_cycles: u64,
    pub rising_edges: u64,
    pub stale_resets: u64,
    pub episode_cycles: StatsSummary,
}

/// End-of-run report
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub cycles: u64,
    pub duplicates: u64,
    pub signal_absent: u64,
    pub commands: ChannelMap<CommandTotals>,
    pub warnings: ChannelMap<ChannelReport>,
    pub step_latency_us: StatsSummary,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Blind-Spot Monitor Run Summary ===")?;
        writeln!(f, "Cycles: {}", self.cycles)?;
        writeln!(f, "Duplicate cycles skipped: {}", self.duplicates)?;
        writeln!(f, "Cycles with absent signals: {}", self.signal_absent)?;
        for channel in Channel::ALL {
            let commands = &self.commands[channel];
            let warnings = &self.warnings[channel];
            writeln!(f, "[{}]", channel)?;
            writeln!(
                f,
                "  commands: enable={} disable={} poll={}",
                commands.enable, commands.disable, commands.poll
            )?;
            writeln!(
                f,
                "  warning: {} cycles, {} episodes, {} stale resets",
                warnings.active_cycles, warnings.rising_edges, warnings.stale_resets
            )?;
            writeln!(f, "  episode length (cycles): {}", warnings.episode_cycles)?;
        }
        writeln!(f, "Step latency (us): {}", self.step_latency_us)?;
        Ok(())
    }
}

/// Summary of a [`RunningStats`]
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1} (n={})",
                self.min, self.max, self.mean, self.count
            )
        }
    }
}

/// Streaming min / max / mean
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

//! Control loop - drives the controller from a signal source and forwards
//! request frames to the dispatcher.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bsm_engine::BsmController;
use contracts::{BusFrame, Channel, ChannelMap, Command, MonitorBlueprint};
use ingestion::{ReplaySource, SnapshotSource};
use observability::{
    record_frames_dispatched, record_frames_dropped, record_step_latency_us, record_step_metrics,
};
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{info, warn};

use super::{PipelineStats, StopReason};

/// Control loop configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Loaded and validated configuration
    pub blueprint: MonitorBlueprint,

    /// Recorded signals
    pub replay_path: PathBuf,

    /// Maximum number of cycles (None = until end of input)
    pub max_cycles: Option<u64>,

    /// Pace cycles at `control_loop.rate_hz`
    pub realtime: bool,

    /// Frame channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main control loop
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Open the replay file and run until it is exhausted or `shutdown` fires
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<PipelineStats> {
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        let source = ReplaySource::from_path(&self.config.replay_path).with_context(|| {
            format!(
                "Failed to load replay from {}",
                self.config.replay_path.display()
            )
        })?;
        info!(cycles = source.len(), "Replay loaded");

        self.run_with_source(source, shutdown).await
    }

    /// Run over any signal source
    pub async fn run_with_source<S: SnapshotSource>(
        self,
        mut source: S,
        shutdown: impl Future<Output = ()>,
    ) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        let mut controller = BsmController::new(
            blueprint.monitor.clone(),
            blueprint.vehicle.capability_flags,
        );
        if !controller.enabled() {
            warn!(
                capability_flags = blueprint.vehicle.capability_flags.0,
                "Vehicle lacks the enhanced blind-spot capability, no requests will be sent"
            );
        }

        let mut ticker = if self.config.realtime {
            let mut ticker = interval(cycle_period(blueprint.control_loop.rate_hz)?);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(ticker)
        } else {
            None
        };

        let (frame_tx, frame_rx) = mpsc::channel::<BusFrame>(self.config.buffer_size);
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - request frames will be dropped");
        }
        let dispatcher = dispatcher::create_dispatcher(&blueprint.sinks, frame_rx)
            .context("Failed to create dispatcher")?;
        let dispatcher_handle = dispatcher.spawn();

        let mut stats = PipelineStats {
            source: source.name().to_string(),
            active_sinks: blueprint.sinks.len(),
            ..Default::default()
        };
        let mut published = ChannelMap::<bool>::default();

        info!(
            source = %stats.source,
            max_cycles = ?self.config.max_cycles,
            realtime = self.config.realtime,
            "Control loop running"
        );

        tokio::pin!(shutdown);
        stats.stop_reason = loop {
            if let Some(max) = self.config.max_cycles {
                if stats.cycles >= max {
                    info!(cycles = stats.cycles, "Reached max cycles limit");
                    break StopReason::MaxCycles;
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping control loop");
                    break StopReason::Signal;
                }
                _ = pace(&mut ticker) => {}
            }

            let Some(input) = source.next_input() else {
                break StopReason::EndOfInput;
            };

            let started = Instant::now();
            let outcome = controller.update(&input);
            let latency_us = started.elapsed().as_secs_f64() * 1e6;

            record_step_metrics(&outcome);
            record_step_latency_us(latency_us);
            stats.run.update(&outcome);
            stats.run.record_latency_us(latency_us);
            stats.cycles += 1;

            for channel in Channel::ALL {
                if outcome.warnings[channel] != published[channel] {
                    info!(
                        cycle = outcome.cycle_index,
                        channel = %channel,
                        warning = outcome.warnings[channel],
                        "Blind-spot warning changed"
                    );
                }
            }
            published = outcome.warnings;

            if !forward(&frame_tx, &outcome.commands, &mut stats.frames_sent).await {
                warn!("Dispatcher channel closed");
                break StopReason::DispatcherClosed;
            }
        };

        if blueprint.control_loop.disable_on_shutdown {
            let commands = controller.shutdown();
            if !commands.is_empty() {
                info!(sessions = commands.len(), "Disabling active sessions");
            }
            let mut sent = 0;
            if !forward(&frame_tx, &commands, &mut sent).await {
                warn!(
                    pending = commands.len() as u64 - sent,
                    "Dispatcher closed before shutdown requests were sent"
                );
            }
            stats.shutdown_frames = sent;
            stats.frames_sent += sent;
        }

        info!("Shutting down control loop...");
        drop(frame_tx);

        match tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await {
            Ok(Ok(report)) => {
                for (sink, snapshot) in &report {
                    record_frames_dispatched(sink, snapshot.write_count, snapshot.failure_count);
                    for (kind, count) in snapshot.dropped.labelled() {
                        record_frames_dropped(sink, kind, count);
                    }
                }
                stats.sinks = report;
            }
            Ok(Err(e)) => warn!(error = %e, "Dispatcher task failed"),
            Err(_) => warn!("Timed out waiting for sinks to drain"),
        }

        stats.duration = start_time.elapsed();
        info!(
            cycles = stats.cycles,
            frames = stats.frames_sent,
            stop_reason = %stats.stop_reason,
            duration_secs = stats.duration.as_secs_f64(),
            "Control loop shutdown complete"
        );

        Ok(stats)
    }
}

/// Interval between cycles at the given rate
fn cycle_period(rate_hz: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(1.0 / rate_hz)
        .with_context(|| format!("control_loop.rate_hz {rate_hz} has no usable cycle period"))
}

/// Wait for the next tick, or just yield when running unpaced
async fn pace(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => tokio::task::yield_now().await,
    }
}

/// Encode and send commands in order; false once the dispatcher is gone
async fn forward(tx: &mpsc::Sender<BusFrame>, commands: &[Command], sent: &mut u64) -> bool {
    for frame in dispatcher::encode_all(commands) {
        if tx.send(frame).await.is_err() {
            return false;
        }
        *sent += 1;
    }
    true
}

//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{CapabilityFlags, Channel, MonitorBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    monitor: MonitorInfo,
    vehicle: VehicleInfo,
    control_loop: ControlLoopInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct MonitorInfo {
    poll_period: u64,
    idle_timeout: u64,
    decay_reset: u32,
    distance_threshold: f64,
    speed_enable_threshold: f64,
    always_on: bool,
    left_phase: u64,
    right_phase: u64,
}

#[derive(Serialize)]
struct VehicleInfo {
    capability_flags: u32,
    enhanced_bsm: bool,
}

#[derive(Serialize)]
struct ControlLoopInfo {
    rate_hz: f64,
    disable_on_shutdown: bool,
    /// Time between polls of one side
    poll_interval_ms: f64,
    /// How long a warning survives without a changed reading
    warning_hold_ms: f64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn cycles_to_ms(cycles: f64, rate_hz: f64) -> f64 {
    cycles / rate_hz * 1000.0
}

fn build_config_info(blueprint: &MonitorBlueprint) -> ConfigInfo {
    let monitor = &blueprint.monitor;
    let rate_hz = blueprint.control_loop.rate_hz;
    let flags = blueprint.vehicle.capability_flags;

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        monitor: MonitorInfo {
            poll_period: monitor.poll_period,
            idle_timeout: monitor.idle_timeout,
            decay_reset: monitor.decay_reset,
            distance_threshold: monitor.distance_threshold,
            speed_enable_threshold: monitor.speed_enable_threshold,
            always_on: monitor.always_on,
            left_phase: monitor.phase_offset(Channel::Left),
            right_phase: monitor.phase_offset(Channel::Right),
        },
        vehicle: VehicleInfo {
            capability_flags: flags.0,
            enhanced_bsm: flags.contains(CapabilityFlags::ENHANCED_BSM),
        },
        control_loop: ControlLoopInfo {
            rate_hz,
            disable_on_shutdown: blueprint.control_loop.disable_on_shutdown,
            poll_interval_ms: cycles_to_ms(monitor.poll_period as f64, rate_hz),
            warning_hold_ms: cycles_to_ms(f64::from(monitor.decay_reset), rate_hz),
        },
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect(),
    }
}

fn print_config_info(info: &ConfigInfo) {
    let monitor = &info.monitor;
    let control = &info.control_loop;

    println!("=== BSM Monitor Configuration ({}) ===\n", info.version);

    println!("Monitor");
    println!("  Poll period: {} cycles", monitor.poll_period);
    println!(
        "  Phases: left={} right={}",
        monitor.left_phase, monitor.right_phase
    );
    println!("  Idle timeout: {} cycles", monitor.idle_timeout);
    println!("  Decay reset: {} cycles", monitor.decay_reset);
    println!("  Distance threshold: {}", monitor.distance_threshold);
    println!(
        "  Speed enable threshold: {} m/s",
        monitor.speed_enable_threshold
    );
    println!("  Always on: {}", monitor.always_on);

    println!("\nVehicle");
    println!(
        "  Capability flags: {:#x} (enhanced BSM: {})",
        info.vehicle.capability_flags, info.vehicle.enhanced_bsm
    );

    println!("\nControl loop");
    println!("  Rate: {} Hz", control.rate_hz);
    println!("  Poll interval per side: {:.1} ms", control.poll_interval_ms);
    println!("  Warning hold: {:.1} ms", control.warning_hold_ms);
    println!("  Disable on shutdown: {}", control.disable_on_shutdown);

    if !info.sinks.is_empty() {
        println!("\nSinks ({})", info.sinks.len());
        for sink in &info.sinks {
            println!(
                "  - {} ({}, queue {})",
                sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}

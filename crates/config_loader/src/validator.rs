//! Configuration validation
//!
//! Rules:
//! - poll_period, idle_timeout, decay_reset > 0
//! - poll phases < poll_period
//! - thresholds finite and >= 0
//! - control loop rate > 0 with a representable cycle period
//! - sink names non-empty and unique, queue_capacity > 0

use std::collections::HashSet;
use std::time::Duration;

use contracts::{Channel, ContractError, MonitorBlueprint};

/// Validate a MonitorBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    validate_cycle_counts(blueprint)?;
    validate_phases(blueprint)?;
    validate_thresholds(blueprint)?;
    validate_control_loop(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_cycle_counts(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let monitor = &blueprint.monitor;
    let counts = [
        ("monitor.poll_period", monitor.poll_period),
        ("monitor.idle_timeout", monitor.idle_timeout),
        ("monitor.decay_reset", u64::from(monitor.decay_reset)),
    ];
    for (field, value) in counts {
        if value == 0 {
            return Err(ContractError::config_validation(
                field,
                "must be > 0 cycles",
            ));
        }
    }
    Ok(())
}

/// Phase offsets must land inside the poll period, otherwise the channel is
/// never polled
fn validate_phases(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let monitor = &blueprint.monitor;
    for channel in Channel::ALL {
        let phase = monitor.phase_offset(channel);
        if phase >= monitor.poll_period {
            return Err(ContractError::config_validation(
                format!("monitor.{channel}_phase"),
                format!(
                    "phase {phase} must be < poll_period ({})",
                    monitor.poll_period
                ),
            ));
        }
    }
    Ok(())
}

fn validate_thresholds(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let monitor = &blueprint.monitor;
    let thresholds = [
        ("monitor.distance_threshold", monitor.distance_threshold),
        ("monitor.speed_enable_threshold", monitor.speed_enable_threshold),
    ];
    for (field, value) in thresholds {
        if !value.is_finite() || value < 0.0 {
            return Err(ContractError::config_validation(
                field,
                format!("must be finite and >= 0, got {value}"),
            ));
        }
    }
    Ok(())
}

fn validate_control_loop(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let rate = blueprint.control_loop.rate_hz;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ContractError::config_validation(
            "control_loop.rate_hz",
            format!("rate_hz must be > 0, got {rate}"),
        ));
    }
    if Duration::try_from_secs_f64(1.0 / rate).is_err() {
        return Err(ContractError::config_validation(
            "control_loop.rate_hz",
            format!("rate_hz {rate} is too small for a cycle period"),
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

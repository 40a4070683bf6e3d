//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{CapabilityFlags, MonitorBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    poll_period: u64,
    idle_timeout: u64,
    always_on: bool,
    enhanced_bsm: bool,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: Vec::new(),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&blueprint),
            summary: Some(ConfigSummary {
                version: format!("{:?}", blueprint.version),
                poll_period: blueprint.monitor.poll_period,
                idle_timeout: blueprint.monitor.idle_timeout,
                always_on: blueprint.monitor.always_on,
                enhanced_bsm: blueprint
                    .vehicle
                    .capability_flags
                    .contains(CapabilityFlags::ENHANCED_BSM),
                sink_count: blueprint.sinks.len(),
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &MonitorBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let monitor = &blueprint.monitor;

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - request frames will be dropped".to_string());
    }

    if !blueprint
        .vehicle
        .capability_flags
        .contains(CapabilityFlags::ENHANCED_BSM)
    {
        warnings.push(
            "vehicle.capability_flags lacks ENHANCED_BSM - the monitor will stay inactive"
                .to_string(),
        );
    }

    if !monitor.always_on && monitor.idle_timeout < monitor.poll_period {
        warnings.push(format!(
            "monitor.idle_timeout ({}) is shorter than monitor.poll_period ({}) - \
             sessions may close between polls",
            monitor.idle_timeout, monitor.poll_period
        ));
    }

    if u64::from(monitor.decay_reset) < monitor.poll_period {
        warnings.push(format!(
            "monitor.decay_reset ({}) is shorter than monitor.poll_period ({}) - \
             warnings expire before the next poll answer",
            monitor.decay_reset, monitor.poll_period
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Poll period: {} cycles", summary.poll_period);
            println!("  Idle timeout: {} cycles", summary.idle_timeout);
            println!("  Always on: {}", summary.always_on);
            println!("  Enhanced BSM: {}", summary.enhanced_bsm);
            println!("  Sinks: {}", summary.sink_count);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

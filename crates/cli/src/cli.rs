//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// BSM Monitor - debounced dual-channel blind-spot monitor
#[derive(Parser, Debug)]
#[command(
    name = "bsm-monitor",
    author,
    version,
    about = "Debounced dual-channel blind-spot monitor",
    long_about = "Drives the blind-spot sensor session protocol from recorded signal data.\n\n\
                  Opens a diagnostic session per side, polls both sides on interleaved \n\
                  phases, debounces the reported distances into warnings, and writes \n\
                  the request frames to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BSM_MONITOR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BSM_MONITOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor over a recorded drive
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective monitor settings
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "bsm.toml", env = "BSM_MONITOR_CONFIG")]
    pub config: PathBuf,

    /// Recorded signals, one JSON object per cycle
    #[arg(short, long, env = "BSM_MONITOR_REPLAY")]
    pub replay: PathBuf,

    /// Maximum number of cycles to run (0 = until end of input)
    #[arg(long, default_value = "0", env = "BSM_MONITOR_MAX_CYCLES")]
    pub max_cycles: u64,

    /// Pace cycles at the configured control loop rate
    #[arg(long)]
    pub realtime: bool,

    /// Channel buffer size between the control loop and the sinks
    #[arg(long, default_value = "256", env = "BSM_MONITOR_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BSM_MONITOR_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "bsm.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "bsm.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "bsm-monitor",
            "-v",
            "run",
            "--config",
            "cfg.toml",
            "--replay",
            "drive.jsonl",
            "--max-cycles",
            "500",
            "--realtime",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("cfg.toml"));
                assert_eq!(args.replay, PathBuf::from("drive.jsonl"));
                assert_eq!(args.max_cycles, 500);
                assert!(args.realtime);
                assert_eq!(args.metrics_port, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_replay() {
        assert!(Cli::try_parse_from(["bsm-monitor", "run", "--config", "cfg.toml"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["bsm-monitor", "-q", "-v", "info"]).is_err());
    }
}

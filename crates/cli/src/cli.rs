//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sensor Master - live registry of simulated robot sensors
#[derive(Parser, Debug)]
#[command(
    name = "sensor-master",
    author,
    version,
    about = "Live registry of the latest reading of every sensor",
    long_about = "Subscribes a sensor registry to a local world view, drives it with the\n\
                  configured mock feeds and an optional recorded replay, and reports which\n\
                  sensors are ready."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SENSOR_MASTER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SENSOR_MASTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the registry against the configured feeds
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "sensor_master.toml",
        env = "SENSOR_MASTER_CONFIG"
    )]
    pub config: PathBuf,

    /// Stop after this many seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0", env = "SENSOR_MASTER_DURATION")]
    pub duration: u64,

    /// Seconds between readiness reports (0 = no periodic report)
    #[arg(long, default_value = "5")]
    pub report_interval: u64,

    /// Replay a recorded JSON-lines file (overrides [replay].path)
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (overrides [replay].speed_multiplier)
    #[arg(long)]
    pub replay_speed: Option<f64>,

    /// Loop the replay when it reaches the end
    #[arg(long)]
    pub replay_loop: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "SENSOR_MASTER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sensor_master.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sensor_master.toml")]
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
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::try_parse_from([
            "sensor-master",
            "-v",
            "run",
            "--config",
            "demo.toml",
            "--duration",
            "3",
            "--replay",
            "run.jsonl",
            "--replay-speed",
            "2.5",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("demo.toml"));
                assert_eq!(args.duration, 3);
                assert_eq!(args.replay_speed, Some(2.5));
                assert_eq!(args.metrics_port, 0);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["sensor-master", "-q", "-v", "info"]);
        assert!(result.is_err());
    }
}

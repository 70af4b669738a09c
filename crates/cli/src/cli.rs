//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Qibla Compass - prayer-time and Qibla navigation engine
#[derive(Parser, Debug)]
#[command(
    name = "qibla-compass",
    author,
    version,
    about = "Prayer-time and Qibla navigation engine",
    long_about = "Computes the next prayer, the great-circle direction to the Kaaba and\n\
                  a smoothed compass heading, and streams navigation frames to the\n\
                  configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "QIBLA_COMPASS_VERBOSE")]
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
        env = "QIBLA_COMPASS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default tracing level from -v / -q
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the navigation engine and stream frames to the sinks
    Run(RunArgs),

    /// Print the prayer status for one instant
    Status(StatusArgs),

    /// Print the Qibla bearing and distance for one observer
    Qibla(QiblaArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "QIBLA_COMPASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override observer latitude
    #[arg(long, env = "QIBLA_COMPASS_LAT", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Override observer longitude
    #[arg(long, env = "QIBLA_COMPASS_LON", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Replay magnetometer samples from a JSON-lines recording
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Loop the replay recording
    #[arg(long, requires = "replay")]
    pub replay_loop: bool,

    /// Simulated device heading in degrees (mock magnetometer)
    #[arg(long, default_value = "0", conflicts_with = "replay", allow_hyphen_values = true)]
    pub heading: f64,

    /// Rotate the simulated heading by this many degrees per sample
    #[arg(long, conflicts_with = "replay", allow_hyphen_values = true)]
    pub rotate: Option<f64>,

    /// Run without a magnetometer
    #[arg(long, conflicts_with_all = ["replay", "rotate"])]
    pub no_magnetometer: bool,

    /// Maximum number of frames to produce (0 = unlimited)
    #[arg(long, default_value = "0", env = "QIBLA_COMPASS_MAX_FRAMES")]
    pub max_frames: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "QIBLA_COMPASS_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "QIBLA_COMPASS_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "QIBLA_COMPASS_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `status` command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Path to configuration file providing the timetable
    #[arg(short, long, env = "QIBLA_COMPASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Raw provider response (JSON), overrides the configured timetable
    #[arg(long)]
    pub timetable: Option<PathBuf>,

    /// Reference local time, "YYYY-MM-DD HH:MM[:SS]" (default: now)
    #[arg(long)]
    pub at: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `qibla` command
#[derive(Parser, Debug)]
pub struct QiblaArgs {
    /// Observer latitude in degrees
    #[arg(long, env = "QIBLA_COMPASS_LAT", allow_hyphen_values = true)]
    pub lat: f64,

    /// Observer longitude in degrees
    #[arg(long, env = "QIBLA_COMPASS_LON", allow_hyphen_values = true)]
    pub lon: f64,

    /// Device heading in degrees, adds the alignment tier
    #[arg(long, allow_hyphen_values = true)]
    pub heading: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the normalized timetable
    #[arg(long)]
    pub timetable: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
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

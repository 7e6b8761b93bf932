//! CLI arguments and subcommands for mmapbench-live.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "mmapbench-live",
    about = "Live dashboard server for mmapbench output",
    long_about = "Live dashboard server for mmapbench output.\n\n\
                  Reads benchmark CSV rows from stdin or a file, samples per-core CPU usage \
                  and page cache occupancy, and serves a browser dashboard that receives \
                  new rows over Server-Sent Events as they arrive.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port [default: 8080]
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Read CSV from file instead of stdin
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Log level [default: info]
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Delay between polls of the /events stream loop, in milliseconds
    #[arg(long)]
    pub stream_interval_ms: Option<u64>,

    /// CPU and page cache sampling period, in milliseconds
    #[arg(long)]
    pub sample_interval_ms: Option<u64>,

    /// Root of the proc filesystem used by the counter readers
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Disable /metrics telemetry endpoint
    #[arg(long)]
    pub disable_telemetry: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and counter sources
    Check,

    /// Generate a synthetic mmapbench CSV feed
    GenerateFeed {
        /// Output file path (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Number of rows to emit per device
        #[arg(short = 'n', long, default_value_t = 60)]
        rows: usize,

        /// Device names to emit rows for (comma-separated)
        #[arg(long, default_value = "nvme0n1")]
        devices: String,

        /// Sleep between rows to emulate a running benchmark
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },
}

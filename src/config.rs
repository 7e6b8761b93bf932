//! Configuration loading and resolution.
//!
//! Configuration is merged from three layers with the precedence
//! CLI > config file > defaults. Config files may be YAML, JSON or TOML,
//! selected by file extension.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::cli::{Args, ConfigFormat, LogLevel};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STREAM_INTERVAL_MS: u64 = 500;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Locations searched when no `--config` is given.
const DEFAULT_CONFIG_PATHS: [&str; 6] = [
    "/etc/mmapbench-live/config.yaml",
    "/etc/mmapbench-live/config.yml",
    "/etc/mmapbench-live/config.json",
    "./mmapbench-live.yaml",
    "./mmapbench-live.yml",
    "./mmapbench-live.json",
];

/// Effective server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    // Server
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Input feed; stdin when unset
    #[serde(alias = "file")]
    pub input_file: Option<PathBuf>,

    // Cadence
    #[serde(alias = "stream-interval-ms")]
    pub stream_interval_ms: Option<u64>,
    #[serde(alias = "cpu-interval-ms")]
    pub cpu_interval_ms: Option<u64>,
    #[serde(alias = "cache-interval-ms")]
    pub cache_interval_ms: Option<u64>,

    // Counter sources
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    // Feature flags
    pub enable_health: Option<bool>,
    pub enable_telemetry: Option<bool>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            input_file: None,
            stream_interval_ms: Some(DEFAULT_STREAM_INTERVAL_MS),
            cpu_interval_ms: Some(DEFAULT_SAMPLE_INTERVAL_MS),
            cache_interval_ms: Some(DEFAULT_SAMPLE_INTERVAL_MS),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            enable_health: Some(true),
            enable_telemetry: Some(true),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms.unwrap_or(DEFAULT_STREAM_INTERVAL_MS))
    }

    pub fn cpu_interval(&self) -> Duration {
        Duration::from_millis(self.cpu_interval_ms.unwrap_or(DEFAULT_SAMPLE_INTERVAL_MS))
    }

    pub fn cache_interval(&self) -> Duration {
        Duration::from_millis(self.cache_interval_ms.unwrap_or(DEFAULT_SAMPLE_INTERVAL_MS))
    }

    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn health_enabled(&self) -> bool {
        self.enable_health.unwrap_or(true)
    }

    pub fn telemetry_enabled(&self) -> bool {
        self.enable_telemetry.unwrap_or(true)
    }

    /// Log level from the config file, if it names a known level.
    pub fn log_level(&self) -> Option<LogLevel> {
        let level = self.log_level.as_deref()?;
        <LogLevel as clap::ValueEnum>::from_str(level, true).ok()
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<()> {
    if cfg.port() == 0 {
        bail!("port must be non-zero");
    }

    cfg.bind()
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid bind address '{}'", cfg.bind()))?;

    for (name, value) in [
        ("stream_interval_ms", cfg.stream_interval_ms),
        ("cpu_interval_ms", cfg.cpu_interval_ms),
        ("cache_interval_ms", cfg.cache_interval_ms),
    ] {
        if value == Some(0) {
            bail!("{name} must be greater than zero");
        }
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if cfg.log_level().is_none() {
            bail!("Invalid log_level '{level}', expected off|error|warn|info|debug|trace");
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(port) = args.port {
        config.port = Some(port);
    }
    if let Some(file) = &args.file {
        config.input_file = Some(file.clone());
    }
    if let Some(ms) = args.stream_interval_ms {
        config.stream_interval_ms = Some(ms);
    }
    if let Some(ms) = args.sample_interval_ms {
        config.cpu_interval_ms = Some(ms);
        config.cache_interval_ms = Some(ms);
    }
    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if let Some(level) = &args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if args.disable_telemetry {
        config.enable_telemetry = Some(false);
    }

    Ok(config)
}

/// Loads a config file, falling back to the default search paths and then
/// to built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                bail!("Config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => match DEFAULT_CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
            Some(p) => p.to_path_buf(),
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(&content, &path)?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

fn parse_config(content: &str, path: &Path) -> Result<Config> {
    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        Some("toml") => {
            toml::from_str(content).with_context(|| format!("Invalid TOML in {}", path.display()))?
        }
        _ => serde_yaml::from_str(content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
    };
    Ok(config)
}

/// Renders configuration in the requested format.
pub fn render_config(config: &Config, format: &ConfigFormat) -> Result<String> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["mmapbench-live", "--no-config"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let cfg = resolve_config(&args(&[])).unwrap();
        assert_eq!(cfg.port(), 8080);
        assert_eq!(cfg.bind(), "0.0.0.0");
        assert_eq!(cfg.stream_interval(), Duration::from_millis(500));
        assert_eq!(cfg.cpu_interval(), Duration::from_secs(1));
        assert_eq!(cfg.cache_interval(), Duration::from_secs(1));
        assert!(cfg.input_file.is_none());
        assert!(validate_effective_config(&cfg).is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let cfg = resolve_config(&args(&[
            "--port",
            "9000",
            "--file",
            "bench.csv",
            "--sample-interval-ms",
            "250",
            "--disable-health",
        ]))
        .unwrap();
        assert_eq!(cfg.port(), 9000);
        assert_eq!(cfg.input_file, Some(PathBuf::from("bench.csv")));
        assert_eq!(cfg.cpu_interval(), Duration::from_millis(250));
        assert_eq!(cfg.cache_interval(), Duration::from_millis(250));
        assert!(!cfg.health_enabled());
        assert!(cfg.telemetry_enabled());
    }

    #[test]
    fn test_file_then_cli_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.yaml");
        fs::write(&path, "port: 7000\nstream_interval_ms: 100\nlog_level: debug\n").unwrap();

        let argv = ["mmapbench-live", "-c", path.to_str().unwrap(), "--port", "7001"];
        let cfg = resolve_config(&Args::parse_from(argv)).unwrap();
        assert_eq!(cfg.port(), 7001);
        assert_eq!(cfg.stream_interval(), Duration::from_millis(100));
        assert!(matches!(cfg.log_level(), Some(LogLevel::Debug)));
        // Fields absent from the file keep their defaults.
        assert_eq!(cfg.cpu_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("live.json");
        fs::write(&json, r#"{"port": 8181, "proc_root": "/tmp/proc"}"#).unwrap();
        let cfg = load_config(Some(&json)).unwrap();
        assert_eq!(cfg.port(), 8181);
        assert_eq!(cfg.proc_root(), PathBuf::from("/tmp/proc"));

        let toml_path = dir.path().join("live.toml");
        fs::write(&toml_path, "port = 8282\nenable_telemetry = false\n").unwrap();
        let cfg = load_config(Some(&toml_path)).unwrap();
        assert_eq!(cfg.port(), 8282);
        assert!(!cfg.telemetry_enabled());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/live.yaml"))).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.stream_interval_ms = Some(0);
        assert!(validate_effective_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.bind = Some("not-an-ip".into());
        assert!(validate_effective_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.log_level = Some("loud".into());
        assert!(validate_effective_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.port = Some(0);
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_render_config_formats() {
        let cfg = Config::default();
        assert!(render_config(&cfg, &ConfigFormat::Yaml).unwrap().contains("port: 8080"));
        assert!(render_config(&cfg, &ConfigFormat::Json).unwrap().contains("\"port\": 8080"));
        assert!(render_config(&cfg, &ConfigFormat::Toml).unwrap().contains("port = 8080"));
    }
}

//! Configuration management for symbscan

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest scan interval a controller accepts, in seconds
pub const MAX_SCAN_INTERVAL_SECS: u64 = 60;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scanner tuning shared by every controller
    pub scanner: ScannerConfig,
    /// Controllers the diagnostic binary knows about
    pub controllers: Vec<ControllerConfig>,
    /// Install the Prometheus recorder
    pub metrics_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Modbus/TCP port (default: 502)
    pub port: u16,
    /// Modbus unit ID
    pub unit_id: u8,
    /// Seconds between full scans, 1 to 60
    pub scan_interval_secs: u64,
    /// Mirror data older than this is reported as stale
    pub data_expiry_ms: u64,
    /// Connect and per-request timeout
    pub timeout_ms: u64,
    /// Worker back-off when there is nothing to do
    pub idle_backoff_ms: u64,
    /// Commands the façade may hand over before blocking
    pub command_capacity: usize,
    /// How long a write waits for the worker before giving up
    pub write_wait_ms: u64,
    /// Writes held by the worker while the device is unreachable
    pub write_buffer_capacity: usize,
    /// Attempts per write before it is dropped; unset retries forever
    pub write_retry_limit: Option<u32>,
    /// Pause between attempts of a failing write
    pub write_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Human-readable name
    pub name: String,
    /// IPv4 or IPv6 address
    pub address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            controllers: vec![],
            metrics_enabled: false,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            port: 502,
            unit_id: 1,
            scan_interval_secs: 1,
            data_expiry_ms: 10_000,
            timeout_ms: 5_000,
            idle_backoff_ms: 50,
            command_capacity: 1,
            write_wait_ms: 500,
            write_buffer_capacity: 100,
            write_retry_limit: Some(10),
            write_retry_delay_ms: 250,
        }
    }
}

impl ScannerConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn data_expiry(&self) -> Duration {
        Duration::from_millis(self.data_expiry_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn write_wait(&self) -> Duration {
        Duration::from_millis(self.write_wait_ms)
    }

    pub fn write_retry_delay(&self) -> Duration {
        Duration::from_millis(self.write_retry_delay_ms)
    }

    /// Reject settings the worker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("scanner.port must not be 0");
        }
        if !(1..=MAX_SCAN_INTERVAL_SECS).contains(&self.scan_interval_secs) {
            bail!(
                "scanner.scan_interval_secs must be between 1 and {}, got {}",
                MAX_SCAN_INTERVAL_SECS,
                self.scan_interval_secs
            );
        }
        if self.timeout_ms == 0 || self.data_expiry_ms == 0 {
            bail!("scanner timeouts must be greater than 0");
        }
        if self.command_capacity == 0 || self.write_buffer_capacity == 0 {
            bail!("scanner capacities must be greater than 0");
        }
        if self.write_retry_limit == Some(0) {
            bail!("scanner.write_retry_limit must be at least 1 when set");
        }
        Ok(())
    }
}

/// Load configuration from the file named by `SYMBSCAN_CONFIG` plus
/// `SYMBSCAN_<SECTION>__<KEY>` environment overrides
pub fn load_config() -> Result<Config> {
    let config_path =
        std::env::var("SYMBSCAN_CONFIG").unwrap_or_else(|_| "symbscan.yaml".to_string());

    if !Path::new(&config_path).exists() {
        tracing::warn!("Config file {} not found, using defaults", config_path);
    }
    load_config_from_path(&config_path)
}

/// Load a YAML file (optional) layered with environment overrides
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let settings = ::config::Config::builder()
        .add_source(
            ::config::File::from(path)
                .format(::config::FileFormat::Yaml)
                .required(false),
        )
        .add_source(
            ::config::Environment::with_prefix("SYMBSCAN")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = settings
        .try_deserialize()
        .with_context(|| "Failed to parse config file")?;
    config.scanner.validate()?;

    Ok(config)
}

/// Load configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml).with_context(|| "Failed to parse config")?;
    config.scanner.validate()?;
    Ok(config)
}

// SPDX-License-Identifier: MPL-2.0

//! Agent configuration
//!
//! The configuration is a flat JSON document. Every field has a default, so
//! an absent file or a file that only overrides a couple of keys is valid:
//!
//! ```json
//! {
//!     "wired_interface": "end0",
//!     "display": { "i2c_bus": "/dev/i2c-3" }
//! }
//! ```

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::time::Duration;

/// Where per-interface byte counters are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CounterSourceKind {
    /// `sysinfo::Networks`
    #[default]
    Sysinfo,
    /// Direct parse of `/proc/net/dev`
    Procfs,
}

/// Physical panel wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// I2C character device the panel hangs off
    pub i2c_bus: String,
    /// 7-bit bus address of the SSD1306 controller
    pub i2c_address: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            i2c_bus: String::from("/dev/i2c-1"),
            i2c_address: 0x3C,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred interface. Also the name reported when nothing is up.
    pub wireless_interface: String,
    /// Used when the wireless interface has no address
    pub wired_interface: String,
    /// Delay between the two counter reads of one measurement
    pub sample_window_ms: u64,
    /// Rates above this (bytes/s) are treated as counter glitches
    pub max_plausible_rate: f64,
    /// Cycles between forced counter cache resets
    pub cache_reset_cycles: u32,
    /// Plain-text (or `{"ip": ...}`) address echo endpoint
    pub public_ip_url: String,
    pub public_ip_timeout_ms: u64,
    /// Pause after the error screen has been drawn
    pub error_backoff_ms: u64,
    pub counter_source: CounterSourceKind,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wireless_interface: String::from("wlan0"),
            wired_interface: String::from("eth0"),
            sample_window_ms: 1000,
            max_plausible_rate: 1_250_000_000.0,
            cache_reset_cycles: 60,
            public_ip_url: String::from("https://api.ipify.org"),
            public_ip_timeout_ms: 3000,
            error_backoff_ms: 5000,
            counter_source: CounterSourceKind::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration from `path`.
    ///
    /// A missing file is not an error: the defaults are used. A file that
    /// exists but cannot be read, parsed or validated is.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config = Self::from_json(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| MonitorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.wireless_interface.trim().is_empty() || self.wired_interface.trim().is_empty() {
            return Err(MonitorError::Config("interface names must not be empty".into()));
        }
        if self.sample_window_ms == 0 {
            return Err(MonitorError::Config("sample_window_ms must be positive".into()));
        }
        if self.cache_reset_cycles == 0 {
            return Err(MonitorError::Config("cache_reset_cycles must be positive".into()));
        }
        if self.max_plausible_rate.is_nan() || self.max_plausible_rate <= 0.0 {
            return Err(MonitorError::Config("max_plausible_rate must be positive".into()));
        }
        if self.public_ip_url.trim().is_empty() {
            return Err(MonitorError::Config("public_ip_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn sample_window(&self) -> Duration {
        Duration::from_millis(self.sample_window_ms)
    }

    pub fn public_ip_timeout(&self) -> Duration {
        Duration::from_millis(self.public_ip_timeout_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

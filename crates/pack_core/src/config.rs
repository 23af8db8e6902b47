//! Unified TOML configuration.
//!
//! A single `config.toml` next to the executable holds every setting.
//! Missing keys fall back to their defaults, so a partial file is valid.

use crate::units::{ChargeUnit, TemperatureUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Serial line settings. Data framing is fixed at 8N1, no flow control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port path (e.g. "/dev/ttyUSB0" or "COM3"). Empty = not configured.
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Reopen the port after a transport failure
    pub reconnect: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 115_200,
            reconnect: true,
        }
    }
}

/// Display units, read once at pipeline construction. Editing these only
/// affects future runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    /// "coulomb" or "amphour"
    pub charge: ChargeUnit,
    /// "celsius" or "farenheit"
    pub temperature: TemperatureUnit,
}

/// Liveness countdown settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Seconds of silence before the pack counts as asleep
    pub timeout_secs: f64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self { timeout_secs: 2.0 }
    }
}

/// CSV data log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub csv_enabled: bool,
    pub csv_path: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            csv_enabled: false,
            csv_path: "pack_log.csv".into(),
        }
    }
}

/// Chart data buffer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Points retained per series
    pub history_size: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { history_size: 300 }
    }
}

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub serial: SerialConfig,
    pub units: UnitsConfig,
    pub liveness: LivenessConfig,
    pub log: LogConfig,
    pub chart: ChartConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file, falling back to defaults on
    /// any read or parse error.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuration loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Could not parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Could not read {}: {}", path.display(), e);
                }
            }
        }

        info!("Using default configuration");
        AppConfig::default()
    }

    /// Saves the configuration as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Default `config.toml` path, next to the executable.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Validates the configuration, returning a list of problems.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.serial.baud_rate == 0 {
            errors.push("serial baud_rate cannot be 0".into());
        }
        if self.liveness.timeout_secs < 0.1 || self.liveness.timeout_secs > 60.0 {
            errors.push(format!(
                "liveness timeout_secs out of range: {} (0.1–60.0)",
                self.liveness.timeout_secs
            ));
        }
        if self.chart.history_size == 0 {
            errors.push("chart history_size cannot be 0".into());
        }
        if self.log.csv_enabled && self.log.csv_path.is_empty() {
            errors.push("log csv_path is empty while csv_enabled is set".into());
        }

        errors
    }
}

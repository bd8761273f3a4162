//! Bridge configuration persisted as JSON.
//!
//! Missing file means defaults; a file that exists but does not parse or
//! validate is an error rather than a silent fallback, so a typo cannot
//! quietly point the bridge at the wrong control endpoint.

use crate::error::config::ConfigError;
use crate::DEFAULT_CONTROL_URL;

use common::ErrorLocation;

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "bridge.json";
const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// WebSocket endpoint of the tunnel-control process.
    #[serde(default = "default_control_url")]
    pub control_url: String,

    /// Working directory handed to `coreInit`; `None` leaves the choice to
    /// the embedding application.
    pub home_dir: Option<String>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            control_url: default_control_url(),
            home_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for the bridge log file; `None` logs to stdout only.
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub control: ControlConfig,

    #[serde(default)]
    pub logging: LogConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            control: ControlConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_control_url() -> String {
    DEFAULT_CONTROL_URL.to_string()
}

/// Platform config directory for the bridge, when the OS exposes one.
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("tunnel-bridge"))
}

impl BridgeConfig {
    /// Load from `{config_dir}/bridge.json`, or defaults if the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read,
    /// parsed, or validated.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Read {
            location: ErrorLocation::capture(),
            path: config_path.clone(),
            source: e,
        })?;

        let config: BridgeConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                location: ErrorLocation::capture(),
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save to `{config_dir}/bridge.json` via temp file + rename, so a
    /// crash mid-write never leaves a truncated config behind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on validation, serialization, or I/O failure.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Write {
            location: ErrorLocation::capture(),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            location: ErrorLocation::capture(),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::Write {
            location: ErrorLocation::capture(),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::Write {
            location: ErrorLocation::capture(),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any value is out of contract.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::Validation {
                location: ErrorLocation::capture(),
                reason: format!(
                    "invalid version: {} (expected 1-{CONFIG_VERSION})",
                    self.version
                ),
            });
        }

        if self.control.control_url.is_empty() {
            return Err(ConfigError::Validation {
                location: ErrorLocation::capture(),
                reason: "control_url cannot be empty".to_string(),
            });
        }

        if !self.control.control_url.starts_with("ws://")
            && !self.control.control_url.starts_with("wss://")
        {
            return Err(ConfigError::Validation {
                location: ErrorLocation::capture(),
                reason: format!("invalid control_url scheme: {}", self.control.control_url),
            });
        }

        if let Some(ref home_dir) = self.control.home_dir {
            if home_dir.is_empty() {
                return Err(ConfigError::Validation {
                    location: ErrorLocation::capture(),
                    reason: "home_dir cannot be an empty string".to_string(),
                });
            }
        }

        Ok(())
    }
}

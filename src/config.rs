// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration module.
//!
//! Handles loading and saving application settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::bluetooth::ble_constants::DEFAULT_OPTIONAL_SERVICES;

/// Directory name under the user's config dir.
const APP_DIR: &str = "bluetooth-messenger";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bluetooth settings.
    pub bluetooth: BluetoothConfig,

    /// Demo mode settings.
    pub demo: DemoConfig,

    /// Chat settings.
    pub chat: ChatConfig,

    /// UI settings.
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BluetoothConfig {
    /// How long to listen for advertisements before showing the picker.
    pub scan_window_ms: u64,

    /// Simulated connect time after a device was picked.
    pub connect_delay_ms: u64,

    /// Services to probe on the picked device.
    /// Either well-known names ("battery_service") or UUID strings.
    pub optional_services: Vec<String>,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            scan_window_ms: 5000,
            connect_delay_ms: 1000,
            optional_services: DEFAULT_OPTIONAL_SERVICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl BluetoothConfig {
    pub fn scan_window(&self) -> Duration {
        Duration::from_millis(self.scan_window_ms)
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Simulated connect time.
    pub connect_delay_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            connect_delay_ms: 1500,
        }
    }
}

impl DemoConfig {
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Text of the scripted peer reply.
    pub auto_reply_text: String,

    /// Delay before the peer reply appears.
    pub auto_reply_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            auto_reply_text: "Got it! Thanks for the message.".to_string(),
            auto_reply_delay_ms: 2000,
        }
    }
}

impl ChatConfig {
    pub fn auto_reply_delay(&self) -> Duration {
        Duration::from_millis(self.auto_reply_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Seconds before a toast dismisses itself.
    pub toast_timeout_secs: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_timeout_secs: 3,
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load configuration from the default location or create it.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            info!("Wrote default configuration to {:?}", path);
            Ok(config)
        }
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.demo.connect_delay(), Duration::from_millis(1500));
        assert_eq!(config.chat.auto_reply_delay(), Duration::from_millis(2000));
        assert_eq!(config.bluetooth.connect_delay(), Duration::from_millis(1000));
        assert_eq!(
            config.bluetooth.optional_services,
            vec!["battery_service".to_string(), "generic_access".to_string()]
        );
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[chat]\nauto_reply_delay_ms = 50\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.chat.auto_reply_delay_ms, 50);
        assert_eq!(config.chat.auto_reply_text, ChatConfig::default().auto_reply_text);
        assert_eq!(config.demo, DemoConfig::default());
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat\nnot toml").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}

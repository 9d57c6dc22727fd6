//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use snes_input_core::{MemoryRegion, CONTROLLER_1_INPUT};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Client name announced to the bridge
    #[serde(default = "default_name")]
    pub name: String,

    /// Extra delay between polls in milliseconds (0 = paced by the bridge)
    #[serde(default)]
    pub interval: u64,

    /// Input source configuration
    #[serde(default)]
    pub input: InputConfig,

    /// Overlay rendering configuration
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Web server configuration
    #[serde(default)]
    pub web: WebConfig,
}

/// Input source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Bridge address of the controller input word
    #[serde(default = "default_address")]
    pub address: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

impl InputConfig {
    /// Returns the region polled every frame.
    pub fn region(&self) -> MemoryRegion {
        MemoryRegion::new(self.address, CONTROLLER_1_INPUT.length)
    }
}

/// Overlay rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Controller diagram image; a plain canvas is used when unset
    #[serde(default)]
    pub background: Option<PathBuf>,

    /// Canvas width without a background image
    #[serde(default = "default_width")]
    pub width: u32,

    /// Canvas height without a background image
    #[serde(default = "default_height")]
    pub height: u32,

    /// Canvas colour without a background image (#RRGGBB)
    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Fill colour for held buttons (#RRGGBB)
    #[serde(default = "default_pressed_color")]
    pub pressed_color: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            background: None,
            width: default_width(),
            height: default_height(),
            background_color: default_background_color(),
            pressed_color: default_pressed_color(),
        }
    }
}

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Serve the overlay over HTTP
    #[serde(default = "default_web_enable")]
    pub enable: bool,

    /// Listen address (e.g., "127.0.0.1:8687")
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Page reload interval for the frame in milliseconds
    #[serde(default = "default_refresh")]
    pub refresh: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enable: default_web_enable(),
            listen: default_listen(),
            refresh: default_refresh(),
        }
    }
}

// Default value functions
fn default_name() -> String {
    "Snes Input Display".to_string()
}

fn default_address() -> u32 {
    CONTROLLER_1_INPUT.address
}

fn default_width() -> u32 {
    540
}

fn default_height() -> u32 {
    200
}

fn default_background_color() -> String {
    "#202020".to_string()
}

fn default_pressed_color() -> String {
    "#FF3B00".to_string()
}

fn default_web_enable() -> bool {
    true
}

fn default_listen() -> String {
    "127.0.0.1:8687".to_string()
}

fn default_refresh() -> u64 {
    33
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            interval: 0,
            input: InputConfig::default(),
            overlay: OverlayConfig::default(),
            web: WebConfig::default(),
        }
    }
}

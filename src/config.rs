use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the panel is wired to the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HardwareConfig {
    /// spidev node of the panel's chip-select channel
    pub spi_device: String,
    /// GPIO driving the data/command line
    pub mode_pin: u64,
    /// GPIO driving the reset line
    pub reset_pin: u64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        HardwareConfig {
            spi_device: "/dev/spidev0.0".to_string(),
            mode_pin: 24,
            reset_pin: 25,
        }
    }
}

impl HardwareConfig {
    /// Load from a JSON file, or fall back to the default wiring
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(HardwareConfig::default());
        };
        let config_data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&config_data)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

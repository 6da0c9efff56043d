//! # Configuration Module
//!
//! Analysis and display settings, stored as JSON.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "whistler.json";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "WHISTLER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhistlerConfig {
    /// Samples per analysis frame; each spectrum has half as many bins.
    pub fft_size: usize,
    /// Sample rate requested from the input device, in Hz.
    pub preferred_sample_rate: u32,
    /// Number of columns in the scrolling spectrogram.
    pub spectrogram_columns: usize,
    /// Number of low bins shown in the spectrogram image.
    pub spectrogram_visible_bins: usize,
    /// Pixels per bin in the instantaneous spectrum view.
    pub spectrum_bar_width: f32,
    /// Pixels per column in the spectrogram.
    pub spectrogram_column_width: f32,
    /// Pixels per bin in the spectrogram.
    pub spectrogram_bin_height: f32,
}

impl Default for WhistlerConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            preferred_sample_rate: 44_100,
            spectrogram_columns: 200,
            spectrogram_visible_bins: 256,
            spectrum_bar_width: 6.0,
            spectrogram_column_width: 4.0,
            spectrogram_bin_height: 2.0,
        }
    }
}

impl WhistlerConfig {
    /// Number of bins in each spectrum frame.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.fft_size >= 4 && self.fft_size.is_power_of_two(),
            "fft_size must be a power of two of at least 4, got {}",
            self.fft_size
        );
        ensure!(self.preferred_sample_rate > 0, "preferred_sample_rate must be positive");
        ensure!(self.spectrogram_columns > 0, "spectrogram_columns must be positive");
        ensure!(
            self.spectrogram_visible_bins > 0,
            "spectrogram_visible_bins must be positive"
        );
        ensure!(
            self.spectrum_bar_width > 0.0
                && self.spectrogram_column_width > 0.0
                && self.spectrogram_bin_height > 0.0,
            "pixel scales must be positive"
        );
        Ok(())
    }
}

/// Loads and validates a config file.
pub fn load_config(path: &Path) -> Result<WhistlerConfig> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open config {}", path.display()))?;
    let mut data = String::new();
    file.read_to_string(&mut data)?;
    let config: WhistlerConfig = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Writes a config file as pretty-printed JSON.
pub fn save_config(config: &WhistlerConfig, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(config)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create config {}", path.display()))?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Config file location: `$WHISTLER_CONFIG`, else `whistler.json`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Loads the config from [`config_path`], falling back to defaults.
///
/// A missing file is not an error; an unreadable or invalid one is logged.
pub fn load_or_default() -> WhistlerConfig {
    let path = config_path();
    if !path.exists() {
        log::info!("[CONFIG] No config at {}, using defaults", path.display());
        return WhistlerConfig::default();
    }
    match load_config(&path) {
        Ok(config) => {
            log::info!("[CONFIG] Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("[CONFIG] {e:#}; using defaults");
            WhistlerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("whistler-{}-{}", std::process::id(), name))
    }

    #[test]
    fn defaults_are_valid() {
        let config = WhistlerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bin_count(), 1024);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: WhistlerConfig =
            serde_json::from_str(r#"{ "fft_size": 4096, "spectrogram_columns": 50 }"#).unwrap();
        assert_eq!(config.fft_size, 4096);
        assert_eq!(config.spectrogram_columns, 50);
        assert_eq!(config.spectrum_bar_width, 6.0);
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("save.json");
        let config = WhistlerConfig {
            spectrogram_columns: 80,
            ..WhistlerConfig::default()
        };
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let path = temp_path("invalid.json");
        std::fs::write(&path, r#"{ "fft_size": 1000 }"#).unwrap();
        let result = load_config(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());

        let zero_columns = WhistlerConfig {
            spectrogram_columns: 0,
            ..WhistlerConfig::default()
        };
        assert!(zero_columns.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(&temp_path("does-not-exist.json")).is_err());
    }
}

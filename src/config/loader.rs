// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_FUEL_LEVEL, DEFAULT_MODULE_PATH, DEFAULT_PRECISION_SLIDER,
    MAX_FUEL_LEVEL, MIN_FUEL_LEVEL,
};
use crate::engine::request::{FloatingFormat, PrecisionMode, Settings, UnitType};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the converter session.
///
/// Every field is optional; an empty file yields a working configuration that
/// looks for the module at its default build location.
///
/// # Example
/// ```yaml
/// module_path: zig-out/bin/unit_data_converter.wasm
/// debounce_ms: 300
/// wasm:
///   fuel:
///     default: 100000000
///     maximum: 500000000
/// defaults:
///   unit: KiB
///   format: decimal
///   precision: custom
///   slider: 4
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_module_path")]
    pub module_path: PathBuf,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub wasm: WasmConfig,
    #[serde(default)]
    pub defaults: DefaultSettings,
}

fn default_module_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODULE_PATH)
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            module_path: default_module_path(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            wasm: WasmConfig::default(),
            defaults: DefaultSettings::default(),
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fuel = &self.wasm.fuel;
        if fuel.get_minimum() > fuel.get_maximum() {
            return Err(ConfigError::InvalidValue {
                field: "wasm.fuel",
                reason: format!(
                    "minimum {} exceeds maximum {}",
                    fuel.get_minimum(),
                    fuel.get_maximum()
                ),
            });
        }
        Ok(())
    }
}

/// WASM-specific configuration options.
#[derive(Debug, Default, Deserialize)]
pub struct WasmConfig {
    #[serde(default)]
    pub fuel: FuelConfig,
}

/// Fuel budget for each module instance.
///
/// Fuel bounds the number of instructions one attempt may run, so a faulty
/// module cannot hang the session. The maximum is a hard limit.
#[derive(Debug, Default, Deserialize)]
pub struct FuelConfig {
    pub default: Option<u64>,
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
}

impl FuelConfig {
    /// Get the default fuel level, using built-in default if not configured.
    pub fn get_default(&self) -> u64 {
        self.default.unwrap_or(DEFAULT_FUEL_LEVEL)
    }

    /// Get the minimum fuel level, using built-in default if not configured.
    pub fn get_minimum(&self) -> u64 {
        self.minimum.unwrap_or(MIN_FUEL_LEVEL)
    }

    /// Get the maximum fuel level, using built-in default if not configured.
    pub fn get_maximum(&self) -> u64 {
        self.maximum.unwrap_or(MAX_FUEL_LEVEL)
    }

    /// Clamp a requested fuel level to the configured bounds.
    ///
    /// # Example
    /// ```
    /// use unit_data_converter::config::FuelConfig;
    ///
    /// let config = FuelConfig::default();
    /// assert_eq!(config.validate_and_clamp(1_000_000_000), 500_000_000);
    /// ```
    pub fn validate_and_clamp(&self, requested: u64) -> u64 {
        requested.clamp(self.get_minimum(), self.get_maximum())
    }

    /// The budget each instance actually receives.
    pub fn effective(&self) -> u64 {
        self.validate_and_clamp(self.get_default())
    }
}

/// Initial settings for a new session.
#[derive(Debug, Deserialize)]
pub struct DefaultSettings {
    #[serde(default = "default_unit")]
    pub unit: UnitType,
    #[serde(default = "default_format")]
    pub format: FloatingFormat,
    #[serde(default = "default_precision_mode")]
    pub precision: PrecisionMode,
    #[serde(default = "default_slider")]
    pub slider: i32,
}

fn default_unit() -> UnitType {
    UnitType::Byte
}

fn default_format() -> FloatingFormat {
    FloatingFormat::Scientific
}

fn default_precision_mode() -> PrecisionMode {
    PrecisionMode::Auto
}

fn default_slider() -> i32 {
    DEFAULT_PRECISION_SLIDER
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            format: default_format(),
            precision: default_precision_mode(),
            slider: default_slider(),
        }
    }
}

impl DefaultSettings {
    pub fn to_settings(&self) -> Settings {
        Settings {
            unit: self.unit,
            format: self.format,
            precision_mode: self.precision,
            slider_value: self.slider,
        }
    }
}

/// Load and validate a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path_str = path.as_ref().to_string_lossy().to_string();
    let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
        path: path_str.clone(),
        source,
    })?;
    let cfg: Config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path_str,
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Conversion request data model.
//!
//! Units, formats and precision are closed types here so that nothing outside
//! their fixed ranges can reach the module.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::consts::{AUTOMATIC_PRECISION, MAX_PRECISION, MIN_PRECISION};

/// IEC data size units, in module index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum UnitType {
    Byte,
    KiB,
    MiB,
    GiB,
    TiB,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::Byte,
        UnitType::KiB,
        UnitType::MiB,
        UnitType::GiB,
        UnitType::TiB,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitType::Byte => "Byte",
            UnitType::KiB => "KiB",
            UnitType::MiB => "MiB",
            UnitType::GiB => "GiB",
            UnitType::TiB => "TiB",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown unit '{}', expected one of Byte, KiB, MiB, GiB, TiB", s))
    }
}

/// Floating point notation the module renders values in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatingFormat {
    Scientific,
    Decimal,
}

impl FloatingFormat {
    pub fn index(self) -> u32 {
        match self {
            FloatingFormat::Scientific => 0,
            FloatingFormat::Decimal => 1,
        }
    }
}

impl FromStr for FloatingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scientific" => Ok(FloatingFormat::Scientific),
            "decimal" => Ok(FloatingFormat::Decimal),
            _ => Err(format!("unknown format '{}', expected scientific or decimal", s)),
        }
    }
}

/// Clamp an explicit precision into the range the module accepts.
pub fn clamp_precision(value: i32) -> i32 {
    value.clamp(MIN_PRECISION, MAX_PRECISION)
}

/// How many fractional digits the module should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Automatic,
    Fixed(i32),
}

impl Precision {
    /// The value passed across the ABI: `-1` for automatic, else clamped to 0..=10.
    pub fn module_value(self) -> i32 {
        match self {
            Precision::Automatic => AUTOMATIC_PRECISION,
            Precision::Fixed(digits) => clamp_precision(digits),
        }
    }
}

/// Precision selector as the settings menu presents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionMode {
    Auto,
    Custom,
}

/// Conversion settings that persist between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub unit: UnitType,
    pub format: FloatingFormat,
    pub precision_mode: PrecisionMode,
    /// Kept while the mode is `Auto` so switching back restores it.
    pub slider_value: i32,
}

impl Settings {
    pub fn precision(&self) -> Precision {
        match self.precision_mode {
            PrecisionMode::Auto => Precision::Automatic,
            PrecisionMode::Custom => Precision::Fixed(self.slider_value),
        }
    }
}

/// One conversion attempt as issued by a user gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub raw_input: String,
    pub unit: UnitType,
    pub format: FloatingFormat,
    pub precision: Precision,
    /// Skip the convert step when the cleaned input matches the previous one.
    pub suppress_if_unchanged: bool,
}

impl ConversionRequest {
    pub fn new(raw_input: impl Into<String>, settings: &Settings, suppress_if_unchanged: bool) -> Self {
        Self {
            raw_input: raw_input.into(),
            unit: settings.unit,
            format: settings.format,
            precision: settings.precision(),
            suppress_if_unchanged,
        }
    }
}

/// Formatted values keyed by unit. Units the module did not produce are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResult(pub BTreeMap<UnitType, String>);

impl ConversionResult {
    pub fn get(&self, unit: UnitType) -> Option<&str> {
        self.0.get(&unit).map(String::as_str)
    }

    pub fn insert(&mut self, unit: UnitType, value: String) {
        self.0.insert(unit, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

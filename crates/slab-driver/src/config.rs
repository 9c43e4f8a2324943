// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Simulation configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! duration_secs = 30
//! min_object_size = 100
//! max_object_size = 300
//! allocation_interval_ms = 10
//! track_interval_secs = 5
//! release_probability = 0.0
//! seed = 42
//! log_file = "memory_log.txt"
//! ```

use crate::DriverError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a stress run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// How long the allocation worker runs, in seconds.
    pub duration_secs: f64,
    /// Smallest payload length in bytes (inclusive).
    pub min_object_size: usize,
    /// Largest payload length in bytes (inclusive).
    pub max_object_size: usize,
    /// Pause between allocation steps, in milliseconds.
    pub allocation_interval_ms: u64,
    /// Interval between tracker samples, in seconds.
    pub track_interval_secs: f64,
    /// Chance per step of releasing a random live block instead of allocating.
    pub release_probability: f64,
    /// RNG seed. Unset means seeded from entropy.
    pub seed: Option<u64>,
    /// Append-only log sink for tracker output.
    pub log_file: PathBuf,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DriverError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DriverError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| DriverError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, DriverError> {
        toml::to_string_pretty(self)
            .map_err(|e| DriverError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Rejects settings the driver cannot run with.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.min_object_size > self.max_object_size {
            return Err(DriverError::ConfigError(format!(
                "min_object_size ({}) exceeds max_object_size ({})",
                self.min_object_size, self.max_object_size
            )));
        }
        if self.track_interval()?.is_zero() {
            return Err(DriverError::ConfigError(
                "track_interval_secs must be positive".to_string(),
            ));
        }
        self.duration()?;
        if !(0.0..=1.0).contains(&self.release_probability) {
            return Err(DriverError::ConfigError(format!(
                "release_probability {} is outside [0, 1]",
                self.release_probability
            )));
        }
        Ok(())
    }

    /// The run length; fails for negative, non-finite or oversized values.
    pub fn duration(&self) -> Result<Duration, DriverError> {
        seconds("duration_secs", self.duration_secs)
    }

    pub fn allocation_interval(&self) -> Duration {
        Duration::from_millis(self.allocation_interval_ms)
    }

    pub fn track_interval(&self) -> Result<Duration, DriverError> {
        seconds("track_interval_secs", self.track_interval_secs)
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration, DriverError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| DriverError::ConfigError(format!("{field} = {value}: {e}")))
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30.0,
            min_object_size: 100,
            max_object_size: 300,
            allocation_interval_ms: 10,
            track_interval_secs: 5.0,
            release_probability: 0.0,
            seed: None,
            log_file: PathBuf::from("memory_log.txt"),
        }
    }
}

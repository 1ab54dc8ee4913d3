use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::algorithms::coordinates::InverseTransform;
use crate::algorithms::ellipse::NumericSettings;
use crate::algorithms::mgrs::MAX_PRECISION;
use crate::core::{CHI_SQUARED_95_2DOF, ROUNDING_DECIMALS};
use crate::utils::logging::LogConfig;

/// Largest supported rounding cadence
pub const MAX_DECIMALS: u32 = 10;

/// Fusion configuration, loadable from a JSON file.
///
/// Missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Chi-squared value for the 95% two-degree-of-freedom confidence region
    pub chi_squared: f64,
    /// Decimal places kept after every matrix/vector operation
    pub decimals: u32,
    /// Mapping of the fused center back to a grid reference
    pub inverse_transform: InverseTransform,
    /// Digits per axis of emitted grid references (1..=5)
    pub grid_precision: u8,
    pub logging: LogConfig,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("I/O error on config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error in config file '{path}': {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            chi_squared: CHI_SQUARED_95_2DOF,
            decimals: ROUNDING_DECIMALS,
            inverse_transform: InverseTransform::FlatSmallAngle,
            grid_precision: MAX_PRECISION,
            logging: LogConfig::default(),
        }
    }
}

impl FusionConfig {
    /// Load and validate a configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;

        let config: FusionConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Serialization {
            path: path_str,
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Serialization {
            path: path_str.clone(),
            source,
        })?;

        fs::write(&path, content).map_err(|source| ConfigError::Io { path: path_str, source })
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.chi_squared.is_finite() || self.chi_squared <= 0.0 {
            return Err(invalid("chi_squared", self.chi_squared, "must be a finite positive number"));
        }

        if self.decimals > MAX_DECIMALS {
            return Err(invalid(
                "decimals",
                self.decimals,
                &format!("must not exceed {}", MAX_DECIMALS),
            ));
        }

        if !(1..=MAX_PRECISION).contains(&self.grid_precision) {
            return Err(invalid(
                "grid_precision",
                self.grid_precision,
                &format!("must be between 1 and {}", MAX_PRECISION),
            ));
        }

        Ok(())
    }

    pub fn numeric_settings(&self) -> NumericSettings {
        NumericSettings {
            chi_squared: self.chi_squared,
            decimals: self.decimals,
        }
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

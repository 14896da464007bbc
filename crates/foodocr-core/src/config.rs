//! Configuration for the extraction engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FoodOcrError, Result};

/// Main configuration for the foodocr pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodOcrConfig {
    /// Expiration-date extraction configuration.
    pub expiration: ExpirationConfig,

    /// Location (city/postal code) extraction configuration.
    pub location: LocationConfig,

    /// Product-weight extraction configuration.
    pub weight: WeightConfig,
}

/// Plausibility window for parsed expiration dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpirationConfig {
    /// Earliest plausible year (inclusive).
    pub min_year: i32,

    /// Latest plausible year (inclusive).
    pub max_year: i32,
}

impl Default for ExpirationConfig {
    fn default() -> Self {
        Self {
            min_year: 2015,
            max_year: 2025,
        }
    }
}

/// Window sizes for the city/postal-code search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Maximum distance (in bytes) between a city name and its postal code.
    pub postal_distance: usize,

    /// Padding (in bytes) of the surrounding-text extract kept for review.
    pub extract_window: usize,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            postal_distance: 10,
            extract_window: 30,
        }
    }
}

/// Product-weight extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Allow automatic processing of non-suspicious weights.
    pub automatic_processing: bool,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            automatic_processing: true,
        }
    }
}

impl FoodOcrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(FoodOcrError::from)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FoodOcrConfig::default();
        assert_eq!(config.expiration.min_year, 2015);
        assert_eq!(config.expiration.max_year, 2025);
        assert_eq!(config.location.postal_distance, 10);
        assert_eq!(config.location.extract_window, 30);
        assert!(config.weight.automatic_processing);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FoodOcrConfig =
            serde_json::from_str(r#"{"location": {"postal_distance": 20}}"#).unwrap();
        assert_eq!(config.location.postal_distance, 20);
        assert_eq!(config.location.extract_window, 30);
        assert_eq!(config.expiration.min_year, 2015);
    }
}

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::RuleClassifier,
    error::{Result, ShapeError},
};

/// Every tunable of the detection pipeline.
///
/// All fields have defaults, so a config file only needs the values it changes:
///
/// ```toml
/// epsilon_ratio = 0.03
///
/// [classifier]
/// right_angle_tolerance = 12.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorConfig {
    /// Grayscale pixels strictly above this value count as drawn
    pub threshold: u8,
    /// Radius of the morphological closing applied before tracing, 0 disables it
    pub close_radius: u8,
    /// Radius of the morphological opening applied before tracing, 0 disables it
    pub open_radius: u8,
    /// Contours enclosing fewer square pixels are dropped as noise
    #[schemars(range(min = 0.0))]
    pub min_contour_area: f64,
    /// Simplification tolerance as a fraction of the contour perimeter
    #[schemars(range(min = 0.0, max = 0.5))]
    pub epsilon_ratio: f64,
    pub classifier: RuleClassifier,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 0,
            close_radius: 1,
            open_radius: 0,
            min_contour_area: 50.0,
            epsilon_ratio: 0.02,
            classifier: RuleClassifier::default(),
        }
    }
}

impl DetectorConfig {
    /// Load a config from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a config from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a config from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ShapeError::UnsupportedConfigFormat),
        }
    }

    /// JSON schema describing the config file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectorConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DetectorConfig::from_toml(
            r#"
            epsilon_ratio = 0.03

            [classifier]
            right_angle_tolerance = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(config.epsilon_ratio, 0.03);
        assert_eq!(config.classifier.right_angle_tolerance, 12.0);
        assert_eq!(config.min_contour_area, 50.0);
        assert_eq!(config.classifier.circle_min_vertices, 8);
    }

    #[test]
    fn test_json_config() {
        let config = DetectorConfig::from_json(r#"{"close_radius": 0, "classifier": {"arrow_max_concavities": 2}}"#)
            .unwrap();
        assert_eq!(config.close_radius, 0);
        assert_eq!(config.classifier.arrow_max_concavities, 2);
        assert_eq!(config.classifier.arrow_vertex_count, 7);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            DetectorConfig::from_file("detector.yaml"),
            Err(ShapeError::UnsupportedConfigFormat)
        ));
    }

    #[test]
    fn test_bad_toml_is_reported() {
        assert!(matches!(
            DetectorConfig::from_toml("epsilon_ratio = \"wide\""),
            Err(ShapeError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = serde_json::to_value(DetectorConfig::schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("epsilon_ratio").is_some());
        assert!(properties.get("classifier").is_some());
    }
}

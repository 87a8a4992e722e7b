use std::{fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{Result, ShapeError};

/// Tunables for the whole analysis, loadable from TOML or JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ShapeConfig {
    pub filter: FilterConfig,
    pub classifier: ClassifierConfig,
    pub background: BackgroundConfig,
    pub recognizer: RecognizerConfig,
}

/// Noise suppression bounds, in squared pixels / pixels of the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterConfig {
    #[schemars(description = "Smallest accepted polygon area")]
    pub min_area: f64,
    #[schemars(description = "Largest accepted polygon area")]
    pub max_area: f64,
    #[schemars(description = "Smallest accepted bounding box width and height")]
    pub min_dim: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_area: 1500.0,
            max_area: 100_000.0,
            min_dim: 18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClassifierConfig {
    #[schemars(description = "Relative tolerance for comparing triangle sides")]
    pub triangle_side_tol: f64,
    #[schemars(description = "Radians a quadrilateral turn may deviate from a right angle")]
    pub right_angle_tol: f64,
    #[schemars(description = "Relative tolerance for comparing quadrilateral sides")]
    pub side_equal_tol: f64,
    #[schemars(description = "Max side-length coefficient of variation for regular 5-6 gons")]
    pub regular_side_cv: f64,
    #[schemars(description = "Max turn-angle standard deviation (radians) for regular 5-6 gons")]
    pub regular_angle_std: f64,
    #[schemars(description = "Area above which any shape is labelled a large landmark")]
    pub very_large_area: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            triangle_side_tol: 0.15,
            right_angle_tol: 0.25,
            side_equal_tol: 0.18,
            regular_side_cv: 0.18,
            regular_angle_std: 0.6,
            very_large_area: 200_000.0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq,
    Serialize, Deserialize, JsonSchema,
    Display,
)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackgroundMode {
    /// Largest polygon, preferring the largest quadrilateral
    #[default]
    Single,
    /// The `count` largest polygons, for compositing
    TopN { count: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BackgroundConfig {
    pub mode: BackgroundMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RecognizerConfig {
    #[schemars(description = "Largest feature distance still reported as a match")]
    pub max_distance: f64,
    #[schemars(description = "Store key the registry is persisted under")]
    pub namespace: String,
}

pub const DEFAULT_REGISTRY_NAMESPACE: &str = "mapmap_component_registry";

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            max_distance: 0.6,
            namespace: DEFAULT_REGISTRY_NAMESPACE.to_string(),
        }
    }
}

impl ShapeConfig {
    /// Get the JSON schema for the configuration
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ShapeConfig)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            _ => Err(ShapeError::UnsupportedConfigFormat),
        }
    }
}

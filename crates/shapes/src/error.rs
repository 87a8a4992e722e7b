use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("Polygon needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("Component label must not be empty")]
    EmptyLabel,

    #[error("No polygons analyzed yet")]
    NoAnalysis,

    #[error("Polygon index {index} out of range (analysis holds {len} shapes)")]
    PolygonIndexOutOfRange { index: usize, len: usize },

    #[error("Detector reported an error: {0}")]
    DetectionFailed(String),

    #[error("Unsupported config format. Please use .toml or .json files")]
    UnsupportedConfigFormat,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, ShapeError>;

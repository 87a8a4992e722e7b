use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{geometry, types::Polygon};

/// Number of entries in a [`FeatureVector`]
pub const FEATURE_LEN: usize = 5;

/// Un-normalized measurements a feature vector is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RawFeatures {
    pub area: f64,
    /// Bounding box width over height, 1 when either side is zero
    pub aspect: f64,
    #[ts(type = "number")]
    pub vertex_count: usize,
    pub mean_side: f64,
    /// Population standard deviation of the side lengths
    pub side_std: f64,
    pub bbox_width: f64,
    pub bbox_height: f64,
}

impl RawFeatures {
    pub fn of(polygon: &Polygon) -> Self {
        let bbox = polygon.bounding_box();
        let aspect = if bbox.width != 0.0 && bbox.height != 0.0 {
            bbox.width / bbox.height
        } else {
            1.0
        };
        let sides = polygon.side_lengths();
        let mean_side = geometry::mean(&sides);
        let side_std = geometry::std_dev(&sides);

        Self {
            area: polygon.area(),
            aspect,
            vertex_count: polygon.vertex_count(),
            mean_side,
            side_std,
            bbox_width: bbox.width,
            bbox_height: bbox.height,
        }
    }

    /// Squash every measurement into roughly `[0, 1]` with a fixed formula.
    pub fn normalize(&self) -> FeatureVector {
        FeatureVector([
            self.area.max(1.0).log10() / 6.0,
            self.aspect.clamp(0.0, 5.0) / 5.0,
            self.vertex_count.min(12) as f64 / 12.0,
            self.mean_side.max(1.0).log10() / 4.0,
            (self.side_std / self.mean_side.max(1.0)).clamp(0.0, 1.0),
        ])
    }
}

/// Normalized descriptor used for recognition only.
///
/// Layout: `[area, aspect, vertex_count, mean_side, side_spread]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct FeatureVector(pub [f64; FEATURE_LEN]);

impl FeatureVector {
    pub fn from_polygon(polygon: &Polygon) -> Self {
        RawFeatures::of(polygon).normalize()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean distance
    pub fn distance(&self, other: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

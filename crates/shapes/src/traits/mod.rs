use crate::{
    algorithms::ShapeKind,
    error::Result,
    types::{BackgroundSelection, Polygon},
};

/// Trait for noise suppression over a raw detector batch
pub trait CandidateFilter: Send + Sync {
    /// Whether a polygon is plausible enough to be a candidate
    fn accepts(&self, polygon: &Polygon) -> bool;

    /// Keep only the accepted polygons, preserving detection order
    fn filter(&self, polygons: &[Polygon]) -> Vec<Polygon> {
        polygons.iter().filter(|p| self.accepts(p)).cloned().collect()
    }
}

/// Trait for picking the document/map boundary
pub trait BackgroundSelector: Send + Sync {
    /// Select the background from `polygons`, `None` when there are none
    fn select(&self, polygons: &[Polygon]) -> Option<BackgroundSelection>;
}

/// Trait for geometric shape classification
pub trait ShapeClassifier: Send + Sync {
    /// Assign a kind to one interior polygon. Must be deterministic.
    fn classify(&self, polygon: &Polygon) -> ShapeKind;
}

/// Textual key-value persistence backing the component registry
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

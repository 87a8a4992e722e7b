//! # Map Shape Analysis Library
//!
//! Turns the polygons a detector found in a photographed or scanned map into
//! a background boundary plus classified interior shapes, and recognizes
//! shapes a user has taught it before.
//!
//! ## Core Features
//!
//! - **Trait-based Architecture**: swap the candidate filter, background selector or classifier
//! - **Rule Classifier**: tolerance-based triangle/quadrilateral/polygon taxonomy with a landmark override
//! - **Component Recognition**: nearest-example lookup over a persisted, user-taught registry
//! - **GeoJSON Support**: export an analysis as a `FeatureCollection`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shapes::{polygons_from_json, Pipeline};
//!
//! let json = std::fs::read_to_string("detections.json")?;
//! let polygons = polygons_from_json(&json)?;
//!
//! let analysis = Pipeline::builder().build().process(&polygons);
//! for shape in &analysis.shapes {
//!     println!("{} at {:?}", shape.kind, shape.centroid());
//! }
//! analysis.save_geojson("analysis.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Teaching Components
//!
//! ```rust,no_run
//! use shapes::{FileStore, ShapeConfig, ShapeManager, ShapeManagerCommand};
//!
//! let mut manager = ShapeManager::new(&ShapeConfig::default(), FileStore::new(".mapmap"));
//! manager.load_detections(&std::fs::read_to_string("detections.json")?)?;
//! manager.execute(ShapeManagerCommand::Analyze)?;
//! manager.execute(ShapeManagerCommand::Register { index: 0, label: "door".into() })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod geometry;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod recognition;
pub mod io;
pub mod manager;

// Re-exports for convenience
pub use error::{Result, ShapeError};
pub use types::{
    polygons_from_json, polygons_from_raw, polygons_from_values, Analysis, BackgroundSelection,
    BoundingBox, ClassifiedPolygon, DetectionResponse, Polygon, RawPolygon,
};
pub use config::{
    BackgroundConfig, BackgroundMode, ClassifierConfig, FilterConfig, RecognizerConfig,
    ShapeConfig,
};
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use recognition::*;
pub use io::polygons_from_geojson_str;
pub use manager::{ShapeManager, ShapeManagerCommand, ShapeManagerOutput};

#[cfg(test)]
mod tests {
    use super::*;

    /// A scanned sheet with a title box, a triangle marker, a hexagonal
    /// building and a speck of noise.
    fn detections() -> Vec<RawPolygon> {
        vec![
            RawPolygon::new(vec![[0.0, 0.0], [300.0, 0.0], [300.0, 300.0], [0.0, 300.0]]),
            RawPolygon::new(vec![[10.0, 10.0], [90.0, 10.0], [90.0, 50.0], [10.0, 50.0]]),
            RawPolygon::new(vec![[150.0, 20.0], [230.0, 20.0], [190.0, 89.3]]),
            RawPolygon::new(vec![
                [150.0, 150.0],
                [180.0, 132.7],
                [210.0, 150.0],
                [210.0, 184.6],
                [180.0, 201.9],
                [150.0, 184.6],
            ]),
            RawPolygon::new(vec![[5.0, 5.0], [7.0, 5.0], [6.0, 7.0]]),
        ]
    }

    #[test]
    fn analyzes_a_scanned_sheet() {
        let polygons = polygons_from_raw(detections());
        let analysis = Pipeline::default().process(&polygons);

        assert_eq!(analysis.background.as_ref().unwrap().polygons()[0].id(), 0);
        let kinds: Vec<&str> = analysis.shapes.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["rectangle", "equilateral triangle", "6-sided regular polygon"]
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let polygons = polygons_from_raw(detections());
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.process(&polygons), pipeline.process(&polygons));
    }

    #[test]
    fn geojson_export_covers_background_and_shapes() {
        let polygons = polygons_from_raw(detections());
        let analysis = Pipeline::default().process(&polygons);
        let collection = analysis.to_geojson();
        assert_eq!(collection.features.len(), 1 + analysis.shapes.len());
    }

    #[test]
    fn manager_round_trip_with_recognition() {
        let mut manager = ShapeManager::new(&ShapeConfig::default(), MemoryStore::new());
        manager.set_polygons(polygons_from_raw(detections()));
        manager.execute(ShapeManagerCommand::Analyze).unwrap();
        manager
            .execute(ShapeManagerCommand::Register { index: 2, label: "building".into() })
            .unwrap();

        let ShapeManagerOutput::Analysis(analysis) =
            manager.execute(ShapeManagerCommand::Analyze).unwrap()
        else {
            panic!("expected analysis");
        };
        assert_eq!(analysis.shapes[2].kind, "building");
        assert_eq!(analysis.shapes[2].recognized.as_ref().unwrap().distance, 0.0);
    }
}

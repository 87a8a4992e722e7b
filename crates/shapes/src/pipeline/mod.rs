pub mod builder;

use tracing::debug;

use crate::{
    algorithms::AreaDimensionFilter,
    traits::{BackgroundSelector, CandidateFilter, ShapeClassifier},
    types::{Analysis, ClassifiedPolygon, Polygon},
};

/// Filter, background selection and classification over one detector batch
pub struct Pipeline {
    filter: Box<dyn CandidateFilter>,
    interior_bounds: AreaDimensionFilter,
    background_selector: Box<dyn BackgroundSelector>,
    classifier: Box<dyn ShapeClassifier>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        filter: Box<dyn CandidateFilter>,
        interior_bounds: AreaDimensionFilter,
        background_selector: Box<dyn BackgroundSelector>,
        classifier: Box<dyn ShapeClassifier>,
    ) -> Self {
        Self {
            filter,
            interior_bounds,
            background_selector,
            classifier,
        }
    }

    /// Run one batch through the pipeline. Never fails: an empty batch gives
    /// an empty analysis.
    pub fn process(&self, polygons: &[Polygon]) -> Analysis {
        // The stages see the batch numbered by slice position, so the
        // background is excluded by position whatever ids the caller assigned.
        let positioned: Vec<Polygon> = polygons
            .iter()
            .enumerate()
            .map(|(position, p)| p.clone().with_id(position))
            .collect();

        // Step 1: Noise suppression
        let candidates = self.filter.filter(&positioned);

        // Step 2: Background from the candidates, or every polygon if none survived
        let pool = if candidates.is_empty() { &positioned[..] } else { &candidates[..] };
        let selected = self.background_selector.select(pool);

        // Step 3: Interior shapes are strictly smaller than the background
        let area_limit = selected
            .as_ref()
            .map_or(f64::INFINITY, |bg| bg.area_limit());
        let shapes: Vec<ClassifiedPolygon> = polygons
            .iter()
            .enumerate()
            .filter(|(position, _)| !selected.as_ref().is_some_and(|bg| bg.contains_id(*position)))
            .map(|(_, p)| p)
            .filter(|p| p.area() < area_limit)
            .filter(|p| self.interior_bounds.is_large_enough(p))
            .map(|p| ClassifiedPolygon::new(p.clone(), self.classifier.classify(p)))
            .collect();

        let background = selected.map(|bg| bg.resolve(polygons));

        debug!(
            total = polygons.len(),
            candidates = candidates.len(),
            shapes = shapes.len(),
            "Processed polygon batch"
        );

        Analysis {
            background,
            shapes,
            candidate_count: candidates.len(),
        }
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: interior shapes need area >= {} and sides >= {}px",
            self.interior_bounds.min_area, self.interior_bounds.min_dim
        )
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        builder::PipelineBuilder::new().build()
    }
}

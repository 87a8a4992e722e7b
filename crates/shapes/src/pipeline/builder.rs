use crate::{
    algorithms::{selector_for, AreaDimensionFilter, LargestQuadSelector, RuleClassifier},
    config::ShapeConfig,
    pipeline::Pipeline,
    traits::{BackgroundSelector, CandidateFilter, ShapeClassifier},
};

/// Builder for creating analysis pipelines with a fluent API
pub struct PipelineBuilder {
    filter: Option<Box<dyn CandidateFilter>>,
    interior_bounds: AreaDimensionFilter,
    background_selector: Option<Box<dyn BackgroundSelector>>,
    classifier: Option<Box<dyn ShapeClassifier>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            filter: None,
            interior_bounds: AreaDimensionFilter::default(),
            background_selector: None,
            classifier: None,
        }
    }

    /// Set the candidate filter (replaces any existing one)
    pub fn set_filter<F>(mut self, filter: F) -> Self
    where
        F: CandidateFilter + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Set the lower bounds interior shapes must meet
    pub fn set_interior_bounds(mut self, bounds: AreaDimensionFilter) -> Self {
        self.interior_bounds = bounds;
        self
    }

    /// Set the background selector (replaces any existing one)
    pub fn set_background_selector<S>(mut self, selector: S) -> Self
    where
        S: BackgroundSelector + 'static,
    {
        self.background_selector = Some(Box::new(selector));
        self
    }

    /// Set the shape classifier (replaces any existing one)
    pub fn set_classifier<C>(mut self, classifier: C) -> Self
    where
        C: ShapeClassifier + 'static,
    {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let filter = self.filter
            .unwrap_or_else(|| Box::new(AreaDimensionFilter::default()));

        let background_selector = self.background_selector
            .unwrap_or_else(|| Box::new(LargestQuadSelector));

        let classifier = self.classifier
            .unwrap_or_else(|| Box::new(RuleClassifier::default()));

        Pipeline::new(filter, self.interior_bounds, background_selector, classifier)
    }

    /// Build a pipeline whose every component follows the configuration
    pub fn build_from_config(config: &ShapeConfig) -> Pipeline {
        let bounds = AreaDimensionFilter::from(&config.filter);
        Pipeline::new(
            Box::new(bounds.clone()),
            bounds,
            selector_for(config.background.mode),
            Box::new(RuleClassifier::new(config.classifier.clone())),
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

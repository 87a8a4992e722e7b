use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, VariantNames};
use tracing::{debug, info};

use crate::{
    config::ShapeConfig,
    error::{Result, ShapeError},
    pipeline::{builder::PipelineBuilder, Pipeline},
    recognition::{validate_label, RecognitionMatch, RecognitionService, Registration, RegistryEntry},
    traits::KeyValueStore,
    types::{polygons_from_json, Analysis, ClassifiedPolygon, Polygon},
};

#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, VariantNames,
    PartialEq
)]
#[serde(tag = "type", content = "params")]
#[strum(serialize_all = "snake_case")]
pub enum ShapeManagerCommand {
    /// Classify the loaded polygon batch, replacing the previous analysis
    #[serde(rename = "analyze")]
    Analyze,

    /// Teach the registry a label for one analyzed shape
    #[serde(rename = "register")]
    Register {
        index: usize,
        #[schemars(length(min = 1))]
        label: String,
    },

    /// Look up the registry label nearest to one analyzed shape
    #[serde(rename = "recognize")]
    Recognize {
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_distance: Option<f64>,
    },

    /// List every registered component
    #[serde(rename = "list_registry")]
    ListRegistry,
}

impl ShapeManagerCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ShapeManagerCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Get a description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::Analyze => "Filter the polygon batch, pick the background and classify interior shapes",
            Self::Register { .. } => "Store an analyzed shape as an example of a user-supplied label",
            Self::Recognize { .. } => "Find the registered label nearest to an analyzed shape",
            Self::ListRegistry => "List registered components with their example counts",
        }
    }
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "result", rename_all = "snake_case")]
pub enum ShapeManagerOutput {
    Analysis(Analysis),
    Registration(Registration),
    Recognition(Option<RecognitionMatch>),
    Registry(Vec<RegistryEntry>),
}

/// One interactive session: the current polygon batch, its latest analysis
/// and the recognition service.
pub struct ShapeManager {
    pipeline: Pipeline,
    recognition: RecognitionService,
    polygons: Vec<Polygon>,
    analysis: Option<Analysis>,
}

impl ShapeManager {
    pub fn new<S>(config: &ShapeConfig, store: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self::with_pipeline(
            PipelineBuilder::build_from_config(config),
            RecognitionService::load(store, &config.recognizer),
        )
    }

    /// Create a new ShapeManager with a custom pipeline
    pub fn with_pipeline(pipeline: Pipeline, recognition: RecognitionService) -> Self {
        Self {
            pipeline,
            recognition,
            polygons: Vec::new(),
            analysis: None,
        }
    }

    /// Replace the polygon batch. The previous analysis is discarded.
    pub fn set_polygons(&mut self, polygons: Vec<Polygon>) {
        self.polygons = polygons;
        self.analysis = None;
    }

    /// Load a batch from detector JSON
    pub fn load_detections(&mut self, json: &str) -> Result<usize> {
        let polygons = polygons_from_json(json)?;
        let count = polygons.len();
        self.set_polygons(polygons);
        Ok(count)
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn recognition(&self) -> &RecognitionService {
        &self.recognition
    }

    fn shape(&self, index: usize) -> Result<&ClassifiedPolygon> {
        let analysis = self.analysis.as_ref().ok_or(ShapeError::NoAnalysis)?;
        analysis.shapes.get(index).ok_or(ShapeError::PolygonIndexOutOfRange {
            index,
            len: analysis.shapes.len(),
        })
    }

    pub fn execute(&mut self, command: ShapeManagerCommand) -> Result<ShapeManagerOutput> {
        debug!(command = %command, "Executing command");
        match command {
            ShapeManagerCommand::Analyze => {
                let mut analysis = self.pipeline.process(&self.polygons);
                let recognized = self.recognition.annotate(&mut analysis.shapes);
                info!(
                    shapes = analysis.shapes.len(),
                    recognized,
                    "Analyzed polygon batch"
                );
                self.analysis = Some(analysis.clone());
                Ok(ShapeManagerOutput::Analysis(analysis))
            }
            ShapeManagerCommand::Register { index, label } => {
                let label = validate_label(&label)?.to_string();
                let polygon = self.shape(index)?.polygon.clone();
                let registration = self.recognition.register(&label, &polygon);

                if let Some(shape) = self
                    .analysis
                    .as_mut()
                    .and_then(|analysis| analysis.shapes.get_mut(index))
                {
                    shape.relabel(label);
                }
                Ok(ShapeManagerOutput::Registration(registration))
            }
            ShapeManagerCommand::Recognize { index, max_distance } => {
                let polygon = &self.shape(index)?.polygon;
                let max_distance = max_distance.unwrap_or(self.recognition.max_distance());
                Ok(ShapeManagerOutput::Recognition(
                    self.recognition.recognize_within(polygon, max_distance),
                ))
            }
            ShapeManagerCommand::ListRegistry => Ok(ShapeManagerOutput::Registry(
                self.recognition.registry().entries().to_vec(),
            )),
        }
    }
}

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::RecognizerConfig,
    error::{Result, ShapeError},
    recognition::{ComponentRegistry, FeatureVector, RecognitionMatch},
    traits::KeyValueStore,
    types::{ClassifiedPolygon, Polygon},
};

/// Outcome of teaching the registry one example.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub label: String,
    /// Examples now held under the label
    pub count: usize,
    /// Set when the example is kept in memory but could not be persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Reject labels that are empty once trimmed.
pub fn validate_label(label: &str) -> Result<&str> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ShapeError::EmptyLabel);
    }
    Ok(trimmed)
}

/// Owns the component registry and the store it is persisted in.
///
/// The registry is read once by [`RecognitionService::load`] and the whole
/// collection is written back after every registration.
pub struct RecognitionService {
    registry: ComponentRegistry,
    store: Box<dyn KeyValueStore>,
    namespace: String,
    max_distance: f64,
}

impl RecognitionService {
    /// Load the registry persisted under the configured namespace.
    ///
    /// Missing, unreadable or corrupt data starts an empty registry.
    pub fn load<S>(store: S, config: &RecognizerConfig) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let namespace = config.namespace.clone();
        let registry = match store.get(&namespace) {
            Ok(Some(json)) => ComponentRegistry::from_json(&json).unwrap_or_else(|e| {
                warn!(namespace = %namespace, "Discarding corrupt component registry: {}", e);
                ComponentRegistry::new()
            }),
            Ok(None) => ComponentRegistry::new(),
            Err(e) => {
                warn!(namespace = %namespace, "Component registry unavailable: {}", e);
                ComponentRegistry::new()
            }
        };

        info!(components = registry.len(), "Loaded component registry");

        Self {
            registry,
            store: Box::new(store),
            namespace,
            max_distance: config.max_distance,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Write the full registry back to the store.
    pub fn save(&mut self) -> Result<()> {
        let json = self.registry.to_json()?;
        self.store.set(&self.namespace, &json)
    }

    /// Add `polygon` as an example of `label`, then persist.
    ///
    /// A persistence failure leaves the in-memory registry updated and is
    /// reported through [`Registration::warning`].
    pub fn register(&mut self, label: &str, polygon: &Polygon) -> Registration {
        let count = self.registry.add(label, polygon);

        let warning = match self.save() {
            Ok(()) => None,
            Err(e) => {
                warn!(label, "Component registry not persisted: {}", e);
                Some(format!("registry not saved: {e}"))
            }
        };

        info!(label, count, "Registered component example");
        Registration { label: label.to_string(), count, warning }
    }

    /// Recognize with the configured distance threshold.
    pub fn recognize(&self, polygon: &Polygon) -> Option<RecognitionMatch> {
        self.recognize_within(polygon, self.max_distance)
    }

    pub fn recognize_within(&self, polygon: &Polygon, max_distance: f64) -> Option<RecognitionMatch> {
        if self.registry.is_empty() {
            return None;
        }
        self.registry
            .recognize(&FeatureVector::from_polygon(polygon), max_distance)
    }

    /// Relabel every shape the registry recognizes. Returns how many matched.
    pub fn annotate(&self, shapes: &mut [ClassifiedPolygon]) -> usize {
        let mut matched = 0;
        for shape in shapes.iter_mut() {
            shape.recognized = self.recognize(&shape.polygon);
            if let Some(found) = &shape.recognized {
                shape.kind = found.label.clone();
                matched += 1;
            }
        }
        matched
    }
}

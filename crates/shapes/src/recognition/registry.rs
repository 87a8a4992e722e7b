use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::{
    error::Result,
    recognition::{FeatureVector, RawFeatures, RecognitionMatch},
    types::Polygon,
};

/// A user-taught label and every example registered under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegistryEntry {
    pub label: String,
    pub examples: Vec<FeatureVector>,
    /// Raw features of the first example
    pub proto: RawFeatures,
    #[ts(type = "number")]
    pub count: usize,
}

/// Append-only collection of labelled examples, one entry per exact label.
///
/// Serialized as a bare JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRegistry {
    entries: Vec<RegistryEntry>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `polygon` as an example of `label` and return the label's count.
    ///
    /// Labels are compared exactly. Callers validate them beforehand.
    pub fn add(&mut self, label: &str, polygon: &Polygon) -> usize {
        let raw = RawFeatures::of(polygon);
        let features = raw.normalize();

        match self.entries.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => {
                entry.examples.push(features);
                entry.count += 1;
                debug!(label, count = entry.count, "Added example to component");
                entry.count
            }
            None => {
                self.entries.push(RegistryEntry {
                    label: label.to_string(),
                    examples: vec![features],
                    proto: raw,
                    count: 1,
                });
                debug!(label, "Registered new component");
                1
            }
        }
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest-example lookup.
    ///
    /// Each entry scores the distance to its closest example and the lowest
    /// score across entries wins, earlier entries winning ties. The winner is
    /// returned only when its distance is at most `max_distance`.
    pub fn recognize(&self, features: &FeatureVector, max_distance: f64) -> Option<RecognitionMatch> {
        let mut best: Option<RecognitionMatch> = None;

        for entry in &self.entries {
            let nearest = entry
                .examples
                .iter()
                .map(|example| features.distance(example))
                .fold(f64::INFINITY, f64::min);

            if best.as_ref().is_none_or(|b| nearest < b.distance) {
                best = Some(RecognitionMatch {
                    label: entry.label.clone(),
                    distance: nearest,
                });
            }
        }

        best.filter(|m| m.distance <= max_distance)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

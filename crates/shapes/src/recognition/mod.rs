pub mod features;
pub mod registry;
pub mod service;
pub mod store;

pub use features::*;
pub use registry::*;
pub use service::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The registry label nearest to a query polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecognitionMatch {
    pub label: String,
    pub distance: f64,
}

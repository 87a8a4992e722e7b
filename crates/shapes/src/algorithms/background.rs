use tracing::debug;

use crate::{
    config::BackgroundMode,
    traits::BackgroundSelector,
    types::{BackgroundSelection, Polygon},
};

/// Picks the single largest polygon, letting the largest quadrilateral win.
///
/// Scanned document boundaries are reliably four-sided, so a quadrilateral is
/// preferred even over a larger non-quadrilateral detection.
#[derive(Debug, Clone, Default)]
pub struct LargestQuadSelector;

impl BackgroundSelector for LargestQuadSelector {
    fn select(&self, polygons: &[Polygon]) -> Option<BackgroundSelection> {
        let mut largest: Option<&Polygon> = None;
        let mut largest_quad: Option<&Polygon> = None;

        for polygon in polygons {
            if largest.is_none_or(|best| polygon.area() > best.area()) {
                largest = Some(polygon);
            }
            if polygon.vertex_count() == 4
                && largest_quad.is_none_or(|best| polygon.area() > best.area())
            {
                largest_quad = Some(polygon);
            }
        }

        let chosen = largest_quad.or(largest)?;
        debug!(
            id = chosen.id(),
            area = chosen.area(),
            quad = largest_quad.is_some(),
            "Selected background polygon"
        );
        Some(BackgroundSelection::Single(chosen.clone()))
    }
}

/// Takes the `count` largest polygons, largest first.
///
/// Equal areas keep detection order.
#[derive(Debug, Clone)]
pub struct TopNSelector {
    pub count: usize,
}

impl Default for TopNSelector {
    fn default() -> Self {
        Self { count: 2 }
    }
}

impl BackgroundSelector for TopNSelector {
    fn select(&self, polygons: &[Polygon]) -> Option<BackgroundSelection> {
        if polygons.is_empty() || self.count == 0 {
            return None;
        }

        let mut sorted: Vec<Polygon> = polygons.to_vec();
        sorted.sort_by(|a, b| b.area().total_cmp(&a.area()));
        sorted.truncate(self.count);

        debug!(count = sorted.len(), "Selected background group");
        Some(BackgroundSelection::Group(sorted))
    }
}

/// Build the selector matching a configured mode
pub fn selector_for(mode: BackgroundMode) -> Box<dyn BackgroundSelector> {
    debug!(%mode, "Building background selector");
    match mode {
        BackgroundMode::Single => Box::new(LargestQuadSelector),
        BackgroundMode::TopN { count } => Box::new(TopNSelector { count }),
    }
}

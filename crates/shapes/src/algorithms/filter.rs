use tracing::debug;

use crate::{config::FilterConfig, traits::CandidateFilter, types::Polygon};

/// Area and bounding-box bounds filter.
///
/// A polygon is a candidate when `min_area <= area <= max_area` and both
/// bounding-box sides are at least `min_dim`.
#[derive(Debug, Clone)]
pub struct AreaDimensionFilter {
    pub min_area: f64,
    pub max_area: f64,
    pub min_dim: f64,
}

impl Default for AreaDimensionFilter {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

impl From<&FilterConfig> for AreaDimensionFilter {
    fn from(config: &FilterConfig) -> Self {
        Self {
            min_area: config.min_area,
            max_area: config.max_area,
            min_dim: config.min_dim,
        }
    }
}

impl AreaDimensionFilter {
    /// Lower bounds only. The interior pass uses this so landmark-sized
    /// shapes inside a larger background are still classified.
    pub fn is_large_enough(&self, polygon: &Polygon) -> bool {
        let bbox = polygon.bounding_box();
        polygon.area() >= self.min_area && bbox.width >= self.min_dim && bbox.height >= self.min_dim
    }
}

impl CandidateFilter for AreaDimensionFilter {
    fn accepts(&self, polygon: &Polygon) -> bool {
        let accepted = self.is_large_enough(polygon) && polygon.area() <= self.max_area;
        if !accepted {
            debug!(id = polygon.id(), area = polygon.area(), "Polygon rejected as noise");
        }
        accepted
    }
}

/// Pass-through filter
#[derive(Debug, Clone, Default)]
pub struct NoFilter;

impl CandidateFilter for NoFilter {
    fn accepts(&self, _polygon: &Polygon) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_area(area: f64) -> Polygon {
        Polygon::with_area(
            vec![[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]],
            area,
        )
        .unwrap()
    }

    #[test]
    fn rejects_areas_outside_bounds() {
        let filter = AreaDimensionFilter::default();
        assert!(!filter.accepts(&square_with_area(10.0)));
        assert!(!filter.accepts(&square_with_area(500_000.0)));
        assert!(filter.accepts(&square_with_area(1500.0)));
        assert!(filter.accepts(&square_with_area(100_000.0)));
    }

    #[test]
    fn rejects_thin_polygons() {
        let filter = AreaDimensionFilter::default();
        let sliver = Polygon::rectangle(0.0, 0.0, 500.0, 10.0);
        assert_eq!(sliver.area(), 5000.0);
        assert!(!filter.accepts(&sliver));
        assert!(!filter.is_large_enough(&sliver));
    }

    #[test]
    fn degenerate_polygon_is_filtered_by_area() {
        let filter = AreaDimensionFilter::default();
        let collinear = Polygon::new(vec![[0.0, 0.0], [50.0, 50.0], [100.0, 100.0]]).unwrap();
        assert_eq!(collinear.area(), 0.0);
        assert!(!filter.accepts(&collinear));
    }

    #[test]
    fn interior_check_ignores_upper_bound() {
        let filter = AreaDimensionFilter::default();
        let huge = Polygon::rectangle(0.0, 0.0, 600.0, 400.0);
        assert!(!filter.accepts(&huge));
        assert!(filter.is_large_enough(&huge));
    }

    #[test]
    fn filter_preserves_order() {
        let filter = AreaDimensionFilter::default();
        let polygons = vec![
            Polygon::rectangle(0.0, 0.0, 50.0, 50.0).with_id(0),
            Polygon::rectangle(0.0, 0.0, 5.0, 5.0).with_id(1),
            Polygon::rectangle(0.0, 0.0, 60.0, 60.0).with_id(2),
        ];
        let ids: Vec<usize> = filter.filter(&polygons).iter().map(Polygon::id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(NoFilter.filter(&polygons).len(), 3);
    }
}

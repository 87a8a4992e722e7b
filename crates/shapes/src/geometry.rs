//! Pure measurements over an ordered, implicitly closed vertex list.
//!
//! Every function here is total: short or degenerate input yields a zero-ish
//! answer instead of a panic, so one bad detection never aborts a batch.

use crate::types::BoundingBox;

/// Shoelace sum over the cyclic vertex sequence (counter-clockwise positive
/// in a y-up frame).
pub fn signed_area(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let [x1, y1] = points[i];
        let [x2, y2] = points[(i + 1) % n];
        sum += x1 * y2 - x2 * y1;
    }
    sum / 2.0
}

/// Absolute shoelace area. Non-finite results collapse to `0.0`.
pub fn area(points: &[[f64; 2]]) -> f64 {
    let area = signed_area(points).abs();
    if area.is_finite() { area } else { 0.0 }
}

/// Arithmetic mean of the vertices.
///
/// This is not the area-weighted centroid. It is only used to place labels.
pub fn centroid(points: &[[f64; 2]]) -> [f64; 2] {
    if points.is_empty() {
        return [0.0, 0.0];
    }

    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &[x, y]| (sx + x, sy + y));
    let n = points.len() as f64;
    [sum_x / n, sum_y / n]
}

/// Axis-aligned bounds. An empty list yields a zero-sized box at the centroid.
pub fn bounding_box(points: &[[f64; 2]]) -> BoundingBox {
    if points.is_empty() {
        let [x, y] = centroid(points);
        return BoundingBox { x, y, width: 0.0, height: 0.0 };
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &[x, y] in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let width = max_x - min_x;
    let height = max_y - min_y;
    BoundingBox {
        x: min_x,
        y: min_y,
        width: if width.is_finite() { width } else { 0.0 },
        height: if height.is_finite() { height } else { 0.0 },
    }
}

fn edge_vectors(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let [ax, ay] = points[i];
            let [bx, by] = points[(i + 1) % n];
            [bx - ax, by - ay]
        })
        .collect()
}

/// Euclidean length of every edge, including the closing edge.
pub fn side_lengths(points: &[[f64; 2]]) -> Vec<f64> {
    edge_vectors(points)
        .into_iter()
        .map(|[dx, dy]| dx.hypot(dy))
        .collect()
}

/// Angle between each edge vector and the next one, in `[0, π]`.
///
/// A zero-length edge is treated as having unit magnitude, and the cosine is
/// clamped so float overshoot never leaves the domain of `acos`.
pub fn turn_angles(points: &[[f64; 2]]) -> Vec<f64> {
    let edges = edge_vectors(points);
    let n = edges.len();
    (0..n)
        .map(|i| {
            let [ax, ay] = edges[i];
            let [bx, by] = edges[(i + 1) % n];
            let dot = ax * bx + ay * by;
            let mut magnitude = ax.hypot(ay) * bx.hypot(by);
            if magnitude == 0.0 {
                magnitude = 1.0;
            }
            (dot / magnitude).clamp(-1.0, 1.0).acos()
        })
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    const SQUARE: [[f64; 2]; 4] = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];

    #[test]
    fn unit_square_measurements() {
        assert_eq!(area(&SQUARE), 100.0);
        assert_eq!(
            bounding_box(&SQUARE),
            BoundingBox { x: 0.0, y: 0.0, width: 10.0, height: 10.0 }
        );
        assert_eq!(centroid(&SQUARE), [5.0, 5.0]);
        assert_eq!(side_lengths(&SQUARE), vec![10.0; 4]);
        for angle in turn_angles(&SQUARE) {
            assert!((angle - FRAC_PI_2).abs() < 1e-12);
        }
    }

    #[test]
    fn signed_area_follows_orientation() {
        let mut reversed = SQUARE.to_vec();
        reversed.reverse();
        assert_eq!(signed_area(&SQUARE), 100.0);
        assert_eq!(signed_area(&reversed), -100.0);
    }

    #[test]
    fn short_and_degenerate_inputs_are_zero() {
        assert_eq!(area(&[]), 0.0);
        assert_eq!(area(&[[1.0, 1.0], [2.0, 2.0]]), 0.0);
        assert_eq!(area(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]), 0.0);
        assert_eq!(area(&[[0.0, 0.0], [f64::NAN, 1.0], [2.0, 0.0]]), 0.0);
        assert_eq!(area(&[[0.0, 0.0], [f64::INFINITY, 1.0], [2.0, 0.0]]), 0.0);
    }

    #[test]
    fn empty_bounding_box_sits_at_centroid() {
        let bbox = bounding_box(&[]);
        assert_eq!(bbox, BoundingBox { x: 0.0, y: 0.0, width: 0.0, height: 0.0 });
    }

    #[test]
    fn duplicate_vertices_do_not_poison_angles() {
        let points = [[0.0, 0.0], [0.0, 0.0], [10.0, 0.0], [10.0, 10.0]];
        let angles = turn_angles(&points);
        assert_eq!(angles.len(), 4);
        assert!(angles.iter().all(|a| a.is_finite()));
    }

    #[test]
    fn shoelace_agrees_with_geo() {
        use geo::Area;
        let points = [[3.0, 1.0], [17.5, 4.0], [21.0, 19.0], [8.0, 25.0], [-2.0, 12.0]];
        let polygon = geo_types::Polygon::new(
            points.iter().map(|&[x, y]| geo_types::Coord { x, y }).collect(),
            vec![],
        );
        assert!((area(&points) - polygon.unsigned_area()).abs() < 1e-9);
    }

    #[test]
    fn std_dev_is_population() {
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    fn polygon_strategy() -> impl Strategy<Value = Vec<[f64; 2]>> {
        prop::collection::vec(
            (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| [x, y]),
            3..12,
        )
    }

    proptest! {
        #[test]
        fn area_is_never_negative(points in polygon_strategy()) {
            prop_assert!(area(&points) >= 0.0);
        }

        #[test]
        fn area_ignores_vertex_order_direction(points in polygon_strategy()) {
            let mut reversed = points.clone();
            reversed.reverse();
            let forward = area(&points);
            prop_assert!((forward - area(&reversed)).abs() <= 1e-9 * forward.max(1.0));
        }

        #[test]
        fn bounding_box_contains_every_vertex(points in polygon_strategy()) {
            let bbox = bounding_box(&points);
            prop_assert!(bbox.width >= 0.0 && bbox.height >= 0.0);
            for [x, y] in points {
                prop_assert!(x >= bbox.x && x <= bbox.x + bbox.width + 1e-9);
                prop_assert!(y >= bbox.y && y <= bbox.y + bbox.height + 1e-9);
            }
        }
    }
}

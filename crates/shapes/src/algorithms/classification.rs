//! Tolerance-based geometric classification.
//!
//! Classification is an ordered list of rules, each owning a vertex-count
//! bucket. The first rule whose bucket matches decides the kind. The landmark
//! area override runs afterwards as a separate pass, so it always wins over
//! whatever the rules decided.

use std::{f64::consts::FRAC_PI_2, fmt};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::{
    config::ClassifierConfig,
    geometry::{mean, std_dev},
    traits::ShapeClassifier,
    types::Polygon,
};

/// The closed taxonomy of geometric shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum ShapeKind {
    EquilateralTriangle,
    IsoscelesTriangle,
    ScaleneTriangle,
    Square,
    Rectangle,
    Rhombus,
    Quadrilateral,
    RegularPolygon { #[ts(type = "number")] sides: usize },
    Polygon { #[ts(type = "number")] sides: usize },
    ComplexPolygon { #[ts(type = "number")] sides: usize },
    VeryLargeArea,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EquilateralTriangle => f.write_str("equilateral triangle"),
            Self::IsoscelesTriangle => f.write_str("isosceles triangle"),
            Self::ScaleneTriangle => f.write_str("scalene triangle"),
            Self::Square => f.write_str("square"),
            Self::Rectangle => f.write_str("rectangle"),
            Self::Rhombus => f.write_str("rhombus"),
            Self::Quadrilateral => f.write_str("quadrilateral"),
            Self::RegularPolygon { sides } => write!(f, "{sides}-sided regular polygon"),
            Self::Polygon { sides } => write!(f, "{sides}-sided polygon"),
            Self::ComplexPolygon { sides } => write!(f, "complex {sides}-sided polygon"),
            Self::VeryLargeArea => f.write_str("very large area (airport/park)"),
        }
    }
}

/// Per-polygon measurements shared by every rule.
#[derive(Debug, Clone)]
pub struct ShapeMeasurements {
    pub vertex_count: usize,
    pub sides: Vec<f64>,
    pub angles: Vec<f64>,
    pub mean_side: f64,
    pub area: f64,
}

impl ShapeMeasurements {
    pub fn of(polygon: &Polygon) -> Self {
        let sides = polygon.side_lengths();
        let mean_side = mean(&sides);
        Self {
            vertex_count: polygon.vertex_count(),
            angles: polygon.turn_angles(),
            sides,
            mean_side,
            area: polygon.area(),
        }
    }
}

/// Relative equality: `|a - b| / max(|b|, 1) <= tol`, with an exact-zero
/// reference only matching a near-zero value.
pub fn approx_equal(a: f64, b: f64, tol: f64) -> bool {
    if b == 0.0 {
        return a.abs() < 1e-6;
    }
    (a - b).abs() / b.abs().max(1.0) <= tol
}

type RuleFn = fn(&ShapeMeasurements, &ClassifierConfig) -> ShapeKind;

/// A vertex-count bucket and the predicate chain deciding kinds inside it.
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub min_vertices: usize,
    pub max_vertices: usize,
    pub classify: RuleFn,
}

impl ClassificationRule {
    pub fn applies_to(&self, vertex_count: usize) -> bool {
        (self.min_vertices..=self.max_vertices).contains(&vertex_count)
    }
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("name", &self.name)
            .field("min_vertices", &self.min_vertices)
            .field("max_vertices", &self.max_vertices)
            .finish()
    }
}

pub fn classify_triangle(m: &ShapeMeasurements, config: &ClassifierConfig) -> ShapeKind {
    let tol = config.triangle_side_tol;
    let (a, b, c) = (m.sides[0], m.sides[1], m.sides[2]);
    if approx_equal(a, b, tol) && approx_equal(b, c, tol) {
        ShapeKind::EquilateralTriangle
    } else if approx_equal(a, b, tol) || approx_equal(b, c, tol) || approx_equal(a, c, tol) {
        ShapeKind::IsoscelesTriangle
    } else {
        ShapeKind::ScaleneTriangle
    }
}

pub fn classify_quadrilateral(m: &ShapeMeasurements, config: &ClassifierConfig) -> ShapeKind {
    let tol = config.side_equal_tol;
    let right_count = m
        .angles
        .iter()
        .filter(|angle| (*angle - FRAC_PI_2).abs() < config.right_angle_tol)
        .count();
    let all_sides_equal = m.sides.iter().all(|&side| approx_equal(side, m.mean_side, tol));
    let opposite_sides_equal =
        approx_equal(m.sides[0], m.sides[2], tol) && approx_equal(m.sides[1], m.sides[3], tol);

    if all_sides_equal && right_count >= 3 {
        ShapeKind::Square
    } else if opposite_sides_equal && right_count >= 3 {
        ShapeKind::Rectangle
    } else if all_sides_equal {
        ShapeKind::Rhombus
    } else {
        ShapeKind::Quadrilateral
    }
}

pub fn classify_small_polygon(m: &ShapeMeasurements, config: &ClassifierConfig) -> ShapeKind {
    let sides = m.vertex_count;
    let side_cv = std_dev(&m.sides) / m.mean_side;
    let angle_std = std_dev(&m.angles);
    // A zero mean side makes the ratio NaN, which fails the comparison.
    if side_cv < config.regular_side_cv && angle_std < config.regular_angle_std {
        ShapeKind::RegularPolygon { sides }
    } else {
        ShapeKind::Polygon { sides }
    }
}

pub fn classify_complex(m: &ShapeMeasurements, _config: &ClassifierConfig) -> ShapeKind {
    ShapeKind::ComplexPolygon { sides: m.vertex_count }
}

/// The default rule order: triangles, quadrilaterals, 5-6 gons, everything else.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule { name: "triangle", min_vertices: 3, max_vertices: 3, classify: classify_triangle },
        ClassificationRule { name: "quadrilateral", min_vertices: 4, max_vertices: 4, classify: classify_quadrilateral },
        ClassificationRule { name: "pentagon_hexagon", min_vertices: 5, max_vertices: 6, classify: classify_small_polygon },
        ClassificationRule { name: "complex", min_vertices: 7, max_vertices: usize::MAX, classify: classify_complex },
    ]
}

/// Rule-list classifier followed by the landmark area override.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    pub config: ClassifierConfig,
    rules: Vec<ClassificationRule>,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl RuleClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config, rules: default_rules() }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Geometric kind before the area override
    pub fn classify_geometry(&self, measurements: &ShapeMeasurements) -> ShapeKind {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(measurements.vertex_count))
            .map(|rule| (rule.classify)(measurements, &self.config))
            .unwrap_or(ShapeKind::Polygon { sides: measurements.vertex_count })
    }

    /// Huge shapes are taken to be landmarks, whatever their geometry.
    pub fn apply_area_override(&self, kind: ShapeKind, area: f64) -> ShapeKind {
        if area > self.config.very_large_area {
            ShapeKind::VeryLargeArea
        } else {
            kind
        }
    }
}

impl ShapeClassifier for RuleClassifier {
    fn classify(&self, polygon: &Polygon) -> ShapeKind {
        let measurements = ShapeMeasurements::of(polygon);
        let geometric = self.classify_geometry(&measurements);
        let kind = self.apply_area_override(geometric, measurements.area);
        debug!(id = polygon.id(), %geometric, %kind, "Classified polygon");
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(points: Vec<[f64; 2]>) -> String {
        RuleClassifier::default()
            .classify(&Polygon::new(points).unwrap())
            .to_string()
    }

    fn regular(n: usize, radius: f64) -> Vec<[f64; 2]> {
        (0..n)
            .map(|i| {
                let t = i as f64 * std::f64::consts::TAU / n as f64;
                [radius * t.cos(), radius * t.sin()]
            })
            .collect()
    }

    #[test]
    fn triangles() {
        assert_eq!(classify(regular(3, 50.0)), "equilateral triangle");
        assert_eq!(classify(vec![[0.0, 0.0], [40.0, 0.0], [20.0, 60.0]]), "isosceles triangle");
        assert_eq!(classify(vec![[0.0, 0.0], [40.0, 0.0], [30.0, 10.0]]), "scalene triangle");
    }

    #[test]
    fn near_equal_sides_count_as_isosceles() {
        // Sides 5.10, 7.62 and 8.25: the last two are within 15%.
        assert_eq!(classify(vec![[0.0, 0.0], [5.0, 1.0], [2.0, 8.0]]), "isosceles triangle");
    }

    #[test]
    fn quadrilaterals() {
        assert_eq!(classify(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]), "square");
        assert_eq!(classify(vec![[0.0, 0.0], [20.0, 0.0], [20.0, 10.0], [0.0, 10.0]]), "rectangle");
        assert_eq!(classify(vec![[0.0, 0.0], [10.0, 0.0], [15.0, 8.0], [5.0, 8.0]]), "rhombus");
        assert_eq!(classify(vec![[0.0, 0.0], [30.0, 0.0], [20.0, 10.0], [5.0, 25.0]]), "quadrilateral");
    }

    #[test]
    fn slightly_skewed_square_is_still_a_square() {
        assert_eq!(classify(vec![[0.0, 0.0], [100.0, 2.0], [101.0, 101.0], [-1.0, 99.0]]), "square");
    }

    #[test]
    fn five_and_six_sided() {
        assert_eq!(classify(regular(5, 40.0)), "5-sided regular polygon");
        assert_eq!(classify(regular(6, 40.0)), "6-sided regular polygon");
        let irregular = vec![[0.0, 0.0], [80.0, 0.0], [82.0, 5.0], [40.0, 60.0], [0.0, 10.0]];
        assert_eq!(classify(irregular), "5-sided polygon");
    }

    #[test]
    fn seven_or_more_is_complex() {
        assert_eq!(classify(regular(7, 40.0)), "complex 7-sided polygon");
        assert_eq!(classify(regular(12, 40.0)), "complex 12-sided polygon");
    }

    #[test]
    fn area_override_wins_after_classification() {
        let huge_square = vec![[0.0, 0.0], [500.0, 0.0], [500.0, 500.0], [0.0, 500.0]];
        assert_eq!(classify(huge_square.clone()), "very large area (airport/park)");
        assert_eq!(classify(regular(3, 400.0)), "very large area (airport/park)");
        assert_eq!(classify(regular(9, 400.0)), "very large area (airport/park)");

        let classifier = RuleClassifier::default();
        let m = ShapeMeasurements::of(&Polygon::new(huge_square).unwrap());
        assert_eq!(classifier.classify_geometry(&m), ShapeKind::Square);
    }

    #[test]
    fn area_exactly_at_threshold_is_not_overridden() {
        let classifier = RuleClassifier::default();
        assert_eq!(classifier.apply_area_override(ShapeKind::Square, 200_000.0), ShapeKind::Square);
        assert_eq!(
            classifier.apply_area_override(ShapeKind::Square, 200_000.5),
            ShapeKind::VeryLargeArea
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = RuleClassifier::default();
        let polygon = Polygon::new(vec![[3.0, 1.0], [40.0, 4.0], [52.0, 30.0], [20.0, 44.0], [-2.0, 25.0]]).unwrap();
        assert_eq!(classifier.classify(&polygon), classifier.classify(&polygon));
    }

    #[test]
    fn degenerate_shapes_do_not_panic() {
        let classifier = RuleClassifier::default();
        let zeros = Polygon::new(vec![[1.0, 1.0]; 5]).unwrap();
        assert_eq!(classifier.classify(&zeros), ShapeKind::Polygon { sides: 5 });
        let flat = Polygon::new(vec![[0.0, 0.0], [0.0, 0.0], [0.0, 0.0]]).unwrap();
        assert_eq!(classifier.classify(&flat), ShapeKind::EquilateralTriangle);
    }

    #[test]
    fn tolerances_come_from_config() {
        // Interior angles of about 75/105 degrees: outside 0.25 rad, inside 0.35 rad.
        let slanted = vec![[0.0, 0.0], [100.0, 0.0], [126.0, 97.0], [26.0, 97.0]];
        assert_eq!(classify(slanted.clone()), "rhombus");

        let loose = RuleClassifier::new(ClassifierConfig { right_angle_tol: 0.35, ..Default::default() });
        assert_eq!(loose.classify(&Polygon::new(slanted).unwrap()), ShapeKind::Square);
    }

    #[test]
    fn rule_buckets_cover_every_vertex_count() {
        let rules = default_rules();
        for n in 3..40 {
            assert_eq!(rules.iter().filter(|r| r.applies_to(n)).count(), 1, "n = {n}");
        }
    }

    #[test]
    fn approx_equal_is_relative_to_reference() {
        assert!(approx_equal(115.0, 100.0, 0.15));
        assert!(!approx_equal(116.0, 100.0, 0.15));
        assert!(approx_equal(0.5, 0.4, 0.15));
        assert!(!approx_equal(0.1, 0.0, 0.15));
        assert!(approx_equal(0.0, 0.0, 0.15));
    }
}

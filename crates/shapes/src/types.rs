use geo::Contains;
use geo_types::{Coord, LineString, Point};
use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::{
    algorithms::ShapeKind,
    error::{Result, ShapeError},
    geometry,
    recognition::RecognitionMatch,
};

/// Axis-aligned bounding box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> [f64; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    /// Smallest box covering both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        BoundingBox { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y }
    }
}

/// A closed polygon with at least three vertices.
///
/// Area, bounding box and centroid are measured once at construction. The id
/// is the polygon's position in the detector's output, 0 unless assigned.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Polygon {
    #[ts(type = "number")]
    id: usize,
    points: Vec<[f64; 2]>,
    area: f64,
    bounding_box: BoundingBox,
    centroid: [f64; 2],
}

impl Polygon {
    /// Build a polygon from its vertices, computing the area.
    pub fn new(points: Vec<[f64; 2]>) -> Result<Self> {
        let area = geometry::area(&points);
        Self::with_area(points, area)
    }

    /// Build a polygon trusting an area measured upstream.
    ///
    /// Negative or non-finite areas are replaced by the shoelace area.
    pub fn with_area(points: Vec<[f64; 2]>, area: f64) -> Result<Self> {
        if points.len() < 3 {
            return Err(ShapeError::TooFewVertices { count: points.len() });
        }
        Ok(Self::measured(points, area))
    }

    /// Axis-aligned rectangle `[[x,y],[x+w,y],[x+w,y+h],[x,y+h]]`.
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        let points = vec![[x, y], [x + width, y], [x + width, y + height], [x, y + height]];
        Self::measured(points, width * height)
    }

    // Callers guarantee at least three points.
    fn measured(points: Vec<[f64; 2]>, area: f64) -> Self {
        let area = if area.is_finite() && area >= 0.0 {
            area
        } else {
            geometry::area(&points)
        };
        let bounding_box = geometry::bounding_box(&points);
        let centroid = geometry::centroid(&points);
        Self { id: 0, points, area, bounding_box, centroid }
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn centroid(&self) -> [f64; 2] {
        self.centroid
    }

    pub fn side_lengths(&self) -> Vec<f64> {
        geometry::side_lengths(&self.points)
    }

    pub fn turn_angles(&self) -> Vec<f64> {
        geometry::turn_angles(&self.points)
    }

    /// Convert to geo-types Polygon for geometric operations
    pub fn to_geo_polygon(&self) -> geo_types::Polygon<f64> {
        let coords: Vec<Coord<f64>> = self.points
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect();
        geo_types::Polygon::new(LineString::new(coords), vec![])
    }

    /// Whether the point lies strictly inside the polygon.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.to_geo_polygon().contains(&Point::new(x, y))
    }
}

/// One polygon as emitted by the external detector.
///
/// `area` is optional and anything that is not a number is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPolygon {
    pub points: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<serde_json::Value>,
}

impl RawPolygon {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self { points, area: None }
    }

    pub fn into_polygon(self, id: usize) -> Result<Polygon> {
        let polygon = match self.area.as_ref().and_then(serde_json::Value::as_f64) {
            Some(area) => Polygon::with_area(self.points, area)?,
            None => Polygon::new(self.points)?,
        };
        Ok(polygon.with_id(id))
    }
}

/// Convert a detector batch, numbering polygons by detection order.
///
/// Polygons that cannot be built are skipped so the rest of the batch survives.
pub fn polygons_from_raw<I>(raws: I) -> Vec<Polygon>
where
    I: IntoIterator<Item = RawPolygon>,
{
    collect_batch(raws.into_iter().map(Ok))
}

/// Convert untyped detector entries. Entries that do not parse as a
/// [`RawPolygon`] are skipped like any other unbuildable polygon, and keep
/// their slot in the detection order.
pub fn polygons_from_values<I>(values: I) -> Vec<Polygon>
where
    I: IntoIterator<Item = serde_json::Value>,
{
    collect_batch(
        values
            .into_iter()
            .map(|value| serde_json::from_value::<RawPolygon>(value).map_err(ShapeError::from)),
    )
}

fn collect_batch<I>(raws: I) -> Vec<Polygon>
where
    I: Iterator<Item = Result<RawPolygon>>,
{
    raws.enumerate()
        .filter_map(|(id, raw)| match raw.and_then(|raw| raw.into_polygon(id)) {
            Ok(polygon) => Some(polygon),
            Err(e) => {
                warn!(id, "Skipping raw polygon: {}", e);
                None
            }
        })
        .collect()
}

/// Envelope returned by the detector's upload endpoint.
///
/// `polygons` stays untyped until conversion so one malformed entry cannot
/// reject the whole response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub polygons: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResponse {
    pub fn into_polygons(self) -> Vec<Polygon> {
        polygons_from_values(self.polygons)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionPayload {
    Bare(Vec<serde_json::Value>),
    Response(DetectionResponse),
}

/// Parse detector output, either the upload envelope or a bare polygon array.
///
/// An envelope carrying an `error` is reported as [`ShapeError::DetectionFailed`].
pub fn polygons_from_json(json: &str) -> Result<Vec<Polygon>> {
    match serde_json::from_str::<DetectionPayload>(json)? {
        DetectionPayload::Bare(values) => Ok(polygons_from_values(values)),
        DetectionPayload::Response(response) => match response.error {
            Some(error) => Err(ShapeError::DetectionFailed(error)),
            None => Ok(response.into_polygons()),
        },
    }
}

/// An interior polygon with its assigned kind, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ClassifiedPolygon {
    pub polygon: Polygon,
    /// Geometric class from the rule classifier.
    pub shape: ShapeKind,
    /// Display label: the geometric class, or a learned label once recognized.
    pub kind: String,
    pub recognized: Option<RecognitionMatch>,
}

impl ClassifiedPolygon {
    pub fn new(polygon: Polygon, shape: ShapeKind) -> Self {
        let kind = shape.to_string();
        Self { polygon, shape, kind, recognized: None }
    }

    pub fn centroid(&self) -> [f64; 2] {
        self.polygon.centroid()
    }

    /// Replace the display label with a user-taught one.
    pub fn relabel(&mut self, label: impl Into<String>) {
        self.kind = label.into();
    }
}

/// The polygon(s) taken as the document/map boundary.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "mode", content = "polygons")]
#[ts(export)]
pub enum BackgroundSelection {
    #[serde(rename = "single")]
    Single(Polygon),
    #[serde(rename = "group")]
    Group(Vec<Polygon>),
}

impl BackgroundSelection {
    /// Background covering a whole (already cropped) image.
    pub fn full_frame(width: f64, height: f64) -> Self {
        Self::Single(Polygon::rectangle(0.0, 0.0, width, height))
    }

    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Self::Single(polygon) => std::slice::from_ref(polygon),
            Self::Group(polygons) => polygons,
        }
    }

    pub fn contains_id(&self, id: usize) -> bool {
        self.polygons().iter().any(|p| p.id() == id)
    }

    /// Swap each member for the batch polygon at the position its id names.
    pub(crate) fn resolve(self, batch: &[Polygon]) -> Self {
        let lookup = |p: Polygon| batch.get(p.id()).cloned().unwrap_or(p);
        match self {
            Self::Single(polygon) => Self::Single(lookup(polygon)),
            Self::Group(polygons) => Self::Group(polygons.into_iter().map(lookup).collect()),
        }
    }

    /// Interior shapes must be strictly smaller than this.
    pub fn area_limit(&self) -> f64 {
        self.polygons()
            .iter()
            .map(Polygon::area)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.polygons()
            .iter()
            .map(Polygon::bounding_box)
            .reduce(|acc, bbox| acc.union(&bbox))
    }

    /// Map an image point into a canvas stretched over the background bounds.
    pub fn project(&self, point: [f64; 2], canvas_width: f64, canvas_height: f64) -> [f64; 2] {
        let Some(bbox) = self.bounding_box() else {
            return point;
        };
        let width = if bbox.width > 0.0 { bbox.width } else { 1.0 };
        let height = if bbox.height > 0.0 { bbox.height } else { 1.0 };
        [
            (point[0] - bbox.x) * canvas_width / width,
            (point[1] - bbox.y) * canvas_height / height,
        ]
    }
}

/// Result of one pass over a detector batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub background: Option<BackgroundSelection>,
    pub shapes: Vec<ClassifiedPolygon>,
    /// How many polygons survived the noise filter.
    pub candidate_count: usize,
}

impl Analysis {
    /// Index of the first shape containing the point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        self.shapes
            .iter()
            .position(|shape| shape.polygon.contains_point(x, y))
    }
}

use std::path::Path;

use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::{json, Map};

use crate::{
    error::Result,
    types::{polygons_from_raw, Analysis, Polygon, RawPolygon},
};

/// Closed GeoJSON ring from an implicitly closed vertex list.
fn ring(points: &[[f64; 2]]) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = points.iter().map(|&[x, y]| vec![x, y]).collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn polygon_feature(polygon: &Polygon, mut properties: Map<String, serde_json::Value>) -> Feature {
    properties.insert("area".to_string(), json!(polygon.area()));
    properties.insert("vertex_count".to_string(), json!(polygon.vertex_count()));
    properties.insert("centroid".to_string(), json!(polygon.centroid()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring(polygon.points())]))),
        id: Some(Id::Number(polygon.id().into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

impl Analysis {
    /// Background polygon(s) followed by the classified shapes.
    pub fn to_geojson(&self) -> FeatureCollection {
        let mut features = Vec::new();

        if let Some(background) = &self.background {
            for polygon in background.polygons() {
                let mut properties = Map::new();
                properties.insert("role".to_string(), json!("background"));
                features.push(polygon_feature(polygon, properties));
            }
        }

        for shape in &self.shapes {
            let mut properties = Map::new();
            properties.insert("role".to_string(), json!("shape"));
            properties.insert("kind".to_string(), json!(shape.kind));
            properties.insert("shape".to_string(), json!(shape.shape.to_string()));
            if let Some(found) = &shape.recognized {
                properties.insert("match_distance".to_string(), json!(found.distance));
            }
            features.push(polygon_feature(&shape.polygon, properties));
        }

        let mut foreign_members = Map::new();
        foreign_members.insert("candidate_count".to_string(), json!(self.candidate_count));
        foreign_members.insert("shape_count".to_string(), json!(self.shapes.len()));

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson())?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }
}

/// Read detector polygons from a GeoJSON document.
///
/// Only the exterior ring of `Polygon` geometries is used. A repeated closing
/// vertex is dropped and an `area` property is honoured like a detector area.
pub fn polygons_from_geojson_str(geojson_str: &str) -> Result<Vec<Polygon>> {
    let features = match geojson_str.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let raws = features.into_iter().filter_map(|feature| {
        let area = feature.property("area").cloned();
        let Value::Polygon(rings) = feature.geometry?.value else {
            return None;
        };
        let exterior = rings.into_iter().next()?;
        let mut points: Vec<[f64; 2]> = exterior
            .iter()
            .filter(|coord| coord.len() >= 2)
            .map(|coord| [coord[0], coord[1]])
            .collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Some(RawPolygon { points, area })
    });

    Ok(polygons_from_raw(raws))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithms::ShapeKind, types::{BackgroundSelection, ClassifiedPolygon}};

    fn analysis() -> Analysis {
        Analysis {
            background: Some(BackgroundSelection::Single(
                Polygon::rectangle(0.0, 0.0, 400.0, 300.0).with_id(0),
            )),
            shapes: vec![ClassifiedPolygon::new(
                Polygon::rectangle(10.0, 10.0, 50.0, 50.0).with_id(3),
                ShapeKind::Square,
            )],
            candidate_count: 2,
        }
    }

    #[test]
    fn exports_background_then_shapes() {
        let collection = analysis().to_geojson();
        assert_eq!(collection.features.len(), 2);

        let background = &collection.features[0];
        assert_eq!(background.property("role").and_then(|v| v.as_str()), Some("background"));

        let shape = &collection.features[1];
        assert_eq!(shape.property("kind").and_then(|v| v.as_str()), Some("square"));
        assert_eq!(shape.property("vertex_count").and_then(|v| v.as_u64()), Some(4));
        assert_eq!(shape.property("area").and_then(|v| v.as_f64()), Some(2500.0));
        assert_eq!(shape.id, Some(Id::Number(3.into())));

        let Some(Geometry { value: Value::Polygon(rings), .. }) = &shape.geometry else {
            panic!("expected polygon geometry");
        };
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn exported_file_reads_back_as_polygons() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.geojson");
        analysis().save_geojson(&path).unwrap();

        let polygons = polygons_from_geojson_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[1].vertex_count(), 4);
        assert_eq!(polygons[1].area(), 2500.0);
        assert_eq!(polygons[1].id(), 1);
    }

    #[test]
    fn non_polygon_geometries_are_skipped() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
                {"type": "Feature", "properties": null, "geometry": {"type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [30.0, 0.0], [30.0, 30.0], [0.0, 0.0]]]}}
            ]
        }"#;
        let polygons = polygons_from_geojson_str(json).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].vertex_count(), 3);
        assert_eq!(polygons[0].area(), 450.0);
    }
}

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use shapes::{
    polygons_from_geojson_str, polygons_from_json, Analysis, Polygon, RecognitionMatch,
    RegistryEntry, ShapeConfig, ShapeError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapmapError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported input format. Please use .json or .geojson files")]
    UnsupportedInputFormat,
}

/// Load a detector batch, dispatching on the file extension.
///
/// `.json` holds the detector's upload response (or a bare polygon array),
/// `.geojson` a feature collection of polygons.
pub fn load_polygons<P: AsRef<Path>>(path: P) -> Result<Vec<Polygon>, MapmapError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(polygons_from_json(&fs::read_to_string(path)?)?),
        Some("geojson") => Ok(polygons_from_geojson_str(&fs::read_to_string(path)?)?),
        _ => Err(MapmapError::UnsupportedInputFormat),
    }
}

/// Configuration from `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ShapeConfig, MapmapError> {
    match path {
        Some(path) => Ok(ShapeConfig::from_file(path)?),
        None => Ok(ShapeConfig::default()),
    }
}

/// Human-readable listing of an analysis, one shape per line.
pub fn format_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();

    match &analysis.background {
        Some(background) => {
            let ids: Vec<String> = background.polygons().iter().map(|p| p.id().to_string()).collect();
            let _ = writeln!(
                out,
                "background: polygon {} (area {:.0})",
                ids.join(", "),
                background.area_limit()
            );
        }
        None => out.push_str("background: none\n"),
    }

    let _ = writeln!(
        out,
        "{} candidate(s), {} shape(s)",
        analysis.candidate_count,
        analysis.shapes.len()
    );

    for (index, shape) in analysis.shapes.iter().enumerate() {
        let [cx, cy] = shape.centroid();
        let _ = write!(
            out,
            "#{index} {} | area {:.0} | {} vertices | at ({cx:.1}, {cy:.1})",
            shape.kind,
            shape.polygon.area(),
            shape.polygon.vertex_count(),
        );
        if let Some(found) = &shape.recognized {
            let _ = write!(out, " | {} match {:.2}", shape.shape, found.distance);
        }
        out.push('\n');
    }

    out
}

pub fn format_match(found: Option<&RecognitionMatch>) -> String {
    match found {
        Some(found) => format!("{} (distance {:.3})", found.label, found.distance),
        None => "no match".to_string(),
    }
}

pub fn format_registry(entries: &[RegistryEntry]) -> String {
    if entries.is_empty() {
        return "registry is empty\n".to_string();
    }
    entries
        .iter()
        .map(|entry| format!("{}: {} example(s)\n", entry.label, entry.count))
        .collect()
}

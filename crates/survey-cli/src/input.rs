//! GeoJSON input: bare geometries, Features and FeatureCollections.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use survey_core::BoundaryShape;

#[derive(Debug, Deserialize)]
struct FeatureInput {
    geometry: BoundaryShape,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeoJsonInput {
    Collection { features: Vec<FeatureInput> },
    Feature { geometry: BoundaryShape },
    Geometry(BoundaryShape),
}

/// Boundary geometry from GeoJSON text. Collections use their first feature.
pub fn parse_boundary(text: &str) -> Result<BoundaryShape> {
    let input: GeoJsonInput =
        serde_json::from_str(text).context("input is not a supported GeoJSON geometry")?;
    match input {
        GeoJsonInput::Geometry(shape) | GeoJsonInput::Feature { geometry: shape } => Ok(shape),
        GeoJsonInput::Collection { features } => features
            .into_iter()
            .next()
            .map(|f| f.geometry)
            .ok_or_else(|| anyhow!("feature collection is empty")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_bare_geometry() {
        let shape = parse_boundary(r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#).unwrap();
        assert_eq!(shape, BoundaryShape::LineString(vec![[0.0, 0.0], [1.0, 1.0]]));
    }

    #[test]
    fn test_reads_feature_with_properties() {
        let text = r#"{
            "type": "Feature",
            "properties": {"name": "field"},
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}
        }"#;
        assert!(matches!(parse_boundary(text).unwrap(), BoundaryShape::Polygon(_)));
    }

    #[test]
    fn test_reads_first_feature_of_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2, 3]}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [4, 5]}}
            ]
        }"#;
        assert_eq!(parse_boundary(text).unwrap(), BoundaryShape::Point([2.0, 3.0]));
    }

    #[test]
    fn test_rejects_empty_collection_and_garbage() {
        assert!(parse_boundary(r#"{"type":"FeatureCollection","features":[]}"#).is_err());
        assert!(parse_boundary("not json").is_err());
        assert!(parse_boundary(r#"{"type":"Circle","coordinates":[0,0]}"#).is_err());
    }
}

//! Reduce input geometry to one closed planar ring.

use crate::models::{BoundaryShape, PlanarPoint};
use crate::spatial::{buffer_polyline, close_ring, Projection};

/// Buffer used for lines when no usable spacing is given.
const FALLBACK_LINE_SPACING_M: f64 = 10.0;

impl BoundaryShape {
    /// Positions that drive planning: the first outer ring or first line.
    pub fn primary_positions(&self) -> &[[f64; 2]] {
        match self {
            BoundaryShape::Point(p) => std::slice::from_ref(p),
            BoundaryShape::LineString(line) => line,
            BoundaryShape::MultiLineString(lines) => {
                lines.first().map(|l| l.as_slice()).unwrap_or(&[])
            }
            BoundaryShape::Polygon(rings) => rings.first().map(|r| r.as_slice()).unwrap_or(&[]),
            BoundaryShape::MultiPolygon(polys) => polys
                .first()
                .and_then(|rings| rings.first())
                .map(|r| r.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Mean latitude of the primary positions.
    pub fn mean_latitude(&self) -> Option<f64> {
        let positions = self.primary_positions();
        if positions.is_empty() {
            return None;
        }
        let sum: f64 = positions.iter().map(|p| p[1]).sum();
        Some(sum / positions.len() as f64)
    }
}

/// Project `shape` into planar meters and close it into a boundary ring.
///
/// Lines are buffered by `max(spacing_m, min_buffer_m)` ground meters. Points
/// and empty geometries give an empty ring.
pub fn normalize_boundary<P: Projection>(
    shape: &BoundaryShape,
    spacing_m: f64,
    min_buffer_m: f64,
    projection: &P,
) -> Vec<PlanarPoint> {
    let positions = shape.primary_positions();
    if positions.is_empty() {
        tracing::warn!("boundary has no coordinates");
        return Vec::new();
    }
    let projected: Vec<PlanarPoint> = positions
        .iter()
        .map(|[lon, lat]| projection.project(*lat, *lon))
        .collect();

    match shape {
        BoundaryShape::Point(_) => {
            tracing::warn!("point geometry cannot bound a survey area");
            Vec::new()
        }
        BoundaryShape::LineString(_) | BoundaryShape::MultiLineString(_) => {
            let spacing = if spacing_m.is_finite() && spacing_m > 0.0 {
                spacing_m
            } else {
                FALLBACK_LINE_SPACING_M
            };
            let scale = shape
                .mean_latitude()
                .map_or(1.0, |lat| projection.scale_factor(lat));
            buffer_polyline(&projected, spacing.max(min_buffer_m) * scale)
        }
        BoundaryShape::Polygon(_) | BoundaryShape::MultiPolygon(_) => close_ring(&projected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{is_degenerate_ring, WebMercator};
    use geo::{Contains, Coord};

    fn polygon(coords: Vec<[f64; 2]>) -> BoundaryShape {
        BoundaryShape::Polygon(vec![coords])
    }

    #[test]
    fn test_polygon_ring_is_closed() {
        let shape = polygon(vec![[-117.0, 33.0], [-116.99, 33.0], [-116.99, 33.01]]);
        let ring = normalize_boundary(&shape, 10.0, 5.0, &WebMercator);
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], ring[3]);
        assert!(!is_degenerate_ring(&ring));
    }

    #[test]
    fn test_multipolygon_uses_first_outer_ring() {
        let first = vec![[0.0, 0.0], [0.001, 0.0], [0.001, 0.001], [0.0, 0.0]];
        let second = vec![[1.0, 1.0], [1.001, 1.0], [1.001, 1.001], [1.0, 1.0]];
        let shape = BoundaryShape::MultiPolygon(vec![vec![first], vec![second]]);
        let ring = normalize_boundary(&shape, 10.0, 5.0, &WebMercator);
        assert_eq!(ring.len(), 4);
        assert!(ring.iter().all(|p| p.x < 200.0 && p.y < 200.0));
    }

    #[test]
    fn test_line_becomes_corridor() {
        let shape = BoundaryShape::LineString(vec![[0.0, 0.0], [0.01, 0.0]]);
        let ring = normalize_boundary(&shape, 20.0, 5.0, &WebMercator);
        assert!(ring.len() > 4);
        assert_eq!(ring.first(), ring.last());
        let poly = crate::spatial::to_geo_polygon(&ring);
        let mid = WebMercator.project(0.0, 0.005);
        assert!(poly.contains(&Coord { x: mid.x, y: mid.y + 15.0 }));
        assert!(!poly.contains(&Coord { x: mid.x, y: mid.y + 25.0 }));
    }

    #[test]
    fn test_small_spacing_uses_minimum_buffer() {
        let shape = BoundaryShape::MultiLineString(vec![vec![[0.0, 0.0], [0.01, 0.0]]]);
        let ring = normalize_boundary(&shape, 1.0, 5.0, &WebMercator);
        let poly = crate::spatial::to_geo_polygon(&ring);
        let mid = WebMercator.project(0.0, 0.005);
        assert!(poly.contains(&Coord { x: mid.x, y: mid.y - 4.0 }));
    }

    #[test]
    fn test_unsupported_shapes_are_empty() {
        let unsupported = [
            BoundaryShape::Point([0.0, 0.0]),
            BoundaryShape::Polygon(vec![]),
            BoundaryShape::MultiLineString(vec![]),
        ];
        for shape in &unsupported {
            assert!(normalize_boundary(shape, 10.0, 5.0, &WebMercator).is_empty());
        }
    }
}

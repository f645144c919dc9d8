//! Spatial math shared by the planning stages.
//!
//! Holds the geographic projection used to move boundaries into planar meters,
//! ring/polyline housekeeping, and the line buffer that turns an open line into
//! a survey boundary.

use crate::models::PlanarPoint;
use geo::{Area, Coord, LineString, Polygon};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Sphere radius of the Web Mercator projection (EPSG:3857).
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of Web Mercator; poles project to infinity.
pub const MAX_MERCATOR_LAT_DEG: f64 = 85.051_128_779_806_59;

/// Arc points per quarter turn when rounding buffer caps.
const ARC_STEPS_PER_QUADRANT: usize = 8;

/// Mitre length beyond which a join is bevelled, as a multiple of the buffer distance.
const MITER_LIMIT: f64 = 4.0;

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Geographic <-> planar conversion used at the edges of the pipeline.
pub trait Projection {
    /// Project a geographic position (degrees) into planar meters.
    fn project(&self, lat: f64, lon: f64) -> PlanarPoint;

    /// Inverse of [`Projection::project`]; returns `(lat, lon)` in degrees.
    fn unproject(&self, point: PlanarPoint) -> (f64, f64);

    /// Planar meters per ground meter at the given latitude.
    fn scale_factor(&self, lat: f64) -> f64;
}

/// Spherical Web Mercator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn project(&self, lat: f64, lon: f64) -> PlanarPoint {
        let lat = lat.clamp(-MAX_MERCATOR_LAT_DEG, MAX_MERCATOR_LAT_DEG);
        let x = WEB_MERCATOR_RADIUS_M * lon.to_radians();
        let y = WEB_MERCATOR_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        PlanarPoint::new(x, y)
    }

    fn unproject(&self, point: PlanarPoint) -> (f64, f64) {
        let lon = (point.x / WEB_MERCATOR_RADIUS_M).to_degrees();
        let lat = (2.0 * (point.y / WEB_MERCATOR_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
        (lat, lon)
    }

    fn scale_factor(&self, lat: f64) -> f64 {
        let lat = lat.clamp(-MAX_MERCATOR_LAT_DEG, MAX_MERCATOR_LAT_DEG);
        1.0 / lat.to_radians().cos()
    }
}

/// Close a ring by repeating its first vertex when needed.
///
/// Already-closed rings are returned unchanged.
pub fn close_ring(points: &[PlanarPoint]) -> Vec<PlanarPoint> {
    let mut ring = points.to_vec();
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if first != last {
            ring.push(*first);
        }
    }
    ring
}

/// Drop non-finite points and points within `tol` of their predecessor.
pub fn sanitize_polyline(points: &[PlanarPoint], tol: f64) -> Vec<PlanarPoint> {
    let mut out: Vec<PlanarPoint> = Vec::with_capacity(points.len());
    for point in points {
        if !point.is_finite() {
            continue;
        }
        if let Some(last) = out.last() {
            if last.distance_to(point) <= tol {
                continue;
            }
        }
        out.push(*point);
    }
    out
}

/// Cumulative arc length at every vertex; the first entry is 0.
pub fn cumulative_lengths(points: &[PlanarPoint]) -> Vec<f64> {
    let mut cum = Vec::with_capacity(points.len().max(1));
    cum.push(0.0);
    for pair in points.windows(2) {
        let last = cum.last().copied().unwrap_or(0.0);
        cum.push(last + pair[0].distance_to(&pair[1]));
    }
    cum
}

/// Axis-aligned bounds as `(min, max)` corners.
pub fn bounds(points: &[PlanarPoint]) -> Option<(PlanarPoint, PlanarPoint)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

/// Center of the bounding box, or the origin for an empty input.
pub fn bounds_center(points: &[PlanarPoint]) -> PlanarPoint {
    match bounds(points) {
        Some((min, max)) => PlanarPoint::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0),
        None => PlanarPoint::default(),
    }
}

/// Build a `geo` polygon (no holes) from a planar ring.
pub fn to_geo_polygon(ring: &[PlanarPoint]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    Polygon::new(LineString::new(coords), Vec::new())
}

/// True when a ring cannot enclose any area.
///
/// Fewer than three distinct vertices, or zero area, is degenerate.
pub fn is_degenerate_ring(ring: &[PlanarPoint]) -> bool {
    let mut distinct: Vec<PlanarPoint> = Vec::new();
    for p in ring {
        if !p.is_finite() {
            return true;
        }
        if !distinct.iter().any(|q| q == p) {
            distinct.push(*p);
            if distinct.len() >= 3 {
                break;
            }
        }
    }
    if distinct.len() < 3 {
        return true;
    }
    let area = to_geo_polygon(&close_ring(ring)).unsigned_area();
    !(area.is_finite() && area > 0.0)
}

/// Outline of an open polyline stroked `distance` to either side.
///
/// Joins are mitred (bevelled past [`MITER_LIMIT`]) and both ends get round
/// caps. A single point becomes a circle. The result is a closed ring.
pub fn buffer_polyline(points: &[PlanarPoint], distance: f64) -> Vec<PlanarPoint> {
    let radius = distance.abs();
    let pts = sanitize_polyline(points, 1e-9);
    if pts.is_empty() || radius <= 0.0 || !radius.is_finite() {
        return Vec::new();
    }
    if pts.len() == 1 {
        let steps = ARC_STEPS_PER_QUADRANT * 4;
        let ring: Vec<PlanarPoint> = (0..steps)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / steps as f64;
                PlanarPoint::new(pts[0].x + radius * a.cos(), pts[0].y + radius * a.sin())
            })
            .collect();
        return close_ring(&ring);
    }

    let normals: Vec<(f64, f64)> = pts
        .windows(2)
        .map(|pair| {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            let len = dx.hypot(dy);
            (-dy / len, dx / len)
        })
        .collect();

    let left = offset_side(&pts, &normals, radius, 1.0);
    let mut right = offset_side(&pts, &normals, radius, -1.0);
    right.reverse();

    let n_last = normals[normals.len() - 1];
    let n_first = normals[0];
    let last = pts[pts.len() - 1];
    let first = pts[0];

    let mut ring = left;
    ring.extend(round_cap(last, n_last, radius));
    ring.extend(right);
    ring.extend(round_cap(first, (-n_first.0, -n_first.1), radius));
    close_ring(&ring)
}

fn offset_side(
    pts: &[PlanarPoint],
    normals: &[(f64, f64)],
    radius: f64,
    side: f64,
) -> Vec<PlanarPoint> {
    let offset = |p: PlanarPoint, n: (f64, f64)| {
        PlanarPoint::new(p.x + side * n.0 * radius, p.y + side * n.1 * radius)
    };

    let mut out = Vec::with_capacity(pts.len() + 2);
    out.push(offset(pts[0], normals[0]));
    for k in 1..pts.len() - 1 {
        let n1 = normals[k - 1];
        let n2 = normals[k];
        let sx = n1.0 + n2.0;
        let sy = n1.1 + n2.1;
        let s_len = sx.hypot(sy);
        if s_len < 1e-9 {
            out.push(offset(pts[k], n1));
            out.push(offset(pts[k], n2));
            continue;
        }
        let (mx, my) = (sx / s_len, sy / s_len);
        let cos_half = mx * n1.0 + my * n1.1;
        if cos_half <= 1.0 / MITER_LIMIT {
            out.push(offset(pts[k], n1));
            out.push(offset(pts[k], n2));
        } else {
            let miter = radius / cos_half;
            out.push(PlanarPoint::new(
                pts[k].x + side * mx * miter,
                pts[k].y + side * my * miter,
            ));
        }
    }
    out.push(offset(pts[pts.len() - 1], normals[normals.len() - 1]));
    out
}

/// Half circle around `center` from `+normal` clockwise to `-normal`, both excluded.
fn round_cap(center: PlanarPoint, normal: (f64, f64), radius: f64) -> Vec<PlanarPoint> {
    let start = normal.1.atan2(normal.0);
    let steps = ARC_STEPS_PER_QUADRANT * 2;
    (1..steps)
        .map(|i| {
            let a = start - PI * i as f64 / steps as f64;
            PlanarPoint::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

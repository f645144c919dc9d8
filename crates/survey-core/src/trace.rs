//! Even spacing along open lines and closed perimeters.

use crate::models::PlanarPoint;
use crate::sampler::sample_polyline_at_distances;
use crate::spatial::{close_ring, cumulative_lengths};

const DUPLICATE_TOL: f64 = 1e-6;
const MIN_PERIMETER_POINTS: usize = 3;
const MIN_PERIMETER_STEP_M: f64 = 1.0;

fn push_unique(out: &mut Vec<PlanarPoint>, p: PlanarPoint) {
    if let Some(last) = out.last() {
        if (last.x - p.x).abs() < DUPLICATE_TOL && (last.y - p.y).abs() < DUPLICATE_TOL {
            return;
        }
    }
    out.push(p);
}

/// A point every `spacing` along an open polyline, ending on its last vertex.
pub fn sample_polyline_uniform(points: &[PlanarPoint], spacing: f64) -> Vec<PlanarPoint> {
    let mut out = Vec::new();
    if !spacing.is_finite() || spacing <= 0.0 || points.is_empty() {
        return out;
    }
    let total = cumulative_lengths(points).last().copied().unwrap_or(0.0);
    if !total.is_finite() || total <= 0.0 {
        return out;
    }

    let steps = (total / spacing).floor() as usize;
    let distances: Vec<f64> = (0..=steps).map(|i| i as f64 * spacing).collect();
    for p in sample_polyline_at_distances(points, &distances) {
        push_unique(&mut out, p);
    }
    if let Some(last) = points.last() {
        push_unique(&mut out, *last);
    }
    out
}

/// Evenly spaced points around a ring, starting on its first vertex.
///
/// At least three points are produced; the start point is not repeated.
pub fn sample_ring_perimeter(ring: &[PlanarPoint], spacing: f64) -> Vec<PlanarPoint> {
    if ring.is_empty() {
        return Vec::new();
    }
    let ring = close_ring(ring);
    let total = cumulative_lengths(&ring).last().copied().unwrap_or(0.0);
    let step = spacing.max(MIN_PERIMETER_STEP_M);
    let count = ((total / step).ceil() as usize).max(MIN_PERIMETER_POINTS);
    let distances: Vec<f64> = (0..count).map(|i| total * i as f64 / count as f64).collect();
    sample_polyline_at_distances(&ring, &distances)
}

//! Pull sweep-row endpoints from cell centers onto the true boundary.

use crate::models::PlanarPoint;
use crate::spatial::close_ring;

/// Sorted x coordinates where the horizontal line at `y` meets the ring.
///
/// Edges are half-open in y so a shared vertex is counted once. Horizontal
/// edges lying on the line contribute both endpoints.
pub fn horizontal_intersections_x(ring: &[PlanarPoint], y: f64, eps: f64) -> Vec<f64> {
    let mut xs = Vec::new();
    for edge in ring.windows(2) {
        let (a, b) = (edge[0], edge[1]);
        let dy = b.y - a.y;
        if dy.abs() < eps {
            if (y - a.y).abs() < eps {
                xs.push(a.x);
                xs.push(b.x);
            }
            continue;
        }
        if (a.y <= y && y < b.y) || (b.y <= y && y < a.y) {
            let t = (y - a.y) / dy;
            xs.push(a.x + t * (b.x - a.x));
        }
    }
    xs.sort_by(f64::total_cmp);
    xs
}

/// Nearest intersection on the outward side of `x_ref`.
///
/// Positive `direction` looks towards +x, otherwise towards -x.
fn pick_boundary_x(xs: &[f64], x_ref: f64, direction: f64, tol: f64) -> Option<f64> {
    if direction > 0.0 {
        xs.iter().copied().find(|x| *x >= x_ref - tol)
    } else {
        xs.iter().rev().copied().find(|x| *x <= x_ref + tol)
    }
}

fn snap_run(
    points: &mut [PlanarPoint],
    start: usize,
    end: usize,
    ring: &[PlanarPoint],
    resolution: f64,
) {
    if end <= start {
        return;
    }
    let dx = points[end].x - points[start].x;
    if dx.abs() < resolution * 1e-6 {
        return;
    }
    let dir_sign = if dx > 0.0 { 1.0 } else { -1.0 };
    let xs = horizontal_intersections_x(ring, points[start].y, resolution * 1e-9);
    if xs.len() < 2 {
        return;
    }
    let tol = resolution * 1e-6;
    if let Some(x) = pick_boundary_x(&xs, points[start].x, -dir_sign, tol) {
        points[start].x = x;
    }
    if let Some(x) = pick_boundary_x(&xs, points[end].x, dir_sign, tol) {
        points[end].x = x;
    }
}

/// Snap the ends of every horizontal run of `path` onto the sweep-frame ring.
///
/// Runs are maximal stretches of consecutive points sharing a y value. Only
/// x coordinates move.
pub fn snap_turning_points_to_border(
    path: &[PlanarPoint],
    ring: &[PlanarPoint],
    resolution: f64,
) -> Vec<PlanarPoint> {
    let mut points = path.to_vec();
    if points.is_empty() {
        return points;
    }
    let ring = close_ring(ring);
    let y_tol = resolution * 1e-6;

    let mut start = 0;
    for i in 1..points.len() {
        if (points[i].y - points[i - 1].y).abs() > y_tol {
            snap_run(&mut points, start, i - 1, &ring, resolution);
            start = i;
        }
    }
    let last = points.len() - 1;
    snap_run(&mut points, start, last, &ring, resolution);
    points
}

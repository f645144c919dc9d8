//! Level → spacing mapping and distance-based path sampling.
//!
//! Two spacing formulas coexist. When the model carries a usable spacing range
//! the level interpolates linearly from the coarsest spacing (level 1) down to
//! the finest (`max_level + 1`). Otherwise spacing is a power-of-two multiple
//! of the base step.

use crate::models::PlanarPoint;
use crate::spatial::cumulative_lengths;

/// Target ratio bias so coarse levels gain midpoints sooner than pure halving.
const RATIO_BOOST: f64 = 1.3;

/// Spacing chosen for a requested level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpacing {
    /// Requested level clamped to `[1, max_level + 1]`
    pub level_used: u32,
    pub spacing: f64,
    /// Power-of-two multiplier, only set by the dyadic branch
    pub(crate) dyadic_factor: Option<f64>,
}

fn has_linear_range(max_spacing: f64, min_spacing: f64) -> bool {
    max_spacing.is_finite()
        && min_spacing.is_finite()
        && max_spacing > 0.0
        && min_spacing > 0.0
        && max_spacing >= min_spacing
}

pub fn clamp_level(level: i64, max_level: u32) -> u32 {
    level.clamp(1, i64::from(max_level) + 1) as u32
}

pub fn spacing_for_level(
    level: i64,
    base_step: f64,
    max_level: u32,
    max_spacing: f64,
    min_spacing: f64,
) -> LevelSpacing {
    let level_used = clamp_level(level, max_level);

    if has_linear_range(max_spacing, min_spacing) {
        let spacing = if max_spacing == min_spacing || max_level == 0 {
            max_spacing
        } else {
            let t = f64::from(level_used - 1) / f64::from(max_level);
            max_spacing - (max_spacing - min_spacing) * t
        };
        return LevelSpacing {
            level_used,
            spacing,
            dyadic_factor: None,
        };
    }

    let exponent = i64::from(max_level) - i64::from(level_used - 1);
    let factor = 2f64.powi(exponent as i32).max(1.0);
    let spacing = if base_step.is_finite() {
        base_step * factor
    } else {
        f64::NAN
    };
    LevelSpacing {
        level_used,
        spacing,
        dyadic_factor: Some(factor),
    }
}

/// Inverse of [`spacing_for_level`]: the level whose spacing is closest to `meters`.
pub fn level_for_spacing(
    meters: f64,
    base_step: f64,
    max_level: u32,
    max_spacing: f64,
    min_spacing: f64,
) -> u32 {
    if !meters.is_finite() || meters <= 0.0 {
        return 1;
    }
    let level_max = i64::from(max_level) + 1;
    let linear = has_linear_range(max_spacing, min_spacing);

    if linear && max_spacing != min_spacing && max_level > 0 {
        let spacing = meters.clamp(min_spacing, max_spacing);
        let t = (max_spacing - spacing) / (max_spacing - min_spacing);
        let level = 1 + (t * f64::from(max_level)).round() as i64;
        return level.clamp(1, level_max) as u32;
    }
    if linear && max_spacing == min_spacing {
        return 1;
    }
    if !base_step.is_finite() || base_step <= 0.0 {
        return 1;
    }

    let desired = meters / base_step.max(1e-6);
    let exponent = desired.max(1e-6).log2().round() as i64;
    let exponent = exponent.clamp(0, i64::from(max_level));
    (i64::from(max_level) - exponent + 1).clamp(1, level_max) as u32
}

/// Sample distances that keep every turn distance and subdivide each
/// inter-turn segment by a power of two.
///
/// A segment is split finely enough to approach `spacing_target` but never
/// finer than `min_spacing`. Distances within `max(spacing_target * 1e-6, 1e-7)`
/// of the previous one are merged into it, keeping the later value, so turns
/// closer together than that collapse into a single sample.
pub fn midpoint_distances(
    turn_distances: &[f64],
    spacing_target: f64,
    min_spacing: f64,
) -> Vec<f64> {
    if turn_distances.len() < 2 {
        return Vec::new();
    }
    let spacing = spacing_target.max(1e-6);
    let min_space = if min_spacing.is_finite() && min_spacing > 0.0 {
        min_spacing
    } else {
        spacing
    };
    let tol = (spacing * 1e-6).max(1e-7);
    let mut out: Vec<f64> = Vec::new();

    for pair in turn_distances.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if !start.is_finite() || !end.is_finite() {
            continue;
        }
        let seg_len = end - start;
        if seg_len <= tol {
            if out.last().map_or(true, |last| (end - last).abs() > tol) {
                out.push(end);
            }
            continue;
        }

        let desired = ((seg_len / spacing) * RATIO_BOOST).max(1e-6).log2().round().max(0.0);
        let max_refine = (seg_len / min_space).max(1e-6).log2().floor().max(0.0);
        let subdiv = 2f64.powf(desired.min(max_refine));
        let steps = subdiv as u64;

        for k in 0..=steps {
            let dist = start + seg_len * k as f64 / subdiv;
            match out.last_mut() {
                Some(last) if (dist - *last).abs() <= tol => *last = dist,
                _ => out.push(dist),
            }
        }
    }
    out
}

/// Points at each arc-length distance along `points`.
pub fn sample_polyline_at_distances(points: &[PlanarPoint], distances: &[f64]) -> Vec<PlanarPoint> {
    let cumulative = cumulative_lengths(points);
    sample_with_lengths(points, &cumulative, distances)
}

/// Like [`sample_polyline_at_distances`] with a precomputed length table.
///
/// Distances are clamped to the path; non-finite ones map to the start.
pub fn sample_with_lengths(
    points: &[PlanarPoint],
    cumulative: &[f64],
    distances: &[f64],
) -> Vec<PlanarPoint> {
    if points.is_empty() {
        return Vec::new();
    }
    if points.len() == 1 || cumulative.len() != points.len() {
        return vec![points[0]];
    }
    let total = cumulative[cumulative.len() - 1];
    let last_seg = points.len() - 2;

    let mut seg = 0usize;
    distances
        .iter()
        .map(|d| {
            let dist = if d.is_finite() { d.clamp(0.0, total) } else { 0.0 };
            if dist < cumulative[seg] {
                seg = 0;
            }
            while seg < last_seg && dist > cumulative[seg + 1] {
                seg += 1;
            }
            let a = points[seg];
            let b = points[seg + 1];
            let seg_len = cumulative[seg + 1] - cumulative[seg];
            let t = if seg_len > 0.0 {
                (dist - cumulative[seg]) / seg_len
            } else {
                0.0
            };
            PlanarPoint::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
        })
        .collect()
}

//! Turn-preserving multi-resolution model of a finished path.

use serde::{Deserialize, Serialize};

use crate::config::ResolutionConfig;
use crate::models::{LevelSample, PlanarPoint};
use crate::sampler::{
    clamp_level, level_for_spacing, midpoint_distances, sample_with_lengths, spacing_for_level,
};
use crate::spatial::{cumulative_lengths, sanitize_polyline};

const MIN_SEGMENT_M: f64 = 1e-6;
const SANITIZE_TOL_M: f64 = 1e-6;
const MAX_LEVEL_CAP: u32 = 60;
const LEVELS_PER_OCTAVE: f64 = 5.0;

/// Indices of path vertices where the heading changes by more than
/// `angle_tol_deg`. Both endpoints are always included.
pub fn extract_turning_indices(points: &[PlanarPoint], angle_tol_deg: f64) -> Vec<usize> {
    let n = points.len();
    if n <= 2 {
        return (0..n).collect();
    }

    let mut headings: Vec<(usize, f64, f64)> = Vec::with_capacity(n - 1);
    for (i, pair) in points.windows(2).enumerate() {
        let dx = pair[1].x - pair[0].x;
        let dy = pair[1].y - pair[0].y;
        let len = dx.hypot(dy);
        if len > MIN_SEGMENT_M {
            headings.push((i, dx / len, dy / len));
        }
    }
    if headings.is_empty() {
        return vec![0, n - 1];
    }

    let cos_tol = angle_tol_deg.to_radians().cos();
    let mut turns = vec![0];
    for pair in headings.windows(2) {
        let (seg, ux, uy) = pair[0];
        let (_, vx, vy) = pair[1];
        if ux * vx + uy * vy < cos_tol {
            turns.push(seg + 1);
        }
    }
    turns.push(n - 1);
    turns.sort_unstable();
    turns.dedup();
    turns
}

/// Cached spacing/level model for one planned path.
///
/// Built once per boundary and spacing, then sampled repeatedly at different
/// levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionModel {
    /// Sanitized planar path
    pub path: Vec<PlanarPoint>,
    /// Arc length at each path vertex
    pub cumulative_lengths: Vec<f64>,
    pub base_step: f64,
    /// Strictly ascending; starts at 0 and ends at `total_length`
    pub turn_distances: Vec<f64>,
    pub total_length: f64,
    pub max_level: u32,
    pub min_spacing: f64,
    pub max_spacing: f64,
}

impl ResolutionModel {
    fn degenerate(path: Vec<PlanarPoint>) -> Self {
        let cumulative_lengths = vec![0.0; path.len().min(1)];
        Self {
            path,
            cumulative_lengths,
            base_step: 1.0,
            turn_distances: vec![0.0],
            total_length: 0.0,
            max_level: 0,
            min_spacing: 1.0,
            max_spacing: 1.0,
        }
    }

    pub fn build(path: &[PlanarPoint], config: &ResolutionConfig) -> Self {
        if path.len() < 2 {
            return Self::degenerate(path.to_vec());
        }
        let path = sanitize_polyline(path, SANITIZE_TOL_M);
        if path.len() < 2 {
            return Self::degenerate(path);
        }

        let cumulative = cumulative_lengths(&path);
        let total_length = cumulative[cumulative.len() - 1];
        if !total_length.is_finite() || total_length <= 0.0 {
            return Self::degenerate(path);
        }

        let mut turn_distances: Vec<f64> =
            extract_turning_indices(&path, config.turning_angle_tol_deg)
                .into_iter()
                .map(|idx| cumulative[idx.min(cumulative.len() - 1)])
                .collect();
        turn_distances.push(0.0);
        turn_distances.push(total_length);
        turn_distances.sort_by(f64::total_cmp);
        turn_distances.dedup();

        let segment_lengths: Vec<f64> = turn_distances
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .filter(|len| len.is_finite() && *len > 0.0)
            .collect();

        let max_points = config.max_waypoints.max(2) as f64;
        let segment_count = segment_lengths.len().max(1) as f64;
        let min_by_count = total_length / (max_points - segment_count).max(1.0);
        let min_spacing = config.min_base_step_m.max(min_by_count);
        let longest = segment_lengths.iter().copied().fold(f64::NAN, f64::max);
        let longest = if longest.is_nan() { total_length } else { longest };
        let max_spacing = longest.max(min_spacing);

        let ratio = max_spacing / min_spacing.max(1e-6);
        // one straight run has nothing to refine between turns
        let max_level = if segment_lengths.len() > 1 && ratio > 1.0 + 1e-6 {
            ((ratio.log2() * LEVELS_PER_OCTAVE).round() as u32).clamp(1, MAX_LEVEL_CAP)
        } else {
            0
        };

        tracing::debug!(
            points = path.len(),
            turns = turn_distances.len(),
            total_length,
            min_spacing,
            max_spacing,
            max_level,
            "resolution model built"
        );

        Self {
            path,
            cumulative_lengths: cumulative,
            base_step: min_spacing,
            turn_distances,
            total_length,
            max_level,
            min_spacing,
            max_spacing,
        }
    }

    /// Highest valid level.
    pub fn finest_level(&self) -> u32 {
        self.max_level + 1
    }

    /// Waypoints for a level. Out-of-range levels are clamped.
    pub fn sample_level(&self, level: i64) -> LevelSample {
        let spacing = spacing_for_level(
            level,
            self.base_step,
            self.max_level,
            self.max_spacing,
            self.min_spacing,
        );
        if self.path.len() < 2 || self.turn_distances.is_empty() || !self.base_step.is_finite() {
            return LevelSample::empty(clamp_level(level, self.max_level), self.base_step);
        }
        if !spacing.spacing.is_finite() {
            return LevelSample::empty(spacing.level_used, spacing.spacing);
        }

        let distances = midpoint_distances(&self.turn_distances, spacing.spacing, self.min_spacing);
        if distances.is_empty() {
            return LevelSample::empty(spacing.level_used, spacing.spacing);
        }
        let points = sample_with_lengths(&self.path, &self.cumulative_lengths, &distances);
        LevelSample {
            count: points.len(),
            points,
            level_used: spacing.level_used,
            spacing_used: spacing.spacing,
        }
    }

    /// Level whose spacing best matches `meters`.
    pub fn level_for_resolution(&self, meters: f64) -> u32 {
        level_for_spacing(
            meters,
            self.base_step,
            self.max_level,
            self.max_spacing,
            self.min_spacing,
        )
    }

    /// Sample distances used for a level, mostly useful for diagnostics.
    pub fn sample_distances(&self, level: i64) -> Vec<f64> {
        let spacing = spacing_for_level(
            level,
            self.base_step,
            self.max_level,
            self.max_spacing,
            self.min_spacing,
        );
        if !spacing.spacing.is_finite() {
            return Vec::new();
        }
        midpoint_distances(&self.turn_distances, spacing.spacing, self.min_spacing)
    }
}

//! Planner tunables.

use serde::{Deserialize, Serialize};

use crate::grid::{DEFAULT_MARGIN_CELLS, MAX_GRID_CELLS};
use crate::models::{MovingDirection, Orientation, SweepDirection};

/// Full configuration for one boundary/spacing planning pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Row spacing and grid resolution in meters
    pub spacing_m: f64,
    pub moving_direction: MovingDirection,
    pub sweep_direction: SweepDirection,
    pub orientation: Orientation,
    /// Waypoint budget used to derive the finest spacing
    pub max_waypoints: usize,
    /// Floor for the finest spacing in meters
    pub min_base_step_m: f64,
    /// Direction change (degrees) that counts as a turn
    pub turning_angle_tol_deg: f64,
    /// Empty cells added around the boundary on each axis
    pub grid_margin_cells: usize,
    /// Rasterization budget; larger grids are rejected
    pub max_grid_cells: usize,
    /// Minimum half-width when buffering a line into a corridor, in meters
    pub min_line_buffer_m: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            spacing_m: 10.0,
            moving_direction: MovingDirection::Right,
            sweep_direction: SweepDirection::Up,
            orientation: Orientation::Auto,
            max_waypoints: 5000,
            min_base_step_m: 0.1,
            turning_angle_tol_deg: 1.0,
            grid_margin_cells: DEFAULT_MARGIN_CELLS,
            max_grid_cells: MAX_GRID_CELLS,
            min_line_buffer_m: 5.0,
        }
    }
}

impl PlannerConfig {
    pub fn with_spacing(spacing_m: f64) -> Self {
        Self {
            spacing_m,
            ..Self::default()
        }
    }

    pub fn sweep_params(&self) -> SweepParams {
        SweepParams {
            spacing_m: self.spacing_m,
            moving_direction: self.moving_direction,
            sweep_direction: self.sweep_direction,
            orientation: self.orientation,
            grid_margin_cells: self.grid_margin_cells,
            max_grid_cells: self.max_grid_cells,
        }
    }

    pub fn resolution(&self) -> ResolutionConfig {
        ResolutionConfig {
            max_waypoints: self.max_waypoints,
            min_base_step_m: self.min_base_step_m,
            turning_angle_tol_deg: self.turning_angle_tol_deg,
        }
    }
}

/// Inputs to the coverage path search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepParams {
    pub spacing_m: f64,
    pub moving_direction: MovingDirection,
    pub sweep_direction: SweepDirection,
    pub orientation: Orientation,
    pub grid_margin_cells: usize,
    pub max_grid_cells: usize,
}

impl Default for SweepParams {
    fn default() -> Self {
        PlannerConfig::default().sweep_params()
    }
}

/// Inputs to the resolution model builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    pub max_waypoints: usize,
    pub min_base_step_m: f64,
    pub turning_angle_tol_deg: f64,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        PlannerConfig::default().resolution()
    }
}

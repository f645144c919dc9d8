//! Planner defaults from environment.

use std::env;

use survey_core::{Orientation, PlannerConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub spacing_m: f64,
    pub max_waypoints: usize,
    pub orientation: Orientation,
    pub max_grid_cells: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = PlannerConfig::default();
        Self {
            spacing_m: lookup("SURVEY_SPACING_M")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.spacing_m),
            max_waypoints: lookup("SURVEY_MAX_WAYPOINTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_waypoints),
            orientation: lookup("SURVEY_ORIENTATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.orientation),
            max_grid_cells: lookup("SURVEY_MAX_GRID_CELLS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_grid_cells),
        }
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            spacing_m: self.spacing_m,
            max_waypoints: self.max_waypoints,
            orientation: self.orientation,
            max_grid_cells: self.max_grid_cells,
            ..PlannerConfig::default()
        }
    }
}

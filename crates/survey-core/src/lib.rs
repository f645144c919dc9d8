//! Coverage planning engine for aerial survey flights.
//!
//! A boundary is rasterized in a rotated sweep frame, walked with a greedy
//! lawnmower search (falling back to row segments joined by grid A*), and the
//! resulting path is resampled at caller-chosen resolution levels without ever
//! dropping a turn.

pub mod boundary;
pub mod config;
pub mod error;
pub mod fallback;
pub mod frame;
pub mod grid;
pub mod models;
pub mod planner;
pub mod resolution;
pub mod sampler;
pub mod snap;
pub mod spatial;
pub mod sweep;
pub mod trace;

pub use boundary::normalize_boundary;
pub use config::{PlannerConfig, ResolutionConfig, SweepParams};
pub use error::{PlanningError, Result};
pub use fallback::{
    build_row_segments, compress_grid_path, row_sweep_path, GridPathfinder, RowSegment,
};
pub use frame::SweepFrame;
pub use grid::{GridIndex, GridMap, MAX_GRID_CELLS};
pub use models::{
    BoundaryShape, CoverageStrategy, LevelSample, MovingDirection, Orientation, PlanarPoint,
    SurveyWaypoint, SweepDirection,
};
pub use planner::{plan_coverage_path, CoverageModel, CoveragePath};
pub use resolution::{extract_turning_indices, ResolutionModel};
pub use sampler::{
    midpoint_distances, sample_polyline_at_distances, spacing_for_level, LevelSpacing,
};
pub use snap::{horizontal_intersections_x, snap_turning_points_to_border};
pub use spatial::{close_ring, haversine_distance, sanitize_polyline, Projection, WebMercator};
pub use sweep::{move_target_grid, search_start_grid, sweep_path_search, SweepResult, SweepState};
pub use trace::{sample_polyline_uniform, sample_ring_perimeter};

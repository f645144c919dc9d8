//! End-to-end coverage planning.
//!
//! `plan_coverage_path` runs one boundary/spacing pass: sweep frame, grid,
//! greedy walk (or the row fallback), border snapping and the trip back to the
//! world frame. `CoverageModel` keeps the products of that pass so level
//! changes only resample.

use serde::{Deserialize, Serialize};

use crate::boundary::normalize_boundary;
use crate::config::{PlannerConfig, SweepParams};
use crate::error::Result;
use crate::fallback::row_sweep_path;
use crate::frame::SweepFrame;
use crate::grid::GridMap;
use crate::models::{BoundaryShape, CoverageStrategy, LevelSample, PlanarPoint, SurveyWaypoint};
use crate::resolution::ResolutionModel;
use crate::snap::snap_turning_points_to_border;
use crate::spatial::{close_ring, is_degenerate_ring, sanitize_polyline, Projection};
use crate::sweep::{sweep_path_search, SweepState};

/// Planned path in the planar world frame plus coverage bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveragePath {
    pub points: Vec<PlanarPoint>,
    pub strategy: CoverageStrategy,
    pub visited_cells: usize,
    pub free_cells: usize,
}

impl CoveragePath {
    fn empty() -> Self {
        Self {
            points: Vec::new(),
            strategy: CoverageStrategy::Empty,
            visited_cells: 0,
            free_cells: 0,
        }
    }

    /// Every free cell of the grid was visited.
    pub fn is_complete(&self) -> bool {
        self.visited_cells >= self.free_cells
    }
}

struct PlannedPass {
    path: CoveragePath,
    frame: Option<SweepFrame>,
    grid: Option<GridMap>,
}

impl PlannedPass {
    fn empty() -> Self {
        Self {
            path: CoveragePath::empty(),
            frame: None,
            grid: None,
        }
    }
}

fn plan_pass(ring: &[PlanarPoint], params: &SweepParams) -> Result<PlannedPass> {
    let spacing = params.spacing_m;
    if !spacing.is_finite() || spacing <= 0.0 {
        tracing::warn!(spacing, "spacing must be positive; nothing planned");
        return Ok(PlannedPass::empty());
    }
    let ring = close_ring(ring);
    if is_degenerate_ring(&ring) {
        tracing::warn!(vertices = ring.len(), "degenerate boundary; nothing planned");
        return Ok(PlannedPass::empty());
    }

    let frame = SweepFrame::select(&ring, params.orientation);
    let sweep_ring = frame.ring_to_sweep(&ring);
    let mut grid = GridMap::rasterize_with(
        &sweep_ring,
        spacing,
        params.grid_margin_cells,
        params.max_grid_cells,
    )?;
    let free_cells = grid.free_count();
    if free_cells == 0 {
        tracing::warn!("boundary contains no grid cell centers; nothing planned");
        return Ok(PlannedPass {
            path: CoveragePath::empty(),
            frame: Some(frame),
            grid: Some(grid),
        });
    }

    let state = SweepState::new(params.moving_direction, params.sweep_direction);
    let sweep = sweep_path_search(&mut grid, state);
    let (sweep_points, strategy, visited_cells) = if sweep.visited_count < free_cells {
        tracing::debug!(
            visited = sweep.visited_count,
            free = free_cells,
            "greedy sweep under-covered; rebuilding rows"
        );
        let rows = row_sweep_path(&grid, state);
        (rows.points, CoverageStrategy::RowFallback, rows.visited_count)
    } else {
        let snapped = snap_turning_points_to_border(&sweep.points, &sweep_ring, spacing);
        (snapped, CoverageStrategy::Boustrophedon, sweep.visited_count)
    };

    let world = frame.path_to_world(&sweep_points);
    let tol = (spacing * 1e-6).max(1e-6);
    let points = sanitize_polyline(&world, tol);
    tracing::debug!(
        ?strategy,
        points = points.len(),
        visited = visited_cells,
        free = free_cells,
        "coverage path planned"
    );

    Ok(PlannedPass {
        path: CoveragePath {
            points,
            strategy,
            visited_cells,
            free_cells,
        },
        frame: Some(frame),
        grid: Some(grid),
    })
}

/// Plan a lawnmower path over a planar boundary ring.
///
/// Only an oversized grid is an error; bad spacing or a degenerate ring yields
/// an empty path.
pub fn plan_coverage_path(ring: &[PlanarPoint], params: &SweepParams) -> Result<CoveragePath> {
    plan_pass(ring, params).map(|pass| pass.path)
}

/// Cached planning products for one boundary and spacing.
#[derive(Debug, Clone)]
pub struct CoverageModel {
    /// Closed planar boundary ring
    pub boundary: Vec<PlanarPoint>,
    pub frame: Option<SweepFrame>,
    /// Grid after the sweep, with visited cells marked
    pub grid: Option<GridMap>,
    pub coverage: CoveragePath,
    pub resolution: ResolutionModel,
    /// Planar units per ground meter
    pub planar_scale: f64,
}

impl CoverageModel {
    /// Plan over a planar ring; distances are taken as ground meters.
    pub fn build(ring: &[PlanarPoint], config: &PlannerConfig) -> Result<Self> {
        Self::build_scaled(ring, config, 1.0)
    }

    fn build_scaled(
        ring: &[PlanarPoint],
        config: &PlannerConfig,
        planar_scale: f64,
    ) -> Result<Self> {
        let mut params = config.sweep_params();
        params.spacing_m = config.spacing_m * planar_scale;
        let boundary = close_ring(ring);
        let pass = plan_pass(&boundary, &params)?;
        // the finest-step floor is in ground meters too
        let mut resolution_config = config.resolution();
        resolution_config.min_base_step_m *= planar_scale;
        let resolution = ResolutionModel::build(&pass.path.points, &resolution_config);
        Ok(Self {
            boundary,
            frame: pass.frame,
            grid: pass.grid,
            coverage: pass.path,
            resolution,
            planar_scale,
        })
    }

    /// Project a geographic shape and plan over it.
    ///
    /// Spacing stays in ground meters: it is scaled by the projection's factor
    /// at the shape's mean latitude before rasterizing.
    pub fn from_shape<P: Projection>(
        shape: &BoundaryShape,
        config: &PlannerConfig,
        projection: &P,
    ) -> Result<Self> {
        let ring =
            normalize_boundary(shape, config.spacing_m, config.min_line_buffer_m, projection);
        let planar_scale = shape
            .mean_latitude()
            .map(|lat| projection.scale_factor(lat))
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(1.0);
        Self::build_scaled(&ring, config, planar_scale)
    }

    pub fn max_level(&self) -> u32 {
        self.resolution.max_level
    }

    /// Waypoints at `level`; `spacing_used` is reported in ground meters.
    pub fn sample_level(&self, level: i64) -> LevelSample {
        let mut sample = self.resolution.sample_level(level);
        sample.spacing_used /= self.planar_scale;
        sample
    }

    pub fn level_for_resolution(&self, meters: f64) -> u32 {
        self.resolution.level_for_resolution(meters * self.planar_scale)
    }

    /// Waypoints at the level closest to `meters` of ground spacing.
    pub fn sample_resolution(&self, meters: f64) -> LevelSample {
        self.sample_level(i64::from(self.level_for_resolution(meters)))
    }

    /// Planar samples converted back to latitude/longitude.
    pub fn to_waypoints<P: Projection>(
        &self,
        points: &[PlanarPoint],
        projection: &P,
    ) -> Vec<SurveyWaypoint> {
        points
            .iter()
            .map(|p| {
                let (lat, lon) = projection.unproject(*p);
                SurveyWaypoint { lat, lon }
            })
            .collect()
    }
}

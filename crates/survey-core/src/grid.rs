//! Occupancy grid over the sweep-frame boundary.
//!
//! Cells hold `0.0` (free, inside the boundary), `0.5` (visited by a sweep) or
//! `1.0` (blocked, outside). Storage is one contiguous row-major buffer, so the
//! cell budget is a plain length check.

use crate::error::{PlanningError, Result};
use crate::models::PlanarPoint;
use crate::spatial::{bounds, to_geo_polygon};
use geo::{Coord, Intersects};

pub const FREE: f32 = 0.0;
pub const VISITED: f32 = 0.5;
pub const BLOCKED: f32 = 1.0;

/// Hard ceiling on `width * height`.
pub const MAX_GRID_CELLS: usize = 3_000_000;

/// Empty cells added around the boundary extent on each axis.
pub const DEFAULT_MARGIN_CELLS: usize = 10;

const MIN_GRID_DIM: usize = 3;

/// Signed cell coordinates; may point outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub x: i64,
    pub y: i64,
}

impl GridIndex {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Free cells of the first non-empty row scanned from one edge of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRow {
    pub y: i64,
    /// In scan order: descending when scanned from the upper edge
    pub xs: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct GridMap {
    width: usize,
    height: usize,
    resolution: f64,
    center: PlanarPoint,
    cells: Vec<f32>,
    free_count: usize,
}

impl GridMap {
    /// Create a fully blocked grid.
    pub fn new(width: usize, height: usize, resolution: f64, center: PlanarPoint) -> Self {
        Self {
            width,
            height,
            resolution,
            center,
            cells: vec![BLOCKED; width * height],
            free_count: 0,
        }
    }

    /// Rasterize a sweep-frame ring at `resolution` meters per cell.
    ///
    /// `resolution` must be positive and finite.
    pub fn rasterize(ring: &[PlanarPoint], resolution: f64) -> Result<Self> {
        Self::rasterize_with(ring, resolution, DEFAULT_MARGIN_CELLS, MAX_GRID_CELLS)
    }

    /// Like [`GridMap::rasterize`] with an explicit margin and cell budget.
    ///
    /// The budget can only lower [`MAX_GRID_CELLS`], never raise it.
    pub fn rasterize_with(
        ring: &[PlanarPoint],
        resolution: f64,
        margin_cells: usize,
        max_cells: usize,
    ) -> Result<Self> {
        let Some((min, max)) = bounds(ring) else {
            let origin = PlanarPoint::default();
            return Ok(Self::new(MIN_GRID_DIM, MIN_GRID_DIM, resolution, origin));
        };
        let max_cells = max_cells.min(MAX_GRID_CELLS);

        let width = (((max.x - min.x) / resolution).ceil() + margin_cells as f64)
            .max(MIN_GRID_DIM as f64);
        let height = (((max.y - min.y) / resolution).ceil() + margin_cells as f64)
            .max(MIN_GRID_DIM as f64);
        if width * height > max_cells as f64 {
            return Err(PlanningError::GridTooLarge {
                width: width as usize,
                height: height as usize,
            });
        }

        let center = PlanarPoint::new((max.x + min.x) / 2.0, (max.y + min.y) / 2.0);
        let mut grid = Self::new(width as usize, height as usize, resolution, center);
        grid.set_polygon_free_area(ring);
        tracing::debug!(
            width = grid.width,
            height = grid.height,
            free = grid.free_count,
            "rasterized boundary"
        );
        Ok(grid)
    }

    /// Mark every cell whose center lies inside (or on) the ring as free.
    fn set_polygon_free_area(&mut self, ring: &[PlanarPoint]) {
        let polygon = to_geo_polygon(ring);
        self.free_count = 0;
        for iy in 0..self.height {
            for ix in 0..self.width {
                let p = self.index_to_world(GridIndex::new(ix as i64, iy as i64));
                let inside = polygon.intersects(&Coord { x: p.x, y: p.y });
                let idx = iy * self.width + ix;
                if inside {
                    self.cells[idx] = FREE;
                    self.free_count += 1;
                } else {
                    self.cells[idx] = BLOCKED;
                }
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn center(&self) -> PlanarPoint {
        self.center
    }

    /// Cells inside the boundary at rasterization time.
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn visited_count(&self) -> usize {
        self.cells.iter().filter(|v| **v == VISITED).count()
    }

    pub fn world_to_index(&self, p: PlanarPoint) -> GridIndex {
        let ix = ((p.x - self.center.x) / self.resolution + self.width as f64 / 2.0).round();
        let iy = ((p.y - self.center.y) / self.resolution + self.height as f64 / 2.0).round();
        GridIndex::new(ix as i64, iy as i64)
    }

    pub fn index_to_world(&self, idx: GridIndex) -> PlanarPoint {
        let x = (idx.x as f64 - self.width as f64 / 2.0) * self.resolution + self.center.x;
        let y = (idx.y as f64 - self.height as f64 / 2.0) * self.resolution + self.center.y;
        PlanarPoint::new(x, y)
    }

    /// Linear buffer offset, or `None` when out of bounds.
    pub fn linear_index(&self, idx: GridIndex) -> Option<usize> {
        if idx.x < 0 || idx.y < 0 {
            return None;
        }
        let (x, y) = (idx.x as usize, idx.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn grid_index(&self, linear: usize) -> GridIndex {
        GridIndex::new((linear % self.width) as i64, (linear / self.width) as i64)
    }

    pub fn value(&self, idx: GridIndex) -> Option<f32> {
        self.linear_index(idx).map(|i| self.cells[i])
    }

    /// Out-of-bounds cells count as occupied.
    pub fn is_occupied(&self, idx: GridIndex, occupied_val: f32) -> bool {
        match self.value(idx) {
            Some(v) => v >= occupied_val,
            None => true,
        }
    }

    /// Traversable for connectors: inside the grid and not blocked.
    pub fn is_passable(&self, idx: GridIndex) -> bool {
        !self.is_occupied(idx, BLOCKED)
    }

    /// Transition a free cell to visited. Returns true only on that transition.
    pub fn mark_visited(&mut self, idx: GridIndex) -> bool {
        match self.linear_index(idx) {
            Some(i) if self.cells[i] < VISITED => {
                self.cells[i] = VISITED;
                true
            }
            _ => false,
        }
    }

    /// First row (from the bottom, or from the top when `from_upper`) holding free cells.
    pub fn edge_row(&self, from_upper: bool) -> Option<EdgeRow> {
        let rows: Vec<usize> = if from_upper {
            (0..self.height).rev().collect()
        } else {
            (0..self.height).collect()
        };
        for iy in rows {
            let mut xs: Vec<i64> = (0..self.width)
                .filter(|ix| self.cells[iy * self.width + ix] < VISITED)
                .map(|ix| ix as i64)
                .collect();
            if !xs.is_empty() {
                if from_upper {
                    xs.reverse();
                }
                return Some(EdgeRow { y: iy as i64, xs });
            }
        }
        None
    }

    /// Build a grid from text rows, bottom row last: `.` free, anything else blocked.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str], resolution: f64) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut grid = Self::new(width, height, resolution, PlanarPoint::default());
        for (row_idx, row) in rows.iter().enumerate() {
            let iy = height - 1 - row_idx;
            for (ix, ch) in row.chars().enumerate() {
                if ch == '.' {
                    grid.cells[iy * width + ix] = FREE;
                    grid.free_count += 1;
                }
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<PlanarPoint> {
        vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(size, 0.0),
            PlanarPoint::new(size, size),
            PlanarPoint::new(0.0, size),
            PlanarPoint::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_rasterize_square_dimensions_and_free_cells() {
        let grid = GridMap::rasterize(&square(10.0), 2.0).unwrap();
        assert_eq!(grid.width(), 15);
        assert_eq!(grid.height(), 15);
        assert_eq!(grid.center(), PlanarPoint::new(5.0, 5.0));
        // cell centers at x = 0, 2, ..., 10 lie on or inside the square
        assert_eq!(grid.free_count(), 36);
        assert_eq!(grid.len(), 225);
    }

    #[test]
    fn test_tiny_boundary_gets_minimum_dimensions() {
        let grid = GridMap::rasterize_with(&square(0.1), 10.0, 0, MAX_GRID_CELLS).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let err = GridMap::rasterize(&square(10_000.0), 1.0).unwrap_err();
        assert_eq!(
            err,
            PlanningError::GridTooLarge {
                width: 10_010,
                height: 10_010
            }
        );
        assert!(err.to_string().contains("increase spacing"));
    }

    #[test]
    fn test_cell_budget_cannot_be_raised() {
        let result = GridMap::rasterize_with(&square(2_000.0), 0.5, 10, 20_000_000);
        assert_eq!(
            result.unwrap_err(),
            PlanningError::GridTooLarge {
                width: 4_010,
                height: 4_010
            }
        );

        // a lower budget still applies
        let small = GridMap::rasterize_with(&square(10.0), 2.0, 10, 100);
        assert!(matches!(small, Err(PlanningError::GridTooLarge { .. })));
    }

    #[test]
    fn test_index_world_round_trip() {
        let grid = GridMap::rasterize(&square(10.0), 2.0).unwrap();
        for iy in 0..grid.height() as i64 {
            for ix in 0..grid.width() as i64 {
                let idx = GridIndex::new(ix, iy);
                assert_eq!(grid.world_to_index(grid.index_to_world(idx)), idx);
            }
        }
    }

    #[test]
    fn test_out_of_bounds_is_occupied() {
        let grid = GridMap::from_rows(&["..", ".."], 1.0);
        assert!(!grid.is_occupied(GridIndex::new(0, 0), VISITED));
        assert!(grid.is_occupied(GridIndex::new(-1, 0), VISITED));
        assert!(grid.is_occupied(GridIndex::new(0, 2), BLOCKED));
    }

    #[test]
    fn test_occupancy_only_rises() {
        let mut grid = GridMap::from_rows(&["..#"], 1.0);
        let cell = GridIndex::new(0, 0);
        assert!(grid.mark_visited(cell));
        assert!(!grid.mark_visited(cell));
        assert_eq!(grid.value(cell), Some(VISITED));
        assert!(!grid.mark_visited(GridIndex::new(2, 0)));
        assert_eq!(grid.visited_count(), 1);
    }

    #[test]
    fn test_edge_rows_scan_from_either_side() {
        let grid = GridMap::from_rows(&["#..#", "....", "##.."], 1.0);
        let bottom = grid.edge_row(false).unwrap();
        assert_eq!(bottom, EdgeRow { y: 0, xs: vec![2, 3] });
        let top = grid.edge_row(true).unwrap();
        assert_eq!(top, EdgeRow { y: 2, xs: vec![2, 1] });
    }
}

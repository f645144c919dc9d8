//! Row-by-row coverage used when the greedy walk leaves free cells behind.
//!
//! Every row is split into maximal runs of non-blocked cells. Runs are
//! traversed in alternating directions and chained together with a 4-connected
//! grid A*.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::grid::{GridIndex, GridMap, BLOCKED};
use crate::models::{MovingDirection, SweepDirection};
use crate::sweep::{SweepResult, SweepState};

/// Maximal run `x0..=x1` of non-blocked cells within one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSegment {
    pub x0: i64,
    pub x1: i64,
}

/// Segments of every row, indexed by row.
pub fn build_row_segments(grid: &GridMap) -> Vec<Vec<RowSegment>> {
    let width = grid.width();
    let cells = grid.cells();
    (0..grid.height())
        .map(|iy| {
            let row = &cells[iy * width..(iy + 1) * width];
            let mut segments = Vec::new();
            let mut ix = 0;
            while ix < width {
                if row[ix] < BLOCKED {
                    let start = ix;
                    while ix + 1 < width && row[ix + 1] < BLOCKED {
                        ix += 1;
                    }
                    segments.push(RowSegment {
                        x0: start as i64,
                        x1: ix as i64,
                    });
                }
                ix += 1;
            }
            segments
        })
        .collect()
}

/// Drop interior points that continue in the same step direction.
pub fn compress_grid_path(path: &[GridIndex]) -> Vec<GridIndex> {
    if path.len() <= 2 {
        return path.to_vec();
    }
    let mut out = vec![path[0]];
    for window in path.windows(3) {
        let (prev, cur, next) = (window[0], window[1], window[2]);
        let step_in = (cur.x - prev.x, cur.y - prev.y);
        let step_out = (next.x - cur.x, next.y - cur.y);
        if step_in != step_out {
            out.push(cur);
        }
    }
    out.push(path[path.len() - 1]);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenCell {
    f_score: u32,
    g_score: u32,
    index: usize,
}

impl Ord for OpenCell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| other.g_score.cmp(&self.g_score))
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for OpenCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const NEIGHBORS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const NO_PARENT: usize = usize::MAX;

/// Grid A* with reusable scratch buffers.
///
/// A cell's score and parent are only trusted when its stamp matches the
/// current search generation, so buffers are never cleared between searches.
pub struct GridPathfinder<'a> {
    grid: &'a GridMap,
    visit_stamp: Vec<u32>,
    g_score: Vec<u32>,
    came_from: Vec<usize>,
    stamp: u32,
    open_set: BinaryHeap<Reverse<OpenCell>>,
}

impl<'a> GridPathfinder<'a> {
    pub fn new(grid: &'a GridMap) -> Self {
        let size = grid.len();
        Self {
            grid,
            visit_stamp: vec![0; size],
            g_score: vec![0; size],
            came_from: vec![NO_PARENT; size],
            stamp: 0,
            open_set: BinaryHeap::new(),
        }
    }

    fn next_stamp(&mut self) -> u32 {
        if self.stamp == u32::MAX {
            self.visit_stamp.fill(0);
            self.stamp = 0;
        }
        self.stamp += 1;
        self.stamp
    }

    /// Compressed cell route from `start` to `goal` through non-blocked cells.
    ///
    /// When either endpoint is blocked or no route exists the result is the
    /// direct pair `[start, goal]`.
    pub fn find_path(&mut self, start: GridIndex, goal: GridIndex) -> Vec<GridIndex> {
        if start == goal {
            return vec![start];
        }
        let (Some(start_idx), Some(goal_idx)) =
            (self.grid.linear_index(start), self.grid.linear_index(goal))
        else {
            tracing::warn!(?start, ?goal, "connector endpoint outside grid");
            return vec![start, goal];
        };
        if !self.grid.is_passable(start) || !self.grid.is_passable(goal) {
            tracing::warn!(?start, ?goal, "connector endpoint blocked");
            return vec![start, goal];
        }

        let stamp = self.next_stamp();
        self.open_set.clear();
        self.visit_stamp[start_idx] = stamp;
        self.g_score[start_idx] = 0;
        self.came_from[start_idx] = NO_PARENT;
        self.open_set.push(Reverse(OpenCell {
            f_score: manhattan(start, goal),
            g_score: 0,
            index: start_idx,
        }));

        let mut reached = false;
        while let Some(Reverse(current)) = self.open_set.pop() {
            if current.index == goal_idx {
                reached = true;
                break;
            }
            // stale heap entry superseded by a cheaper route
            if current.g_score > self.g_score[current.index] {
                continue;
            }

            let cell = self.grid.grid_index(current.index);
            for (dx, dy) in NEIGHBORS {
                let next = cell.offset(dx, dy);
                if !self.grid.is_passable(next) {
                    continue;
                }
                let Some(next_idx) = self.grid.linear_index(next) else {
                    continue;
                };
                let tentative_g = current.g_score + 1;
                if self.visit_stamp[next_idx] != stamp || tentative_g < self.g_score[next_idx] {
                    self.visit_stamp[next_idx] = stamp;
                    self.g_score[next_idx] = tentative_g;
                    self.came_from[next_idx] = current.index;
                    self.open_set.push(Reverse(OpenCell {
                        f_score: tentative_g + manhattan(next, goal),
                        g_score: tentative_g,
                        index: next_idx,
                    }));
                }
            }
        }

        if !reached {
            tracing::warn!(?start, ?goal, "no grid route between segments; joining directly");
            return vec![start, goal];
        }

        let mut path = Vec::new();
        let mut cursor = goal_idx;
        while cursor != NO_PARENT {
            path.push(self.grid.grid_index(cursor));
            cursor = self.came_from[cursor];
        }
        path.reverse();
        compress_grid_path(&path)
    }
}

fn push_index(indices: &mut Vec<GridIndex>, idx: GridIndex) {
    if indices.last() != Some(&idx) {
        indices.push(idx);
    }
}

fn manhattan(a: GridIndex, b: GridIndex) -> u32 {
    ((a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()) as u32
}

/// Rebuild coverage row by row, joining segments with grid A*.
///
/// Every non-blocked cell lies on some traversed segment, so the reported
/// visited count is the grid's free count.
pub fn row_sweep_path(grid: &GridMap, state: SweepState) -> SweepResult {
    let segments_by_row = build_row_segments(grid);
    let mut pathfinder = GridPathfinder::new(grid);
    let mut indices: Vec<GridIndex> = Vec::new();

    let rows: Vec<usize> = match state.sweep {
        SweepDirection::Up => (0..grid.height()).collect(),
        SweepDirection::Down => (0..grid.height()).rev().collect(),
    };

    let mut dir = state.moving;
    let mut last: Option<GridIndex> = None;
    for iy in rows {
        let mut ordered = segments_by_row[iy].clone();
        if ordered.is_empty() {
            continue;
        }
        match dir {
            MovingDirection::Right => ordered.sort_by_key(|seg| seg.x0),
            MovingDirection::Left => ordered.sort_by_key(|seg| Reverse(seg.x1)),
        }

        let y = iy as i64;
        for seg in ordered {
            let (start, end) = match dir {
                MovingDirection::Right => (GridIndex::new(seg.x0, y), GridIndex::new(seg.x1, y)),
                MovingDirection::Left => (GridIndex::new(seg.x1, y), GridIndex::new(seg.x0, y)),
            };
            match last {
                Some(prev) => {
                    for idx in pathfinder.find_path(prev, start).into_iter().skip(1) {
                        push_index(&mut indices, idx);
                    }
                }
                None => push_index(&mut indices, start),
            }
            push_index(&mut indices, end);
            last = Some(end);
        }
        dir = dir.reversed();
    }

    tracing::debug!(points = indices.len(), "row fallback path built");
    SweepResult {
        points: indices.iter().map(|idx| grid.index_to_world(*idx)).collect(),
        visited_count: grid.free_count(),
    }
}

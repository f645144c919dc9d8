//! Greedy boustrophedon walk over the occupancy grid.
//!
//! The walker rides a row to its far wall, steps one row in the sweep
//! direction and turns back. Direction changes are expressed as a new
//! [`SweepState`] returned from each step rather than mutated in place.

use crate::grid::{EdgeRow, GridIndex, GridMap, BLOCKED, VISITED};
use crate::models::{MovingDirection, PlanarPoint, SweepDirection};

/// Direction of travel plus the turning preferences derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepState {
    pub moving: MovingDirection,
    pub sweep: SweepDirection,
}

impl SweepState {
    pub fn new(moving: MovingDirection, sweep: SweepDirection) -> Self {
        Self { moving, sweep }
    }

    /// Offsets tried, in order, when the cell straight ahead is taken.
    pub fn turning_window(&self) -> [(i64, i64); 4] {
        let mv = self.moving.sign();
        let sw = self.sweep.sign();
        [(mv, 0), (mv, sw), (0, sw), (-mv, sw)]
    }

    pub fn swapped(self) -> Self {
        Self {
            moving: self.moving.reversed(),
            sweep: self.sweep,
        }
    }
}

/// Points and newly visited cells produced by a coverage search.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub points: Vec<PlanarPoint>,
    pub visited_count: usize,
}

impl SweepResult {
    fn empty() -> Self {
        Self {
            points: Vec::new(),
            visited_count: 0,
        }
    }
}

/// Edge row the walk must finish on: the last row in sweep order.
pub fn sweep_goal(grid: &GridMap, sweep: SweepDirection) -> Option<EdgeRow> {
    grid.edge_row(sweep == SweepDirection::Up)
}

/// True once every free cell of the goal row has been visited.
pub fn is_search_done(grid: &GridMap, goal: Option<&EdgeRow>) -> bool {
    match goal {
        Some(row) => row
            .xs
            .iter()
            .all(|x| grid.is_occupied(GridIndex::new(*x, row.y), VISITED)),
        None => true,
    }
}

/// Start cell: first row in sweep order, at the x-extreme the walk heads away from.
pub fn search_start_grid(grid: &GridMap, state: SweepState) -> Option<GridIndex> {
    let row = grid.edge_row(state.sweep == SweepDirection::Down)?;
    let x = match state.moving {
        MovingDirection::Right => row.xs.iter().min()?,
        MovingDirection::Left => row.xs.iter().max()?,
    };
    Some(GridIndex::new(*x, row.y))
}

/// First free cell of the turning window around `current`.
pub fn find_safe_turning_grid(
    grid: &GridMap,
    current: GridIndex,
    state: SweepState,
) -> Option<GridIndex> {
    state
        .turning_window()
        .iter()
        .map(|(dx, dy)| current.offset(*dx, *dy))
        .find(|next| !grid.is_occupied(*next, VISITED))
}

/// One walker step. Returns the next cell and the state to continue with, or
/// `None` when the walker is boxed in.
pub fn move_target_grid(
    grid: &GridMap,
    current: GridIndex,
    state: SweepState,
) -> Option<(GridIndex, SweepState)> {
    let mv = state.moving.sign();
    let ahead = current.offset(mv, 0);
    if !grid.is_occupied(ahead, VISITED) {
        return Some((ahead, state));
    }

    match find_safe_turning_grid(grid, current, state) {
        Some(mut next) => {
            // ride to the far wall before turning around
            while !grid.is_occupied(next.offset(mv, 0), VISITED) {
                next = next.offset(mv, 0);
            }
            Some((next, state.swapped()))
        }
        None => {
            let back = current.offset(-mv, 0);
            if grid.is_occupied(back, BLOCKED) {
                None
            } else {
                Some((back, state))
            }
        }
    }
}

/// Run the greedy walk, marking visited cells on `grid`.
///
/// The returned points are cell centers in the sweep frame. `visited_count`
/// counts only free-to-visited transitions.
pub fn sweep_path_search(grid: &mut GridMap, initial: SweepState) -> SweepResult {
    let Some(mut current) = search_start_grid(grid, initial) else {
        return SweepResult::empty();
    };
    if grid.is_occupied(current, BLOCKED) {
        return SweepResult::empty();
    }
    let goal = sweep_goal(grid, initial.sweep);

    let mut state = initial;
    let mut visited_count = 0;
    if grid.mark_visited(current) {
        visited_count += 1;
    }
    let mut points = vec![grid.index_to_world(current)];

    // reversals can revisit cells, so cap the walk well above any useful length
    let max_steps = grid.len().saturating_mul(4);
    let mut steps = 0usize;
    loop {
        let next = move_target_grid(grid, current, state);
        if is_search_done(grid, goal.as_ref()) {
            break;
        }
        let Some((cell, next_state)) = next else {
            break;
        };
        steps += 1;
        if steps > max_steps {
            tracing::warn!(steps, "sweep walk exceeded step budget");
            break;
        }
        current = cell;
        state = next_state;
        points.push(grid.index_to_world(current));
        if grid.mark_visited(current) {
            visited_count += 1;
        }
    }

    tracing::debug!(
        points = points.len(),
        visited = visited_count,
        free = grid.free_count(),
        "sweep walk finished"
    );
    SweepResult {
        points,
        visited_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_up() -> SweepState {
        SweepState::new(MovingDirection::Right, SweepDirection::Up)
    }

    #[test]
    fn test_turning_window_follows_directions() {
        assert_eq!(
            right_up().turning_window(),
            [(1, 0), (1, 1), (0, 1), (-1, 1)]
        );
        let left_down = SweepState::new(MovingDirection::Left, SweepDirection::Down);
        assert_eq!(
            left_down.turning_window(),
            [(-1, 0), (-1, -1), (0, -1), (1, -1)]
        );
        assert_eq!(right_up().swapped().moving, MovingDirection::Left);
        assert_eq!(right_up().swapped().sweep, SweepDirection::Up);
    }

    #[test]
    fn test_start_is_on_first_row_at_moving_extreme() {
        let grid = GridMap::from_rows(&["#...#", "#...#", "##..#"], 1.0);
        assert_eq!(search_start_grid(&grid, right_up()), Some(GridIndex::new(2, 0)));
        let left_down = SweepState::new(MovingDirection::Left, SweepDirection::Down);
        assert_eq!(search_start_grid(&grid, left_down), Some(GridIndex::new(3, 2)));
    }

    #[test]
    fn test_blocked_grid_has_no_start() {
        let mut grid = GridMap::from_rows(&["###", "###"], 1.0);
        assert_eq!(search_start_grid(&grid, right_up()), None);
        let result = sweep_path_search(&mut grid, right_up());
        assert!(result.points.is_empty());
        assert_eq!(result.visited_count, 0);
    }

    #[test]
    fn test_straight_ahead_keeps_state() {
        let grid = GridMap::from_rows(&["....", "...."], 1.0);
        let (next, state) = move_target_grid(&grid, GridIndex::new(0, 0), right_up()).unwrap();
        assert_eq!(next, GridIndex::new(1, 0));
        assert_eq!(state, right_up());
    }

    #[test]
    fn test_turn_rides_to_far_wall_and_swaps() {
        let mut grid = GridMap::from_rows(&["....", "...."], 1.0);
        for x in 0..4 {
            grid.mark_visited(GridIndex::new(x, 0));
        }
        // at the right wall: the window lands on (3,1) then rides right, already at the wall
        let (next, state) = move_target_grid(&grid, GridIndex::new(3, 0), right_up()).unwrap();
        assert_eq!(next, GridIndex::new(3, 1));
        assert_eq!(state.moving, MovingDirection::Left);
    }

    #[test]
    fn test_boxed_in_walker_reverses_then_stops() {
        let mut grid = GridMap::from_rows(&["####", "#..#", "####"], 1.0);
        grid.mark_visited(GridIndex::new(1, 1));
        grid.mark_visited(GridIndex::new(2, 1));
        let (back, state) = move_target_grid(&grid, GridIndex::new(2, 1), right_up()).unwrap();
        assert_eq!(back, GridIndex::new(1, 1));
        assert_eq!(state, right_up());

        // reversing from the left end would run into the wall
        assert_eq!(move_target_grid(&grid, GridIndex::new(1, 1), right_up()), None);
    }

    #[test]
    fn test_rectangle_is_fully_covered_in_rows() {
        let mut grid = GridMap::from_rows(&["#####", "#...#", "#...#", "#...#", "#####"], 1.0);
        let result = sweep_path_search(&mut grid, right_up());
        assert_eq!(result.visited_count, grid.free_count());
        assert_eq!(result.visited_count, 9);
        let ys: Vec<f64> = result.points.iter().map(|p| p.y).collect();
        assert!(ys.windows(2).all(|w| w[1] >= w[0]));
        assert!(is_search_done(&grid, sweep_goal(&grid, SweepDirection::Up).as_ref()));
    }

    #[test]
    fn test_sweeping_down_starts_at_top_row() {
        let mut grid = GridMap::from_rows(&["#...#", "#...#", "#...#"], 1.0);
        let state = SweepState::new(MovingDirection::Right, SweepDirection::Down);
        let result = sweep_path_search(&mut grid, state);
        assert_eq!(result.visited_count, 9);
        let first = result.points[0];
        let last = result.points[result.points.len() - 1];
        assert!(first.y > last.y);
    }
}

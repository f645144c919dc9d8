//! Errors surfaced by the planner.

use thiserror::Error;

/// Fatal planning failures.
///
/// Only resource limits are reported this way. Degenerate boundaries, greedy
/// under-coverage and unreachable connectors all degrade to a best-effort result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("grid too large ({width} x {height}); increase spacing to reduce resolution")]
    GridTooLarge { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, PlanningError>;

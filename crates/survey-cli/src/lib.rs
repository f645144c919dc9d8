//! Survey CLI - plan coverage flights from GeoJSON boundaries.
//!
//! The `survey-plan` binary reads a geometry, plans over it and prints a JSON
//! waypoint report.

pub mod config;
pub mod input;
pub mod logging;
pub mod report;

pub use config::Config;
pub use input::parse_boundary;
pub use report::{ground_length_m, PlanReport};

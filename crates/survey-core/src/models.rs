//! Core data models for the coverage planner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in the planar (projected) frame, in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for PlanarPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Direction of travel along a sweep row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovingDirection {
    /// Towards increasing x in the sweep frame
    #[default]
    Right,
    /// Towards decreasing x in the sweep frame
    Left,
}

impl MovingDirection {
    pub fn sign(self) -> i64 {
        match self {
            MovingDirection::Right => 1,
            MovingDirection::Left => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            MovingDirection::Right => MovingDirection::Left,
            MovingDirection::Left => MovingDirection::Right,
        }
    }
}

/// Direction in which successive rows are stacked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepDirection {
    /// Rows advance towards increasing y in the sweep frame
    #[default]
    Up,
    /// Rows advance towards decreasing y in the sweep frame
    Down,
}

impl SweepDirection {
    pub fn sign(self) -> i64 {
        match self {
            SweepDirection::Up => 1,
            SweepDirection::Down => -1,
        }
    }
}

/// How the sweep axis is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Rows run parallel to the longest boundary edge
    #[default]
    Auto,
    /// Rows run along global east
    EastWest,
    /// Rows run along global north
    NorthSouth,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Orientation::Auto => "auto",
            Orientation::EastWest => "east-west",
            Orientation::NorthSouth => "north-south",
        };
        f.write_str(label)
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Orientation::Auto),
            "east-west" | "ew" => Ok(Orientation::EastWest),
            "north-south" | "ns" => Ok(Orientation::NorthSouth),
            other => Err(format!(
                "unknown orientation '{}' (expected auto, east-west or north-south)",
                other
            )),
        }
    }
}

/// Geographic boundary geometry in GeoJSON layout.
///
/// Positions are `[lon, lat]` pairs in decimal degrees. Rings are expected to
/// be closed but are closed on normalization if they are not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum BoundaryShape {
    Point([f64; 2]),
    LineString(Vec<[f64; 2]>),
    MultiLineString(Vec<Vec<[f64; 2]>>),
    Polygon(Vec<Vec<[f64; 2]>>),
    MultiPolygon(Vec<Vec<Vec<[f64; 2]>>>),
}

/// Which search produced a coverage path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStrategy {
    /// Greedy lawnmower walk covered every free cell
    Boustrophedon,
    /// Greedy walk under-covered; rows rebuilt and joined with grid A*
    RowFallback,
    /// Nothing to cover (degenerate boundary or invalid spacing)
    Empty,
}

/// Waypoints produced for one resolution level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSample {
    pub points: Vec<PlanarPoint>,
    pub level_used: u32,
    pub spacing_used: f64,
    pub count: usize,
}

impl LevelSample {
    pub(crate) fn empty(level_used: u32, spacing_used: f64) -> Self {
        Self {
            points: Vec::new(),
            level_used,
            spacing_used,
            count: 0,
        }
    }
}

/// A geographic waypoint returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyWaypoint {
    pub lat: f64,
    pub lon: f64,
}

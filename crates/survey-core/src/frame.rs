//! Sweep-axis selection and the rotated "sweep frame".
//!
//! All grid work happens in a frame where sweep rows run along +x. The frame
//! is a translation to the sweep origin followed by a rotation that takes the
//! sweep axis onto +x; [`SweepFrame::to_world`] is its exact inverse.

use crate::models::{Orientation, PlanarPoint};
use crate::spatial::bounds_center;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepFrame {
    /// Sweep axis in world coordinates (not necessarily unit length)
    pub axis: PlanarPoint,
    /// Frame origin in world coordinates
    pub origin: PlanarPoint,
    /// Angle of `axis` from world +x, radians
    pub theta: f64,
}

impl SweepFrame {
    pub fn new(axis: PlanarPoint, origin: PlanarPoint) -> Self {
        Self {
            axis,
            origin,
            theta: axis.y.atan2(axis.x),
        }
    }

    /// Pick the sweep axis and origin for a closed boundary ring.
    pub fn select(ring: &[PlanarPoint], orientation: Orientation) -> Self {
        match orientation {
            Orientation::EastWest => Self::new(PlanarPoint::new(1.0, 0.0), bounds_center(ring)),
            Orientation::NorthSouth => Self::new(PlanarPoint::new(0.0, 1.0), bounds_center(ring)),
            Orientation::Auto => {
                let (axis, origin) = longest_edge(ring);
                Self::new(axis, origin)
            }
        }
    }

    /// World -> sweep frame.
    pub fn to_sweep(&self, p: PlanarPoint) -> PlanarPoint {
        let tx = p.x - self.origin.x;
        let ty = p.y - self.origin.y;
        rotate(tx, ty, -self.theta)
    }

    /// Sweep frame -> world.
    pub fn to_world(&self, p: PlanarPoint) -> PlanarPoint {
        let r = rotate(p.x, p.y, self.theta);
        PlanarPoint::new(r.x + self.origin.x, r.y + self.origin.y)
    }

    pub fn ring_to_sweep(&self, points: &[PlanarPoint]) -> Vec<PlanarPoint> {
        points.iter().map(|p| self.to_sweep(*p)).collect()
    }

    pub fn path_to_world(&self, points: &[PlanarPoint]) -> Vec<PlanarPoint> {
        points.iter().map(|p| self.to_world(*p)).collect()
    }
}

/// Direction vector and start point of the longest edge.
///
/// Ties keep the first edge found. A ring without a positive-length edge yields
/// a zero axis at the origin.
fn longest_edge(ring: &[PlanarPoint]) -> (PlanarPoint, PlanarPoint) {
    let mut max_dist = 0.0;
    let mut axis = PlanarPoint::default();
    let mut start = PlanarPoint::default();
    for pair in ring.windows(2) {
        let dx = pair[1].x - pair[0].x;
        let dy = pair[1].y - pair[0].y;
        let d = dx.hypot(dy);
        if d > max_dist {
            max_dist = d;
            axis = PlanarPoint::new(dx, dy);
            start = pair[0];
        }
    }
    (axis, start)
}

/// Standard 2x2 rotation by `theta`.
fn rotate(x: f64, y: f64, theta: f64) -> PlanarPoint {
    let (s, c) = theta.sin_cos();
    PlanarPoint::new(c * x - s * y, s * x + c * y)
}

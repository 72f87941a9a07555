//! Typed angular slices of a level ring
//!
//! A level is a full turn split into arcs. Angles are measured in the ring's
//! own frame, counter-clockwise from +X, and always satisfy
//! `0 <= start < end <= 2π`.

use serde::{Deserialize, Serialize};

use crate::normalize_angle;

/// What happens when the ball meets an arc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcKind {
    /// Solid; the ball bounces
    Platform,
    /// Deadly unless the streak forgives it
    Loss,
    /// Empty; the ball drops to the next level
    Hole,
}

impl ArcKind {
    pub const ALL: [ArcKind; 3] = [ArcKind::Platform, ArcKind::Loss, ArcKind::Hole];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArcKind::Platform => "platform",
            ArcKind::Loss => "loss",
            ArcKind::Hole => "hole",
        }
    }

    /// Holes are not rendered but still report overlaps
    pub fn is_visible(&self) -> bool {
        *self != ArcKind::Hole
    }
}

impl std::fmt::Display for ArcKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One angular slice of a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    /// Start angle (radians, inclusive)
    pub start: f32,
    /// End angle (radians, exclusive)
    pub end: f32,
    pub kind: ArcKind,
}

impl Arc {
    pub const fn new(start: f32, end: f32, kind: ArcKind) -> Self {
        Self { start, end, kind }
    }

    /// Angular span of the arc
    #[inline]
    pub fn width(&self) -> f32 {
        self.end - self.start
    }

    /// Angle halfway between start and end
    #[inline]
    pub fn mid_angle(&self) -> f32 {
        (self.start + self.end) / 2.0
    }

    /// Check if an angle (any range, ring frame) falls inside `[start, end)`
    pub fn contains_angle(&self, theta: f32) -> bool {
        let theta = normalize_angle(theta);
        theta >= self.start && theta < self.end
    }
}

/// Index of the arc covering `theta` (ring frame), if any
pub fn arc_at_angle(arcs: &[Arc], theta: f32) -> Option<usize> {
    let theta = normalize_angle(theta);
    arcs.iter()
        .position(|arc| arc.contains_angle(theta))
        // The last arc ends at exactly 2π, which normalizes to 0
        .or_else(|| arcs.iter().position(|arc| arc.start <= theta && theta <= arc.end))
}

/// Total angular coverage of a set of arcs
pub fn total_width(arcs: &[Arc]) -> f32 {
    arcs.iter().map(Arc::width).sum()
}

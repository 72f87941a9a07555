//! Helix Drop - gameplay core of a helix descent arcade game
//!
//! Core modules:
//! - `sim`: Level generation, arc geometry and the game-state rules
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::TAU;

    /// Full turn in radians
    pub const FULL_TURN: f32 = TAU;
    /// Arcs thinner than this are never emitted as separate arcs (radians)
    pub const MIN_ARC_WIDTH: f32 = 0.01;

    /// Ring geometry (world units)
    pub const PLATFORM_RADIUS: f32 = 10.0;
    pub const PLATFORM_DEPTH: f32 = 1.0;
    /// Outline points per full turn
    pub const ARC_RESOLUTION: u32 = 32;
    /// Vertical distance between two consecutive levels
    pub const LEVEL_SPACING: f32 = 15.0;
    /// Levels kept instantiated on each side of the current score
    pub const WINDOW_RANGE: u32 = 2;

    /// Consecutive holes needed before a bounce advances the score
    pub const FORGIVENESS_STREAK: u32 = 3;
    /// Jump count that raises the "stuck on one platform" warning
    pub const STUCK_JUMPS: u32 = 5;
    /// Upward speed given to the ball by a platform bounce
    pub const BOUNCE_SPEED: f32 = 32.0;
    /// Outward speed of a resolved arc falling away
    pub const FALL_AWAY_SPEED: f32 = 25.0;
    /// Rotation per dragged pixel (radians)
    pub const DRAG_SENSITIVITY: f32 = 0.01;

    /// Levels per difficulty step
    pub const DIFFICULTY_INTERVAL: u32 = 20;
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

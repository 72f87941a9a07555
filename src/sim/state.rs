//! Game counters and the events flowing in and out of the rules
//!
//! Counters have a single writer (the session tick). Everything else reads a
//! copy.

use serde::{Deserialize, Serialize};

use super::arc::ArcKind;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball is falling through the helix
    #[default]
    Playing,
    /// Ball touched a loss arc; counters frozen until reset
    GameOver,
}

/// Counters owned by the level state machine for one play session
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GameCounters {
    /// Lowest level not yet cleared, also the points shown to the player
    pub score: u32,
    /// Enter-based advance counter, never behind `score`
    pub pre_score: u32,
    /// Platform bounces since the last hole
    pub num_jumps: u32,
    /// Holes passed without a bounce spending them
    pub streak: u32,
    /// Ring orientation in radians, written only by player input
    pub rotation: f32,
}

impl GameCounters {
    /// Whether `level` is still in play (not yet cleared)
    #[inline]
    pub fn is_live(&self, level: u32) -> bool {
        level >= self.score
    }

    /// Streak large enough for a loss arc to be forgiven
    #[inline]
    pub fn is_charged(&self, forgiveness_streak: u32) -> bool {
        self.streak >= forgiveness_streak
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance the cleared level by one
    pub(crate) fn advance(&mut self) {
        self.score += 1;
        self.pre_score = self.pre_score.max(self.score);
    }
}

/// Arena address of one arc: level index and position in that level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArcId {
    pub level: u32,
    pub arc: usize,
}

impl ArcId {
    pub const fn new(level: u32, arc: usize) -> Self {
        Self { level, arc }
    }
}

/// Physics bodies the core talks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyId {
    /// The player's ball
    Ball,
    /// The rigid body of one arc
    Arc(ArcId),
    /// Anything else the physics engine reports
    Other(u32),
}

impl BodyId {
    /// Logical name used by the physics scene
    pub fn name(&self) -> &'static str {
        match self {
            BodyId::Ball => BALL_BODY_NAME,
            BodyId::Arc(_) => "sector",
            BodyId::Other(_) => "other",
        }
    }
}

/// Reserved logical name of the ball body
pub const BALL_BODY_NAME: &str = "ball";

/// Which side of an overlap a physics callback reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlapPhase {
    Enter,
    Exit,
}

/// Overlap between an arc and another body, as queued by physics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlapEvent {
    pub arc: ArcId,
    pub kind: ArcKind,
    pub other: BodyId,
    pub phase: OverlapPhase,
}

impl OverlapEvent {
    pub fn enter(arc: ArcId, kind: ArcKind, other: BodyId) -> Self {
        Self {
            arc,
            kind,
            other,
            phase: OverlapPhase::Enter,
        }
    }

    pub fn exit(arc: ArcId, kind: ArcKind, other: BodyId) -> Self {
        Self {
            arc,
            kind,
            other,
            phase: OverlapPhase::Exit,
        }
    }
}

/// Presentation-facing events produced by the rules and the tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball bounced off an arc
    Bounce { arc: ArcId },
    /// A level was cleared; `score` is the new score
    LevelCleared { level: u32, score: u32 },
    /// A loss arc was forgiven by the streak
    Forgiven { arc: ArcId },
    /// Too many bounces without finding a hole
    StuckWarning { jumps: u32, message: String },
    /// Terminal loss
    RunEnded { score: u32, message: String },
}

pub const LOSS_MESSAGE: &str = "You have touched the Loss Sector!";

pub fn stuck_message(jumps: u32) -> String {
    format!("You have jumped on the same platform {} times!", jumps)
}

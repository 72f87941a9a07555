//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (levels by index, arcs by angle)
//! - No rendering or physics engine dependencies

pub mod arc;
pub mod generator;
pub mod geometry;
pub mod level;
pub mod rules;
pub mod state;
pub mod tick;

pub use arc::{Arc, ArcKind, arc_at_angle, total_width};
pub use generator::{SegmentGenerator, difficulty_level, starting_layout};
pub use geometry::{ArcPanel, PanelVertex, build_arc_panel, ring_direction};
pub use level::{Level, LevelArc, LevelAssembler, LevelWindow};
pub use rules::{LevelStateMachine, Transition};
pub use state::{
    ArcId, BodyId, GameCounters, GameEvent, GamePhase, OverlapEvent, OverlapPhase,
    BALL_BODY_NAME, LOSS_MESSAGE, stuck_message,
};
pub use tick::{PhysicsWorld, Session, TickInput};

//! Configuration errors
//!
//! Everything here is raised while building a generator or loading tuning,
//! never in the middle of a run.

use thiserror::Error;

use crate::sim::ArcKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{kind} size range is invalid: min {min} > max {max}")]
    SizeRange { kind: ArcKind, min: f32, max: f32 },
    #[error("{kind} sizes must be finite and positive (min {min})")]
    NonPositiveSize { kind: ArcKind, min: f32 },
    #[error("{kind} count range is invalid: min {min} > max {max}")]
    CountRange { kind: ArcKind, min: u32, max: u32 },
    #[error("difficulty interval must be at least 1")]
    DifficultyInterval,
    #[error("layout value `{field}` must be finite and positive (got {value})")]
    Layout { field: &'static str, value: f32 },
    #[error("arc resolution must be at least 1")]
    ArcResolution,
    #[error("rule value `{field}` is out of range (got {value})")]
    Rule { field: &'static str, value: f32 },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
}

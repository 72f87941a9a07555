//! Data-driven game balance
//!
//! Every section falls back to its defaults when missing from the JSON, so a
//! tuning file only needs to name what it changes.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::ArcKind;

/// Size and count limits for one arc kind on one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorConfig {
    /// Smallest size of one instance (radians)
    pub min_size: f32,
    /// Largest size of one instance (radians)
    pub max_size: f32,
    /// Fewest instances per level
    pub min_count: u32,
    /// Most instances per level
    pub max_count: u32,
}

impl SectorConfig {
    pub const fn new(min_size: f32, max_size: f32, min_count: u32, max_count: u32) -> Self {
        Self {
            min_size,
            max_size,
            min_count,
            max_count,
        }
    }

    pub fn validate(&self, kind: ArcKind) -> Result<(), ConfigError> {
        if !self.min_size.is_finite() || !self.max_size.is_finite() || self.min_size <= 0.0 {
            return Err(ConfigError::NonPositiveSize {
                kind,
                min: self.min_size,
            });
        }
        if self.min_size > self.max_size {
            return Err(ConfigError::SizeRange {
                kind,
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.min_count > self.max_count {
            return Err(ConfigError::CountRange {
                kind,
                min: self.min_count,
                max: self.max_count,
            });
        }
        Ok(())
    }
}

/// Difficulty curve applied on top of the base sector sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub enabled: bool,
    /// Levels per difficulty step
    pub interval: u32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: DIFFICULTY_INTERVAL,
        }
    }
}

/// Segment generator balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorTuning {
    pub platform: SectorConfig,
    pub loss: SectorConfig,
    pub hole: SectorConfig,
    pub difficulty: DifficultyTuning,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        // Worst case the sampled arcs cover ~5.2 rad, so a platform filler
        // always closes the ring.
        Self {
            platform: SectorConfig::new(0.5, 1.0, 2, 3),
            loss: SectorConfig::new(0.2, 0.35, 2, 3),
            hole: SectorConfig::new(0.35, 0.55, 1, 2),
            difficulty: DifficultyTuning::default(),
        }
    }
}

impl GeneratorTuning {
    pub fn sector(&self, kind: ArcKind) -> &SectorConfig {
        match kind {
            ArcKind::Platform => &self.platform,
            ArcKind::Loss => &self.loss,
            ArcKind::Hole => &self.hole,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in ArcKind::ALL {
            self.sector(kind).validate(kind)?;
        }
        if self.difficulty.interval == 0 {
            return Err(ConfigError::DifficultyInterval);
        }
        Ok(())
    }
}

/// Ring geometry and level placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTuning {
    pub platform_radius: f32,
    pub platform_depth: f32,
    pub arc_resolution: u32,
    pub level_spacing: f32,
    pub window_range: u32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            platform_radius: PLATFORM_RADIUS,
            platform_depth: PLATFORM_DEPTH,
            arc_resolution: ARC_RESOLUTION,
            level_spacing: LEVEL_SPACING,
            window_range: WINDOW_RANGE,
        }
    }
}

impl LayoutTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("platform_radius", self.platform_radius),
            ("platform_depth", self.platform_depth),
            ("level_spacing", self.level_spacing),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Layout { field, value });
            }
        }
        if self.arc_resolution == 0 {
            return Err(ConfigError::ArcResolution);
        }
        Ok(())
    }
}

/// Level state machine constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesTuning {
    pub forgiveness_streak: u32,
    pub stuck_jumps: u32,
    pub bounce_speed: f32,
    pub fall_away_speed: f32,
    pub drag_sensitivity: f32,
}

impl Default for RulesTuning {
    fn default() -> Self {
        Self {
            forgiveness_streak: FORGIVENESS_STREAK,
            stuck_jumps: STUCK_JUMPS,
            bounce_speed: BOUNCE_SPEED,
            fall_away_speed: FALL_AWAY_SPEED,
            drag_sensitivity: DRAG_SENSITIVITY,
        }
    }
}

impl RulesTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forgiveness_streak == 0 {
            return Err(ConfigError::Rule {
                field: "forgiveness_streak",
                value: 0.0,
            });
        }
        for (field, value) in [
            ("bounce_speed", self.bounce_speed),
            ("fall_away_speed", self.fall_away_speed),
            ("drag_sensitivity", self.drag_sensitivity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Rule { field, value });
            }
        }
        Ok(())
    }
}

/// Complete game balance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub generator: GeneratorTuning,
    pub layout: LayoutTuning,
    pub rules: RulesTuning,
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::debug!("Loaded tuning: {:?}", tuning);
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.layout.validate()?;
        self.rules.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "rules": { "stuck_jumps": 7 } }"#).unwrap();
        assert_eq!(tuning.rules.stuck_jumps, 7);
        assert_eq!(tuning.rules.forgiveness_streak, FORGIVENESS_STREAK);
        assert_eq!(tuning.generator, GeneratorTuning::default());
        assert_eq!(tuning.layout.arc_resolution, ARC_RESOLUTION);
    }

    #[test]
    fn test_json_round_trip() {
        let mut tuning = Tuning::default();
        tuning.generator.hole = SectorConfig::new(0.3, 0.4, 1, 1);
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_rejects_inverted_size_range() {
        let json = r#"{ "generator": { "loss": { "min_size": 0.5, "max_size": 0.2, "min_count": 1, "max_count": 2 } } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(ConfigError::SizeRange {
                kind: ArcKind::Loss,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_inverted_count_range() {
        let sector = SectorConfig::new(0.2, 0.3, 4, 2);
        assert!(matches!(
            sector.validate(ArcKind::Hole),
            Err(ConfigError::CountRange { min: 4, max: 2, .. })
        ));
        let err = sector.validate(ArcKind::Hole).unwrap_err();
        assert_eq!(err.to_string(), "hole count range is invalid: min 4 > max 2");
    }

    #[test]
    fn test_rejects_zero_size_and_bad_layout() {
        let sector = SectorConfig::new(0.0, 0.3, 1, 2);
        assert!(matches!(
            sector.validate(ArcKind::Platform),
            Err(ConfigError::NonPositiveSize { .. })
        ));

        let mut tuning = Tuning::default();
        tuning.layout.level_spacing = -1.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::Layout {
                field: "level_spacing",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }
}

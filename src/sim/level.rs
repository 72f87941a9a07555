//! Level assembly and the visible window
//!
//! Levels live in an arena keyed by index. Each arc is a plain record holding
//! its mesh, the rotation it was last drawn at and whether its fall-away
//! velocity has been sent, so arcs need no identity beyond `(level, arc)`.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::Rng;

use super::arc::{Arc, ArcKind, arc_at_angle};
use super::generator::SegmentGenerator;
use super::geometry::{ArcPanel, build_arc_panel, local_to_plane, world_to_local};
use super::state::ArcId;
use crate::error::ConfigError;
use crate::tuning::{LayoutTuning, Tuning};

/// One arc of an instantiated level
#[derive(Debug, Clone)]
pub struct LevelArc {
    pub arc: Arc,
    pub panel: ArcPanel,
    /// Rotation the arc was last synced to
    pub rotation: f32,
    /// Fall-away velocity already sent to physics
    pub impulse_applied: bool,
}

/// One ring of the helix
#[derive(Debug, Clone)]
pub struct Level {
    pub index: u32,
    /// Height of the ring's underside on the descent axis
    pub vertical_position: f32,
    pub arcs: Vec<LevelArc>,
}

impl Level {
    pub fn arc_id(&self, arc: usize) -> ArcId {
        ArcId::new(self.index, arc)
    }

    pub fn arc_list(&self) -> Vec<Arc> {
        self.arcs.iter().map(|a| a.arc).collect()
    }

    /// Arc under a ring-frame angle
    pub fn arc_at_angle(&self, theta: f32) -> Option<usize> {
        let arcs = self.arc_list();
        arc_at_angle(&arcs, theta)
    }

    /// Arc whose solid contains a world point (y on the descent axis, x/z
    /// relative to the helix axis)
    pub fn arc_containing(&self, point: Vec3) -> Option<usize> {
        let height = point.y - self.vertical_position;
        self.arcs.iter().position(|slot| {
            let local = world_to_local(Vec3::new(point.x, height, point.z), slot.rotation);
            slot.panel.contains_local(local)
        })
    }

    /// Arc directly above or below a world point, ignoring height
    pub fn arc_below(&self, point: Vec3) -> Option<usize> {
        let slot = self.arcs.first()?;
        let local = world_to_local(Vec3::new(point.x, 0.0, point.z), slot.rotation);
        let p = local_to_plane(local);
        if p.length() > slot.panel.outer_radius {
            return None;
        }
        self.arc_at_angle(p.y.atan2(p.x))
    }

    pub fn kind_of(&self, arc: usize) -> Option<ArcKind> {
        self.arcs.get(arc).map(|a| a.arc.kind)
    }
}

/// Turns generator output into positioned levels with meshes
#[derive(Debug, Clone)]
pub struct LevelAssembler {
    generator: SegmentGenerator,
    layout: LayoutTuning,
}

impl LevelAssembler {
    pub fn new(tuning: &Tuning) -> Result<Self, ConfigError> {
        tuning.layout.validate()?;
        Ok(Self {
            generator: SegmentGenerator::new(tuning.generator.clone())?,
            layout: tuning.layout,
        })
    }

    pub fn layout(&self) -> &LayoutTuning {
        &self.layout
    }

    pub fn generator(&self) -> &SegmentGenerator {
        &self.generator
    }

    /// Height of level `index` on the descent axis
    pub fn vertical_position(&self, index: u32) -> f32 {
        -(index as f32) * self.layout.level_spacing
    }

    pub fn assemble<R: Rng + ?Sized>(&self, index: u32, rotation: f32, rng: &mut R) -> Level {
        let arcs = self
            .generator
            .generate(index, rng)
            .into_iter()
            .map(|arc| LevelArc {
                arc,
                panel: build_arc_panel(
                    self.layout.platform_radius,
                    self.layout.platform_depth,
                    arc.start,
                    arc.end,
                    self.layout.arc_resolution,
                ),
                rotation,
                impulse_applied: false,
            })
            .collect();

        Level {
            index,
            vertical_position: self.vertical_position(index),
            arcs,
        }
    }
}

/// Levels instantiated around the current score
#[derive(Debug, Clone, Default)]
pub struct LevelWindow {
    levels: BTreeMap<u32, Level>,
}

impl LevelWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index range the window should hold for a score
    pub fn range_for(score: u32, range: u32) -> std::ops::RangeInclusive<u32> {
        score.saturating_sub(range)..=score.saturating_add(range)
    }

    /// Drop levels outside the window and build the missing ones, in
    /// ascending index order so seeded runs stay reproducible
    pub fn sync<R: Rng + ?Sized>(
        &mut self,
        score: u32,
        rotation: f32,
        assembler: &LevelAssembler,
        rng: &mut R,
    ) {
        let wanted = Self::range_for(score, assembler.layout().window_range);
        let before = self.levels.len();
        self.levels.retain(|index, _| wanted.contains(index));
        let dropped = before - self.levels.len();

        let mut built = 0;
        for index in wanted {
            if !self.levels.contains_key(&index) {
                self.levels.insert(index, assembler.assemble(index, rotation, rng));
                built += 1;
            }
        }
        if dropped > 0 || built > 0 {
            log::debug!(
                "Window at score {}: dropped {}, built {}, holding {:?}",
                score,
                dropped,
                built,
                self.levels.keys().collect::<Vec<_>>()
            );
        }
    }

    pub fn get(&self, index: u32) -> Option<&Level> {
        self.levels.get(&index)
    }

    pub fn arc(&self, id: ArcId) -> Option<&LevelArc> {
        self.levels.get(&id.level)?.arcs.get(id.arc)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Level> {
        self.levels.values_mut()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.levels.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}

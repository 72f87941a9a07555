//! Per-frame session tick
//!
//! A session owns everything one run needs: counters, the level window, the
//! rules and a seeded RNG. Physics reports overlaps through `push_overlap`;
//! they are queued and handled together on the next `tick`, which is the only
//! place counters change.

use std::collections::HashSet;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::level::{Level, LevelAssembler, LevelWindow};
use super::geometry::ring_direction;
use super::rules::LevelStateMachine;
use super::state::{ArcId, BodyId, GameCounters, GameEvent, GamePhase, OverlapEvent};
use super::ArcKind;
use crate::error::ConfigError;
use crate::normalize_angle;
use crate::tuning::Tuning;

/// Player input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Horizontal drag since the last tick, in pixels
    pub drag_delta_px: f32,
}

/// The part of the physics engine the core drives
pub trait PhysicsWorld {
    /// Replace a body's velocity immediately
    fn apply_instant_velocity(&mut self, body: BodyId, velocity: Vec3);
}

/// One play session
#[derive(Debug, Clone)]
pub struct Session {
    tuning: Tuning,
    seed: u64,
    rng: Pcg32,
    counters: GameCounters,
    phase: GamePhase,
    machine: LevelStateMachine,
    assembler: LevelAssembler,
    window: LevelWindow,
    pending: Vec<OverlapEvent>,
    tick_count: u64,
}

impl Session {
    /// Create a session and instantiate the first window of levels
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let assembler = LevelAssembler::new(&tuning)?;
        let mut session = Self {
            machine: LevelStateMachine::new(tuning.rules),
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            counters: GameCounters::default(),
            phase: GamePhase::Playing,
            assembler,
            window: LevelWindow::new(),
            pending: Vec::new(),
            tick_count: 0,
        };
        session.sync_window();
        log::info!("Session started with seed {}", seed);
        Ok(session)
    }

    /// Start over with the same seed
    pub fn reset(&mut self) {
        self.reset_with_seed(self.seed);
    }

    pub fn reset_with_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.counters.reset();
        self.phase = GamePhase::Playing;
        self.window.clear();
        self.pending.clear();
        self.tick_count = 0;
        self.sync_window();
        log::info!("Session reset with seed {}", seed);
    }

    /// Queue an overlap reported by physics
    pub fn push_overlap(&mut self, event: OverlapEvent) {
        self.pending.push(event);
    }

    /// Queue an enter overlap between an arc and a body, looking up the arc's
    /// kind. Returns false if the arc is not instantiated.
    pub fn push_enter(&mut self, arc: ArcId, other: BodyId) -> bool {
        match self.arc_kind(arc) {
            Some(kind) => {
                self.push_overlap(OverlapEvent::enter(arc, kind, other));
                true
            }
            None => false,
        }
    }

    /// Advance the session by one frame
    pub fn tick<P: PhysicsWorld + ?Sized>(
        &mut self,
        input: &TickInput,
        physics: &mut P,
    ) -> Vec<GameEvent> {
        self.tick_count += 1;

        if self.phase == GamePhase::Playing && input.drag_delta_px != 0.0 {
            self.counters.rotation = normalize_angle(
                self.counters.rotation + input.drag_delta_px * self.tuning.rules.drag_sensitivity,
            );
        }

        let events = self.drain_overlaps(physics);
        self.sync_window();
        self.couple_rotation(physics);
        events
    }

    fn drain_overlaps<P: PhysicsWorld + ?Sized>(&mut self, physics: &mut P) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut seen = HashSet::new();

        for overlap in std::mem::take(&mut self.pending) {
            if self.phase == GamePhase::GameOver {
                break;
            }
            // physics may report the same contact more than once per step
            if !seen.insert(overlap) {
                continue;
            }
            let transition = self.machine.apply(&mut self.counters, &overlap);
            if transition.bounce {
                physics.apply_instant_velocity(
                    BodyId::Ball,
                    Vec3::new(0.0, self.tuning.rules.bounce_speed, 0.0),
                );
            }
            if transition.ended {
                self.phase = GamePhase::GameOver;
            }
            events.extend(transition.events);
        }
        events
    }

    fn sync_window(&mut self) {
        self.window.sync(
            self.counters.score,
            self.counters.rotation,
            &self.assembler,
            &mut self.rng,
        );
    }

    /// Live levels follow the ring rotation; resolved levels freeze and their
    /// arcs are pushed outward once
    fn couple_rotation<P: PhysicsWorld + ?Sized>(&mut self, physics: &mut P) {
        let rotation = self.counters.rotation;
        let speed = self.tuning.rules.fall_away_speed;

        for level in self.window.iter_mut() {
            let live = self.counters.is_live(level.index);
            let index = level.index;
            for (i, slot) in level.arcs.iter_mut().enumerate() {
                if live {
                    slot.rotation = rotation;
                } else if !slot.impulse_applied {
                    let velocity = ring_direction(slot.arc.mid_angle(), slot.rotation) * speed;
                    physics.apply_instant_velocity(BodyId::Arc(ArcId::new(index, i)), velocity);
                    slot.impulse_applied = true;
                }
            }
        }
    }

    pub fn counters(&self) -> GameCounters {
        self.counters
    }

    pub fn score(&self) -> u32 {
        self.counters.score
    }

    pub fn rotation(&self) -> f32 {
        self.counters.rotation
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn assembler(&self) -> &LevelAssembler {
        &self.assembler
    }

    pub fn window(&self) -> &LevelWindow {
        &self.window
    }

    pub fn level(&self, index: u32) -> Option<&Level> {
        self.window.get(index)
    }

    pub fn arc_kind(&self, id: ArcId) -> Option<ArcKind> {
        self.window.arc(id).map(|slot| slot.arc.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingPhysics {
        calls: Vec<(BodyId, Vec3)>,
    }

    impl PhysicsWorld for RecordingPhysics {
        fn apply_instant_velocity(&mut self, body: BodyId, velocity: Vec3) {
            self.calls.push((body, velocity));
        }
    }

    impl RecordingPhysics {
        fn arc_impulses(&self, level: u32) -> usize {
            self.calls
                .iter()
                .filter(|(body, _)| matches!(body, BodyId::Arc(id) if id.level == level))
                .count()
        }

        fn ball_bounces(&self) -> usize {
            self.calls.iter().filter(|(body, _)| *body == BodyId::Ball).count()
        }
    }

    fn session(seed: u64) -> Session {
        Session::new(seed, Tuning::default()).unwrap()
    }

    fn first_of(session: &Session, level: u32, kind: ArcKind) -> Option<ArcId> {
        let level = session.level(level)?;
        level
            .arcs
            .iter()
            .position(|slot| slot.arc.kind == kind)
            .map(|i| level.arc_id(i))
    }

    /// Drop through level 0's hole so later levels become live
    fn clear_level_zero(session: &mut Session, physics: &mut RecordingPhysics) {
        let hole = first_of(session, 0, ArcKind::Hole).unwrap();
        session.push_enter(hole, BodyId::Ball);
        session.tick(&TickInput::default(), physics);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_new_session_window() {
        let s = session(7);
        assert_eq!(s.window().indices(), vec![0, 1, 2]);
        assert_eq!(s.counters(), GameCounters::default());
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_drag_rotates_live_levels() {
        let mut s = session(7);
        let mut physics = RecordingPhysics::default();
        s.tick(&TickInput { drag_delta_px: 50.0 }, &mut physics);
        assert!((s.rotation() - 0.5).abs() < 1e-6);
        for level in s.window().iter() {
            assert!(level.arcs.iter().all(|a| (a.rotation - 0.5).abs() < 1e-6));
        }
        assert!(physics.calls.is_empty());
    }

    #[test]
    fn test_hole_advances_and_slides_window() {
        let mut s = session(11);
        let mut physics = RecordingPhysics::default();
        let hole = first_of(&s, 0, ArcKind::Hole).unwrap();
        s.push_enter(hole, BodyId::Ball);
        let events = s.tick(&TickInput::default(), &mut physics);

        assert_eq!(events, vec![GameEvent::LevelCleared { level: 0, score: 1 }]);
        assert_eq!(s.counters().streak, 1);
        assert_eq!(s.window().indices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_resolved_arcs_fall_away_once() {
        let mut s = session(11);
        let mut physics = RecordingPhysics::default();
        s.tick(&TickInput { drag_delta_px: 30.0 }, &mut physics);
        clear_level_zero(&mut s, &mut physics);

        let arc_count = s.level(0).unwrap().arcs.len();
        assert_eq!(physics.arc_impulses(0), arc_count);

        // frozen at the rotation they had when resolved
        s.tick(&TickInput { drag_delta_px: 100.0 }, &mut physics);
        s.tick(&TickInput::default(), &mut physics);
        assert_eq!(physics.arc_impulses(0), arc_count);
        let level = s.level(0).unwrap();
        assert!(level.arcs.iter().all(|a| (a.rotation - 0.3).abs() < 1e-6));

        // outward along the arc midpoint
        let (_, velocity) = physics
            .calls
            .iter()
            .find(|(body, _)| *body == BodyId::Arc(ArcId::new(0, 0)))
            .copied()
            .unwrap();
        let expected = ring_direction(level.arcs[0].arc.mid_angle(), 0.3) * 25.0;
        assert!((velocity - expected).length() < 1e-4);
    }

    #[test]
    fn test_duplicate_events_in_one_tick_count_once() {
        let mut s = session(5);
        let mut physics = RecordingPhysics::default();
        clear_level_zero(&mut s, &mut physics);

        let platform = first_of(&s, 1, ArcKind::Platform).unwrap();
        s.push_enter(platform, BodyId::Ball);
        s.push_enter(platform, BodyId::Ball);
        s.tick(&TickInput::default(), &mut physics);
        assert_eq!(s.counters().num_jumps, 1);
        assert_eq!(physics.ball_bounces(), 1);

        // a fresh contact on a later tick is a new bounce
        s.push_enter(platform, BodyId::Ball);
        s.tick(&TickInput::default(), &mut physics);
        assert_eq!(s.counters().num_jumps, 2);
    }

    #[test]
    fn test_bounce_velocity() {
        let mut s = session(5);
        let mut physics = RecordingPhysics::default();
        let platform = first_of(&s, 0, ArcKind::Platform).unwrap();
        s.push_enter(platform, BodyId::Ball);
        let events = s.tick(&TickInput::default(), &mut physics);
        assert_eq!(events, vec![GameEvent::Bounce { arc: platform }]);
        assert_eq!(physics.calls, vec![(BodyId::Ball, Vec3::new(0.0, 32.0, 0.0))]);
        assert_eq!(s.counters().num_jumps, 0);
    }

    #[test]
    fn test_loss_freezes_session_until_reset() {
        // find a seed whose level 1 has a loss arc
        let (mut s, loss) = (0..64)
            .find_map(|seed| {
                let s = session(seed);
                first_of(&s, 1, ArcKind::Loss).map(|loss| (s, loss))
            })
            .unwrap();
        let mut physics = RecordingPhysics::default();
        clear_level_zero(&mut s, &mut physics);

        s.push_enter(loss, BodyId::Ball);
        let events = s.tick(&TickInput::default(), &mut physics);
        assert!(s.is_over());
        assert!(matches!(events.as_slice(), [GameEvent::RunEnded { score: 1, .. }]));
        let frozen = s.counters();

        // input and events are ignored once the run is over
        let platform = first_of(&s, 1, ArcKind::Platform).unwrap();
        s.push_enter(platform, BodyId::Ball);
        let events = s.tick(&TickInput { drag_delta_px: 40.0 }, &mut physics);
        assert!(events.is_empty());
        assert_eq!(s.counters(), frozen);

        s.reset();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.counters(), GameCounters::default());
        assert_eq!(s.window().indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_same_seed_same_levels() {
        let a = session(99);
        let b = session(99);
        for index in 0..=2 {
            assert_eq!(a.level(index).unwrap().arc_list(), b.level(index).unwrap().arc_list());
        }

        let mut c = session(99);
        let mut physics = RecordingPhysics::default();
        clear_level_zero(&mut c, &mut physics);
        c.reset();
        assert_eq!(c.level(2).unwrap().arc_list(), a.level(2).unwrap().arc_list());
    }

    #[test]
    fn test_unknown_arc_is_not_queued() {
        let mut s = session(3);
        assert!(!s.push_enter(ArcId::new(40, 0), BodyId::Ball));
        assert!(!s.push_enter(ArcId::new(0, 99), BodyId::Ball));
    }
}

//! Helix Drop headless demo
//!
//! Plays one seeded run against a toy physics stand-in: the ball falls under
//! gravity, ring planes are crossed at the ball's fixed position and an
//! autopilot drags the nearest hole underneath it.
//!
//! Usage: `helix-drop [--seed N] [--levels N] [--tuning tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod args {
    use std::path::PathBuf;

    use clap::Parser;

    #[derive(Parser, Debug, Clone)]
    #[command(name = "helix-drop")]
    #[command(about = "Headless Helix Drop run with an autopilot", long_about = None)]
    pub struct Args {
        /// Seed for level generation and the autopilot
        #[arg(long, default_value_t = 42)]
        pub seed: u64,
        /// Stop once this many levels are cleared
        #[arg(long, default_value_t = 30)]
        pub levels: u32,
        /// Optional tuning file (JSON)
        #[arg(long)]
        pub tuning: Option<PathBuf>,
    }

}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::f32::consts::{FRAC_PI_2, PI};

    use glam::Vec3;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use helix_drop::normalize_angle;
    use helix_drop::sim::{ArcId, ArcKind, BodyId, GameEvent, PhysicsWorld, Session, TickInput};

    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    const GRAVITY: f32 = -60.0;
    const BALL_RADIUS: f32 = 0.5;
    /// Ball hovers over this ring radius at world angle 3π/2
    const BALL_RING_RADIUS: f32 = 7.5;
    const BALL_ANGLE: f32 = 3.0 * FRAC_PI_2;
    const BALL_START_HEIGHT: f32 = 10.0;
    const MAX_DRAG_PX: f32 = 4.0;
    const JITTER_PX: f32 = 1.5;

    /// Ball-only physics; arcs are only counted once they fall away
    #[derive(Debug)]
    pub struct ToyPhysics {
        ball_y: f32,
        ball_vy: f32,
        pub bounces: u32,
        pub fallen_arcs: u32,
    }

    impl PhysicsWorld for ToyPhysics {
        fn apply_instant_velocity(&mut self, body: BodyId, velocity: Vec3) {
            match body {
                BodyId::Ball => {
                    self.ball_vy = velocity.y;
                    self.bounces += 1;
                }
                BodyId::Arc(_) => self.fallen_arcs += 1,
                BodyId::Other(_) => {}
            }
        }
    }

    impl ToyPhysics {
        pub fn new() -> Self {
            Self {
                ball_y: BALL_START_HEIGHT,
                ball_vy: 0.0,
                bounces: 0,
                fallen_arcs: 0,
            }
        }

        /// Integrate the ball and report ring planes it crossed
        pub fn step(&mut self, session: &mut Session, dt: f32) {
            let prev_bottom = self.ball_y - BALL_RADIUS;
            self.ball_vy += GRAVITY * dt;
            self.ball_y += self.ball_vy * dt;
            let bottom = self.ball_y - BALL_RADIUS;

            let depth = session.assembler().layout().platform_depth;
            let score = session.score();
            let ball = Vec3::new(0.0, self.ball_y, BALL_RING_RADIUS);

            let hits: Vec<(ArcId, ArcKind, f32)> = session
                .window()
                .iter()
                .filter(|level| level.index >= score)
                .filter_map(|level| {
                    let top = level.vertical_position + depth;
                    if prev_bottom < top || bottom >= top {
                        return None;
                    }
                    let arc = level.arc_below(ball)?;
                    Some((level.arc_id(arc), level.kind_of(arc)?, top))
                })
                .collect();

            for (arc, kind, top) in hits {
                session.push_enter(arc, BodyId::Ball);
                if kind != ArcKind::Hole {
                    self.ball_y = top + BALL_RADIUS;
                    self.ball_vy = 0.0;
                }
            }
        }
    }

    /// Signed turn in (-π, π]
    fn shortest_turn(angle: f32) -> f32 {
        normalize_angle(angle + PI) - PI
    }

    /// Drag that brings the closest hole of the current level under the ball
    pub fn autopilot_drag(session: &Session, rng: &mut Pcg32) -> f32 {
        let Some(level) = session.level(session.score()) else {
            return 0.0;
        };
        let rotation = session.rotation();
        let best = level
            .arcs
            .iter()
            .filter(|slot| slot.arc.kind == ArcKind::Hole)
            .map(|slot| shortest_turn(BALL_ANGLE - slot.arc.mid_angle() - rotation))
            .min_by(|a, b| a.abs().total_cmp(&b.abs()));
        let Some(turn) = best else {
            return 0.0;
        };
        let px = turn / session.tuning().rules.drag_sensitivity;
        px.clamp(-MAX_DRAG_PX, MAX_DRAG_PX) + rng.random_range(-JITTER_PX..=JITTER_PX)
    }

    /// Summary of one demo run
    #[derive(Debug)]
    pub struct Outcome {
        pub score: u32,
        pub ticks: u64,
        pub bounces: u32,
        pub fallen_arcs: u32,
        pub lost: bool,
    }

    pub fn run(seed: u64, levels: u32, session: &mut Session) -> Outcome {
        let mut physics = ToyPhysics::new();
        let mut pilot = Pcg32::seed_from_u64(seed.wrapping_add(1));
        // a minute of play per level is plenty
        let max_ticks = u64::from(levels.max(1)) * 120 * 60;

        while session.score() < levels && !session.is_over() && session.tick_count() < max_ticks {
            let input = TickInput {
                drag_delta_px: autopilot_drag(session, &mut pilot),
            };
            physics.step(session, SIM_DT);
            for event in session.tick(&input, &mut physics) {
                match event {
                    GameEvent::LevelCleared { level, score } => {
                        log::info!("Cleared level {} (score {})", level, score);
                    }
                    GameEvent::Forgiven { arc } => {
                        log::info!("Streak saved the ball on level {}", arc.level);
                    }
                    GameEvent::StuckWarning { message, .. } => log::warn!("{}", message),
                    GameEvent::RunEnded { score, message } => {
                        log::info!("{} Final score: {}", message, score);
                    }
                    GameEvent::Bounce { .. } => {}
                }
            }
        }

        Outcome {
            score: session.score(),
            ticks: session.tick_count(),
            bounces: physics.bounces,
            fallen_arcs: physics.fallen_arcs,
            lost: session.is_over(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;
    use helix_drop::Tuning;
    use helix_drop::sim::Session;

    env_logger::init();

    let args::Args {
        seed,
        levels,
        tuning,
    } = args::Args::parse();
    let tuning = match tuning {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };

    log::info!("Helix Drop (headless) seed {} target {} levels", seed, levels);
    let mut session = Session::new(seed, tuning)?;
    let outcome = demo::run(seed, levels, &mut session);

    println!(
        "seed {}: score {} in {} ticks ({:.1}s), {} bounces, {} arcs fell away{}",
        seed,
        outcome.score,
        outcome.ticks,
        outcome.ticks as f32 * demo::SIM_DT,
        outcome.bounces,
        outcome.fallen_arcs,
        if outcome.lost { ", lost" } else { "" }
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // no headless demo on the web
}

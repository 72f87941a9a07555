//! Level state machine
//!
//! Turns ball/arc overlaps into counter changes. Arcs carry no state of their
//! own: a level is live while `level >= score` and resolved once the score has
//! moved past it, so events from resolved levels are simply dropped.
//!
//! | Arc      | Condition              | Effect                                          |
//! |----------|------------------------|-------------------------------------------------|
//! | Platform | always                 | bounce, jump +1 (not on level 0), advance if charged, streak 0 |
//! | Loss     | streak charged         | same as platform, always counts the jump        |
//! | Loss     | otherwise              | run ends, counters untouched                    |
//! | Hole     | streak 0 or no jumps   | streak +1                                       |
//! | Hole     | always                 | advance, jumps 0                                |

use super::state::{
    ArcId, BodyId, GameCounters, GameEvent, LOSS_MESSAGE, OverlapEvent, OverlapPhase,
    stuck_message,
};
use super::ArcKind;
use crate::tuning::RulesTuning;

/// Outcome of one overlap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Ball should be given the bounce velocity
    pub bounce: bool,
    /// The run is over
    pub ended: bool,
    pub events: Vec<GameEvent>,
}

impl Transition {
    /// Nothing happened (ignored or stale event)
    pub fn is_noop(&self) -> bool {
        !self.bounce && !self.ended && self.events.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LevelStateMachine {
    tuning: RulesTuning,
}

impl LevelStateMachine {
    pub fn new(tuning: RulesTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &RulesTuning {
        &self.tuning
    }

    /// Apply one overlap event to the counters
    pub fn apply(&self, counters: &mut GameCounters, event: &OverlapEvent) -> Transition {
        let mut transition = Transition::default();

        if event.other != BodyId::Ball || event.phase == OverlapPhase::Exit {
            return transition;
        }
        let level = event.arc.level;
        if !counters.is_live(level) {
            log::trace!("Stale overlap on level {} (score {})", level, counters.score);
            return transition;
        }

        match event.kind {
            ArcKind::Platform => {
                self.bounce(counters, event.arc, level != 0, &mut transition);
            }
            ArcKind::Loss if counters.is_charged(self.tuning.forgiveness_streak) => {
                log::debug!("Loss arc on level {} forgiven (streak {})", level, counters.streak);
                transition.events.push(GameEvent::Forgiven { arc: event.arc });
                self.bounce(counters, event.arc, true, &mut transition);
            }
            ArcKind::Loss => {
                log::info!("Run ended on level {} with score {}", level, counters.score);
                transition.ended = true;
                transition.events.push(GameEvent::RunEnded {
                    score: counters.score,
                    message: LOSS_MESSAGE.to_string(),
                });
            }
            ArcKind::Hole => {
                if counters.streak == 0 || counters.num_jumps == 0 {
                    counters.streak += 1;
                }
                counters.advance();
                counters.num_jumps = 0;
                transition.events.push(GameEvent::LevelCleared {
                    level,
                    score: counters.score,
                });
            }
        }
        transition
    }

    fn bounce(
        &self,
        counters: &mut GameCounters,
        arc: ArcId,
        counts_jump: bool,
        transition: &mut Transition,
    ) {
        transition.bounce = true;
        transition.events.push(GameEvent::Bounce { arc });

        if counts_jump {
            counters.num_jumps += 1;
            if counters.num_jumps == self.tuning.stuck_jumps {
                log::warn!("Ball bounced {} times without finding a hole", counters.num_jumps);
                transition.events.push(GameEvent::StuckWarning {
                    jumps: counters.num_jumps,
                    message: stuck_message(counters.num_jumps),
                });
            }
        }

        if counters.is_charged(self.tuning.forgiveness_streak) {
            counters.advance();
            transition.events.push(GameEvent::LevelCleared {
                level: arc.level,
                score: counters.score,
            });
        }
        counters.streak = 0;
    }
}

impl Default for LevelStateMachine {
    fn default() -> Self {
        Self::new(RulesTuning::default())
    }
}

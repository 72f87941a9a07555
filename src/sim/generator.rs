//! Procedural level layouts
//!
//! Every level past the first is a shuffled bag of randomly sized arcs, spread
//! around the ring and closed with a platform filler:
//! 1. Scale sector sizes by difficulty
//! 2. Sample counts and sizes per kind
//! 3. Shuffle, then repair same-kind neighbours (best effort)
//! 4. Place left to right, fill the remainder with a platform
//! 5. Fold slivers into their neighbour, split arcs wider than π
//!
//! The repair is one pass, not a solver. It is stricter than swapping in the
//! first later piece of another kind: for each clash it first looks for a
//! swap partner (later positions, then earlier ones) that leaves no new clash
//! around either position, and only then takes the first later piece of
//! another kind. The plain forward rule leaves about one bag in five with a
//! clash; this one about one in a hundred. Bags where one kind holds more
//! than half of the pieces still cannot be fixed, and no layout is promised
//! clash-free. Callers get the layout either way.

use rand::Rng;
use rand::seq::SliceRandom;
use std::f32::consts::PI;

use super::arc::{Arc, ArcKind};
use crate::consts::{FULL_TURN, MIN_ARC_WIDTH};
use crate::error::ConfigError;
use crate::tuning::{GeneratorTuning, SectorConfig};

/// An arc before placement: only kind and requested size are known
#[derive(Debug, Clone, Copy, PartialEq)]
struct Piece {
    kind: ArcKind,
    size: f32,
}

/// Builds the arc layout of each level
#[derive(Debug, Clone)]
pub struct SegmentGenerator {
    tuning: GeneratorTuning,
}

impl SegmentGenerator {
    /// Create a generator, rejecting invalid sector configs up front
    pub fn new(tuning: GeneratorTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self { tuning })
    }

    pub fn tuning(&self) -> &GeneratorTuning {
        &self.tuning
    }

    /// Generate the ordered arcs of a level, tiling exactly one full turn
    pub fn generate<R: Rng + ?Sized>(&self, level_index: u32, rng: &mut R) -> Vec<Arc> {
        if level_index == 0 {
            return starting_layout();
        }

        let mut pieces = self.sample_pieces(level_index, rng);
        pieces.shuffle(rng);

        let clashes = repair_adjacency(&mut pieces);
        let wrap_ok = repair_wraparound(&mut pieces);
        if clashes > 0 || !wrap_ok {
            log::debug!(
                "Level {}: adjacency left with {} clash(es), wraparound {}",
                level_index,
                clashes,
                if wrap_ok { "ok" } else { "unrepaired" }
            );
        }

        let arcs = split_wide(absorb_slivers(place(&pieces)));
        log::debug!("Level {}: {} arcs from {} pieces", level_index, arcs.len(), pieces.len());
        arcs
    }

    /// Sector config for `kind` after difficulty scaling at `level_index`
    pub fn scaled_sector(&self, kind: ArcKind, level_index: u32) -> SectorConfig {
        let base = self.tuning.sector(kind);
        if !self.tuning.difficulty.enabled {
            return *base;
        }
        let level = difficulty_level(level_index, self.tuning.difficulty.interval);
        scale_sector(base, kind, difficulty_progress(level))
    }

    fn sample_pieces<R: Rng + ?Sized>(&self, level_index: u32, rng: &mut R) -> Vec<Piece> {
        let mut pieces = Vec::new();
        for kind in ArcKind::ALL {
            let sector = self.scaled_sector(kind, level_index);
            let count = rng.random_range(sector.min_count..=sector.max_count);
            for _ in 0..count {
                let size = rng.random_range(sector.min_size..=sector.max_size);
                pieces.push(Piece { kind, size });
            }
        }
        pieces
    }
}

/// The first ring: three platforms and one hole, identical on every run
pub fn starting_layout() -> Vec<Arc> {
    let hole_start = FULL_TURN - PI / 4.0;
    let step = hole_start / 3.0;
    vec![
        Arc::new(0.0, step, ArcKind::Platform),
        Arc::new(step, 2.0 * step, ArcKind::Platform),
        Arc::new(2.0 * step, hole_start, ArcKind::Platform),
        Arc::new(hole_start, FULL_TURN, ArcKind::Hole),
    ]
}

/// Difficulty step for a level index
pub fn difficulty_level(level_index: u32, interval: u32) -> u32 {
    level_index / interval.max(1)
}

/// Fraction of the way from base sizes to the hard target, `1 - 0.5^level`
pub fn difficulty_progress(level: u32) -> f32 {
    // 0.5^64 is already far below f32 epsilon
    1.0 - 0.5f32.powi(level.min(64) as i32)
}

/// Move sizes toward the hard target: platforms and holes shrink to their
/// minimum, loss arcs grow to their maximum. The bound at the target stays
/// fixed and the moving bound never crosses it, so the range is never empty.
pub fn scale_sector(base: &SectorConfig, kind: ArcKind, progress: f32) -> SectorConfig {
    let toward = |value: f32, target: f32| value + (target - value) * progress;
    match kind {
        ArcKind::Platform | ArcKind::Hole => SectorConfig {
            max_size: toward(base.max_size, base.min_size).max(base.min_size),
            ..*base
        },
        ArcKind::Loss => SectorConfig {
            min_size: toward(base.min_size, base.max_size).min(base.max_size),
            ..*base
        },
    }
}

/// Kind of the piece at `p` once `i` and `j` have been swapped
fn kind_after_swap(pieces: &[Piece], i: usize, j: usize, p: usize) -> ArcKind {
    if p == i {
        pieces[j].kind
    } else if p == j {
        pieces[i].kind
    } else {
        pieces[p].kind
    }
}

/// Whether the pair starting at `p` would share a kind after swapping `i`/`j`
fn pair_clashes(pieces: &[Piece], i: usize, j: usize, p: usize, cyclic: bool) -> bool {
    let n = pieces.len();
    if p >= n {
        return false;
    }
    let q = if p + 1 < n {
        p + 1
    } else if cyclic && n > 1 {
        0
    } else {
        return false;
    };
    kind_after_swap(pieces, i, j, p) == kind_after_swap(pieces, i, j, q)
}

/// Swapping `i` and `j` leaves no clash around either position
fn swap_is_clean(pieces: &[Piece], i: usize, j: usize, cyclic: bool) -> bool {
    let n = pieces.len();
    let before = |p: usize| {
        if p > 0 {
            Some(p - 1)
        } else if cyclic {
            Some(n - 1)
        } else {
            None
        }
    };
    [before(i), Some(i), before(j), Some(j)]
        .into_iter()
        .flatten()
        .all(|p| !pair_clashes(pieces, i, j, p, cyclic))
}

/// One left-to-right pass swapping a different kind into every clash.
/// Returns the number of same-kind neighbours left over.
fn repair_adjacency(pieces: &mut [Piece]) -> usize {
    let n = pieces.len();
    for i in 1..n {
        let prev = pieces[i - 1].kind;
        if pieces[i].kind != prev {
            continue;
        }

        let clean = (i + 1..n)
            .chain(0..i - 1)
            .find(|&j| pieces[j].kind != prev && swap_is_clean(pieces, i, j, false));
        let fallback = || (i + 1..n).find(|&j| pieces[j].kind != prev);

        if let Some(j) = clean.or_else(fallback) {
            pieces.swap(i, j);
        }
    }
    linear_clashes(pieces)
}

/// Same rule for the first/last pair. Returns false if a clash remains.
fn repair_wraparound(pieces: &mut [Piece]) -> bool {
    let n = pieces.len();
    if n < 3 || pieces[0].kind != pieces[n - 1].kind {
        return true;
    }
    let first = pieces[0].kind;
    match (1..n - 1).find(|&j| pieces[j].kind != first && swap_is_clean(pieces, 0, j, true)) {
        Some(j) => {
            pieces.swap(0, j);
            true
        }
        None => false,
    }
}

fn linear_clashes(pieces: &[Piece]) -> usize {
    pieces.windows(2).filter(|w| w[0].kind == w[1].kind).count()
}

/// Lay pieces end to end from angle 0, then close the ring with a platform
fn place(pieces: &[Piece]) -> Vec<Arc> {
    let mut arcs = Vec::with_capacity(pieces.len() + 1);
    let mut running = 0.0f32;

    for piece in pieces {
        if running >= FULL_TURN {
            break;
        }
        let end = (running + piece.size).min(FULL_TURN);
        arcs.push(Arc::new(running, end, piece.kind));
        running = end;
    }

    if running < FULL_TURN {
        arcs.push(Arc::new(running, FULL_TURN, ArcKind::Platform));
    }
    arcs
}

/// Fold arcs thinner than the minimum width into the previous arc (or the
/// next one at the start of the ring) so coverage stays exact
fn absorb_slivers(arcs: Vec<Arc>) -> Vec<Arc> {
    let mut out: Vec<Arc> = Vec::with_capacity(arcs.len());
    let mut leading: Option<f32> = None;

    for mut arc in arcs {
        if arc.width() < MIN_ARC_WIDTH {
            match out.last_mut() {
                Some(prev) => prev.end = arc.end,
                None => leading = Some(leading.unwrap_or(arc.start)),
            }
            continue;
        }
        if let Some(start) = leading.take() {
            arc.start = start;
        }
        out.push(arc);
    }

    if out.is_empty() {
        out.push(Arc::new(0.0, FULL_TURN, ArcKind::Platform));
    }
    out
}

/// Split every arc wider than π into two equal halves of the same kind
fn split_wide(arcs: Vec<Arc>) -> Vec<Arc> {
    let mut out = Vec::with_capacity(arcs.len() + 2);
    for arc in arcs {
        if arc.width() > PI {
            let mid = arc.start + arc.width() / 2.0;
            out.push(Arc::new(arc.start, mid, arc.kind));
            out.push(Arc::new(mid, arc.end, arc.kind));
        } else {
            out.push(arc);
        }
    }
    out
}

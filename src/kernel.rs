//! The per-body tick algorithm, written once and shared by every backend.
//!
//! A tick runs in three phases over a read-only snapshot:
//!
//! 1. [`propose`]: every body lists, on its own, the bodies that could absorb
//!    it. Slots are independent, so this phase is data-parallel.
//! 2. [`resolve`]: a serial pass picks one surviving winner per claimed body
//!    and applies the merges. This is the only phase that writes across slots.
//! 3. [`integrate`]: every surviving body accumulates gravity from the merged
//!    state and takes one semi-implicit Euler step. Data-parallel again.
//!
//! Each slot function reads only its inputs and returns only its own slot, so
//! the result does not depend on how slots are distributed over workers.

use std::ops::Range;

use ultraviolet::DVec2;

use crate::body::Body;

/// One accepted merge: `loser` was absorbed into `winner` (snapshot indices).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Merge {
    pub winner: usize,
    pub loser: usize,
}

/// Whether `bodies[w]` claims `bodies[l]` at distance `dist`.
/// When both could absorb each other the lower index wins.
#[inline(always)]
fn claims(bodies: &[Body], w: usize, l: usize, dist: f64) -> bool {
    let (winner, loser) = (&bodies[w], &bodies[l]);
    winner.can_absorb(loser, dist) && !(l < w && loser.can_absorb(winner, dist))
}

/// Phase 1: every body that could absorb `bodies[i]` this tick, best first.
///
/// Claimers are ranked by mass, heaviest first, ties going to the lower index.
pub fn propose(bodies: &[Body], i: usize) -> Vec<usize> {
    let body = &bodies[i];
    if body.is_dead || body.is_static {
        return Vec::new();
    }

    let mut claimers: Vec<usize> = bodies
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != i && !other.is_dead)
        .filter(|&(j, other)| claims(bodies, j, i, (other.pos - body.pos).mag()))
        .map(|(j, _)| j)
        .collect();
    // Stable, so equal masses stay in index order
    claimers.sort_by(|&a, &b| bodies[b].mass.total_cmp(&bodies[a].mass));
    claimers
}

pub fn propose_range(bodies: &[Body], range: Range<usize>, out: &mut [Vec<usize>]) {
    for (slot, i) in out.iter_mut().zip(range) {
        *slot = propose(bodies, i);
    }
}

/// Phase 2: picks a winner for every claimed body and applies the merges to
/// `bodies` in place.
///
/// A body goes to its best claimer that survives the tick; if every claimer
/// is itself absorbed, the body survives. A dynamic claimer is never lighter
/// than the body it claims, and equal masses only claim upward in index, so
/// settling bodies heaviest first (ties by index) decides every claimer
/// before the bodies it claims. Static bodies have no claimers. Merges are
/// applied in ascending loser order. Returns the accepted merges.
pub fn resolve(bodies: &mut [Body], claimers: &[Vec<usize>]) -> Vec<Merge> {
    debug_assert_eq!(bodies.len(), claimers.len());

    let mut order: Vec<usize> = (0..claimers.len()).collect();
    order.sort_by(|&a, &b| bodies[b].mass.total_cmp(&bodies[a].mass));

    let mut absorbed_by: Vec<Option<usize>> = vec![None; claimers.len()];
    for &i in &order {
        absorbed_by[i] = claimers[i].iter().copied().find(|&w| absorbed_by[w].is_none());
        if let (Some(winner), Some(&best)) = (absorbed_by[i], claimers[i].first()) {
            if winner != best {
                log::trace!("{i} falls back to {winner}, {best} is absorbed this tick");
            }
        }
    }

    let mut merges = Vec::new();
    for (loser, winner) in absorbed_by.iter().enumerate() {
        let Some(winner) = *winner else { continue };
        let absorbed = bodies[loser];
        bodies[winner].absorb(&absorbed);
        bodies[loser].is_dead = true;
        merges.push(Merge { winner, loser });
    }
    merges
}

/// Phase 3: gravity from every other live body, then one Euler step.
///
/// Coincident bodies that did not merge exert no force on each other.
pub fn integrate(bodies: &[Body], i: usize, dt: f64, g: f64) -> Body {
    let mut body = bodies[i];
    if body.is_dead {
        return body;
    }

    let mut dv = DVec2::zero();
    for (j, other) in bodies.iter().enumerate() {
        if j == i || other.is_dead {
            continue;
        }
        let d = other.pos - body.pos;
        let dist_sq = d.mag_sq();
        if dist_sq == 0.0 {
            continue;
        }
        let dist = dist_sq.sqrt();
        let accel = other.mass * g / dist_sq;
        dv += d * (accel / dist * dt);
    }

    body.update(dv, dt);
    body
}

pub fn integrate_range(bodies: &[Body], range: Range<usize>, dt: f64, g: f64, out: &mut [Body]) {
    for (slot, i) in out.iter_mut().zip(range) {
        *slot = integrate(bodies, i, dt, g);
    }
}

//! Collision partitioning for one tick's worth of movements.
//!
//! Two bullets collide by *swapping* (each moving into the other's current
//! cell, i.e. passing head-on) or by *converging* on the same destination
//! cell (a *final* collision). Both members of a colliding pair are
//! destroyed; there is no winner. Swap pairs are claimed first and removed
//! from the pool before final pairing starts, so the two categories are
//! mutually exclusive per bullet.
//!
//! Movements are processed in bullet insertion order, never from an
//! unordered set, so pairing for three or more bullets converging on one
//! cell is reproducible: the first two movements in order pair off, then the
//! next two, and an odd one out survives.

use serde::Serialize;

use crate::bullet::{Bullet, BulletMovement};

// ---------------------------------------------------------------------------
// Collision
// ---------------------------------------------------------------------------

/// A mutually destructive pair of movements. The `a`/`b` distinction is
/// incidental (whichever came first in bullet order); both bullets vanish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub a: BulletMovement,
    pub b: BulletMovement,
}

// ---------------------------------------------------------------------------
// CollisionReport
// ---------------------------------------------------------------------------

/// The partition of one tick's movements into swap collisions, final
/// collisions, and uncollided survivors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CollisionReport {
    /// Pairs that tried to exchange cells (head-on pass-through).
    pub swaps: Vec<Collision>,
    /// Pairs that converged on the same destination cell.
    pub finals: Vec<Collision>,
    /// Movements untouched by either category; these bullets advance.
    pub remaining: Vec<BulletMovement>,
}

impl CollisionReport {
    /// True when no collision of either kind occurred.
    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty() && self.finals.is_empty()
    }

    /// Total number of collisions (each destroying two bullets).
    pub fn collision_count(&self) -> usize {
        self.swaps.len() + self.finals.len()
    }

    /// Every bullet destroyed this tick, swap pairs first, in pairing order.
    pub fn collided_bullets(&self) -> Vec<&Bullet> {
        self.swaps
            .iter()
            .chain(self.finals.iter())
            .flat_map(|c| [&c.a.bullet, &c.b.bullet])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// partition
// ---------------------------------------------------------------------------

/// Partition this tick's movements into swap collisions, final collisions,
/// and survivors.
///
/// Both passes use the same take-one/search-rest elimination: repeatedly take
/// the first unprocessed movement and scan the rest for its first partner;
/// pair and remove both, or keep the movement as a candidate for the next
/// stage. The scans are quadratic in the number of bullets, which is fine on
/// a small bounded board.
///
/// Input order is the determinism contract: callers supply movements in
/// bullet order, and pairing (including which pair gets reported for a
/// 3+-way convergence) follows that order exactly.
pub fn partition(movements: Vec<BulletMovement>) -> CollisionReport {
    // Swap pass: claim head-on pairs.
    let mut pool = movements;
    let mut swaps = Vec::new();
    let mut unswapped = Vec::new();
    while !pool.is_empty() {
        let search = pool.remove(0);
        let partner = pool.iter().position(|candidate| {
            candidate.movement.from == search.movement.to
                && candidate.movement.to == search.movement.from
        });
        match partner {
            Some(i) => {
                let found = pool.remove(i);
                swaps.push(Collision { a: search, b: found });
            }
            None => unswapped.push(search),
        }
    }

    // Final pass over the leftovers: claim shared-destination pairs.
    let mut pool = unswapped;
    let mut finals = Vec::new();
    let mut remaining = Vec::new();
    while !pool.is_empty() {
        let search = pool.remove(0);
        let partner = pool
            .iter()
            .position(|candidate| candidate.movement.to == search.movement.to);
        match partner {
            Some(i) => {
                let found = pool.remove(i);
                finals.push(Collision { a: search, b: found });
            }
            None => remaining.push(search),
        }
    }

    CollisionReport {
        swaps,
        finals,
        remaining,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

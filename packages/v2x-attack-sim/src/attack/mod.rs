//! attack — Beacon falsification engine
//!
//! `types` holds the closed taxonomy, the family modules hold the strategy
//! implementations and `dispatcher` turns an identifier plus run-time context
//! into a constructed strategy, owning the self-mutation vs. ghost branch.

pub mod acceleration;
pub mod channel;
pub mod dimension;
pub mod dispatcher;
pub mod eebl;
pub mod heading;
pub mod ima;
pub mod latch;
pub mod mobility;
pub mod position;
pub mod speed;
pub mod types;

use rand::Rng;
use serde::{Deserialize, Serialize};
use v2x_types::{BasicSafetyMessage, Coord};

pub use dispatcher::{AttackDispatcher, SelfOutcome};
pub use latch::{AttackLatches, LatchScope, OneShotLatch};
pub use types::{AttackFamily, AttackSelection, AttackType};

// ── Strategy interface ────────────────────────────────────────────────────────

/// A falsification strategy.
///
/// Strategies are constructed fresh for every beacon (or every fabricated
/// ghost) and draw any randomness they need at construction. `update`
/// refreshes cross-cycle state and is a no-op for stateless strategies;
/// `attack` mutates the record and stamps the ground-truth label.
pub trait Attack {
    fn kind(&self) -> AttackType;

    fn update(&mut self, _ctx: &AttackContext) {}

    fn attack(&mut self, bsm: &mut BasicSafetyMessage);

    /// Stamp the ground-truth label; every `attack` implementation calls this.
    fn stamp(&self, bsm: &mut BasicSafetyMessage) {
        bsm.attack_type = self.kind().label().to_string();
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Rectangular playground, origin at (0, 0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    pub width_m: f64,
    pub height_m: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self { width_m: 1000.0, height_m: 1000.0 }
    }
}

impl WorldBounds {
    pub fn center(&self) -> Coord {
        Coord::planar(self.width_m / 2.0, self.height_m / 2.0)
    }

    pub fn contains(&self, p: &Coord) -> bool {
        (0.0..=self.width_m).contains(&p.x) && (0.0..=self.height_m).contains(&p.y)
    }
}

/// Offset magnitudes used by the offset-family strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackOffsets {
    pub position_m: f64,
    pub dimension_m: f64,
    pub heading_rad: f64,
    pub yaw_rate_rad_s: f64,
    pub acceleration_mps2: f64,
    pub speed_mps: f64,
}

impl Default for AttackOffsets {
    fn default() -> Self {
        Self {
            position_m: 25.0,
            dimension_m: 2.0,
            heading_rad: std::f64::consts::FRAC_PI_2,
            yaw_rate_rad_s: 0.5,
            acceleration_mps2: 3.0,
            speed_mps: 10.0,
        }
    }
}

/// Draw from `[-|limit|, |limit|]`, zero for a zero limit. `None` when the
/// limit is not finite, so the caller can skip the strategy.
pub(crate) fn symmetric_draw(limit: f64, rng: &mut impl Rng) -> Option<f64> {
    let d = limit.abs();
    if !d.is_finite() {
        return None;
    }
    Some(if d > 0.0 { rng.gen_range(-d..=d) } else { 0.0 })
}

/// Per-cycle state borrowed by the active strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackContext {
    /// Current simulation time, seconds
    pub now: f64,
    /// Heading of the last transmitted beacon
    pub prev_heading: f64,
    /// Generation time of the last transmitted beacon, `None` before the first
    pub prev_beacon_time: Option<f64>,
    pub bounds: WorldBounds,
    /// Ghost clearance used by comm-range braking (the radio range)
    pub ghost_distance: f64,
    pub approaching_intersection: bool,
    pub junction_pos: Coord,
    /// Attacker's own velocity vector
    pub own_speed: Coord,
    pub offsets: AttackOffsets,
}

impl AttackContext {
    /// Seconds since the previous beacon, zero before the first one.
    pub fn elapsed(&self) -> f64 {
        self.prev_beacon_time
            .map(|t| (self.now - t).max(0.0))
            .unwrap_or(0.0)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_zero_before_first_beacon() {
        let mut ctx = test_support::ctx();
        ctx.prev_beacon_time = None;
        assert_eq!(ctx.elapsed(), 0.0);
        ctx.prev_beacon_time = Some(9.5);
        assert!((ctx.elapsed() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn world_center_is_inside() {
        let b = WorldBounds { width_m: 100.0, height_m: 50.0 };
        assert!(b.contains(&b.center()));
        assert!(!b.contains(&Coord::planar(-1.0, 10.0)));
    }
}

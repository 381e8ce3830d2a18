//! position.rs — Position falsification
//!
//! Self-telemetry strategies rewrite the attacker's own reported position.
//! Ghost strategies place a fabricated vehicle relative to a victim's record.

use rand::Rng;
use v2x_types::{BasicSafetyMessage, Coord, GHOST_DATA};

use super::{symmetric_draw, Attack, AttackContext, AttackType};
use crate::geometry::{offset_along_heading, stopping_distance};

/// Ghost placed this far inside the victim's stopping distance (meters)
pub const SUDDEN_APPEARANCE_MARGIN_M: f64 = 0.1;

// ── Self telemetry ────────────────────────────────────────────────────────────

/// Report a position drawn uniformly inside the world bounds.
#[derive(Debug, Clone)]
pub struct RandomPosition {
    position: Coord,
}

impl RandomPosition {
    pub fn new(ctx: &AttackContext, rng: &mut impl Rng) -> Self {
        let position = Coord::planar(
            rng.gen_range(0.0..=ctx.bounds.width_m),
            rng.gen_range(0.0..=ctx.bounds.height_m),
        );
        Self { position }
    }
}

impl Attack for RandomPosition {
    fn kind(&self) -> AttackType { AttackType::RandomPosition }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        bsm.position = self.position;
    }
}

/// Add an offset vector to the true position. The direction does not depend
/// on the vehicle's motion.
#[derive(Debug, Clone)]
pub struct PositionOffset {
    kind: AttackType,
    offset: Coord,
}

impl PositionOffset {
    /// Fixed `(d, d)` offset every beacon. `None` if `d` is not finite.
    pub fn constant(ctx: &AttackContext) -> Option<Self> {
        let d = ctx.offsets.position_m;
        d.is_finite()
            .then(|| Self { kind: AttackType::ConstantPositionOffset, offset: Coord::planar(d, d) })
    }

    /// Offset resampled per axis from `[-d, d]`. `None` if `d` is not finite.
    pub fn random(ctx: &AttackContext, rng: &mut impl Rng) -> Option<Self> {
        let d = ctx.offsets.position_m;
        let offset = Coord::planar(symmetric_draw(d, rng)?, symmetric_draw(d, rng)?);
        Some(Self { kind: AttackType::RandomPositionOffset, offset })
    }
}

impl Attack for PositionOffset {
    fn kind(&self) -> AttackType { self.kind }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        bsm.position = bsm.position.add(&self.offset);
    }
}

/// Pin the reported position to the centre of the playground.
#[derive(Debug, Clone)]
pub struct PlaygroundConstantPosition {
    position: Coord,
}

impl PlaygroundConstantPosition {
    pub fn new(ctx: &AttackContext) -> Self {
        Self { position: ctx.bounds.center() }
    }
}

impl Attack for PlaygroundConstantPosition {
    fn kind(&self) -> AttackType { AttackType::PlaygroundConstantPosition }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        bsm.position = self.position;
    }
}

/// Stop transmitting. The dispatcher suppresses the send; the record itself
/// only carries the label.
#[derive(Debug, Clone, Default)]
pub struct SuddenDisappearance;

impl Attack for SuddenDisappearance {
    fn kind(&self) -> AttackType { AttackType::SuddenDisappearance }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
    }
}

// ── Ghost vehicles ────────────────────────────────────────────────────────────

/// A stationary ghost appears just inside the victim's stopping distance.
#[derive(Debug, Clone)]
pub struct SuddenAppearance {
    position: Coord,
}

impl SuddenAppearance {
    pub fn new(victim: &BasicSafetyMessage) -> Self {
        let offset = (stopping_distance(&victim.speed) - SUDDEN_APPEARANCE_MARGIN_M).max(0.0);
        Self { position: offset_along_heading(&victim.position, victim.heading(), offset) }
    }
}

impl Attack for SuddenAppearance {
    fn kind(&self) -> AttackType { AttackType::SuddenAppearance }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        bsm.data = GHOST_DATA.to_string();
        bsm.position = self.position;
        bsm.speed = Coord::ZERO;
    }
}

/// Ghost pinned at an anchor computed once from the first victim seen.
#[derive(Debug, Clone)]
pub struct TargetedConstantPosition {
    position: Coord,
}

impl TargetedConstantPosition {
    /// Anchor for a fresh attacker: victim position plus `(d, d)`
    pub fn anchor_for(victim: &BasicSafetyMessage, ctx: &AttackContext) -> Coord {
        let d = ctx.offsets.position_m;
        victim.position.add(&Coord::planar(d, d))
    }

    pub fn new(anchor: Coord) -> Self {
        Self { position: anchor }
    }
}

impl Attack for TargetedConstantPosition {
    fn kind(&self) -> AttackType { AttackType::TargetedConstantPosition }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        bsm.data = GHOST_DATA.to_string();
        bsm.position = self.position;
        bsm.speed = Coord::ZERO;
    }
}

//! speed.rs — Velocity falsification
//!
//! Magnitude transforms keep the direction of the reported velocity (or the
//! heading when the vehicle is stationary). Random speed draws both
//! components independently.

use rand::Rng;
use v2x_types::{BasicSafetyMessage, Coord};

use super::{symmetric_draw, Attack, AttackContext, AttackType};
use crate::geometry::heading_unit;

/// J2735 Speed upper bound, m/s
pub const HIGH_SPEED_MPS: f64 = 163.8;
pub const CONSTANT_SPEED_MPS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Magnitude(f64),
    Offset(f64),
    Vector(Coord),
}

#[derive(Debug, Clone)]
pub struct SpeedAttack {
    kind: AttackType,
    value: Value,
}

/// Unit vector of the current velocity, or of the heading at rest
fn direction(bsm: &BasicSafetyMessage) -> Coord {
    let v = bsm.speed.length();
    if v > 0.0 {
        bsm.speed.scale(1.0 / v)
    } else {
        heading_unit(bsm.heading())
    }
}

impl SpeedAttack {
    /// `None` for other families and for offset variants whose configured
    /// offset is not finite.
    pub fn new(kind: AttackType, ctx: &AttackContext, rng: &mut impl Rng) -> Option<Self> {
        let d = ctx.offsets.speed_mps;
        let value = match kind {
            AttackType::HighSpeed => Value::Magnitude(HIGH_SPEED_MPS),
            AttackType::LowSpeed => Value::Magnitude(0.0),
            AttackType::ConstantSpeed => Value::Magnitude(CONSTANT_SPEED_MPS),
            AttackType::RandomSpeed => Value::Vector(Coord::planar(
                rng.gen_range(-HIGH_SPEED_MPS..=HIGH_SPEED_MPS),
                rng.gen_range(-HIGH_SPEED_MPS..=HIGH_SPEED_MPS),
            )),
            AttackType::RandomSpeedOffset => Value::Offset(symmetric_draw(d, rng)?),
            AttackType::ConstantSpeedOffset if d.is_finite() => Value::Offset(d),
            _ => return None,
        };
        Some(Self { kind, value })
    }
}

impl Attack for SpeedAttack {
    fn kind(&self) -> AttackType { self.kind }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        bsm.speed = match self.value {
            Value::Magnitude(m) => direction(bsm).scale(m),
            Value::Offset(o) => direction(bsm).scale((bsm.speed.length() + o).max(0.0)),
            Value::Vector(v) => v,
        };
    }
}

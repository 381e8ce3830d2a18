//! acceleration.rs — Longitudinal acceleration falsification
//!
//! Every variant goes through `set_acceleration`, so the hard-braking flag
//! follows the falsified value.

use rand::Rng;
use v2x_types::BasicSafetyMessage;

use super::{symmetric_draw, Attack, AttackContext, AttackType};

pub const HIGH_ACCELERATION_MPS2: f64 = 20.0;
pub const LOW_ACCELERATION_MPS2: f64 = -20.0;
pub const CONSTANT_ACCELERATION_MPS2: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Absolute(f64),
    Offset(f64),
}

#[derive(Debug, Clone)]
pub struct AccelerationAttack {
    kind: AttackType,
    value: Value,
}

impl AccelerationAttack {
    pub fn new(kind: AttackType, ctx: &AttackContext, rng: &mut impl Rng) -> Option<Self> {
        let d = ctx.offsets.acceleration_mps2;
        let value = match kind {
            AttackType::HighAcceleration => Value::Absolute(HIGH_ACCELERATION_MPS2),
            AttackType::LowAcceleration => Value::Absolute(LOW_ACCELERATION_MPS2),
            AttackType::ConstantAcceleration => Value::Absolute(CONSTANT_ACCELERATION_MPS2),
            AttackType::RandomAcceleration => {
                Value::Absolute(rng.gen_range(LOW_ACCELERATION_MPS2..=HIGH_ACCELERATION_MPS2))
            }
            AttackType::RandomAccelerationOffset => Value::Offset(symmetric_draw(d, rng)?),
            AttackType::ConstantAccelerationOffset if d.is_finite() => Value::Offset(d),
            _ => return None,
        };
        Some(Self { kind, value })
    }
}

impl Attack for AccelerationAttack {
    fn kind(&self) -> AttackType { self.kind }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        let a = match self.value {
            Value::Absolute(a) => a,
            Value::Offset(o) => bsm.acceleration() + o,
        };
        bsm.set_acceleration(a);
    }
}

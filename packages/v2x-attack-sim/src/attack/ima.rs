//! ima.rs — Intersection movement assist falsification
//!
//! Every variant is a no-op unless the attacker is approaching a junction.

use v2x_types::{BasicSafetyMessage, Coord};

use super::speed::HIGH_SPEED_MPS;
use super::{Attack, AttackContext, AttackType};
use crate::geometry::{heading_unit, offset_along_heading};

/// Reported position is pushed this far ahead along the heading (meters)
pub const IMA_POSITION_OFFSET_M: f64 = 10.0;
/// Magnitude of the falsified IMA acceleration, m/s²
pub const IMA_ACCELERATION_MPS2: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ImaTransform {
    PositionOffset,
    JunctionPosition(Coord),
    HighSpeed,
    LowSpeed,
    HighAcceleration,
    LowAcceleration,
}

#[derive(Debug, Clone)]
pub struct ImaAttack {
    kind: AttackType,
    transform: ImaTransform,
    approaching_intersection: bool,
}

impl ImaAttack {
    /// `None` for identifiers outside the IMA family.
    pub fn new(kind: AttackType, ctx: &AttackContext) -> Option<Self> {
        let transform = match kind {
            AttackType::ImaPositionOffset => ImaTransform::PositionOffset,
            AttackType::ImaJunctionPosition => ImaTransform::JunctionPosition(ctx.junction_pos),
            AttackType::ImaHighSpeed => ImaTransform::HighSpeed,
            AttackType::ImaLowSpeed => ImaTransform::LowSpeed,
            AttackType::ImaHighAcceleration => ImaTransform::HighAcceleration,
            AttackType::ImaLowAcceleration => ImaTransform::LowAcceleration,
            _ => return None,
        };
        Some(Self { kind, transform, approaching_intersection: ctx.approaching_intersection })
    }
}

impl Attack for ImaAttack {
    fn kind(&self) -> AttackType { self.kind }

    fn update(&mut self, ctx: &AttackContext) {
        self.approaching_intersection = ctx.approaching_intersection;
        if let ImaTransform::JunctionPosition(_) = self.transform {
            self.transform = ImaTransform::JunctionPosition(ctx.junction_pos);
        }
    }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        if !self.approaching_intersection {
            return;
        }
        self.stamp(bsm);
        match self.transform {
            ImaTransform::PositionOffset => {
                bsm.position = offset_along_heading(&bsm.position, bsm.heading(), IMA_POSITION_OFFSET_M);
            }
            ImaTransform::JunctionPosition(junction) => bsm.position = junction,
            ImaTransform::HighSpeed => {
                bsm.speed = heading_unit(bsm.heading()).scale(HIGH_SPEED_MPS);
            }
            ImaTransform::LowSpeed => bsm.speed = Coord::ZERO,
            ImaTransform::HighAcceleration => bsm.set_acceleration(IMA_ACCELERATION_MPS2),
            ImaTransform::LowAcceleration => bsm.set_acceleration(-IMA_ACCELERATION_MPS2),
        }
    }
}

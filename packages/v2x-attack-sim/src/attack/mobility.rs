//! mobility.rs — Ghost mobility falsification

use v2x_types::{BasicSafetyMessage, Coord, GHOST_DATA};

use super::{Attack, AttackContext, AttackType};
use crate::geometry::offset_along_heading;

/// Commanded deceleration of a braking ghost, m/s²
pub const GHOST_BRAKING_MPS2: f64 = -4.6;

/// Ghost at the edge of radio range ahead of the victim, hard braking.
#[derive(Debug, Clone)]
pub struct CommRangeBraking {
    position: Coord,
    speed: Coord,
}

impl CommRangeBraking {
    pub fn new(victim: &BasicSafetyMessage, ctx: &AttackContext) -> Self {
        Self {
            position: offset_along_heading(&victim.position, victim.heading(), ctx.ghost_distance),
            speed: ctx.own_speed,
        }
    }
}

impl Attack for CommRangeBraking {
    fn kind(&self) -> AttackType { AttackType::CommRangeBraking }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        bsm.data = GHOST_DATA.to_string();
        bsm.position = self.position;
        bsm.speed = self.speed;
        bsm.set_acceleration(GHOST_BRAKING_MPS2);
        bsm.set_event_hard_braking(true);
    }
}

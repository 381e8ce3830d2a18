//! eebl.rs — Fake emergency brake light ghosts
//!
//! Both strategies put a stationary, hard-braking ghost just inside the
//! victim's stopping distance. The stop-after-attack sibling reports the
//! position frozen on first use instead of tracking the victim.

use v2x_types::{BasicSafetyMessage, Coord, GHOST_DATA};

use super::mobility::GHOST_BRAKING_MPS2;
use super::{Attack, AttackType};
use crate::geometry::{offset_along_heading, stopping_distance};

/// Ghost placed this far inside the victim's stopping distance (meters)
pub const FAKE_EEBL_MARGIN_M: f64 = 0.2;

/// Position just inside the victim's stopping envelope
pub fn ghost_position(victim: &BasicSafetyMessage) -> Coord {
    let offset = (stopping_distance(&victim.speed) - FAKE_EEBL_MARGIN_M).max(0.0);
    offset_along_heading(&victim.position, victim.heading(), offset)
}

fn brake_hard(bsm: &mut BasicSafetyMessage, position: Coord) {
    bsm.data = GHOST_DATA.to_string();
    bsm.position = position;
    bsm.speed = Coord::ZERO;
    bsm.set_acceleration(GHOST_BRAKING_MPS2);
    bsm.set_event_hard_braking(true);
}

#[derive(Debug, Clone)]
pub struct FakeEeblJustAttack {
    position: Coord,
}

impl FakeEeblJustAttack {
    pub fn new(victim: &BasicSafetyMessage) -> Self {
        Self { position: ghost_position(victim) }
    }
}

impl Attack for FakeEeblJustAttack {
    fn kind(&self) -> AttackType { AttackType::FakeEeblJustAttack }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        brake_hard(bsm, self.position);
    }
}

/// Keeps reporting the position frozen when the latch fired.
#[derive(Debug, Clone)]
pub struct FakeEeblStopPositionUpdateAfterAttack {
    frozen: Coord,
}

impl FakeEeblStopPositionUpdateAfterAttack {
    pub fn new(frozen: Coord) -> Self {
        Self { frozen }
    }
}

impl Attack for FakeEeblStopPositionUpdateAfterAttack {
    fn kind(&self) -> AttackType { AttackType::FakeEeblStopPositionUpdateAfterAttack }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        brake_hard(bsm, self.frozen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safetyapps::{eebl, HostVehicle};

    fn victim() -> BasicSafetyMessage {
        let mut v = BasicSafetyMessage::new(5);
        v.position = Coord::planar(100.0, 100.0);
        v.speed = Coord::planar(0.0, 20.0);
        v.set_heading(std::f64::consts::FRAC_PI_2);
        v
    }

    #[test]
    fn just_attack_triggers_victims_eebl() {
        let v = victim();
        let mut ghost = BasicSafetyMessage::new(77);
        FakeEeblJustAttack::new(&v).attack(&mut ghost);

        assert!(ghost.event_hard_braking());
        assert_eq!(ghost.acceleration(), GHOST_BRAKING_MPS2);
        assert_eq!(ghost.speed, Coord::ZERO);
        let hv = HostVehicle { id: v.sender_id, position: v.position, heading: v.heading(), speed: v.speed };
        assert!(eebl::warning(&ghost, &hv));
    }

    #[test]
    fn stationary_victim_gets_ghost_on_top() {
        let mut v = victim();
        v.speed = Coord::ZERO;
        assert_eq!(ghost_position(&v), v.position);
    }

    #[test]
    fn stop_after_attack_reports_frozen_position() {
        let frozen = Coord::planar(1.0, 2.0);
        let mut ghost = BasicSafetyMessage::new(77);
        FakeEeblStopPositionUpdateAfterAttack::new(frozen).attack(&mut ghost);
        assert_eq!(ghost.position, frozen);
        assert_eq!(ghost.attack_type, "FakeEEBLStopPositionUpdateAfterAttack");
    }
}

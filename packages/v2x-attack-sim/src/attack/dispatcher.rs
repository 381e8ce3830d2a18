//! dispatcher.rs — Attack identifier → strategy instance
//!
//! One dispatcher per malicious vehicle. It owns the ghost registry, the
//! anchors that persist across fabricated beacons, the vehicle's latch set
//! and the RNG every strategy draws from.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use v2x_types::{BasicSafetyMessage, Coord, GHOST_DATA};

use super::acceleration::AccelerationAttack;
use super::channel::DenialOfService;
use super::dimension::DimensionAttack;
use super::eebl::{self, FakeEeblJustAttack, FakeEeblStopPositionUpdateAfterAttack};
use super::heading::HeadingAttack;
use super::ima::ImaAttack;
use super::latch::AttackLatches;
use super::mobility::CommRangeBraking;
use super::position::{
    PlaygroundConstantPosition, PositionOffset, RandomPosition, SuddenAppearance,
    SuddenDisappearance, TargetedConstantPosition,
};
use super::speed::SpeedAttack;
use super::{Attack, AttackContext, AttackFamily, AttackType};
use crate::ghost_registry::GhostRegistry;

/// What happens to the attacker's own beacon this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfOutcome {
    Transmit,
    Suppress,
}

pub struct AttackDispatcher {
    vehicle_id: u32,
    n_dos_messages: u32,
    latches: AttackLatches,
    registry: GhostRegistry,
    /// Targeted-constant-position anchor, set by the first ghost built
    targeted_anchor: Option<Coord>,
    /// Stop-after-attack position, set when the freeze latch fires here
    frozen_ghost: Option<Coord>,
    rng: StdRng,
}

impl AttackDispatcher {
    pub fn new(vehicle_id: u32, latches: AttackLatches, n_dos_messages: u32, seed: u64) -> Self {
        Self {
            vehicle_id,
            n_dos_messages,
            latches,
            registry: GhostRegistry::new(),
            targeted_anchor: None,
            frozen_ghost: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn registry(&self) -> &GhostRegistry {
        &self.registry
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Strategy for the self-telemetry path. `None` for ghost attacks.
    pub fn build_self(
        &mut self,
        kind: AttackType,
        ctx: &AttackContext,
        beacon_interval_s: &mut f64,
    ) -> Option<Box<dyn Attack>> {
        let rng = &mut self.rng;
        let attack: Box<dyn Attack> = match kind.family() {
            AttackFamily::GhostPosition | AttackFamily::GhostMobility | AttackFamily::EeblGhost => {
                return None
            }
            AttackFamily::SelfPosition => match kind {
                AttackType::RandomPosition => Box::new(RandomPosition::new(ctx, rng)),
                AttackType::RandomPositionOffset => Box::new(PositionOffset::random(ctx, rng)?),
                AttackType::ConstantPositionOffset => Box::new(PositionOffset::constant(ctx)?),
                AttackType::PlaygroundConstantPosition => Box::new(PlaygroundConstantPosition::new(ctx)),
                AttackType::SuddenDisappearance => Box::new(SuddenDisappearance),
                _ => return None,
            },
            AttackFamily::Channel => Box::new(DenialOfService::new(
                &self.latches.dos,
                beacon_interval_s,
                self.n_dos_messages,
            )),
            AttackFamily::Ima => Box::new(ImaAttack::new(kind, ctx)?),
            AttackFamily::Dimension | AttackFamily::Length | AttackFamily::Width => {
                Box::new(DimensionAttack::new(kind, ctx, rng)?)
            }
            AttackFamily::Heading | AttackFamily::YawRate | AttackFamily::HeadingYawRate => {
                Box::new(HeadingAttack::new(kind, ctx, rng)?)
            }
            AttackFamily::Acceleration => Box::new(AccelerationAttack::new(kind, ctx, rng)?),
            AttackFamily::Speed => Box::new(SpeedAttack::new(kind, ctx, rng)?),
        };
        Some(attack)
    }

    /// Strategy for fabricating a ghost aimed at `victim`. `None` for
    /// self-telemetry attacks, and for the stop-after-attack ghost while no
    /// frozen position exists on this vehicle.
    pub fn build_ghost(
        &mut self,
        kind: AttackType,
        victim: &BasicSafetyMessage,
        ctx: &AttackContext,
    ) -> Option<Box<dyn Attack>> {
        let attack: Box<dyn Attack> = match kind {
            AttackType::SuddenAppearance => Box::new(SuddenAppearance::new(victim)),
            AttackType::TargetedConstantPosition => {
                let anchor = *self
                    .targeted_anchor
                    .get_or_insert_with(|| TargetedConstantPosition::anchor_for(victim, ctx));
                Box::new(TargetedConstantPosition::new(anchor))
            }
            AttackType::CommRangeBraking => Box::new(CommRangeBraking::new(victim, ctx)),
            AttackType::FakeEeblJustAttack => Box::new(FakeEeblJustAttack::new(victim)),
            AttackType::FakeEeblStopPositionUpdateAfterAttack => {
                if self.latches.eebl_freeze.try_fire() {
                    let frozen = eebl::ghost_position(victim);
                    info!(
                        "🧊 Vehicle {} froze EEBL ghost at ({:.1}, {:.1})",
                        self.vehicle_id, frozen.x, frozen.y
                    );
                    self.frozen_ghost = Some(frozen);
                }
                Box::new(FakeEeblStopPositionUpdateAfterAttack::new(self.frozen_ghost?))
            }
            _ => return None,
        };
        Some(attack)
    }

    // ── Execution ─────────────────────────────────────────────────────────

    /// Run `kind` against the attacker's own populated beacon.
    pub fn attack_own(
        &mut self,
        kind: AttackType,
        ctx: &AttackContext,
        bsm: &mut BasicSafetyMessage,
        beacon_interval_s: &mut f64,
    ) -> SelfOutcome {
        let Some(mut attack) = self.build_self(kind, ctx, beacon_interval_s) else {
            return SelfOutcome::Transmit;
        };
        let genuine = bsm.clone();
        attack.update(ctx);
        attack.attack(bsm);

        if !bsm.is_finite() {
            warn!(
                "⚠️ {} produced non-finite fields on vehicle {}, sending genuine beacon",
                kind, self.vehicle_id
            );
            *bsm = genuine;
        }

        if kind == AttackType::SuddenDisappearance {
            debug!("Vehicle {} suppressed beacon at t={:.2}", self.vehicle_id, ctx.now);
            SelfOutcome::Suppress
        } else {
            SelfOutcome::Transmit
        }
    }

    /// Build a ghost record aimed at `victim`, starting from `template`
    /// (the attacker's own genuine beacon for this instant).
    pub fn fabricate_ghost(
        &mut self,
        kind: AttackType,
        victim: &BasicSafetyMessage,
        template: &BasicSafetyMessage,
        ctx: &AttackContext,
    ) -> Option<BasicSafetyMessage> {
        let mut attack = self.build_ghost(kind, victim, ctx)?;

        let mut ghost = template.clone();
        ghost.recipient_id = victim.sender_id;
        ghost.sender_id = self.registry.get_or_create_identity(self.vehicle_id, victim.sender_id, &mut self.rng);
        let count = self.registry.next_sequence(self.vehicle_id, victim.sender_id, &mut self.rng);
        ghost.set_msg_count(count);
        ghost.data = GHOST_DATA.to_string();

        attack.update(ctx);
        attack.attack(&mut ghost);

        if !ghost.is_finite() {
            warn!(
                "⚠️ {} produced a non-finite ghost on vehicle {}, dropped",
                kind, self.vehicle_id
            );
            return None;
        }
        Some(ghost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::latch::{AttackLatches, LatchScope};
    use crate::attack::test_support::{bsm, ctx};
    use crate::attack::AttackOffsets;

    fn dispatcher(latches: AttackLatches) -> AttackDispatcher {
        AttackDispatcher::new(3, latches, 10, 42)
    }

    fn victim() -> BasicSafetyMessage {
        let mut v = BasicSafetyMessage::new(8);
        v.position = Coord::planar(300.0, 300.0);
        v.speed = Coord::planar(15.0, 0.0);
        v.set_heading(0.0);
        v
    }

    #[test]
    fn every_self_attack_builds_and_every_ghost_attack_does_not() {
        let mut d = dispatcher(AttackLatches::new());
        let ctx = ctx();
        let mut interval = 0.1;
        for kind in AttackType::ALL {
            let built = d.build_self(kind, &ctx, &mut interval);
            assert_eq!(built.is_some(), !kind.is_ghost(), "{kind}");
            if let Some(a) = built {
                assert_eq!(a.kind(), kind);
            }
        }
    }

    #[test]
    fn every_ghost_attack_builds_for_a_fresh_vehicle() {
        let ctx = ctx();
        for kind in AttackType::ALL.into_iter().filter(|a| a.is_ghost()) {
            let mut d = dispatcher(AttackLatches::new());
            assert!(d.build_ghost(kind, &victim(), &ctx).is_some(), "{kind}");
        }
    }

    #[test]
    fn self_attack_stamps_label() {
        let mut d = dispatcher(AttackLatches::new());
        let mut msg = bsm();
        let mut interval = 0.1;
        let out = d.attack_own(AttackType::HighSpeed, &ctx(), &mut msg, &mut interval);
        assert_eq!(out, SelfOutcome::Transmit);
        assert_eq!(msg.attack_type, "HighSpeed");
    }

    #[test]
    fn sudden_disappearance_suppresses() {
        let mut d = dispatcher(AttackLatches::new());
        let mut msg = bsm();
        let mut interval = 0.1;
        let out = d.attack_own(AttackType::SuddenDisappearance, &ctx(), &mut msg, &mut interval);
        assert_eq!(out, SelfOutcome::Suppress);
    }

    #[test]
    fn ghost_attack_on_self_path_leaves_record_genuine() {
        let mut d = dispatcher(AttackLatches::new());
        let mut msg = bsm();
        let before = msg.clone();
        let mut interval = 0.1;
        let out = d.attack_own(AttackType::SuddenAppearance, &ctx(), &mut msg, &mut interval);
        assert_eq!(out, SelfOutcome::Transmit);
        assert_eq!(msg, before);
    }

    #[test]
    fn non_finite_result_reverts_to_genuine() {
        let mut d = dispatcher(AttackLatches::new());
        let mut ctx = ctx();
        ctx.offsets.position_m = f64::MAX;
        let mut msg = bsm();
        msg.position = Coord::planar(f64::MAX, f64::MAX);
        let before = msg.clone();
        let mut interval = 0.1;
        d.attack_own(AttackType::ConstantPositionOffset, &ctx, &mut msg, &mut interval);
        assert_eq!(msg, before);
    }

    #[test]
    fn non_finite_offsets_leave_record_untouched() {
        let mut ctx = ctx();
        ctx.offsets = AttackOffsets {
            position_m: f64::INFINITY,
            dimension_m: f64::NAN,
            heading_rad: f64::NAN,
            yaw_rate_rad_s: f64::INFINITY,
            acceleration_mps2: f64::NEG_INFINITY,
            speed_mps: f64::NAN,
        };
        let offset_kinds = AttackType::ALL
            .into_iter()
            .filter(|k| k.family() != AttackFamily::Ima && k.label().ends_with("Offset"));
        for kind in offset_kinds {
            let mut d = dispatcher(AttackLatches::new());
            let mut msg = bsm();
            let before = msg.clone();
            let mut interval = 0.1;
            let out = d.attack_own(kind, &ctx, &mut msg, &mut interval);
            assert_eq!(out, SelfOutcome::Transmit, "{kind}");
            assert_eq!(msg, before, "{kind}");
        }
    }

    #[test]
    fn dos_divides_interval_once_per_vehicle() {
        let mut d = dispatcher(AttackLatches::new());
        let mut msg = bsm();
        let mut interval = 0.1;
        d.attack_own(AttackType::DenialOfService, &ctx(), &mut msg, &mut interval);
        d.attack_own(AttackType::DenialOfService, &ctx(), &mut msg, &mut interval);
        assert!((interval - 0.01).abs() < 1e-12);
    }

    #[test]
    fn ghost_carries_registry_identity_and_victim_recipient() {
        let mut d = dispatcher(AttackLatches::new());
        let template = bsm();
        let v = victim();
        let g1 = d.fabricate_ghost(AttackType::SuddenAppearance, &v, &template, &ctx()).unwrap();
        let g2 = d.fabricate_ghost(AttackType::SuddenAppearance, &v, &template, &ctx()).unwrap();
        assert_eq!(g1.sender_id, g2.sender_id);
        assert_ne!(g1.sender_id, template.sender_id);
        assert_eq!(g1.recipient_id, v.sender_id);
        assert_eq!((g1.msg_count(), g2.msg_count()), (0, 1));
        assert!(g1.is_ghost());
    }

    #[test]
    fn self_attacks_fabricate_nothing() {
        let mut d = dispatcher(AttackLatches::new());
        assert!(d.fabricate_ghost(AttackType::HighSpeed, &victim(), &bsm(), &ctx()).is_none());
        assert!(d.registry().is_empty());
    }

    #[test]
    fn targeted_anchor_is_fixed_by_first_victim() {
        let mut d = dispatcher(AttackLatches::new());
        let v1 = victim();
        let mut v2 = victim();
        v2.sender_id = 9;
        v2.position = Coord::planar(10.0, 10.0);
        let g1 = d.fabricate_ghost(AttackType::TargetedConstantPosition, &v1, &bsm(), &ctx()).unwrap();
        let g2 = d.fabricate_ghost(AttackType::TargetedConstantPosition, &v2, &bsm(), &ctx()).unwrap();
        assert_eq!(g1.position, g2.position);
    }

    #[test]
    fn frozen_ghost_stays_put_while_victim_moves() {
        let mut d = dispatcher(AttackLatches::new());
        let mut v = victim();
        let g1 = d
            .fabricate_ghost(AttackType::FakeEeblStopPositionUpdateAfterAttack, &v, &bsm(), &ctx())
            .unwrap();
        v.position = v.position.add(&Coord::planar(30.0, 0.0));
        let g2 = d
            .fabricate_ghost(AttackType::FakeEeblStopPositionUpdateAfterAttack, &v, &bsm(), &ctx())
            .unwrap();
        assert_eq!(g1.position, g2.position);
        assert!(g2.event_hard_braking());
    }

    #[test]
    fn per_run_freeze_only_arms_first_vehicle() {
        let run = AttackLatches::new();
        let mut a = dispatcher(AttackLatches::for_vehicle(LatchScope::PerRun, &run));
        let mut b = AttackDispatcher::new(4, AttackLatches::for_vehicle(LatchScope::PerRun, &run), 10, 43);
        let kind = AttackType::FakeEeblStopPositionUpdateAfterAttack;
        assert!(a.fabricate_ghost(kind, &victim(), &bsm(), &ctx()).is_some());
        assert!(b.fabricate_ghost(kind, &victim(), &bsm(), &ctx()).is_none());
    }
}

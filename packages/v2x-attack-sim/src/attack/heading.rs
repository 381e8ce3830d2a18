//! heading.rs — Heading and yaw-rate falsification
//!
//! A transform (constant, offset, high, low, random, ...) is applied to a
//! field selector. In `Both` mode the transform yields a yaw rate and the
//! heading is re-derived by integrating it from the previously transmitted
//! heading, so the two fields stay kinematically consistent.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use rand::Rng;
use v2x_types::BasicSafetyMessage;

use super::{Attack, AttackContext, AttackFamily, AttackType};
use crate::geometry::advance_heading;

pub const CONSTANT_HEADING_RAD: f64 = FRAC_PI_2;
pub const CONSTANT_YAW_RATE_RAD_S: f64 = FRAC_PI_2;
pub const HIGH_YAW_RATE_RAD_S: f64 = PI;
pub const LOW_YAW_RATE_RAD_S: f64 = -PI;
/// Heading advance per beacon for the rotating attack
pub const ROTATION_STEP_RAD: f64 = PI / 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadingField {
    Heading,
    YawRate,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Transform {
    Constant,
    ConstantOffset(f64),
    High,
    Low,
    /// Value drawn at construction
    Random(f64),
    /// Offset drawn at construction
    RandomOffset(f64),
    Opposite,
    Perpendicular,
    Rotating,
}

#[derive(Debug, Clone)]
pub struct HeadingAttack {
    kind: AttackType,
    field: HeadingField,
    transform: Transform,
    prev_heading: f64,
    elapsed: f64,
}

fn draw_offset(limit: f64, rng: &mut impl Rng) -> f64 {
    let d = limit.abs();
    if d > TAU {
        // out of range: keep the magnitude so `attack` rejects it
        d
    } else if d > 0.0 {
        rng.gen_range(-d..=d)
    } else {
        0.0
    }
}

impl HeadingAttack {
    /// `None` for identifiers outside the heading/yaw-rate families.
    pub fn new(kind: AttackType, ctx: &AttackContext, rng: &mut impl Rng) -> Option<Self> {
        use AttackType::*;
        let field = match kind.family() {
            AttackFamily::Heading => HeadingField::Heading,
            AttackFamily::YawRate => HeadingField::YawRate,
            AttackFamily::HeadingYawRate => HeadingField::Both,
            _ => return None,
        };
        let offset = match field {
            HeadingField::Heading => ctx.offsets.heading_rad,
            HeadingField::YawRate | HeadingField::Both => ctx.offsets.yaw_rate_rad_s,
        };
        let transform = match kind {
            OppositeHeading => Transform::Opposite,
            PerpendicularHeading => Transform::Perpendicular,
            RotatingHeading => Transform::Rotating,
            ConstantHeading | ConstantYawRate | ConstantHeadingYawRate => Transform::Constant,
            ConstantHeadingOffset | ConstantYawRateOffset | ConstantHeadingYawRateOffset
                if offset.is_finite() =>
            {
                Transform::ConstantOffset(offset)
            }
            ConstantHeadingOffset | ConstantYawRateOffset | ConstantHeadingYawRateOffset => return None,
            HighYawRate | HighHeadingYawRate => Transform::High,
            LowYawRate | LowHeadingYawRate => Transform::Low,
            RandomHeading => Transform::Random(rng.gen_range(0.0..TAU)),
            RandomYawRate | RandomHeadingYawRate => Transform::Random(rng.gen_range(-PI..=PI)),
            _ if offset.is_finite() => Transform::RandomOffset(draw_offset(offset, rng)),
            _ => return None,
        };
        Some(Self { kind, field, transform, prev_heading: ctx.prev_heading, elapsed: ctx.elapsed() })
    }

    /// Falsified yaw rate for the yaw-rate and coupled modes
    fn yaw_rate(&self, current: f64) -> Option<f64> {
        let coupled = self.field == HeadingField::Both;
        match self.transform {
            Transform::Constant if coupled => Some(0.0),
            Transform::Constant => Some(CONSTANT_YAW_RATE_RAD_S),
            Transform::High => Some(HIGH_YAW_RATE_RAD_S),
            Transform::Low => Some(LOW_YAW_RATE_RAD_S),
            Transform::Random(w) => Some(w),
            Transform::ConstantOffset(o) | Transform::RandomOffset(o) => Some((current + o) % TAU),
            Transform::Opposite | Transform::Perpendicular | Transform::Rotating => None,
        }
    }

    fn heading(&self, current: f64) -> f64 {
        match self.transform {
            Transform::Constant => CONSTANT_HEADING_RAD,
            Transform::ConstantOffset(o) | Transform::RandomOffset(o) => current + o,
            Transform::Random(h) => h,
            Transform::Opposite => current + PI,
            Transform::Perpendicular => current + FRAC_PI_2,
            Transform::Rotating => self.prev_heading + ROTATION_STEP_RAD,
            Transform::High | Transform::Low => current,
        }
    }
}

impl Attack for HeadingAttack {
    fn kind(&self) -> AttackType { self.kind }

    fn update(&mut self, ctx: &AttackContext) {
        self.prev_heading = ctx.prev_heading;
        self.elapsed = ctx.elapsed();
    }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        if let Transform::ConstantOffset(o) | Transform::RandomOffset(o) = self.transform {
            if o.abs() > TAU {
                return;
            }
        }
        self.stamp(bsm);
        match self.field {
            HeadingField::Heading => bsm.set_heading(self.heading(bsm.heading())),
            HeadingField::YawRate => {
                if let Some(w) = self.yaw_rate(bsm.yaw_rate) {
                    bsm.yaw_rate = w;
                }
            }
            HeadingField::Both => {
                if let Some(w) = self.yaw_rate(bsm.yaw_rate) {
                    bsm.yaw_rate = w;
                    bsm.set_heading(advance_heading(self.prev_heading, w, self.elapsed));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::test_support::{bsm, ctx};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(kind: AttackType, ctx: &AttackContext) -> HeadingAttack {
        let mut rng = StdRng::seed_from_u64(5);
        let mut attack = HeadingAttack::new(kind, ctx, &mut rng).unwrap();
        attack.update(ctx);
        attack
    }

    #[test]
    fn constant_offset_above_two_pi_is_no_op() {
        let mut ctx = ctx();
        ctx.offsets.heading_rad = TAU + 0.01;
        let mut msg = bsm();
        let before = msg.clone();
        build(AttackType::ConstantHeadingOffset, &ctx).attack(&mut msg);
        assert_eq!(msg, before);
    }

    #[test]
    fn constant_offset_of_pi_adds_pi() {
        let mut ctx = ctx();
        ctx.offsets.heading_rad = PI;
        let mut msg = bsm();
        msg.set_heading(4.0);
        build(AttackType::ConstantHeadingOffset, &ctx).attack(&mut msg);
        assert!((msg.heading() - (4.0 + PI - TAU)).abs() < 1e-9);
        assert_eq!(msg.attack_type, "ConstantHeadingOffset");
    }

    #[test]
    fn yaw_rate_offset_is_taken_modulo_two_pi() {
        let mut ctx = ctx();
        ctx.offsets.yaw_rate_rad_s = 6.0;
        let mut msg = bsm();
        msg.yaw_rate = 1.0;
        let heading = msg.heading();
        build(AttackType::ConstantYawRateOffset, &ctx).attack(&mut msg);
        assert!((msg.yaw_rate - (7.0 - TAU)).abs() < 1e-9);
        assert_eq!(msg.heading(), heading);
    }

    #[test]
    fn heading_only_transforms_leave_yaw_rate() {
        for kind in [
            AttackType::OppositeHeading,
            AttackType::PerpendicularHeading,
            AttackType::RotatingHeading,
            AttackType::ConstantHeading,
            AttackType::RandomHeading,
        ] {
            let mut msg = bsm();
            build(kind, &ctx()).attack(&mut msg);
            assert_eq!(msg.yaw_rate, bsm().yaw_rate, "{kind}");
            assert!((0.0..TAU).contains(&msg.heading()));
        }
    }

    #[test]
    fn opposite_and_perpendicular() {
        let mut msg = bsm();
        msg.set_heading(0.5);
        build(AttackType::OppositeHeading, &ctx()).attack(&mut msg);
        assert!((msg.heading() - (0.5 + PI)).abs() < 1e-9);

        let mut msg = bsm();
        msg.set_heading(0.5);
        build(AttackType::PerpendicularHeading, &ctx()).attack(&mut msg);
        assert!((msg.heading() - (0.5 + FRAC_PI_2)).abs() < 1e-9);
    }

    #[test]
    fn rotating_advances_from_previous_beacon() {
        let ctx = ctx();
        let mut msg = bsm();
        build(AttackType::RotatingHeading, &ctx).attack(&mut msg);
        assert!((msg.heading() - (ctx.prev_heading + ROTATION_STEP_RAD)).abs() < 1e-9);
    }

    #[test]
    fn yaw_rate_modes_leave_heading() {
        for (kind, expected) in [
            (AttackType::HighYawRate, HIGH_YAW_RATE_RAD_S),
            (AttackType::LowYawRate, LOW_YAW_RATE_RAD_S),
            (AttackType::ConstantYawRate, CONSTANT_YAW_RATE_RAD_S),
        ] {
            let mut msg = bsm();
            build(kind, &ctx()).attack(&mut msg);
            assert_eq!(msg.yaw_rate, expected);
            assert_eq!(msg.heading(), bsm().heading());
        }
    }

    #[test]
    fn coupled_mode_integrates_yaw_rate() {
        let ctx = ctx();
        for kind in [
            AttackType::HighHeadingYawRate,
            AttackType::LowHeadingYawRate,
            AttackType::ConstantHeadingYawRate,
            AttackType::RandomHeadingYawRate,
            AttackType::RandomHeadingYawRateOffset,
            AttackType::ConstantHeadingYawRateOffset,
        ] {
            let mut msg = bsm();
            build(kind, &ctx).attack(&mut msg);
            let expected = advance_heading(ctx.prev_heading, msg.yaw_rate, ctx.elapsed());
            assert!((msg.heading() - expected).abs() < 1e-9, "{kind}");
        }
    }

    #[test]
    fn coupled_constant_holds_previous_heading() {
        let ctx = ctx();
        let mut msg = bsm();
        msg.set_heading(3.0);
        build(AttackType::ConstantHeadingYawRate, &ctx).attack(&mut msg);
        assert_eq!(msg.yaw_rate, 0.0);
        assert!((msg.heading() - ctx.prev_heading).abs() < 1e-12);
    }

    #[test]
    fn random_offsets_are_bounded() {
        let ctx = ctx();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let mut msg = bsm();
            msg.set_heading(PI);
            let mut a = HeadingAttack::new(AttackType::RandomHeadingOffset, &ctx, &mut rng).unwrap();
            a.attack(&mut msg);
            assert!((msg.heading() - PI).abs() <= ctx.offsets.heading_rad + 1e-9);
        }
    }

    #[test]
    fn nan_offset_builds_nothing() {
        let mut ctx = ctx();
        ctx.offsets.heading_rad = f64::NAN;
        ctx.offsets.yaw_rate_rad_s = f64::NAN;
        let mut rng = StdRng::seed_from_u64(99);
        for kind in [
            AttackType::ConstantHeadingOffset,
            AttackType::RandomHeadingOffset,
            AttackType::RandomYawRateOffset,
            AttackType::ConstantHeadingYawRateOffset,
        ] {
            assert!(HeadingAttack::new(kind, &ctx, &mut rng).is_none(), "{kind}");
        }
        assert!(HeadingAttack::new(AttackType::OppositeHeading, &ctx, &mut rng).is_some());
    }
}

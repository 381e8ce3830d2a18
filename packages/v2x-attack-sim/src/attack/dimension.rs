//! dimension.rs — Vehicle dimension falsification
//!
//! One shape transform applied to an axis selector (length, width or both)
//! covers the whole dimension/length/width family.

use rand::Rng;
use v2x_types::BasicSafetyMessage;

use super::{symmetric_draw, Attack, AttackContext, AttackFamily, AttackType};

/// J2735 VehicleLength upper bound, meters
pub const HIGH_LENGTH_M: f64 = 40.0;
/// J2735 VehicleWidth upper bound, meters
pub const HIGH_WIDTH_M: f64 = 10.0;
pub const LOW_DIMENSION_M: f64 = 0.1;
/// Length:width factor used by the bad-ratio transform
pub const BAD_RATIO_FACTOR: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Length,
    Width,
    Both,
}

impl Axis {
    fn touches_length(self) -> bool {
        matches!(self, Axis::Length | Axis::Both)
    }
    fn touches_width(self) -> bool {
        matches!(self, Axis::Width | Axis::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    High,
    Low,
    /// Absolute values drawn at construction (length, width)
    Random(f64, f64),
    /// Signed deltas drawn at construction (length, width)
    RandomOffset(f64, f64),
    ConstantOffset(f64),
    BadRatio,
}

#[derive(Debug, Clone)]
pub struct DimensionAttack {
    kind: AttackType,
    axis: Axis,
    shape: Shape,
}

impl DimensionAttack {
    /// `None` for identifiers outside the dimension/length/width families,
    /// and for offset variants whose configured offset is not finite.
    pub fn new(kind: AttackType, ctx: &AttackContext, rng: &mut impl Rng) -> Option<Self> {
        use AttackType::*;
        let axis = match kind.family() {
            AttackFamily::Dimension => Axis::Both,
            AttackFamily::Length => Axis::Length,
            AttackFamily::Width => Axis::Width,
            _ => return None,
        };
        let d = ctx.offsets.dimension_m;
        let shape = match kind {
            HighDimension | HighLength | HighWidth => Shape::High,
            LowDimension | LowLength | LowWidth => Shape::Low,
            RandomDimension | RandomLength | RandomWidth => Shape::Random(
                rng.gen_range(LOW_DIMENSION_M..=HIGH_LENGTH_M),
                rng.gen_range(LOW_DIMENSION_M..=HIGH_WIDTH_M),
            ),
            RandomDimensionOffset | RandomLengthOffset | RandomWidthOffset => {
                Shape::RandomOffset(symmetric_draw(d, rng)?, symmetric_draw(d, rng)?)
            }
            ConstantDimensionOffset | ConstantLengthOffset | ConstantWidthOffset if d.is_finite() => {
                Shape::ConstantOffset(d)
            }
            ConstantDimensionOffset | ConstantLengthOffset | ConstantWidthOffset => return None,
            _ => Shape::BadRatio,
        };
        Some(Self { kind, axis, shape })
    }
}

impl Attack for DimensionAttack {
    fn kind(&self) -> AttackType { self.kind }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
        let (mut length, mut width) = (bsm.length, bsm.width);
        match self.shape {
            Shape::High => {
                length = HIGH_LENGTH_M;
                width = HIGH_WIDTH_M;
            }
            Shape::Low => {
                length = LOW_DIMENSION_M;
                width = LOW_DIMENSION_M;
            }
            Shape::Random(l, w) => {
                length = l;
                width = w;
            }
            Shape::RandomOffset(dl, dw) => {
                length = (length + dl).max(LOW_DIMENSION_M);
                width = (width + dw).max(LOW_DIMENSION_M);
            }
            Shape::ConstantOffset(d) => {
                length = (length + d).max(LOW_DIMENSION_M);
                width = (width + d).max(LOW_DIMENSION_M);
            }
            Shape::BadRatio => match self.axis {
                // a car that is four times wider than long
                Axis::Length => length = bsm.width / BAD_RATIO_FACTOR,
                Axis::Width => width = bsm.length * BAD_RATIO_FACTOR,
                Axis::Both => {
                    length = bsm.width;
                    width = bsm.length;
                }
            },
        }
        if self.axis.touches_length() {
            bsm.length = length;
        }
        if self.axis.touches_width() {
            bsm.width = width;
        }
    }
}

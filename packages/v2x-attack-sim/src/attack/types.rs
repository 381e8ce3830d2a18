//! types.rs — Attack taxonomy
//!
//! One closed enumeration of concrete falsification behaviours, grouped into
//! families, plus the selection meta-values read from configuration.
//! Random selection draws from `AttackType::ALL`, so the selectable set is
//! exactly the enum and nothing else.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Concrete attack identifier. Serialized as its ground-truth label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttackType {
    // Position (self telemetry)
    RandomPosition,
    RandomPositionOffset,
    ConstantPositionOffset,
    PlaygroundConstantPosition,
    SuddenDisappearance,

    // Position (ghost vehicle)
    SuddenAppearance,
    TargetedConstantPosition,

    // Mobility (ghost vehicle)
    CommRangeBraking,

    // Channel
    DenialOfService,

    // EEBL-specific (ghost vehicle)
    FakeEeblJustAttack,
    FakeEeblStopPositionUpdateAfterAttack,

    // IMA-specific
    ImaPositionOffset,
    ImaJunctionPosition,
    ImaHighSpeed,
    ImaLowSpeed,
    ImaHighAcceleration,
    ImaLowAcceleration,

    // Dimension (length and width)
    HighDimension,
    LowDimension,
    RandomDimension,
    RandomDimensionOffset,
    ConstantDimensionOffset,
    BadRatioDimension,

    // Length
    HighLength,
    LowLength,
    RandomLength,
    RandomLengthOffset,
    ConstantLengthOffset,
    BadRatioLength,

    // Width
    HighWidth,
    LowWidth,
    RandomWidth,
    RandomWidthOffset,
    ConstantWidthOffset,
    BadRatioWidth,

    // Heading
    OppositeHeading,
    PerpendicularHeading,
    RotatingHeading,
    ConstantHeading,
    RandomHeading,
    RandomHeadingOffset,
    ConstantHeadingOffset,

    // Yaw rate
    HighYawRate,
    LowYawRate,
    ConstantYawRate,
    RandomYawRate,
    RandomYawRateOffset,
    ConstantYawRateOffset,

    // Heading and yaw rate, kinematically matched
    HighHeadingYawRate,
    LowHeadingYawRate,
    ConstantHeadingYawRate,
    RandomHeadingYawRate,
    RandomHeadingYawRateOffset,
    ConstantHeadingYawRateOffset,

    // Acceleration
    HighAcceleration,
    LowAcceleration,
    ConstantAcceleration,
    RandomAcceleration,
    RandomAccelerationOffset,
    ConstantAccelerationOffset,

    // Speed
    HighSpeed,
    LowSpeed,
    ConstantSpeed,
    RandomSpeed,
    RandomSpeedOffset,
    ConstantSpeedOffset,
}

/// Attack families; the family decides which strategy implementation handles a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackFamily {
    SelfPosition,
    GhostPosition,
    GhostMobility,
    Channel,
    EeblGhost,
    Ima,
    Dimension,
    Length,
    Width,
    Heading,
    YawRate,
    HeadingYawRate,
    Acceleration,
    Speed,
}

impl AttackFamily {
    /// Ghost families fabricate a new record per victim instead of mutating
    /// the attacker's own beacon.
    pub fn is_ghost(self) -> bool {
        matches!(self, Self::GhostPosition | Self::GhostMobility | Self::EeblGhost)
    }
}

impl AttackType {
    pub const ALL: [AttackType; 66] = [
        Self::RandomPosition,
        Self::RandomPositionOffset,
        Self::ConstantPositionOffset,
        Self::PlaygroundConstantPosition,
        Self::SuddenDisappearance,
        Self::SuddenAppearance,
        Self::TargetedConstantPosition,
        Self::CommRangeBraking,
        Self::DenialOfService,
        Self::FakeEeblJustAttack,
        Self::FakeEeblStopPositionUpdateAfterAttack,
        Self::ImaPositionOffset,
        Self::ImaJunctionPosition,
        Self::ImaHighSpeed,
        Self::ImaLowSpeed,
        Self::ImaHighAcceleration,
        Self::ImaLowAcceleration,
        Self::HighDimension,
        Self::LowDimension,
        Self::RandomDimension,
        Self::RandomDimensionOffset,
        Self::ConstantDimensionOffset,
        Self::BadRatioDimension,
        Self::HighLength,
        Self::LowLength,
        Self::RandomLength,
        Self::RandomLengthOffset,
        Self::ConstantLengthOffset,
        Self::BadRatioLength,
        Self::HighWidth,
        Self::LowWidth,
        Self::RandomWidth,
        Self::RandomWidthOffset,
        Self::ConstantWidthOffset,
        Self::BadRatioWidth,
        Self::OppositeHeading,
        Self::PerpendicularHeading,
        Self::RotatingHeading,
        Self::ConstantHeading,
        Self::RandomHeading,
        Self::RandomHeadingOffset,
        Self::ConstantHeadingOffset,
        Self::HighYawRate,
        Self::LowYawRate,
        Self::ConstantYawRate,
        Self::RandomYawRate,
        Self::RandomYawRateOffset,
        Self::ConstantYawRateOffset,
        Self::HighHeadingYawRate,
        Self::LowHeadingYawRate,
        Self::ConstantHeadingYawRate,
        Self::RandomHeadingYawRate,
        Self::RandomHeadingYawRateOffset,
        Self::ConstantHeadingYawRateOffset,
        Self::HighAcceleration,
        Self::LowAcceleration,
        Self::ConstantAcceleration,
        Self::RandomAcceleration,
        Self::RandomAccelerationOffset,
        Self::ConstantAccelerationOffset,
        Self::HighSpeed,
        Self::LowSpeed,
        Self::ConstantSpeed,
        Self::RandomSpeed,
        Self::RandomSpeedOffset,
        Self::ConstantSpeedOffset,
    ];

    /// Uniform draw over every concrete attack
    pub fn random(rng: &mut impl Rng) -> AttackType {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn family(self) -> AttackFamily {
        use AttackType::*;
        match self {
            RandomPosition | RandomPositionOffset | ConstantPositionOffset
            | PlaygroundConstantPosition | SuddenDisappearance => AttackFamily::SelfPosition,
            SuddenAppearance | TargetedConstantPosition => AttackFamily::GhostPosition,
            CommRangeBraking => AttackFamily::GhostMobility,
            DenialOfService => AttackFamily::Channel,
            FakeEeblJustAttack | FakeEeblStopPositionUpdateAfterAttack => AttackFamily::EeblGhost,
            ImaPositionOffset | ImaJunctionPosition | ImaHighSpeed | ImaLowSpeed
            | ImaHighAcceleration | ImaLowAcceleration => AttackFamily::Ima,
            HighDimension | LowDimension | RandomDimension | RandomDimensionOffset
            | ConstantDimensionOffset | BadRatioDimension => AttackFamily::Dimension,
            HighLength | LowLength | RandomLength | RandomLengthOffset
            | ConstantLengthOffset | BadRatioLength => AttackFamily::Length,
            HighWidth | LowWidth | RandomWidth | RandomWidthOffset
            | ConstantWidthOffset | BadRatioWidth => AttackFamily::Width,
            OppositeHeading | PerpendicularHeading | RotatingHeading | ConstantHeading
            | RandomHeading | RandomHeadingOffset | ConstantHeadingOffset => AttackFamily::Heading,
            HighYawRate | LowYawRate | ConstantYawRate | RandomYawRate
            | RandomYawRateOffset | ConstantYawRateOffset => AttackFamily::YawRate,
            HighHeadingYawRate | LowHeadingYawRate | ConstantHeadingYawRate
            | RandomHeadingYawRate | RandomHeadingYawRateOffset
            | ConstantHeadingYawRateOffset => AttackFamily::HeadingYawRate,
            HighAcceleration | LowAcceleration | ConstantAcceleration | RandomAcceleration
            | RandomAccelerationOffset | ConstantAccelerationOffset => AttackFamily::Acceleration,
            HighSpeed | LowSpeed | ConstantSpeed | RandomSpeed | RandomSpeedOffset
            | ConstantSpeedOffset => AttackFamily::Speed,
        }
    }

    pub fn is_ghost(self) -> bool {
        self.family().is_ghost()
    }

    /// Ground-truth label stamped into `BasicSafetyMessage::attack_type`
    pub fn label(self) -> &'static str {
        use AttackType::*;
        match self {
            RandomPosition => "RandomPosition",
            RandomPositionOffset => "RandomPositionOffset",
            ConstantPositionOffset => "ConstantPositionOffset",
            PlaygroundConstantPosition => "PlaygroundConstantPosition",
            SuddenDisappearance => "SuddenDisappearance",
            SuddenAppearance => "SuddenAppearance",
            TargetedConstantPosition => "TargetedConstantPosition",
            CommRangeBraking => "CommRangeBraking",
            DenialOfService => "DenialOfService",
            FakeEeblJustAttack => "FakeEEBLJustAttack",
            FakeEeblStopPositionUpdateAfterAttack => "FakeEEBLStopPositionUpdateAfterAttack",
            ImaPositionOffset => "IMAPositionOffset",
            ImaJunctionPosition => "IMAJunctionPosition",
            ImaHighSpeed => "IMAHighSpeed",
            ImaLowSpeed => "IMALowSpeed",
            ImaHighAcceleration => "IMAHighAcceleration",
            ImaLowAcceleration => "IMALowAcceleration",
            HighDimension => "HighDimension",
            LowDimension => "LowDimension",
            RandomDimension => "RandomDimension",
            RandomDimensionOffset => "RandomDimensionOffset",
            ConstantDimensionOffset => "ConstantDimensionOffset",
            BadRatioDimension => "BadRatioDimension",
            HighLength => "HighLength",
            LowLength => "LowLength",
            RandomLength => "RandomLength",
            RandomLengthOffset => "RandomLengthOffset",
            ConstantLengthOffset => "ConstantLengthOffset",
            BadRatioLength => "BadRatioLength",
            HighWidth => "HighWidth",
            LowWidth => "LowWidth",
            RandomWidth => "RandomWidth",
            RandomWidthOffset => "RandomWidthOffset",
            ConstantWidthOffset => "ConstantWidthOffset",
            BadRatioWidth => "BadRatioWidth",
            OppositeHeading => "OppositeHeading",
            PerpendicularHeading => "PerpendicularHeading",
            RotatingHeading => "RotatingHeading",
            ConstantHeading => "ConstantHeading",
            RandomHeading => "RandomHeading",
            RandomHeadingOffset => "RandomHeadingOffset",
            ConstantHeadingOffset => "ConstantHeadingOffset",
            HighYawRate => "HighYawRate",
            LowYawRate => "LowYawRate",
            ConstantYawRate => "ConstantYawRate",
            RandomYawRate => "RandomYawRate",
            RandomYawRateOffset => "RandomYawRateOffset",
            ConstantYawRateOffset => "ConstantYawRateOffset",
            HighHeadingYawRate => "HighHeadingYawRate",
            LowHeadingYawRate => "LowHeadingYawRate",
            ConstantHeadingYawRate => "ConstantHeadingYawRate",
            RandomHeadingYawRate => "RandomHeadingYawRate",
            RandomHeadingYawRateOffset => "RandomHeadingYawRateOffset",
            ConstantHeadingYawRateOffset => "ConstantHeadingYawRateOffset",
            HighAcceleration => "HighAcceleration",
            LowAcceleration => "LowAcceleration",
            ConstantAcceleration => "ConstantAcceleration",
            RandomAcceleration => "RandomAcceleration",
            RandomAccelerationOffset => "RandomAccelerationOffset",
            ConstantAccelerationOffset => "ConstantAccelerationOffset",
            HighSpeed => "HighSpeed",
            LowSpeed => "LowSpeed",
            ConstantSpeed => "ConstantSpeed",
            RandomSpeed => "RandomSpeed",
            RandomSpeedOffset => "RandomSpeedOffset",
            ConstantSpeedOffset => "ConstantSpeedOffset",
        }
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown attack identifier `{0}`")]
pub struct UnknownAttack(pub String);

impl FromStr for AttackType {
    type Err = UnknownAttack;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAttack(s.to_string()))
    }
}

impl TryFrom<String> for AttackType {
    type Error = UnknownAttack;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<AttackType> for String {
    fn from(a: AttackType) -> Self { a.label().to_string() }
}

// ── Selection (config meta-values) ────────────────────────────────────────────

/// What a vehicle's `attack.selection` config resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttackSelection {
    /// Never attack; forces malicious probability to zero
    NoAttack,
    Fixed(AttackType),
    /// Draw one concrete attack per vehicle at election time
    RandomOnce,
    /// Draw a fresh concrete attack before every beacon
    RandomEachBeacon,
}

impl Default for AttackSelection {
    fn default() -> Self { Self::NoAttack }
}

impl FromStr for AttackSelection {
    type Err = UnknownAttack;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" | "NoAttack" | "none" => Ok(Self::NoAttack),
            "RandomOnce" | "RandomlySelected" => Ok(Self::RandomOnce),
            "RandomEachBeacon" | "AlwaysRandom" => Ok(Self::RandomEachBeacon),
            other => other.parse().map(Self::Fixed),
        }
    }
}

impl TryFrom<String> for AttackSelection {
    type Error = UnknownAttack;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<AttackSelection> for String {
    fn from(s: AttackSelection) -> Self {
        match s {
            AttackSelection::NoAttack => "None".to_string(),
            AttackSelection::Fixed(a) => a.label().to_string(),
            AttackSelection::RandomOnce => "RandomOnce".to_string(),
            AttackSelection::RandomEachBeacon => "RandomEachBeacon".to_string(),
        }
    }
}

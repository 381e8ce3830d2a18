//! scenarios.rs — Named attack presets
//!
//! A preset replaces the `[attack]` section of the loaded config; the
//! simulation, world and traffic sections are left as configured.
//! Selected with `--preset <name>`.

use crate::attack::{AttackOffsets, AttackSelection, AttackType, LatchScope};
use crate::config::AttackConfig;

pub const PRESET_NAMES: [&str; 6] = [
    "default",
    "ghost_eebl",
    "dos_flood",
    "heading_yaw",
    "ima_junction",
    "random_each_beacon",
];

/// Look up a preset by name.
pub fn preset(name: &str) -> Option<AttackConfig> {
    let cfg = match name {
        "default"            => preset_default(),
        "ghost_eebl"         => preset_ghost_eebl(),
        "dos_flood"          => preset_dos_flood(),
        "heading_yaw"        => preset_heading_yaw(),
        "ima_junction"       => preset_ima_junction(),
        "random_each_beacon" => preset_random_each_beacon(),
        _ => return None,
    };
    Some(cfg)
}

/// One attack per malicious vehicle, drawn at start-up; 10% of vehicles
pub fn preset_default() -> AttackConfig {
    AttackConfig {
        selection: AttackSelection::RandomOnce,
        malicious_probability: 0.1,
        ..Default::default()
    }
}

/// Fake hard-braking ghosts just ahead of every victim
pub fn preset_ghost_eebl() -> AttackConfig {
    AttackConfig {
        selection: AttackSelection::Fixed(AttackType::FakeEeblJustAttack),
        malicious_probability: 0.2,
        ..Default::default()
    }
}

/// Beacon flooding. The latch is shared, so only the first attacker speeds up.
pub fn preset_dos_flood() -> AttackConfig {
    AttackConfig {
        selection: AttackSelection::Fixed(AttackType::DenialOfService),
        malicious_probability: 0.1,
        latch_scope: LatchScope::PerRun,
        n_dos_messages: 20,
        ..Default::default()
    }
}

/// Kinematically consistent heading and yaw-rate falsification
pub fn preset_heading_yaw() -> AttackConfig {
    AttackConfig {
        selection: AttackSelection::Fixed(AttackType::RandomHeadingYawRateOffset),
        malicious_probability: 0.2,
        offsets: AttackOffsets { heading_rad: 0.3, yaw_rate_rad_s: 0.3, ..Default::default() },
        ..Default::default()
    }
}

/// Vehicles claim to sit on the junction while approaching it
pub fn preset_ima_junction() -> AttackConfig {
    AttackConfig {
        selection: AttackSelection::Fixed(AttackType::ImaJunctionPosition),
        malicious_probability: 0.2,
        ..Default::default()
    }
}

/// A fresh attack before every beacon
pub fn preset_random_each_beacon() -> AttackConfig {
    AttackConfig {
        selection: AttackSelection::RandomEachBeacon,
        malicious_probability: 0.3,
        ..Default::default()
    }
}

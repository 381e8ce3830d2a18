//! config.rs — TOML configuration
//!
//! Sections mirror config.toml: `[simulation]`, `[world]`, `[traffic]`,
//! `[attack]` and `[attack.offsets]`. Every field has a default so a partial
//! file is accepted; `validate` rejects values the run cannot work with.

use std::path::Path;

use serde::Deserialize;

use crate::attack::{AttackOffsets, AttackSelection, LatchScope, WorldBounds};
use crate::error::{Result, SimError};

/// Config compiled into the binary, used when no file can be read
pub const BUNDLED_CONFIG: &str = include_str!("../config.toml");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FullConfig {
    pub simulation: SimulationConfig,
    pub world: WorldBounds,
    pub traffic: TrafficConfig,
    pub attack: AttackConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub update_rate_hz: f64,
    pub duration_s: f64,
    pub beacon_interval_s: f64,
    /// Radio range; also the ghost clearance for comm-range braking
    pub comm_range_m: f64,
    /// How often vehicles refresh their junction lookup
    pub ima_interval_s: f64,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
    /// Road map JSON; the bundled map when absent
    pub map_file: Option<String>,
    /// JSONL trace output; no trace when absent
    pub trace_path: Option<String>,
    /// Payload tag carried by genuine beacons
    pub bsm_data: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: 10.0,
            duration_s: 60.0,
            beacon_interval_s: 0.1,
            comm_range_m: 300.0,
            ima_interval_s: 2.0,
            seed: None,
            map_file: None,
            trace_path: None,
            bsm_data: "bsm".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub n_vehicles: usize,
    pub target_speed_mps: f64,
    /// Full width of the uniform speed spread around the target
    pub speed_variance: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    /// Lateral lane weave amplitude (gives non-zero yaw rates)
    pub lane_weave_m: f64,
    pub lane_weave_wavelength_m: f64,
    /// Chance per vehicle per second of starting a hard-braking event
    pub hard_brake_rate_hz: f64,
    pub hard_brake_decel_mps2: f64,
    pub hard_brake_duration_s: f64,
    /// Acceleration used to recover cruising speed
    pub recovery_accel_mps2: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            n_vehicles: 20,
            target_speed_mps: 13.9,
            speed_variance: 6.0,
            length_m: 4.5,
            width_m: 1.8,
            height_m: 1.5,
            lane_weave_m: 0.4,
            lane_weave_wavelength_m: 120.0,
            hard_brake_rate_hz: 0.01,
            hard_brake_decel_mps2: -6.0,
            hard_brake_duration_s: 2.0,
            recovery_accel_mps2: 1.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub selection: AttackSelection,
    pub malicious_probability: f64,
    pub latch_scope: LatchScope,
    /// Beacon interval divisor of the denial-of-service attack
    pub n_dos_messages: u32,
    pub offsets: AttackOffsets,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            selection: AttackSelection::NoAttack,
            malicious_probability: 0.0,
            latch_scope: LatchScope::PerVehicle,
            n_dos_messages: 10,
            offsets: AttackOffsets::default(),
        }
    }
}

impl AttackConfig {
    /// Election probability; forced to zero when no attack is selected.
    pub fn effective_probability(&self) -> f64 {
        match self.selection {
            AttackSelection::NoAttack => 0.0,
            _ => self.malicious_probability,
        }
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!("{name} must be positive, got {v}")))
    }
}

fn finite(name: &str, v: f64) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!("{name} must be finite, got {v}")))
    }
}

impl FullConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: FullConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| SimError::ConfigRead { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_CONFIG)
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.simulation;
        positive("simulation.update_rate_hz", s.update_rate_hz)?;
        positive("simulation.duration_s", s.duration_s)?;
        positive("simulation.beacon_interval_s", s.beacon_interval_s)?;
        positive("simulation.comm_range_m", s.comm_range_m)?;
        positive("simulation.ima_interval_s", s.ima_interval_s)?;
        positive("world.width_m", self.world.width_m)?;
        positive("world.height_m", self.world.height_m)?;
        positive("traffic.target_speed_mps", self.traffic.target_speed_mps)?;
        positive("traffic.lane_weave_wavelength_m", self.traffic.lane_weave_wavelength_m)?;

        let p = self.attack.malicious_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(SimError::InvalidConfig(format!(
                "attack.malicious_probability must be in [0, 1], got {p}"
            )));
        }
        let o = &self.attack.offsets;
        finite("attack.offsets.position_m", o.position_m)?;
        finite("attack.offsets.dimension_m", o.dimension_m)?;
        finite("attack.offsets.heading_rad", o.heading_rad)?;
        finite("attack.offsets.yaw_rate_rad_s", o.yaw_rate_rad_s)?;
        finite("attack.offsets.acceleration_mps2", o.acceleration_mps2)?;
        finite("attack.offsets.speed_mps", o.speed_mps)?;
        if self.attack.n_dos_messages == 0 {
            return Err(SimError::InvalidConfig("attack.n_dos_messages must be at least 1".into()));
        }
        if self.traffic.speed_variance < 0.0 || self.traffic.hard_brake_rate_hz < 0.0 {
            return Err(SimError::InvalidConfig("traffic rates and spreads must not be negative".into()));
        }
        Ok(())
    }
}

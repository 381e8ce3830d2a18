//! # v2x-types
//!
//! Shared beacon structures for the V2X attack simulator.
//!
//! These types are used by:
//! - `v2x-attack-sim`: populating, falsifying and consuming Basic Safety Messages
//! - the UDP beacon mirror: JSON wire encoding of every transmitted record
//!
//! ## Coordinate Conventions
//!
//! - **World frame**: planar Cartesian, X = east, Y = north, Z = up (meters)
//! - **Heading**: radians, 0 = east, counter-clockwise positive, canonical range [0, 2π)
//!
//! ## Invariants
//! - heading is wrapped into [0, 2π) by every setter
//! - message count never exceeds 127
//! - hard-braking flag is re-derived whenever acceleration is set
//! - decoding goes through the same setters, so wire input obeys the above

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Recipient id meaning "every vehicle in range".
pub const BROADCAST_ID: u32 = u32::MAX;

/// Payload tag carried by fabricated (ghost) records.
pub const GHOST_DATA: &str = "ghost";

/// Ground-truth label of an unmodified record.
pub const GENUINE_LABEL: &str = "Genuine";

/// AASHTO hard braking: deceleration greater than 4.5 m/s²
pub const HARD_BRAKING_THRESHOLD_MPS2: f64 = -4.5;

/// Message count wraps at this value (SAE J2735 MsgCount is 0..=127).
pub const MSG_COUNT_MODULUS: u32 = 128;

/// Wrap any finite angle into [0, 2π).
pub fn wrap_angle(rad: f64) -> f64 {
    let wrapped = rad.rem_euclid(TAU);
    // rem_euclid can round tiny negatives up to exactly 2π
    if wrapped >= TAU { 0.0 } else { wrapped }
}

// ── 3D Vector ─────────────────────────────────────────────────────────────────

/// 3D vector in the world frame (meters, or m/s for velocities)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,  // East
    pub y: f64,  // North
    pub z: f64,  // Up
}

impl Coord {
    pub const ZERO: Coord = Coord { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }
    pub fn planar(x: f64, y: f64) -> Self { Self { x, y, z: 0.0 } }

    /// Euclidean magnitude
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
    pub fn dist(&self, other: &Coord) -> f64 {
        self.sub(other).length()
    }
    pub fn add(&self, other: &Coord) -> Coord {
        Coord::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
    pub fn sub(&self, other: &Coord) -> Coord {
        Coord::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
    pub fn scale(&self, s: f64) -> Coord {
        Coord::new(self.x * s, self.y * s, self.z * s)
    }
    pub fn dot(&self, other: &Coord) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ── Basic Safety Message ──────────────────────────────────────────────────────

/// Periodic beacon broadcast by every vehicle (SAE J2735 BSM Part I subset).
///
/// `attack_type` is ground truth for offline analysis only; receivers never
/// base decisions on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireBsm")]
pub struct BasicSafetyMessage {
    /// Claimed sender identity (real vehicle id or a synthetic ghost id)
    pub sender_id: u32,
    /// Unicast hint, `BROADCAST_ID` for ordinary beacons
    pub recipient_id: u32,
    /// Generation timestamp, simulation seconds
    pub generation_time: f64,
    msg_count: u8,
    /// Payload tag (`GHOST_DATA` on fabricated records)
    pub data: String,
    pub position: Coord,
    /// Velocity vector, m/s
    pub speed: Coord,
    heading: f64,
    /// rad/s
    pub yaw_rate: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    acceleration: f64,
    event_hard_braking: bool,
    /// Ground-truth label of the falsification applied (or `GENUINE_LABEL`)
    pub attack_type: String,
}

/// Decoding shape of a BSM. Guarded fields are routed through the setters.
#[derive(Deserialize)]
struct WireBsm {
    sender_id: u32,
    recipient_id: u32,
    generation_time: f64,
    msg_count: u32,
    data: String,
    position: Coord,
    speed: Coord,
    heading: f64,
    yaw_rate: f64,
    length: f64,
    width: f64,
    height: f64,
    acceleration: f64,
    event_hard_braking: bool,
    attack_type: String,
}

impl From<WireBsm> for BasicSafetyMessage {
    fn from(w: WireBsm) -> Self {
        let mut bsm = BasicSafetyMessage {
            recipient_id: w.recipient_id,
            generation_time: w.generation_time,
            data: w.data,
            position: w.position,
            speed: w.speed,
            yaw_rate: w.yaw_rate,
            length: w.length,
            width: w.width,
            height: w.height,
            attack_type: w.attack_type,
            ..BasicSafetyMessage::new(w.sender_id)
        };
        bsm.set_msg_count(w.msg_count);
        bsm.set_heading(w.heading);
        bsm.set_acceleration(w.acceleration);
        // the flag may have been falsified independently of acceleration
        bsm.set_event_hard_braking(w.event_hard_braking);
        bsm
    }
}

impl BasicSafetyMessage {
    pub fn new(sender_id: u32) -> Self {
        Self {
            sender_id,
            recipient_id: BROADCAST_ID,
            generation_time: 0.0,
            msg_count: 0,
            data: String::new(),
            position: Coord::ZERO,
            speed: Coord::ZERO,
            heading: 0.0,
            yaw_rate: 0.0,
            length: 0.0,
            width: 0.0,
            height: 0.0,
            acceleration: 0.0,
            event_hard_braking: false,
            attack_type: GENUINE_LABEL.to_string(),
        }
    }

    pub fn heading(&self) -> f64 { self.heading }

    /// Set heading, wrapped into [0, 2π)
    pub fn set_heading(&mut self, rad: f64) {
        self.heading = wrap_angle(rad);
    }

    pub fn msg_count(&self) -> u8 { self.msg_count }

    pub fn set_msg_count(&mut self, count: u32) {
        self.msg_count = (count % MSG_COUNT_MODULUS) as u8;
    }

    pub fn acceleration(&self) -> f64 { self.acceleration }

    /// Set longitudinal acceleration and re-derive the hard-braking event flag.
    pub fn set_acceleration(&mut self, mps2: f64) {
        self.acceleration = mps2;
        self.event_hard_braking = mps2 < HARD_BRAKING_THRESHOLD_MPS2;
    }

    pub fn event_hard_braking(&self) -> bool { self.event_hard_braking }

    /// Override the hard-braking flag independently of acceleration.
    pub fn set_event_hard_braking(&mut self, on: bool) {
        self.event_hard_braking = on;
    }

    pub fn is_ghost(&self) -> bool { self.data == GHOST_DATA }

    pub fn is_genuine(&self) -> bool { self.attack_type == GENUINE_LABEL }

    /// Every numeric field is finite
    pub fn is_finite(&self) -> bool {
        self.generation_time.is_finite()
            && self.position.is_finite()
            && self.speed.is_finite()
            && self.heading.is_finite()
            && self.yaw_rate.is_finite()
            && self.length.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.acceleration.is_finite()
    }

    /// JSON wire encoding used by the UDP beacon mirror
    pub fn to_wire(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_wire(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn heading_setter_wraps_into_canonical_range() {
        let mut bsm = BasicSafetyMessage::new(1);
        bsm.set_heading(5.0 * PI);
        assert!((bsm.heading() - PI).abs() < 1e-9);
        bsm.set_heading(-PI / 2.0);
        assert!((bsm.heading() - 1.5 * PI).abs() < 1e-9);
        bsm.set_heading(TAU);
        assert_eq!(bsm.heading(), 0.0);
    }

    #[test]
    fn msg_count_never_exceeds_127() {
        let mut bsm = BasicSafetyMessage::new(1);
        bsm.set_msg_count(127);
        assert_eq!(bsm.msg_count(), 127);
        bsm.set_msg_count(128);
        assert_eq!(bsm.msg_count(), 0);
        bsm.set_msg_count(300);
        assert_eq!(bsm.msg_count(), 44);
    }

    #[test]
    fn hard_braking_follows_acceleration() {
        let mut bsm = BasicSafetyMessage::new(1);
        bsm.set_acceleration(-4.5);
        assert!(!bsm.event_hard_braking());
        bsm.set_acceleration(-4.6);
        assert!(bsm.event_hard_braking());
        bsm.set_acceleration(1.0);
        assert!(!bsm.event_hard_braking());
    }

    #[test]
    fn wire_encoding_keeps_private_fields() {
        let mut bsm = BasicSafetyMessage::new(7);
        bsm.set_heading(1.25);
        bsm.set_msg_count(99);
        bsm.set_acceleration(-6.0);
        let decoded = BasicSafetyMessage::from_wire(&bsm.to_wire().unwrap()).unwrap();
        assert_eq!(decoded, bsm);
        assert!(decoded.event_hard_braking());
    }

    #[test]
    fn decoding_enforces_setter_invariants() {
        let mut raw: serde_json::Value =
            serde_json::from_slice(&BasicSafetyMessage::new(7).to_wire().unwrap()).unwrap();
        raw["heading"] = 7.0.into();
        raw["msg_count"] = 200.into();
        let decoded = BasicSafetyMessage::from_wire(raw.to_string().as_bytes()).unwrap();
        assert!((decoded.heading() - (7.0 - TAU)).abs() < 1e-12);
        assert_eq!(decoded.msg_count(), 72);
    }

    #[test]
    fn decoding_keeps_an_independent_braking_flag() {
        let mut bsm = BasicSafetyMessage::new(7);
        bsm.set_acceleration(0.0);
        bsm.set_event_hard_braking(true);
        let decoded = BasicSafetyMessage::from_wire(&bsm.to_wire().unwrap()).unwrap();
        assert!(decoded.event_hard_braking());
        assert_eq!(decoded.acceleration(), 0.0);
    }

    #[test]
    fn non_finite_fields_are_detected() {
        let mut bsm = BasicSafetyMessage::new(1);
        assert!(bsm.is_finite());
        bsm.speed = Coord::new(f64::NAN, 0.0, 0.0);
        assert!(!bsm.is_finite());
    }
}

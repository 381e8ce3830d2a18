//! safetyapps — Hazard detectors run by every genuine receiver
//!
//! Their outputs are the ground truth an attack is judged against.

pub mod eebl;
pub mod ima;

use v2x_types::Coord;

/// The receiving (host) vehicle's own state at reception time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostVehicle {
    pub id: u32,
    pub position: Coord,
    pub heading: f64,
    pub speed: Coord,
}

//! ima.rs — Intersection movement assist
//!
//! Warns when host and remote vehicle are both closing on the same junction
//! and would reach it at about the same time.

use v2x_types::{BasicSafetyMessage, Coord};

use super::HostVehicle;
use crate::geometry::heading_unit;

/// Vehicles slower than this are treated as not arriving, m/s
pub const MIN_SPEED_MPS: f64 = 0.5;
/// Arrival-time gap below which paths conflict, seconds
pub const CONFLICT_WINDOW_S: f64 = 2.0;
/// Arrivals further out than this are ignored, seconds
pub const HORIZON_S: f64 = 10.0;

/// Seconds until `position` moving along `heading` at `speed` reaches
/// `junction`, or `None` if it is slow or moving away.
fn time_to_junction(position: &Coord, heading: f64, speed: &Coord, junction: &Coord) -> Option<f64> {
    let v = speed.length();
    if v < MIN_SPEED_MPS {
        return None;
    }
    let to_junction = junction.sub(position);
    if heading_unit(heading).dot(&to_junction) <= 0.0 {
        return None;
    }
    let t = to_junction.length() / v;
    (t <= HORIZON_S).then_some(t)
}

pub fn warning(
    rv: &BasicSafetyMessage,
    hv: &HostVehicle,
    approaching_intersection: bool,
    junction: &Coord,
) -> bool {
    if !approaching_intersection || rv.sender_id == hv.id {
        return false;
    }
    let Some(t_hv) = time_to_junction(&hv.position, hv.heading, &hv.speed, junction) else {
        return false;
    };
    let Some(t_rv) = time_to_junction(&rv.position, rv.heading(), &rv.speed, junction) else {
        return false;
    };
    (t_hv - t_rv).abs() < CONFLICT_WINDOW_S
}

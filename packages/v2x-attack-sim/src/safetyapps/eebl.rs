//! eebl.rs — Emergency electronic brake light
//!
//! SAE J2945/1 leaves the distance threshold to the implementation; here it
//! is the host's stopping distance at its current speed.

use v2x_types::BasicSafetyMessage;

use super::HostVehicle;
use crate::geometry::{is_behind, stopping_distance};

/// Warn iff the remote vehicle is hard braking, not behind us, and within our
/// stopping distance. Own echoes are dropped by the caller.
pub fn warning(rv: &BasicSafetyMessage, hv: &HostVehicle) -> bool {
    if !rv.event_hard_braking() {
        return false;
    }
    if is_behind(&hv.position, &rv.position, hv.heading) {
        return false;
    }
    hv.position.dist(&rv.position) <= stopping_distance(&hv.speed)
}

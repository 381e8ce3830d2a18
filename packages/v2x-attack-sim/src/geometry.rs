//! geometry.rs — Geometry & kinematics kernel
//!
//! Pure functions shared by the attack strategies (ghost placement, coupled
//! heading/yaw-rate falsification) and the hazard detectors (EEBL ground truth).
//!
//! Frame: X = east, Y = north, heading 0 = east, counter-clockwise positive.

use v2x_types::{wrap_angle, Coord};

/// Perception-to-reaction time, seconds
pub const PERCEPTION_REACTION_TIME_S: f64 = 1.5;
/// Tyre/road friction coefficient μ
pub const FRICTION_COEFFICIENT: f64 = 0.7;
/// m/s²
pub const GRAVITY_MPS2: f64 = 9.8;

/// Length of the reference leg used by the side-of-line test (meters)
const REFERENCE_LEG_M: f64 = 5.0;

/// Unit vector pointing along `heading`
pub fn heading_unit(heading: f64) -> Coord {
    Coord::planar(heading.cos(), heading.sin())
}

/// Signed side of `p2` relative to the directed line p0 → p1.
/// > 0: left of the line, < 0: right, 0: on the line.
fn side(p0: &Coord, p1: &Coord, p2: &Coord) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p1.y - p0.y) * (p2.x - p0.x)
}

/// Is `other` behind an observer at `observer` travelling along `heading`?
///
/// The heading (degrees, normalised to [0, 360)) selects one of eight cases.
/// Cardinal headings are exact matches and test against the line through the
/// observer perpendicular to travel. Diagonal octants test against the
/// horizontal line through the observer: a vehicle moving "up" has the lower
/// half-plane behind it and vice versa. Points exactly on the reference line
/// are never behind.
pub fn is_behind(observer: &Coord, other: &Coord, heading: f64) -> bool {
    let angle = wrap_angle(heading).to_degrees().rem_euclid(360.0);
    let (x0, y0) = (observer.x, observer.y);

    if angle == 0.0 {
        // east bound: reference leg points north, behind = left (west)
        let p1 = Coord::planar(x0, y0 + REFERENCE_LEG_M);
        side(observer, &p1, other) > 0.0
    } else if angle < 90.0 {
        // north-east bound: leg points east, behind = right (south)
        let p1 = Coord::planar(x0 + REFERENCE_LEG_M, y0);
        side(observer, &p1, other) < 0.0
    } else if angle == 90.0 {
        // north bound: leg points west, behind = left (south)
        let p1 = Coord::planar(x0 - REFERENCE_LEG_M, y0);
        side(observer, &p1, other) > 0.0
    } else if angle < 180.0 {
        // north-west bound: leg points west, behind = left (south)
        let p1 = Coord::planar(x0 - REFERENCE_LEG_M, y0);
        side(observer, &p1, other) > 0.0
    } else if angle == 180.0 {
        // west bound: leg points north, behind = right (east)
        let p1 = Coord::planar(x0, y0 + REFERENCE_LEG_M);
        side(observer, &p1, other) < 0.0
    } else if angle < 270.0 {
        // south-west bound: leg points west, behind = right (north)
        let p1 = Coord::planar(x0 - REFERENCE_LEG_M, y0);
        side(observer, &p1, other) < 0.0
    } else if angle == 270.0 {
        // south bound: leg points east, behind = left (north)
        let p1 = Coord::planar(x0 + REFERENCE_LEG_M, y0);
        side(observer, &p1, other) > 0.0
    } else {
        // south-east bound: leg points east, behind = left (north)
        let p1 = Coord::planar(x0 + REFERENCE_LEG_M, y0);
        side(observer, &p1, other) > 0.0
    }
}

/// Total stopping distance for a velocity vector:
/// D = v·t_pr + v² / (2·μ·g)
pub fn stopping_distance(speed: &Coord) -> f64 {
    let v = speed.length();
    let reaction = v * PERCEPTION_REACTION_TIME_S;
    let braking = (v * v) / (2.0 * FRICTION_COEFFICIENT * GRAVITY_MPS2);
    reaction + braking
}

/// Integrate yaw rate over `elapsed_s` and wrap into [0, 2π).
/// Negative results wrap too.
pub fn advance_heading(prev_heading: f64, yaw_rate: f64, elapsed_s: f64) -> f64 {
    wrap_angle(prev_heading + yaw_rate * elapsed_s)
}

/// `base` moved `distance` meters along `heading`
pub fn offset_along_heading(base: &Coord, heading: f64, distance: f64) -> Coord {
    base.add(&heading_unit(heading).scale(distance))
}

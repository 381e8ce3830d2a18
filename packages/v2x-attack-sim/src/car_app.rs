//! car_app.rs — Per-vehicle V2X application
//!
//! Owns everything one simulated vehicle does on the radio side:
//! - Populates its genuine beacon from mobility state
//! - Decides once, at start-up, whether it is malicious
//! - Falsifies its own beacons or fabricates ghosts aimed at the senders it hears
//! - Runs the EEBL and IMA detectors on received records and emits trace rows

use std::f64::consts::{PI, TAU};

use rand::Rng;
use tracing::{debug, info};
use v2x_types::{wrap_angle, BasicSafetyMessage, Coord, BROADCAST_ID, MSG_COUNT_MODULUS};

use crate::attack::{
    AttackContext, AttackDispatcher, AttackLatches, AttackSelection, AttackType, SelfOutcome,
    WorldBounds,
};
use crate::config::{AttackConfig, FullConfig};
use crate::road_map::RoadMap;
use crate::safetyapps::{eebl, ima, HostVehicle};
use crate::trace::TraceRecord;
use crate::vehicle_sim::VehicleState;

/// Run-wide settings every vehicle application reads
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub bsm_data: String,
    pub beacon_interval_s: f64,
    pub comm_range_m: f64,
    pub ima_interval_s: f64,
    pub bounds: WorldBounds,
    pub attack: AttackConfig,
}

impl From<&FullConfig> for AppSettings {
    fn from(cfg: &FullConfig) -> Self {
        Self {
            bsm_data: cfg.simulation.bsm_data.clone(),
            beacon_interval_s: cfg.simulation.beacon_interval_s,
            comm_range_m: cfg.simulation.comm_range_m,
            ima_interval_s: cfg.simulation.ima_interval_s,
            bounds: cfg.world,
            attack: cfg.attack.clone(),
        }
    }
}

/// Result of handing a received record to a vehicle
#[derive(Debug, Clone, PartialEq)]
pub enum Reception {
    Ignored,
    /// A malicious vehicle answered with a ghost aimed at the sender
    Ghost(BasicSafetyMessage),
    /// A genuine vehicle evaluated the record
    Trace(TraceRecord),
}

// ── Yaw rate ──────────────────────────────────────────────────────────────────

/// Yaw rate from successive mobility headings
#[derive(Debug, Clone, Default)]
pub struct YawRateEstimator {
    last: Option<(f64, f64)>,
    yaw_rate: f64,
}

impl YawRateEstimator {
    pub fn update(&mut self, now: f64, heading: f64) -> f64 {
        if let Some((t, h)) = self.last {
            let dt = now - t;
            if dt > 0.0 {
                self.yaw_rate = signed_delta(heading - h) / dt;
            }
        }
        self.last = Some((now, heading));
        self.yaw_rate
    }

    pub fn yaw_rate(&self) -> f64 {
        self.yaw_rate
    }
}

/// Angle difference folded into (−π, π]
fn signed_delta(d: f64) -> f64 {
    let w = wrap_angle(d);
    if w > PI { w - TAU } else { w }
}

// ── Application ───────────────────────────────────────────────────────────────

struct MaliciousState {
    attack: AttackType,
    dispatcher: AttackDispatcher,
    prev_heading: Option<f64>,
    prev_beacon_time: Option<f64>,
}

pub struct CarApp {
    pub id: u32,
    settings: AppSettings,
    malicious: Option<MaliciousState>,
    beacon_interval_s: f64,
    next_beacon_at: f64,
    generated: u32,
    yaw: YawRateEstimator,
    next_ima_at: f64,
    approaching_intersection: bool,
    junction_pos: Coord,
    pub eebl_warnings: u64,
    pub ima_warnings: u64,
}

impl CarApp {
    /// Create the application for vehicle `id` and run the malicious election.
    pub fn new(
        id: u32,
        settings: &AppSettings,
        run_latches: &AttackLatches,
        rng: &mut impl Rng,
    ) -> Self {
        let attack_cfg = &settings.attack;
        let p = attack_cfg.effective_probability();
        let elected = attack_cfg.selection != AttackSelection::NoAttack && p >= rng.gen::<f64>();

        let malicious = if elected {
            let attack = match attack_cfg.selection {
                AttackSelection::Fixed(kind) => kind,
                _ => AttackType::random(rng),
            };
            let latches = AttackLatches::for_vehicle(attack_cfg.latch_scope, run_latches);
            let dispatcher = AttackDispatcher::new(id, latches, attack_cfg.n_dos_messages, rng.gen());
            info!("😈 Vehicle {id} is malicious: {attack} ({})", String::from(attack_cfg.selection));
            Some(MaliciousState { attack, dispatcher, prev_heading: None, prev_beacon_time: None })
        } else {
            None
        };

        // random first beacon offset so vehicles do not transmit in lockstep
        let next_beacon_at = rng.gen_range(0.0..settings.beacon_interval_s);

        Self {
            id,
            settings: settings.clone(),
            malicious,
            beacon_interval_s: settings.beacon_interval_s,
            next_beacon_at,
            generated: 0,
            yaw: YawRateEstimator::default(),
            next_ima_at: settings.ima_interval_s,
            approaching_intersection: false,
            junction_pos: Coord::ZERO,
            eebl_warnings: 0,
            ima_warnings: 0,
        }
    }

    pub fn is_malicious(&self) -> bool {
        self.malicious.is_some()
    }

    /// Currently active attack, `None` for genuine vehicles
    pub fn attack(&self) -> Option<AttackType> {
        self.malicious.as_ref().map(|m| m.attack)
    }

    pub fn beacon_interval_s(&self) -> f64 {
        self.beacon_interval_s
    }

    pub fn approaching_intersection(&self) -> bool {
        self.approaching_intersection
    }

    pub fn junction_pos(&self) -> Coord {
        self.junction_pos
    }

    pub fn ghost_identities(&self) -> usize {
        self.malicious.as_ref().map_or(0, |m| m.dispatcher.registry().len())
    }

    // ── Per-tick hooks ────────────────────────────────────────────────────

    /// Refresh mobility-derived state: yaw rate every tick, junction every IMA interval.
    pub fn observe(&mut self, vehicle: &VehicleState, now: f64, map: &RoadMap) {
        self.yaw.update(now, vehicle.heading);

        if now + 1e-9 >= self.next_ima_at {
            match map.junction_for(&vehicle.road_id) {
                Some(j) => {
                    self.approaching_intersection = true;
                    self.junction_pos = j;
                }
                None => self.approaching_intersection = false,
            }
            self.next_ima_at += self.settings.ima_interval_s;
        }
    }

    pub fn beacon_due(&self, now: f64) -> bool {
        self.next_beacon_at <= now + 1e-9
    }

    /// The genuine beacon for this instant
    pub fn populate(&self, vehicle: &VehicleState, now: f64) -> BasicSafetyMessage {
        let mut bsm = BasicSafetyMessage::new(self.id);
        bsm.recipient_id = BROADCAST_ID;
        bsm.generation_time = now;
        bsm.set_msg_count(self.generated % MSG_COUNT_MODULUS);
        bsm.data = self.settings.bsm_data.clone();
        bsm.position = vehicle.position;
        bsm.speed = vehicle.velocity();
        bsm.set_heading(vehicle.heading);
        bsm.yaw_rate = self.yaw.yaw_rate();
        bsm.length = vehicle.length_m;
        bsm.width = vehicle.width_m;
        bsm.height = vehicle.height_m;
        bsm.set_acceleration(vehicle.acceleration_mps2);
        bsm
    }

    fn attack_context(&self, vehicle: &VehicleState, now: f64, m: &MaliciousState) -> AttackContext {
        let speed = vehicle.velocity();
        AttackContext {
            now,
            prev_heading: m.prev_heading.unwrap_or(vehicle.heading),
            prev_beacon_time: m.prev_beacon_time,
            bounds: self.settings.bounds,
            ghost_distance: self.settings.comm_range_m,
            approaching_intersection: self.approaching_intersection,
            junction_pos: self.junction_pos,
            own_speed: speed,
            offsets: self.settings.attack.offsets,
        }
    }

    /// Produce this vehicle's beacon if one is due. `None` when no beacon is
    /// due or the attack suppressed it. Each call consumes at most one
    /// schedule slot; callers loop on `beacon_due` to catch up.
    pub fn send_beacon(&mut self, vehicle: &VehicleState, now: f64) -> Option<BasicSafetyMessage> {
        if !self.beacon_due(now) {
            return None;
        }
        let mut bsm = self.populate(vehicle, now);

        let outcome = match self.malicious.take() {
            Some(mut m) => {
                if m.prev_heading.is_none() {
                    m.prev_heading = Some(bsm.heading());
                }
                if self.settings.attack.selection == AttackSelection::RandomEachBeacon {
                    m.attack = AttackType::random(m.dispatcher.rng());
                }
                let ctx = self.attack_context(vehicle, now, &m);
                let outcome =
                    m.dispatcher.attack_own(m.attack, &ctx, &mut bsm, &mut self.beacon_interval_s);
                m.prev_beacon_time = Some(now);
                if outcome == SelfOutcome::Transmit {
                    m.prev_heading = Some(bsm.heading());
                }
                self.malicious = Some(m);
                outcome
            }
            None => SelfOutcome::Transmit,
        };

        self.next_beacon_at += self.beacon_interval_s;

        match outcome {
            SelfOutcome::Transmit => {
                self.generated = self.generated.wrapping_add(1);
                Some(bsm)
            }
            SelfOutcome::Suppress => None,
        }
    }

    /// Handle a record received while this vehicle is in `vehicle` state.
    pub fn on_bsm(&mut self, rv: &BasicSafetyMessage, vehicle: &VehicleState, now: f64) -> Reception {
        if rv.sender_id == self.id {
            return Reception::Ignored;
        }

        if let Some(mut m) = self.malicious.take() {
            let reception = if rv.is_ghost() || !m.attack.is_ghost() {
                Reception::Ignored
            } else {
                let template = self.populate(vehicle, now);
                let ctx = self.attack_context(vehicle, now, &m);
                match m.dispatcher.fabricate_ghost(m.attack, rv, &template, &ctx) {
                    Some(ghost) => {
                        debug!("Vehicle {} fabricated ghost {} for {}", self.id, ghost.sender_id, rv.sender_id);
                        Reception::Ghost(ghost)
                    }
                    None => Reception::Ignored,
                }
            };
            self.malicious = Some(m);
            return reception;
        }

        let hv = HostVehicle {
            id: self.id,
            position: vehicle.position,
            heading: vehicle.heading,
            speed: vehicle.velocity(),
        };
        let eebl_warn = eebl::warning(rv, &hv);
        let ima_warn = ima::warning(rv, &hv, self.approaching_intersection, &self.junction_pos);
        self.eebl_warnings += eebl_warn as u64;
        self.ima_warnings += ima_warn as u64;

        let hv_bsm = self.populate(vehicle, now);
        Reception::Trace(TraceRecord::new(rv, &hv_bsm, now, eebl_warn, ima_warn))
    }
}

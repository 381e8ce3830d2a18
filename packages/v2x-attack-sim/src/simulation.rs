//! simulation.rs — Tick-driven run loop
//!
//! Each tick:
//!   1. Mobility advances every vehicle by dt
//!   2. Every application refreshes yaw rate and (periodically) its junction
//!   3. Due beacons are generated, falsified where the sender is malicious
//!   4. Records are delivered to every other vehicle within radio range of
//!      the physical transmitter; ghosts answered by malicious receivers are
//!      queued and delivered in the same tick, from the attacker's position
//!
//! No I/O here. The binary owns pacing, trace output and the UDP mirror.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;
use v2x_types::{BasicSafetyMessage, Coord};

use crate::attack::AttackLatches;
use crate::car_app::{AppSettings, CarApp, Reception};
use crate::config::FullConfig;
use crate::error::{Result, SimError};
use crate::road_map::RoadMap;
use crate::trace::TraceRecord;
use crate::vehicle_sim::{VehicleSim, VehicleState};

/// A record on the air, with the vehicle that physically sent it
#[derive(Debug, Clone)]
struct Transmission {
    transmitter: u32,
    origin: Coord,
    bsm: BasicSafetyMessage,
}

/// Everything one tick put on the air and every trace row it produced
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub transmitted: Vec<BasicSafetyMessage>,
    pub traces: Vec<TraceRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimStats {
    pub ticks: u64,
    pub beacons: u64,
    pub suppressed: u64,
    pub ghosts: u64,
    pub receptions: u64,
    pub eebl_warnings: u64,
    pub ima_warnings: u64,
}

pub struct Simulation {
    cfg: FullConfig,
    map: RoadMap,
    traffic: VehicleSim,
    apps: Vec<CarApp>,
    rng: StdRng,
    stats: SimStats,
}

impl Simulation {
    /// Build the traffic and the per-vehicle applications. Malicious
    /// election happens here, once per vehicle.
    pub fn new(cfg: &FullConfig, map: RoadMap) -> Result<Self> {
        cfg.validate()?;
        if map.is_empty() {
            return Err(SimError::InvalidConfig("road map has no roads".into()));
        }

        let mut rng = match cfg.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let traffic = VehicleSim::new(&cfg.traffic, map.roads(), &mut rng);
        let settings = AppSettings::from(cfg);
        let run_latches = AttackLatches::new();
        let apps: Vec<CarApp> = traffic
            .vehicles
            .iter()
            .map(|v| CarApp::new(v.id, &settings, &run_latches, &mut rng))
            .collect();

        let n_malicious = apps.iter().filter(|a| a.is_malicious()).count();
        info!(
            "🚗 {} vehicles on {} roads, {} malicious (selection {}, p={})",
            apps.len(),
            map.roads().len(),
            n_malicious,
            String::from(cfg.attack.selection),
            cfg.attack.effective_probability(),
        );

        Ok(Self { cfg: cfg.clone(), map, traffic, apps, rng, stats: SimStats::default() })
    }

    /// Seconds per tick at the configured update rate
    pub fn step_s(&self) -> f64 {
        1.0 / self.cfg.simulation.update_rate_hz
    }

    pub fn now(&self) -> f64 {
        self.traffic.t_elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.now() + 1e-9 >= self.cfg.simulation.duration_s
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn apps(&self) -> &[CarApp] {
        &self.apps
    }

    pub fn vehicles(&self) -> &[VehicleState] {
        &self.traffic.vehicles
    }

    pub fn malicious_count(&self) -> usize {
        self.apps.iter().filter(|a| a.is_malicious()).count()
    }

    /// Advance the whole world by `dt` seconds
    pub fn tick(&mut self, dt: f64) -> TickOutput {
        self.traffic.tick(dt, &mut self.rng);
        self.stats.ticks += 1;
        let now = self.traffic.t_elapsed;
        let vehicles = &self.traffic.vehicles;

        for (app, v) in self.apps.iter_mut().zip(vehicles) {
            app.observe(v, now, &self.map);
        }

        let mut air: VecDeque<Transmission> = VecDeque::new();
        for (app, v) in self.apps.iter_mut().zip(vehicles) {
            while app.beacon_due(now) {
                match app.send_beacon(v, now) {
                    Some(bsm) => {
                        self.stats.beacons += 1;
                        air.push_back(Transmission { transmitter: app.id, origin: v.position, bsm });
                    }
                    None => self.stats.suppressed += 1,
                }
            }
        }

        let range = self.cfg.simulation.comm_range_m;
        let mut out = TickOutput::default();
        while let Some(tx) = air.pop_front() {
            for (app, v) in self.apps.iter_mut().zip(vehicles) {
                if app.id == tx.transmitter || v.position.dist(&tx.origin) > range {
                    continue;
                }
                self.stats.receptions += 1;
                match app.on_bsm(&tx.bsm, v, now) {
                    Reception::Ignored => {}
                    Reception::Ghost(ghost) => {
                        self.stats.ghosts += 1;
                        air.push_back(Transmission { transmitter: app.id, origin: v.position, bsm: ghost });
                    }
                    Reception::Trace(row) => {
                        self.stats.eebl_warnings += row.eebl_warn as u64;
                        self.stats.ima_warnings += row.ima_warn as u64;
                        out.traces.push(row);
                    }
                }
            }
            out.transmitted.push(tx.bsm);
        }
        out
    }
}

//! vehicle_sim.rs — Traffic mobility model
//!
//! Vehicles drive along the mapped roads toward their junctions and
//! re-enter at the road start when they reach the end. Each vehicle has:
//! - A cruising speed drawn per vehicle around the configured target
//! - A gentle lateral lane weave, so headings and yaw rates vary
//! - Random hard-braking events followed by a recovery to cruising speed
//!
//! Pure math, no I/O. Acts as the mobility provider for the vehicle
//! applications: position, heading, velocity, acceleration, road id.

use std::f64::consts::TAU;

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use v2x_types::{wrap_angle, Coord};

use crate::config::TrafficConfig;
use crate::geometry::heading_unit;
use crate::road_map::Road;

// ── Vehicle state ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VehicleState {
    pub id: u32,
    pub road_index: usize,
    pub road_id: String,
    /// Distance travelled along the current road, meters
    pub progress_m: f64,
    pub position: Coord,
    /// Radians, [0, 2π)
    pub heading: f64,
    pub speed_mps: f64,
    /// Cruising speed for this vehicle
    pub base_speed_mps: f64,
    pub acceleration_mps2: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    /// End of the current hard-braking event, simulation seconds
    pub braking_until: Option<f64>,
    weave_phase: f64,
}

impl VehicleState {
    /// Velocity vector along the current heading
    pub fn velocity(&self) -> Coord {
        heading_unit(self.heading).scale(self.speed_mps)
    }
}

// ── Simulation tick ───────────────────────────────────────────────────────────

pub struct VehicleSim {
    pub vehicles: Vec<VehicleState>,
    pub t_elapsed: f64,
    roads: Vec<Road>,
    cfg: TrafficConfig,
}

impl VehicleSim {
    /// Spawn `cfg.n_vehicles` spread round-robin over `roads`.
    /// `roads` must not be empty.
    pub fn new(cfg: &TrafficConfig, roads: &[Road], rng: &mut impl Rng) -> Self {
        let mut sim = Self {
            vehicles: Vec::with_capacity(cfg.n_vehicles),
            t_elapsed: 0.0,
            roads: roads.to_vec(),
            cfg: cfg.clone(),
        };
        sim.spawn_vehicles(rng);
        sim
    }

    fn spawn_vehicles(&mut self, rng: &mut impl Rng) {
        if self.roads.is_empty() {
            return;
        }
        let half = self.cfg.speed_variance / 2.0;
        let lo = (self.cfg.target_speed_mps - half).max(0.5);
        let hi = (self.cfg.target_speed_mps + half).max(lo + f64::EPSILON);
        let speed_dist = Uniform::new_inclusive(lo, hi);
        let n = self.cfg.n_vehicles;
        let n_roads = self.roads.len();

        for i in 0..n {
            let road_index = i % n_roads;
            let slot = i / n_roads;
            let per_road = n.div_ceil(n_roads).max(1);
            let road = &self.roads[road_index];
            let spacing = road.length() / per_road as f64;
            let jitter = rng.gen_range(-0.25..=0.25) * spacing;
            let progress = (slot as f64 * spacing + jitter).clamp(0.0, road.length() - 1e-6);
            let base_speed = speed_dist.sample(rng);

            let mut v = VehicleState {
                id: i as u32 + 1,
                road_index,
                road_id: road.id.clone(),
                progress_m: progress,
                position: Coord::ZERO,
                heading: 0.0,
                speed_mps: base_speed,
                base_speed_mps: base_speed,
                acceleration_mps2: 0.0,
                length_m: self.cfg.length_m,
                width_m: self.cfg.width_m,
                height_m: self.cfg.height_m,
                braking_until: None,
                weave_phase: rng.gen_range(0.0..TAU),
            };
            self.place(&mut v);
            self.vehicles.push(v);
        }
    }

    /// Position and heading from road progress plus lane weave
    fn place(&self, v: &mut VehicleState) {
        let road = &self.roads[v.road_index];
        let road_heading = road.heading();
        let along = heading_unit(road_heading);
        let normal = Coord::planar(-along.y, along.x);

        let k = TAU / self.cfg.lane_weave_wavelength_m;
        let phase = k * v.progress_m + v.weave_phase;
        let lateral = self.cfg.lane_weave_m * phase.sin();
        let slope = self.cfg.lane_weave_m * k * phase.cos();

        v.position = road
            .start()
            .add(&along.scale(v.progress_m))
            .add(&normal.scale(lateral));
        v.heading = wrap_angle(road_heading + slope.atan());
    }

    /// Advance every vehicle by `dt` seconds
    pub fn tick(&mut self, dt: f64, rng: &mut impl Rng) {
        self.t_elapsed += dt;
        let now = self.t_elapsed;
        let brake_chance = (self.cfg.hard_brake_rate_hz * dt).clamp(0.0, 1.0);

        for i in 0..self.vehicles.len() {
            let mut v = self.vehicles[i].clone();

            if v.braking_until.is_none() && brake_chance > 0.0 && rng.gen_bool(brake_chance) {
                v.braking_until = Some(now + self.cfg.hard_brake_duration_s);
            }

            v.acceleration_mps2 = match v.braking_until {
                Some(until) if now < until => self.cfg.hard_brake_decel_mps2,
                _ => {
                    v.braking_until = None;
                    if v.speed_mps < v.base_speed_mps {
                        let gap = (v.base_speed_mps - v.speed_mps) / dt;
                        self.cfg.recovery_accel_mps2.min(gap)
                    } else {
                        0.0
                    }
                }
            };
            v.speed_mps = (v.speed_mps + v.acceleration_mps2 * dt).max(0.0);

            let road_len = self.roads[v.road_index].length();
            v.progress_m += v.speed_mps * dt;
            if v.progress_m >= road_len {
                v.progress_m %= road_len;
            }

            self.place(&mut v);
            self.vehicles[i] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road_map::RoadMap;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sim(cfg: TrafficConfig) -> (VehicleSim, StdRng) {
        let mut rng = StdRng::seed_from_u64(3);
        let map = RoadMap::bundled().unwrap();
        (VehicleSim::new(&cfg, map.roads(), &mut rng), rng)
    }

    #[test]
    fn spawns_configured_count_with_unique_ids() {
        let (s, _) = sim(TrafficConfig { n_vehicles: 9, ..Default::default() });
        assert_eq!(s.vehicles.len(), 9);
        let mut ids: Vec<_> = s.vehicles.iter().map(|v| v.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn vehicles_move_forward() {
        let (mut s, mut rng) = sim(TrafficConfig { hard_brake_rate_hz: 0.0, ..Default::default() });
        let before: Vec<_> = s.vehicles.iter().map(|v| v.position).collect();
        s.tick(0.1, &mut rng);
        for (v, p) in s.vehicles.iter().zip(before) {
            let step = v.position.dist(&p);
            assert!(step > 0.0 && step < v.speed_mps * 0.2 + 1.0);
        }
    }

    #[test]
    fn headings_stay_canonical_and_vary() {
        let (mut s, mut rng) = sim(TrafficConfig::default());
        let h0 = s.vehicles[0].heading;
        let mut changed = false;
        for _ in 0..50 {
            s.tick(0.1, &mut rng);
            for v in &s.vehicles {
                assert!((0.0..TAU).contains(&v.heading));
            }
            changed |= s.vehicles[0].heading != h0;
        }
        assert!(changed);
    }

    #[test]
    fn hard_braking_decelerates_then_recovers() {
        let cfg = TrafficConfig {
            n_vehicles: 1,
            hard_brake_rate_hz: 1000.0,
            hard_brake_duration_s: 0.5,
            ..Default::default()
        };
        let (mut s, mut rng) = sim(cfg.clone());
        s.tick(0.1, &mut rng);
        assert_eq!(s.vehicles[0].acceleration_mps2, cfg.hard_brake_decel_mps2);

        s.cfg.hard_brake_rate_hz = 0.0;
        for _ in 0..10 {
            s.tick(0.1, &mut rng);
        }
        assert!(s.vehicles[0].acceleration_mps2 >= 0.0);
        assert!(s.vehicles[0].braking_until.is_none());
    }

    #[test]
    fn vehicles_reenter_at_road_start() {
        let (mut s, mut rng) = sim(TrafficConfig { n_vehicles: 1, hard_brake_rate_hz: 0.0, ..Default::default() });
        for _ in 0..2000 {
            s.tick(0.1, &mut rng);
            let v = &s.vehicles[0];
            assert!(v.progress_m < s.roads[v.road_index].length());
        }
    }
}

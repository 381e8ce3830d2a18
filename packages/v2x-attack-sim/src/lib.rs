//! v2x_attack_sim — V2X beacon falsification simulator
//!
//! Vehicles broadcast Basic Safety Messages; a configurable share of them
//! falsify their own telemetry or fabricate ghost vehicles aimed at their
//! neighbours, and every genuine receiver runs the EEBL and IMA hazard
//! detectors against what it hears.

pub mod attack;
pub mod car_app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ghost_registry;
pub mod road_map;
pub mod safetyapps;
pub mod scenarios;
pub mod simulation;
pub mod trace;
pub mod udp_tx;
pub mod vehicle_sim;

pub use config::FullConfig;
pub use error::{Result, SimError};
pub use simulation::{SimStats, Simulation, TickOutput};

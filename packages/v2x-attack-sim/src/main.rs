//! main.rs — V2X attack simulator entry point
//!
//! Loads config + road map, builds the traffic and the per-vehicle
//! applications, then ticks the world until `duration_s`:
//!   - headless (default): as fast as possible
//!   - `--realtime`: paced by a tokio interval, scaled by `--speed`
//!
//! Every transmitted record can be mirrored over UDP (`--udp-addr`) and every
//! reception by a genuine vehicle is traced as JSONL (`--trace` or
//! `simulation.trace_path`). Mirror and trace failures are logged, never fatal.

use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::time::interval;
use tracing::{info, warn};

use v2x_attack_sim::config::FullConfig;
use v2x_attack_sim::error::SimError;
use v2x_attack_sim::road_map::RoadMap;
use v2x_attack_sim::scenarios::{self, PRESET_NAMES};
use v2x_attack_sim::simulation::Simulation;
use v2x_attack_sim::trace::TraceWriter;
use v2x_attack_sim::udp_tx::BeaconTransmitter;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "v2x-sim", about = "V2X beacon falsification simulator")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    /// Attack preset replacing the [attack] section
    #[arg(short, long)]
    preset: Option<String>,
    /// Simulated duration override, seconds
    #[arg(long)]
    duration: Option<f64>,
    /// RNG seed override
    #[arg(long)]
    seed: Option<u64>,
    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,
    /// Real-time speed multiplier (1.0 = real-time)
    #[arg(long, default_value = "1.0")]
    speed: f64,
    /// Mirror every transmitted record to this UDP address
    #[arg(long)]
    udp_addr: Option<String>,
    /// JSONL trace output override
    #[arg(long)]
    trace: Option<String>,
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "v2x_attack_sim=info,v2x_sim=info".into()),
        )
        .init();

    let args = Args::parse();
    let cfg = load_config(&args)?;

    let map = match &cfg.simulation.map_file {
        Some(path) => RoadMap::load(path).with_context(|| format!("loading road map {path}"))?,
        None => RoadMap::bundled().context("bundled road map is invalid")?,
    };

    info!(
        "🛰  V2X Simulator starting — {} vehicles, {}s at {} Hz, {} m radio range",
        cfg.traffic.n_vehicles,
        cfg.simulation.duration_s,
        cfg.simulation.update_rate_hz,
        cfg.simulation.comm_range_m,
    );

    let mut sim = Simulation::new(&cfg, map).context("initialising simulation")?;

    let mut trace = match &cfg.simulation.trace_path {
        Some(path) => match TraceWriter::create(path).await {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("Trace disabled, cannot open {path}: {e}");
                None
            }
        },
        None => None,
    };

    let mut mirror = match &args.udp_addr {
        Some(addr) => match BeaconTransmitter::new(addr) {
            Ok(tx) => {
                info!("📡 Mirroring beacons to udp://{addr}");
                Some(tx)
            }
            Err(e) => {
                warn!("UDP mirror disabled, bind failed: {e}");
                None
            }
        },
        None => None,
    };

    let dt = sim.step_s();
    let progress_every = ((10.0 / dt).round() as u64).max(1);
    let started = Instant::now();

    if args.realtime {
        let period = Duration::from_secs_f64(dt / args.speed.clamp(0.1, 100.0));
        let mut ticker = interval(period);
        info!("⏱ Real-time loop at {}× ({}ms tick)", args.speed, period.as_millis());
        while !sim.is_finished() {
            ticker.tick().await;
            step(&mut sim, dt, &mut trace, &mut mirror, progress_every).await;
        }
    } else {
        while !sim.is_finished() {
            step(&mut sim, dt, &mut trace, &mut mirror, progress_every).await;
        }
    }

    if let Some(w) = trace.as_mut() {
        w.flush().await;
        info!("📝 {} trace rows written", w.written());
    }

    let s = sim.stats();
    info!(
        "🏁 Done in {:.2}s wall — beacons={} suppressed={} ghosts={} receptions={} eebl={} ima={}",
        started.elapsed().as_secs_f64(),
        s.beacons,
        s.suppressed,
        s.ghosts,
        s.receptions,
        s.eebl_warnings,
        s.ima_warnings,
    );
    Ok(())
}

/// Config file (bundled fallback if unreadable) with preset and CLI overrides.
fn load_config(args: &Args) -> anyhow::Result<FullConfig> {
    let mut cfg = match FullConfig::load(&args.config) {
        Ok(cfg) => cfg,
        Err(SimError::ConfigRead { path, source }) => {
            warn!("Config {} unreadable ({source}), using bundled config", path.display());
            FullConfig::bundled().context("bundled config is invalid")?
        }
        Err(e) => return Err(e).with_context(|| format!("loading config {}", args.config)),
    };

    if let Some(name) = &args.preset {
        cfg.attack = scenarios::preset(name).with_context(|| {
            format!("unknown preset '{name}' (known: {})", PRESET_NAMES.join(", "))
        })?;
        info!("🎭 Preset '{name}' loaded");
    }
    if let Some(d) = args.duration {
        cfg.simulation.duration_s = d;
    }
    if args.seed.is_some() {
        cfg.simulation.seed = args.seed;
    }
    if args.trace.is_some() {
        cfg.simulation.trace_path = args.trace.clone();
    }

    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

async fn step(
    sim: &mut Simulation,
    dt: f64,
    trace: &mut Option<TraceWriter>,
    mirror: &mut Option<BeaconTransmitter>,
    progress_every: u64,
) {
    let out = sim.tick(dt);

    if let Some(tx) = mirror.as_mut() {
        tx.send_all(&out.transmitted);
    }
    if let Some(w) = trace.as_mut() {
        w.append(&out.traces).await;
    }

    let s = sim.stats();
    if s.ticks % progress_every == 0 {
        info!(
            "⏱ t={:.1}s | beacons={} | ghosts={} | eebl={} | ima={}",
            sim.now(),
            s.beacons,
            s.ghosts,
            s.eebl_warnings,
            s.ima_warnings,
        );
    }
}

//! End-to-end runs over the bundled map and config.

use v2x_attack_sim::attack::{AttackSelection, AttackType};
use v2x_attack_sim::config::FullConfig;
use v2x_attack_sim::road_map::RoadMap;
use v2x_attack_sim::scenarios;
use v2x_attack_sim::trace::{TraceRecord, TraceWriter};
use v2x_attack_sim::{Simulation, TickOutput};

fn bundled(seed: u64, duration_s: f64) -> FullConfig {
    let mut cfg = FullConfig::bundled().unwrap();
    cfg.simulation.seed = Some(seed);
    cfg.simulation.duration_s = duration_s;
    cfg
}

fn run(cfg: &FullConfig) -> (Simulation, Vec<TickOutput>) {
    let mut sim = Simulation::new(cfg, RoadMap::bundled().unwrap()).unwrap();
    let dt = sim.step_s();
    let mut outs = Vec::new();
    while !sim.is_finished() {
        outs.push(sim.tick(dt));
    }
    (sim, outs)
}

#[test]
fn every_preset_runs() {
    for name in scenarios::PRESET_NAMES {
        let mut cfg = bundled(21, 3.0);
        cfg.attack = scenarios::preset(name).unwrap();
        let (sim, _) = run(&cfg);
        assert!(sim.stats().beacons > 0, "{name}");
    }
}

#[test]
fn labels_on_air_are_genuine_or_known_attacks() {
    let mut cfg = bundled(5, 6.0);
    cfg.attack = scenarios::preset_random_each_beacon();
    let (_, outs) = run(&cfg);
    for bsm in outs.iter().flat_map(|o| &o.transmitted) {
        assert!(bsm.is_finite());
        if !bsm.is_genuine() {
            assert!(bsm.attack_type.parse::<AttackType>().is_ok(), "{}", bsm.attack_type);
        }
    }
}

#[test]
fn fake_eebl_ghosts_reach_their_victims() {
    let mut cfg = bundled(8, 5.0);
    cfg.attack = scenarios::preset_ghost_eebl();
    cfg.attack.malicious_probability = 0.5;
    let (sim, outs) = run(&cfg);
    assert!(sim.malicious_count() > 0);
    assert!(sim.stats().ghosts > 0);

    let rows: Vec<&TraceRecord> = outs.iter().flat_map(|o| &o.traces).collect();
    let hit = rows
        .iter()
        .any(|r| r.attack_type == "FakeEEBLJustAttack" && r.hv_id == r.target_id && r.eebl_warn);
    assert!(hit, "no victim warned by a fake EEBL ghost");
    assert!(sim.stats().eebl_warnings > 0);
}

#[test]
fn sudden_disappearance_silences_attackers() {
    let mut cfg = bundled(13, 4.0);
    cfg.attack.selection = AttackSelection::Fixed(AttackType::SuddenDisappearance);
    cfg.attack.malicious_probability = 0.5;
    let (sim, outs) = run(&cfg);

    let silent: Vec<u32> = sim.apps().iter().filter(|a| a.is_malicious()).map(|a| a.id).collect();
    assert!(!silent.is_empty());
    assert!(sim.stats().suppressed > 0);
    for bsm in outs.iter().flat_map(|o| &o.transmitted) {
        assert!(!silent.contains(&bsm.sender_id));
    }
}

#[test]
fn random_once_keeps_one_attack_per_vehicle() {
    let mut cfg = bundled(17, 4.0);
    cfg.attack.malicious_probability = 1.0;
    let (sim, outs) = run(&cfg);
    for app in sim.apps() {
        let label = app.attack().unwrap().label();
        let own: Vec<_> = outs
            .iter()
            .flat_map(|o| &o.transmitted)
            .filter(|b| b.sender_id == app.id && !b.is_genuine())
            .collect();
        assert!(own.iter().all(|b| b.attack_type == label), "vehicle {}", app.id);
    }
}

#[tokio::test]
async fn trace_file_holds_every_row() {
    let cfg = bundled(3, 2.0);
    let (_, outs) = run(&cfg);
    let rows: Vec<TraceRecord> = outs.into_iter().flat_map(|o| o.traces).collect();
    assert!(!rows.is_empty());

    let path = std::env::temp_dir().join(format!("v2x-run-{}.jsonl", std::process::id()));
    let mut w = TraceWriter::create(&path).await.unwrap();
    w.append(&rows).await;
    w.flush().await;

    let text = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(text.lines().count(), rows.len());
    let first: TraceRecord = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first, rows[0]);
    let _ = tokio::fs::remove_file(&path).await;
}

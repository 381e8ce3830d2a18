//! latch.rs — One-shot latches with an explicit owner
//!
//! A latch permits its effect exactly once and then stays fired. Clones share
//! the same flag, so the owner decides the scope by deciding who gets a clone:
//! one set per vehicle, or one set handed to every vehicle of a run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct OneShotLatch(Arc<AtomicBool>);

impl OneShotLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once across every clone of this latch.
    pub fn try_fire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_fired(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Who shares a set of attack latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatchScope {
    /// Each malicious vehicle owns its own latches
    #[default]
    PerVehicle,
    /// One latch set for the whole run; the first vehicle to fire wins
    PerRun,
}

/// The two latched effects in the attack engine.
#[derive(Debug, Clone, Default)]
pub struct AttackLatches {
    /// Beacon interval shortening (denial of service)
    pub dos: OneShotLatch,
    /// Ghost position freeze (fake EEBL, stop after attack)
    pub eebl_freeze: OneShotLatch,
}

impl AttackLatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch set for a newly created vehicle under `scope`.
    pub fn for_vehicle(scope: LatchScope, run_latches: &AttackLatches) -> AttackLatches {
        match scope {
            LatchScope::PerVehicle => AttackLatches::new(),
            LatchScope::PerRun => run_latches.clone(),
        }
    }
}

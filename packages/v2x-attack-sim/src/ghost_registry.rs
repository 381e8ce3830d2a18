//! ghost_registry.rs — Synthetic ghost identities
//!
//! Each (attacker, victim) pair gets a persistent fake sender id and its own
//! message counter, so a ghost looks like one vehicle across many beacons.
//! Owned by the attacking vehicle; never shared.

use std::collections::HashMap;

use rand::Rng;
use tracing::debug;
use v2x_types::MSG_COUNT_MODULUS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GhostIdentity {
    sender_id: u32,
    next_count: u32,
}

#[derive(Debug, Default)]
pub struct GhostRegistry {
    entries: HashMap<String, GhostIdentity>,
}

impl GhostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(attacker: u32, victim: u32) -> String {
        format!("{attacker}-{victim}")
    }

    fn entry(&mut self, attacker: u32, victim: u32, rng: &mut impl Rng) -> &mut GhostIdentity {
        self.entries.entry(Self::key(attacker, victim)).or_insert_with(|| {
            let sender_id = rng.gen_range(0..i32::MAX as u32);
            debug!("👻 ghost identity {} allocated for {}→{}", sender_id, attacker, victim);
            GhostIdentity { sender_id, next_count: 0 }
        })
    }

    /// Synthetic sender id for this pair, allocated on first use.
    pub fn get_or_create_identity(&mut self, attacker: u32, victim: u32, rng: &mut impl Rng) -> u32 {
        self.entry(attacker, victim, rng).sender_id
    }

    /// Current message count for this pair, then advance it modulo 128.
    pub fn next_sequence(&mut self, attacker: u32, victim: u32, rng: &mut impl Rng) -> u32 {
        let entry = self.entry(attacker, victim, rng);
        let count = entry.next_count;
        entry.next_count = (count + 1) % MSG_COUNT_MODULUS;
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn identity_is_stable_per_pair() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut reg = GhostRegistry::new();
        let a = reg.get_or_create_identity(1, 2, &mut rng);
        let b = reg.get_or_create_identity(1, 2, &mut rng);
        assert_eq!(a, b);
        assert!(a < i32::MAX as u32);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn pairs_are_independent() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut reg = GhostRegistry::new();
        reg.get_or_create_identity(1, 2, &mut rng);
        reg.get_or_create_identity(1, 3, &mut rng);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.next_sequence(1, 2, &mut rng), 0);
        assert_eq!(reg.next_sequence(1, 2, &mut rng), 1);
        assert_eq!(reg.next_sequence(1, 3, &mut rng), 0);
    }

    #[test]
    fn sequence_wraps_after_127() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut reg = GhostRegistry::new();
        let seen: Vec<u32> = (0..129).map(|_| reg.next_sequence(4, 9, &mut rng)).collect();
        let expected: Vec<u32> = (0..128).chain(std::iter::once(0)).collect();
        assert_eq!(seen, expected);
    }
}

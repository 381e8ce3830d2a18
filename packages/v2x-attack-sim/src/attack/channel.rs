//! channel.rs — Denial of service by beacon flooding

use tracing::info;
use v2x_types::BasicSafetyMessage;

use super::latch::OneShotLatch;
use super::{Attack, AttackType};

/// Shortens the sender's beacon interval by `n_messages` the first time the
/// latch fires. Later constructions leave the interval alone; `attack` only
/// stamps the label.
#[derive(Debug, Clone)]
pub struct DenialOfService {
    fired: bool,
}

impl DenialOfService {
    pub fn new(latch: &OneShotLatch, beacon_interval_s: &mut f64, n_messages: u32) -> Self {
        let fired = latch.try_fire();
        if fired {
            let before = *beacon_interval_s;
            *beacon_interval_s = before / f64::from(n_messages.max(1));
            info!(
                "📡 DoS latch fired: beacon interval {:.4}s -> {:.4}s (x{})",
                before, *beacon_interval_s, n_messages
            );
        }
        Self { fired }
    }

    /// Whether this construction changed the interval
    pub fn fired(&self) -> bool {
        self.fired
    }
}

impl Attack for DenialOfService {
    fn kind(&self) -> AttackType { AttackType::DenialOfService }

    fn attack(&mut self, bsm: &mut BasicSafetyMessage) {
        self.stamp(bsm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_divided_exactly_once() {
        let latch = OneShotLatch::new();
        let mut interval = 0.1;
        let first = DenialOfService::new(&latch, &mut interval, 10);
        assert!(first.fired());
        assert!((interval - 0.01).abs() < 1e-12);

        let second = DenialOfService::new(&latch, &mut interval, 10);
        assert!(!second.fired());
        assert!((interval - 0.01).abs() < 1e-12);
    }

    #[test]
    fn shared_latch_leaves_other_vehicle_untouched() {
        let latch = OneShotLatch::new();
        let (mut a, mut b) = (0.1, 0.1);
        DenialOfService::new(&latch, &mut a, 5);
        DenialOfService::new(&latch.clone(), &mut b, 5);
        assert!((a - 0.02).abs() < 1e-12);
        assert_eq!(b, 0.1);
    }

    #[test]
    fn attack_only_stamps_label() {
        let latch = OneShotLatch::new();
        let mut interval = 0.1;
        let mut msg = BasicSafetyMessage::new(1);
        let before = msg.clone();
        DenialOfService::new(&latch, &mut interval, 2).attack(&mut msg);
        assert_eq!(msg.attack_type, "DenialOfService");
        msg.attack_type = before.attack_type.clone();
        assert_eq!(msg, before);
    }
}

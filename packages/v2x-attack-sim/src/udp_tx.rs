//! udp_tx.rs — UDP mirror of everything put on the air
//!
//! Each transmitted record (genuine, falsified or ghost) is sent as one JSON
//! datagram in the `v2x_types` wire encoding. Send errors are logged and
//! never stop the simulation.

use std::net::UdpSocket;

use tracing::{debug, warn};
use v2x_types::BasicSafetyMessage;

pub struct BeaconTransmitter {
    socket: UdpSocket,
    target_addr: String,
    sent: u64,
}

impl BeaconTransmitter {
    /// Bind an ephemeral local socket that sends to `target_addr`.
    pub fn new(target_addr: &str) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(false)?;
        Ok(Self { socket, target_addr: target_addr.to_string(), sent: 0 })
    }

    pub fn target_addr(&self) -> &str {
        &self.target_addr
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn send_all(&mut self, records: &[BasicSafetyMessage]) {
        for bsm in records {
            self.send(bsm);
        }
    }

    fn send(&mut self, bsm: &BasicSafetyMessage) {
        let bytes = match bsm.to_wire() {
            Ok(b) => b,
            Err(e) => { warn!("UDP: serialize failed: {e}"); return; }
        };
        match self.socket.send_to(&bytes, &self.target_addr) {
            Ok(_) => {
                self.sent += 1;
                debug!("UDP → {} sender={} label={}", self.target_addr, bsm.sender_id, bsm.attack_type);
            }
            Err(e) => warn!("UDP: send to {} failed: {e}", self.target_addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn mirrors_records_as_wire_json() {
        let rx = UdpSocket::bind("127.0.0.1:0").unwrap();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut tx = BeaconTransmitter::new(&rx.local_addr().unwrap().to_string()).unwrap();

        let mut bsm = BasicSafetyMessage::new(4);
        bsm.attack_type = "RandomPosition".into();
        tx.send_all(&[bsm.clone()]);
        assert_eq!(tx.sent(), 1);

        let mut buf = [0u8; 4096];
        let n = rx.recv(&mut buf).unwrap();
        assert_eq!(BasicSafetyMessage::from_wire(&buf[..n]).unwrap(), bsm);
    }

    #[test]
    fn unreachable_target_is_not_fatal() {
        let mut tx = BeaconTransmitter::new("not-an-address").unwrap();
        tx.send_all(&[BasicSafetyMessage::new(1)]);
        assert_eq!(tx.sent(), 0);
    }
}

//! trace.rs — Per-reception trace for offline analysis
//!
//! One JSON line per record received by a genuine vehicle: both vehicles'
//! telemetry, the ground-truth label and both detector outputs.
//! Write failures are logged and never stop the run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use v2x_types::BasicSafetyMessage;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    // sorting columns
    pub rv_id: u32,
    pub hv_id: u32,
    pub target_id: u32,
    pub msg_generation_time: f64,
    pub msg_rcv_time: f64,

    // remote vehicle
    pub rv_msg_count: u8,
    pub rv_wsm_data: String,
    pub rv_pos_x: f64,
    pub rv_pos_y: f64,
    pub rv_pos_z: f64,
    pub rv_speed: f64,
    pub rv_accel: f64,
    pub rv_heading: f64,
    pub rv_yaw_rate: f64,
    pub rv_length: f64,
    pub rv_width: f64,
    pub rv_height: f64,

    // host vehicle
    pub hv_msg_count: u8,
    pub hv_wsm_data: String,
    pub hv_pos_x: f64,
    pub hv_pos_y: f64,
    pub hv_pos_z: f64,
    pub hv_speed: f64,
    pub hv_accel: f64,
    pub hv_heading: f64,
    pub hv_length: f64,
    pub hv_width: f64,
    pub hv_height: f64,

    // ground truth
    pub attack_type: String,

    // detector outputs
    pub eebl_warn: bool,
    pub ima_warn: bool,
}

impl TraceRecord {
    pub fn new(
        rv: &BasicSafetyMessage,
        hv: &BasicSafetyMessage,
        rcv_time: f64,
        eebl_warn: bool,
        ima_warn: bool,
    ) -> Self {
        Self {
            rv_id: rv.sender_id,
            hv_id: hv.sender_id,
            target_id: rv.recipient_id,
            msg_generation_time: rv.generation_time,
            msg_rcv_time: rcv_time,
            rv_msg_count: rv.msg_count(),
            rv_wsm_data: rv.data.clone(),
            rv_pos_x: rv.position.x,
            rv_pos_y: rv.position.y,
            rv_pos_z: rv.position.z,
            rv_speed: rv.speed.length(),
            rv_accel: rv.acceleration(),
            rv_heading: rv.heading(),
            rv_yaw_rate: rv.yaw_rate,
            rv_length: rv.length,
            rv_width: rv.width,
            rv_height: rv.height,
            hv_msg_count: hv.msg_count(),
            hv_wsm_data: hv.data.clone(),
            hv_pos_x: hv.position.x,
            hv_pos_y: hv.position.y,
            hv_pos_z: hv.position.z,
            hv_speed: hv.speed.length(),
            hv_accel: hv.acceleration(),
            hv_heading: hv.heading(),
            hv_length: hv.length,
            hv_width: hv.width,
            hv_height: hv.height,
            attack_type: rv.attack_type.clone(),
            eebl_warn,
            ima_warn,
        }
    }
}

/// Append-only JSONL trace file
pub struct TraceWriter {
    path: PathBuf,
    file: File,
    written: u64,
}

impl TraceWriter {
    /// Create (truncate) the trace file.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;
        info!("📝 Trace → {}", path.display());
        Ok(Self { path, file, written: 0 })
    }

    pub async fn append(&mut self, records: &[TraceRecord]) {
        if records.is_empty() {
            return;
        }
        let mut buf = String::new();
        for r in records {
            match serde_json::to_string(r) {
                Ok(line) => {
                    buf.push_str(&line);
                    buf.push('\n');
                }
                Err(e) => warn!("Trace: failed to serialize record: {e}"),
            }
        }
        match self.file.write_all(buf.as_bytes()).await {
            Ok(()) => self.written += records.len() as u64,
            Err(e) => warn!("Trace: write to {} failed: {e}", self.path.display()),
        }
    }

    pub async fn flush(&mut self) {
        if let Err(e) = self.file.flush().await {
            warn!("Trace: flush of {} failed: {e}", self.path.display());
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

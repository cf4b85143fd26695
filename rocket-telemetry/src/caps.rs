//! Sensor capability bits: "is the real device for this sensor up?"
//!
//! `rocket_c/src/sensors.c` kept these as three fields of one
//! process-global struct, written by whichever worker thread opened its
//! device and read only by `summaries.c` at shutdown. Per the
//! re-architecture noted in the design doc, each bit is its own
//! publish-once `Arc<AtomicBool>` instead — no shared struct, no lock,
//! and each worker only ever touches its own cell.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use telemetry_types::SensorId;

/// One atomic bit per sensor, set to `true` exactly once by the owning
/// worker if its real device opened successfully. Never reset.
#[derive(Clone)]
pub struct Capabilities {
    imu: Arc<AtomicBool>,
    baro: Arc<AtomicBool>,
    gps: Arc<AtomicBool>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self {
            imu: Arc::new(AtomicBool::new(false)),
            baro: Arc::new(AtomicBool::new(false)),
            gps: Arc::new(AtomicBool::new(false)),
        }
    }

    fn cell(&self, id: SensorId) -> &AtomicBool {
        match id {
            SensorId::Imu => &self.imu,
            SensorId::Baro => &self.baro,
            SensorId::Gps => &self.gps,
        }
    }

    /// Publishes that `id`'s real hardware loop is active. Called once
    /// by the owning worker right before it enters its read loop.
    pub fn publish(&self, id: SensorId) {
        self.cell(id).store(true, Ordering::Release);
    }

    pub fn is_real(&self, id: SensorId) -> bool {
        self.cell(id).load(Ordering::Acquire)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new()
    }
}

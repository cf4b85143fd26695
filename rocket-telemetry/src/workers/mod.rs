//! The three sensor workers: independent long-running producers, one
//! per `SensorId`, each with a real hardware loop and a deterministic
//! dummy fallback (§4.3).

pub mod baro;
pub mod gps;
pub mod imu;

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag the supervisor sets to ask every worker to wind down.
/// Each worker checks this once per loop iteration (§5); the channel
/// close is what actually unblocks a worker waiting on a full push.
pub type StopFlag = std::sync::Arc<AtomicBool>;

pub(crate) fn should_stop(stop: &StopFlag) -> bool {
    stop.load(Ordering::Relaxed)
}

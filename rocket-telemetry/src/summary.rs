//! Human-readable start/final summary reports, ported from
//! `rocket_c/src/summaries.c`. Out of scope for correctness testing
//! per spec §1 ("human-readable... summary reports" is named as an
//! external collaborator), but kept as a real module since the
//! supervisor's shutdown sequence calls into it at two fixed points.

use crate::activity::ActivityTracker;
use crate::caps::Capabilities;
use crate::config::Config;
use crate::logsink;
use telemetry_types::SensorId;

/// Logged once, right after every worker and the aggregator have been
/// spawned.
pub fn log_start_summary(config: &Config) {
    logsink::log_sys(
        "SUPERVISOR",
        &format!(
            "rocket-telemetry starting: imu=i2c-{}@0x{:02x} baro={}@{} gps={}@{} channel_capacity={} emit_interval={}s",
            config.imu_i2c_bus,
            config.imu_i2c_address,
            config.baro_serial_path,
            config.baro_baud,
            config.gps_serial_path,
            config.gps_baud,
            config.channel_capacity,
            config.emit_interval_seconds,
        ),
    );
}

/// Logged once, after every worker and the aggregator have been
/// joined — reports which sensors ended up running real hardware vs.
/// dummy streams, and whether the liftoff latch ever tripped.
pub fn log_final_summary(caps: &Capabilities, activity: &ActivityTracker, zero_signal_details: Option<(f64, f64)>) {
    let mut lines = Vec::new();
    for id in SensorId::ALL {
        let mode = if caps.is_real(id) { "real" } else { "dummy" };
        let seen = if activity.seen(id) { "yes" } else { "no" };
        lines.push(format!("{}={} seen={}", id.name(), mode, seen));
    }

    logsink::log_sys("SUPERVISOR", &format!("shutdown complete: {}", lines.join(", ")));

    match zero_signal_details {
        Some((timestamp, magnitude)) => {
            logsink::log_sys(
                "SUPERVISOR",
                &format!("liftoff signal latched at t={timestamp:.3} magnitude={magnitude:.4}g"),
            );
        }
        None => {
            logsink::log_sys("SUPERVISOR", "liftoff signal never latched this run");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_do_not_panic() {
        let config = Config::default();
        log_start_summary(&config);

        let caps = Capabilities::new();
        let activity = ActivityTracker::new();
        log_final_summary(&caps, &activity, None);
        log_final_summary(&caps, &activity, Some((11.5, 1.0)));
    }
}

//! Sensor registry and the per-sensor sample payloads.

use serde::{Deserialize, Serialize};

// ── Sensor registry ───────────────────────────────────────────────────────────

/// The closed set of sensors this aggregator ever talks to.
///
/// Ordering is significant: `Imu < Baro < Gps` is the canonical
/// enumeration order used for the expected-sensor list and the JSON
/// snapshot's `sensors` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorId {
    Imu,
    Baro,
    Gps,
}

impl SensorId {
    /// Canonical enumeration order, also the fixed field order in the
    /// JSON snapshot's `sensors` object.
    pub const ALL: [SensorId; 3] = [SensorId::Imu, SensorId::Baro, SensorId::Gps];

    /// Stable lowercase device name, as it appears in JSON and logs.
    pub const fn name(self) -> &'static str {
        match self {
            SensorId::Imu => "mpu6050",
            SensorId::Baro => "bmp180",
            SensorId::Gps => "neo6m",
        }
    }

    /// Human-readable tag used as the `source_tag` in log lines.
    pub const fn log_tag(self) -> &'static str {
        match self {
            SensorId::Imu => "MPU6050",
            SensorId::Baro => "BMP180",
            SensorId::Gps => "NEO6M",
        }
    }
}

// ── Per-sensor frames ─────────────────────────────────────────────────────────

/// One IMU reading: smoothed accel/gyro plus the complementary-filtered,
/// attitude-smoothed orientation estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuFrame {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
    pub dummy: bool,
}

impl ImuFrame {
    /// Accelerometer vector magnitude in g — the liftoff detector's input.
    pub fn accel_magnitude(&self) -> f64 {
        (self.ax * self.ax + self.ay * self.ay + self.az * self.az).sqrt()
    }
}

/// One barometric reading. `raw` carries the opaque line from the
/// co-processor when present; `temperature`/`pressure` are the parsed
/// values when the worker extracted them (dummy mode always sets both).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaroFrame {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub raw: Option<String>,
    pub dummy: bool,
}

/// One GPS fix. All fields are optional since a sentence may carry only
/// a subset (e.g. no fix yet, or a field the co-processor omitted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsFrame {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub fix_time: Option<String>,
    pub raw: Option<String>,
    pub dummy: bool,
}

/// Tagged union of the three frame kinds, always matching the
/// `SensorSample::sensor_id` it's attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorPayload {
    Imu(ImuFrame),
    Baro(BaroFrame),
    Gps(GpsFrame),
}

impl SensorPayload {
    pub fn dummy(&self) -> bool {
        match self {
            SensorPayload::Imu(f) => f.dummy,
            SensorPayload::Baro(f) => f.dummy,
            SensorPayload::Gps(f) => f.dummy,
        }
    }
}

/// One sample published by a worker: a timestamp plus the payload for
/// exactly the sensor that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub sensor_id: SensorId,
    pub timestamp: f64,
    pub payload: SensorPayload,
}

impl SensorSample {
    /// Build an IMU sample. The smart constructors below are the only
    /// way to produce a `SensorSample`, so a worker can never publish a
    /// payload variant that doesn't match its own `SensorId`.
    pub fn imu(timestamp: f64, frame: ImuFrame) -> Self {
        Self { sensor_id: SensorId::Imu, timestamp, payload: SensorPayload::Imu(frame) }
    }

    pub fn baro(timestamp: f64, frame: BaroFrame) -> Self {
        Self { sensor_id: SensorId::Baro, timestamp, payload: SensorPayload::Baro(frame) }
    }

    pub fn gps(timestamp: f64, frame: GpsFrame) -> Self {
        Self { sensor_id: SensorId::Gps, timestamp, payload: SensorPayload::Gps(frame) }
    }

    pub fn dummy(&self) -> bool {
        self.payload.dummy()
    }

    /// `Some` only for IMU samples — the liftoff detector's entry point.
    pub fn as_imu(&self) -> Option<&ImuFrame> {
        match &self.payload {
            SensorPayload::Imu(f) => Some(f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_imu_baro_gps() {
        assert!(SensorId::Imu < SensorId::Baro);
        assert!(SensorId::Baro < SensorId::Gps);
        assert_eq!(SensorId::ALL, [SensorId::Imu, SensorId::Baro, SensorId::Gps]);
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(SensorId::Imu.name(), "mpu6050");
        assert_eq!(SensorId::Baro.name(), "bmp180");
        assert_eq!(SensorId::Gps.name(), "neo6m");
    }

    #[test]
    fn smart_constructors_tag_payload_to_match_sensor_id() {
        let s = SensorSample::imu(0.0, ImuFrame {
            ax: 0.0, ay: 0.0, az: 1.0, gx: 0.0, gy: 0.0, gz: 0.0,
            pitch: 0.0, roll: 0.0, yaw: 0.0, dummy: false,
        });
        assert_eq!(s.sensor_id, SensorId::Imu);
        assert!(s.as_imu().is_some());
    }

    #[test]
    fn accel_magnitude_is_euclidean_norm() {
        let f = ImuFrame { ax: 0.0, ay: 0.0, az: 1.0, gx: 0.0, gy: 0.0, gz: 0.0, pitch: 0.0, roll: 0.0, yaw: 0.0, dummy: false };
        assert!((f.accel_magnitude() - 1.0).abs() < 1e-12);
    }
}

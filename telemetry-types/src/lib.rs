//! # telemetry-types
//!
//! Shared data model for the rocket avionics telemetry aggregator.
//!
//! These types are used by:
//! - `rocket-telemetry`: the sensor workers that produce them, the
//!   aggregator that fuses them, and the JSON encoder that serializes them
//!
//! ## Conventions
//!
//! - Angles in degrees, accelerations in g, angular rates in deg/s.
//! - Timestamps are seconds since the Unix epoch as `f64`.
//! - Every optional field on `BaroFrame`/`GpsFrame` is genuinely absent
//!   until a worker observes it — there is no sentinel zero value.

pub mod sensor;
pub mod time;

pub use sensor::{BaroFrame, GpsFrame, ImuFrame, SensorId, SensorPayload, SensorSample};
pub use time::format_iso8601_utc;

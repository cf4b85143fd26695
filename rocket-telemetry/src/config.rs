//! Device endpoints and tunables, centralized in one place per spec §6.
//!
//! There is no command-line parsing (a deliberate Non-goal) — a
//! `Config::default()` is the whole surface. Tests that need different
//! endpoints construct a `Config` directly.

#[derive(Debug, Clone)]
pub struct Config {
    /// I2C bus number for the IMU (`/dev/i2c-<bus>`).
    pub imu_i2c_bus: u8,
    /// 7-bit I2C slave address of the MPU6050.
    pub imu_i2c_address: u16,

    /// Serial device path for the barometric co-processor link.
    pub baro_serial_path: String,
    pub baro_baud: u32,
    pub baro_read_timeout: std::time::Duration,

    /// Serial device path for the GPS receiver.
    pub gps_serial_path: String,
    pub gps_baud: u32,
    pub gps_read_timeout: std::time::Duration,

    /// Message channel capacity (§3: default 128).
    pub channel_capacity: usize,
    /// Aggregator emit cadence in seconds (§4.4: default 0.5).
    pub emit_interval_seconds: f64,

    /// Radio parameters passed to `RadioDriver::init`.
    pub radio_channel: u8,
    pub radio_freq_hz: u32,
    pub radio_spreading_factor: u8,

    /// How often the supervisor's idle loop rechecks the stop flag.
    pub supervisor_poll_interval: std::time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            imu_i2c_bus: 1,
            imu_i2c_address: 0x68,

            baro_serial_path: "/dev/ttyUSB0".to_string(),
            baro_baud: 9600,
            baro_read_timeout: std::time::Duration::from_millis(200),

            gps_serial_path: "/dev/serial0".to_string(),
            gps_baud: 9600,
            gps_read_timeout: std::time::Duration::from_millis(400),

            channel_capacity: 128,
            emit_interval_seconds: 0.5,

            radio_channel: 0,
            radio_freq_hz: 433_000_000,
            radio_spreading_factor: 7,

            supervisor_poll_interval: std::time::Duration::from_millis(200),
        }
    }
}

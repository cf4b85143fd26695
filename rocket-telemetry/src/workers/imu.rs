//! IMU worker: MPU-6050 over I2C, calibration, complementary filter,
//! and attitude smoothing, ported from `rocket_c/src/sensor_workers.c`
//! and `rocket_c/src/sensors.c`. The register layout/offsets mirror
//! the MPU-6050 access pattern in the GY-521 driver in the reference
//! pack (`block_read` of a contiguous register range, big-endian
//! 16-bit pairs).

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use rppal::i2c::I2c;

use telemetry_types::{ImuFrame, SensorSample};

use crate::caps::Capabilities;
use crate::channel::SensorChannel;
use crate::clock;
use crate::config::Config;
use crate::error::DeviceOpenError;
use crate::logsink;
use crate::workers::{should_stop, StopFlag};

const POWER_MANAGEMENT_REGISTER: u8 = 0x6B;
const WAKE_COMMAND: u8 = 0x00;
const DATA_START_REGISTER: u8 = 0x3B;
const DATA_LEN: usize = 14;

const ACCEL_SCALE: f64 = 16384.0;
const GYRO_SCALE: f64 = 131.0;

const CALIBRATION_SAMPLES: u32 = 500;
const CALIBRATION_INTERVAL_SECONDS: f64 = 0.002;

const EMA_ALPHA: f64 = 0.3;
const COMPLEMENTARY_ALPHA: f64 = 0.96;
const ATTITUDE_SMOOTHING_ALPHA: f64 = 0.9;

const SAMPLE_PERIOD_SECONDS: f64 = 0.05;
const DUMMY_PHASE_STEP: f64 = 0.05;

#[derive(Default, Clone, Copy)]
struct Axes6 {
    ax: f64,
    ay: f64,
    az: f64,
    gx: f64,
    gy: f64,
    gz: f64,
}

struct Offsets {
    ax: f64,
    ay: f64,
    az: f64,
    gx: f64,
    gy: f64,
    gz: f64,
}

fn read_raw(i2c: &I2c) -> std::io::Result<Axes6> {
    let mut data = [0u8; DATA_LEN];
    i2c.block_read(DATA_START_REGISTER, &mut data)?;
    let be16 = |hi: u8, lo: u8| -> i16 { ((hi as i16) << 8) | lo as i16 };
    Ok(Axes6 {
        ax: be16(data[0], data[1]) as f64,
        ay: be16(data[2], data[3]) as f64,
        az: be16(data[4], data[5]) as f64,
        gx: be16(data[8], data[9]) as f64,
        gy: be16(data[10], data[11]) as f64,
        gz: be16(data[12], data[13]) as f64,
    })
}

fn open_device(config: &Config) -> Result<I2c, DeviceOpenError> {
    let mut i2c = I2c::with_bus(config.imu_i2c_bus)
        .map_err(|e| DeviceOpenError::Configuration(format!("i2c-{}: {e}", config.imu_i2c_bus)))?;
    i2c.set_slave_address(config.imu_i2c_address)
        .map_err(|e| DeviceOpenError::Configuration(format!("set_slave_address: {e}")))?;
    i2c.write(&[POWER_MANAGEMENT_REGISTER, WAKE_COMMAND])
        .map_err(|e| DeviceOpenError::Configuration(format!("wake write: {e}")))?;
    Ok(i2c)
}

fn calibrate(i2c: &I2c) -> std::io::Result<Offsets> {
    let mut sum = Axes6::default();
    for _ in 0..CALIBRATION_SAMPLES {
        let raw = read_raw(i2c)?;
        sum.ax += raw.ax;
        sum.ay += raw.ay;
        sum.az += raw.az;
        sum.gx += raw.gx;
        sum.gy += raw.gy;
        sum.gz += raw.gz;
        clock::sleep_seconds(CALIBRATION_INTERVAL_SECONDS);
    }
    let n = CALIBRATION_SAMPLES as f64;
    Ok(Offsets { ax: sum.ax / n, ay: sum.ay / n, az: sum.az / n, gx: sum.gx / n, gy: sum.gy / n, gz: sum.gz / n })
}

/// Carries the complementary filter's running attitude estimate and
/// the EMA smoothing state for all six raw channels, across samples.
struct FilterState {
    ema: Axes6,
    pitch: f64,
    roll: f64,
    yaw: f64,
    pitch_smooth: f64,
    roll_smooth: f64,
    last_sample_at: Instant,
}

impl FilterState {
    fn new() -> Self {
        Self {
            ema: Axes6::default(),
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
            pitch_smooth: 0.0,
            roll_smooth: 0.0,
            last_sample_at: Instant::now(),
        }
    }

    fn step(&mut self, raw: Axes6, offsets: &Offsets) -> ImuFrame {
        let accel = |raw: f64, offset: f64| (raw - offset) / ACCEL_SCALE;
        let gyro = |raw: f64, offset: f64| (raw - offset) / GYRO_SCALE;

        let x = Axes6 {
            ax: accel(raw.ax, offsets.ax),
            ay: accel(raw.ay, offsets.ay),
            az: accel(raw.az, offsets.az),
            gx: gyro(raw.gx, offsets.gx),
            gy: gyro(raw.gy, offsets.gy),
            gz: gyro(raw.gz, offsets.gz),
        };

        self.ema.ax = EMA_ALPHA * x.ax + (1.0 - EMA_ALPHA) * self.ema.ax;
        self.ema.ay = EMA_ALPHA * x.ay + (1.0 - EMA_ALPHA) * self.ema.ay;
        self.ema.az = EMA_ALPHA * x.az + (1.0 - EMA_ALPHA) * self.ema.az;
        self.ema.gx = EMA_ALPHA * x.gx + (1.0 - EMA_ALPHA) * self.ema.gx;
        self.ema.gy = EMA_ALPHA * x.gy + (1.0 - EMA_ALPHA) * self.ema.gy;
        self.ema.gz = EMA_ALPHA * x.gz + (1.0 - EMA_ALPHA) * self.ema.gz;

        let now = Instant::now();
        let mut dt = now.duration_since(self.last_sample_at).as_secs_f64();
        if dt <= 0.0 {
            dt = 0.001;
        }
        self.last_sample_at = now;

        let pitch_acc = (-self.ema.ax).atan2((self.ema.ay * self.ema.ay + self.ema.az * self.ema.az).sqrt()).to_degrees();
        let roll_acc = if self.ema.az.abs() < 0.01 { self.roll } else { self.ema.ay.atan2(self.ema.az).to_degrees() };

        self.pitch = COMPLEMENTARY_ALPHA * (self.pitch + self.ema.gx * dt) + (1.0 - COMPLEMENTARY_ALPHA) * pitch_acc;
        self.roll = COMPLEMENTARY_ALPHA * (self.roll + self.ema.gy * dt) + (1.0 - COMPLEMENTARY_ALPHA) * roll_acc;
        self.yaw += self.ema.gz * dt;

        self.pitch_smooth = ATTITUDE_SMOOTHING_ALPHA * self.pitch_smooth + (1.0 - ATTITUDE_SMOOTHING_ALPHA) * self.pitch;
        self.roll_smooth = ATTITUDE_SMOOTHING_ALPHA * self.roll_smooth + (1.0 - ATTITUDE_SMOOTHING_ALPHA) * self.roll;

        ImuFrame {
            ax: self.ema.ax,
            ay: self.ema.ay,
            az: self.ema.az,
            gx: self.ema.gx,
            gy: self.ema.gy,
            gz: self.ema.gz,
            pitch: self.pitch_smooth,
            roll: self.roll_smooth,
            yaw: self.yaw,
            dummy: false,
        }
    }
}

/// Runs the IMU worker to completion: tries the real device, falls
/// back to the dummy stream, and exits when the channel closes or the
/// stop flag is observed.
pub fn run(channel: Arc<SensorChannel>, stop: StopFlag, caps: Capabilities, config: Config) {
    match open_device(&config) {
        Ok(i2c) => {
            caps.publish(telemetry_types::SensorId::Imu);
            logsink::log_info("MPU6050", "device opened, starting calibration");
            match calibrate(&i2c) {
                Ok(offsets) => {
                    logsink::log_debug(
                        "MPU6050",
                        &format!(
                            "calibration offsets: accel=({:.1}, {:.1}, {:.1}) gyro=({:.1}, {:.1}, {:.1})",
                            offsets.ax, offsets.ay, offsets.az, offsets.gx, offsets.gy, offsets.gz,
                        ),
                    );
                    run_real_loop(&channel, &stop, &i2c, offsets);
                }
                Err(e) => {
                    logsink::log_error("MPU6050", &format!("calibration failed: {e}"));
                }
            }
        }
        Err(e) => {
            logsink::log_warn("MPU6050", &format!("device unavailable ({e}), running dummy stream"));
            run_dummy_loop(&channel, &stop);
        }
    }
}

fn run_real_loop(channel: &SensorChannel, stop: &StopFlag, i2c: &I2c, offsets: Offsets) {
    let mut filter = FilterState::new();
    while !should_stop(stop) {
        let raw = match read_raw(i2c) {
            Ok(raw) => raw,
            Err(e) => {
                logsink::log_error("MPU6050", &format!("read failed: {e}"));
                break;
            }
        };
        let frame = filter.step(raw, &offsets);
        let sample = SensorSample::imu(clock::now_seconds(), frame);
        if !channel.push(sample) {
            break;
        }
        clock::sleep_seconds(SAMPLE_PERIOD_SECONDS);
    }
}

fn run_dummy_loop(channel: &SensorChannel, stop: &StopFlag) {
    let mut phase: f64 = 0.0;
    while !should_stop(stop) {
        let frame = ImuFrame {
            ax: 0.01 * phase.sin(),
            ay: 0.01 * phase.cos(),
            az: 1.0,
            gx: 0.1 * phase.sin(),
            gy: 0.1 * phase.cos(),
            gz: 0.0,
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
            dummy: true,
        };
        let sample = SensorSample::imu(clock::now_seconds(), frame);
        if !channel.push(sample) {
            break;
        }
        phase += DUMMY_PHASE_STEP;
        clock::sleep_seconds(SAMPLE_PERIOD_SECONDS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_loop_produces_unit_gravity_on_z_axis() {
        let channel = Arc::new(SensorChannel::new(4));
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let stop2 = stop.clone();
        let channel2 = channel.clone();
        let handle = std::thread::spawn(move || run_dummy_loop(&channel2, &stop2));
        let sample = channel.pop(2.0).expect("dummy loop publishes promptly");
        assert!(sample.dummy());
        let frame = sample.as_imu().unwrap();
        assert_eq!(frame.az, 1.0);
        stop.store(true, Ordering::Relaxed);
        channel.close();
        let _ = handle.join();
    }

    #[test]
    fn filter_state_produces_finite_attitude_from_level_samples() {
        let mut filter = FilterState::new();
        let offsets = Offsets { ax: 0.0, ay: 0.0, az: 0.0, gx: 0.0, gy: 0.0, gz: 0.0 };
        let raw = Axes6 { ax: 0.0, ay: 0.0, az: ACCEL_SCALE, gx: 0.0, gy: 0.0, gz: 0.0 };
        let frame = filter.step(raw, &offsets);
        assert!(frame.pitch.is_finite());
        assert!(frame.roll.is_finite());
        assert!((frame.az - 1.0).abs() < 0.5);
    }
}

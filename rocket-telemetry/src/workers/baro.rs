//! Barometric worker: reads newline-terminated lines from the
//! co-processor's serial link, ported from
//! `rocket_c/src/sensor_workers.c`'s baro loop.

use std::io::{BufRead, BufReader};
use std::sync::Arc;

use telemetry_types::{BaroFrame, SensorId, SensorSample};

use crate::caps::Capabilities;
use crate::channel::SensorChannel;
use crate::clock;
use crate::config::Config;
use crate::error::DeviceOpenError;
use crate::logsink;
use crate::workers::{should_stop, StopFlag};

const DUMMY_CYCLE_SECONDS: f64 = 0.2;
const DUMMY_TEMPERATURE_START: f64 = 25.0;
const DUMMY_TEMPERATURE_STEP: f64 = 0.01;
const DUMMY_PRESSURE_START: f64 = 1013.25;
const DUMMY_PRESSURE_STEP: f64 = 0.02;

fn open_device(config: &Config) -> Result<Box<dyn serialport::SerialPort>, DeviceOpenError> {
    serialport::new(&config.baro_serial_path, config.baro_baud)
        .timeout(config.baro_read_timeout)
        .open()
        .map_err(|e| match e.kind {
            serialport::ErrorKind::NoDevice => DeviceOpenError::NotFound(config.baro_serial_path.clone()),
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                DeviceOpenError::PermissionDenied(config.baro_serial_path.clone())
            }
            _ => DeviceOpenError::Configuration(format!("{}: {e}", config.baro_serial_path)),
        })
}

/// Runs the barometric worker to completion.
pub fn run(channel: Arc<SensorChannel>, stop: StopFlag, caps: Capabilities, config: Config) {
    match open_device(&config) {
        Ok(port) => {
            caps.publish(SensorId::Baro);
            logsink::log_info("BMP180", "device opened");
            run_real_loop(&channel, &stop, port);
        }
        Err(e) => {
            logsink::log_warn("BMP180", &format!("device unavailable ({e}), running dummy stream"));
            run_dummy_loop(&channel, &stop);
        }
    }
}

fn run_real_loop(channel: &SensorChannel, stop: &StopFlag, port: Box<dyn serialport::SerialPort>) {
    let mut reader = BufReader::new(port);
    let mut line = String::new();
    while !should_stop(stop) {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => continue,
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\r', '\n']);
                if trimmed.is_empty() {
                    continue;
                }
                let frame = BaroFrame {
                    temperature: None,
                    pressure: None,
                    raw: Some(trimmed.to_string()),
                    dummy: false,
                };
                let sample = SensorSample::baro(clock::now_seconds(), frame);
                if !channel.push(sample) {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => {
                logsink::log_error("BMP180", &format!("read failed: {e}"));
                break;
            }
        }
    }
}

fn run_dummy_loop(channel: &SensorChannel, stop: &StopFlag) {
    let mut temperature = DUMMY_TEMPERATURE_START;
    let mut pressure = DUMMY_PRESSURE_START;
    while !should_stop(stop) {
        let raw = format!("T={temperature:.2},P={pressure:.2}");
        let frame = BaroFrame {
            temperature: Some(temperature),
            pressure: Some(pressure),
            raw: Some(raw),
            dummy: true,
        };
        let sample = SensorSample::baro(clock::now_seconds(), frame);
        if !channel.push(sample) {
            break;
        }
        temperature += DUMMY_TEMPERATURE_STEP;
        pressure += DUMMY_PRESSURE_STEP;
        clock::sleep_seconds(DUMMY_CYCLE_SECONDS);
    }
}

//! GPS worker: reads and parses `$GPGGA`/`$GPRMC` NMEA sentences off a
//! serial link, ported from `rocket_c/src/sensor_workers.c`'s GPS
//! loop. The field-index parser is hand-written rather than built on
//! the `nmea` crate so the exact field-index semantics in §4.3.3 stay
//! pinned and testable bit-for-bit.

use std::io::{BufRead, BufReader};
use std::sync::Arc;

use telemetry_types::{GpsFrame, SensorId, SensorSample};

use crate::caps::Capabilities;
use crate::channel::SensorChannel;
use crate::clock;
use crate::config::Config;
use crate::error::DeviceOpenError;
use crate::logsink;
use crate::workers::{should_stop, StopFlag};

const DUMMY_CYCLE_SECONDS: f64 = 0.5;
const DUMMY_LAT_START: f64 = 25.651;
const DUMMY_LAT_STEP: f64 = 1e-5;
const DUMMY_LON_START: f64 = -100.289;
const DUMMY_LON_STEP: f64 = -1e-5;
const DUMMY_ALTITUDE: f64 = 512.0;

const MIN_FIELDS: usize = 10;

fn open_device(config: &Config) -> Result<Box<dyn serialport::SerialPort>, DeviceOpenError> {
    serialport::new(&config.gps_serial_path, config.gps_baud)
        .timeout(config.gps_read_timeout)
        .open()
        .map_err(|e| match e.kind {
            serialport::ErrorKind::NoDevice => DeviceOpenError::NotFound(config.gps_serial_path.clone()),
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                DeviceOpenError::PermissionDenied(config.gps_serial_path.clone())
            }
            _ => DeviceOpenError::Configuration(format!("{}: {e}", config.gps_serial_path)),
        })
}

/// Converts an NMEA `ddmm.mmmm`-style coordinate with a hemisphere
/// letter into signed decimal degrees (§4.3.3, §8.7).
fn convert_coordinate(raw: f64, hemisphere: &str) -> f64 {
    let degrees = (raw / 100.0).floor();
    let minutes = raw - 100.0 * degrees;
    let value = degrees + minutes / 60.0;
    if hemisphere == "S" || hemisphere == "W" {
        -value
    } else {
        value
    }
}

/// Parses one `$GPGGA`/`$GPRMC` sentence into a `GpsFrame`. Returns
/// `None` if the sentence has too few fields or reports no fix.
fn parse_gga(line: &str) -> Option<GpsFrame> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let fix_quality: u32 = fields[6].parse().unwrap_or(0);
    if fix_quality == 0 {
        return None;
    }

    let time_field = fields[1];
    let lat_raw: Option<f64> = fields[2].parse().ok();
    let lon_raw: Option<f64> = fields[4].parse().ok();
    let altitude: Option<f64> = fields[9].parse().ok();

    let latitude = lat_raw.map(|raw| convert_coordinate(raw, fields[3]));
    let longitude = lon_raw.map(|raw| convert_coordinate(raw, fields[5]));

    let fix_time = if time_field.len() >= 6 {
        Some(format!("{}:{}:{}", &time_field[0..2], &time_field[2..4], &time_field[4..6]))
    } else {
        None
    };

    Some(GpsFrame {
        latitude,
        longitude,
        altitude,
        fix_time,
        raw: Some(line.to_string()),
        dummy: false,
    })
}

/// Runs the GPS worker to completion.
pub fn run(channel: Arc<SensorChannel>, stop: StopFlag, caps: Capabilities, config: Config) {
    match open_device(&config) {
        Ok(port) => {
            caps.publish(SensorId::Gps);
            logsink::log_info("NEO6M", "device opened");
            run_real_loop(&channel, &stop, port);
        }
        Err(e) => {
            logsink::log_warn("NEO6M", &format!("device unavailable ({e}), running dummy stream"));
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
                if !trimmed.starts_with("$GPGGA") && !trimmed.starts_with("$GPRMC") {
                    continue;
                }
                let Some(frame) = parse_gga(trimmed) else { continue };
                let sample = SensorSample::gps(clock::now_seconds(), frame);
                if !channel.push(sample) {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => {
                logsink::log_error("NEO6M", &format!("read failed: {e}"));
                break;
            }
        }
    }
}

fn run_dummy_loop(channel: &SensorChannel, stop: &StopFlag) {
    let mut lat = DUMMY_LAT_START;
    let mut lon = DUMMY_LON_START;
    while !should_stop(stop) {
        let frame = GpsFrame {
            latitude: Some(lat),
            longitude: Some(lon),
            altitude: Some(DUMMY_ALTITUDE),
            fix_time: Some("DUMMY".to_string()),
            raw: Some("$GPGGA,DUMMY".to_string()),
            dummy: true,
        };
        let sample = SensorSample::gps(clock::now_seconds(), frame);
        if !channel.push(sample) {
            break;
        }
        lat += DUMMY_LAT_STEP;
        lon += DUMMY_LON_STEP;
        clock::sleep_seconds(DUMMY_CYCLE_SECONDS);
    }
}

//! Deterministic, schema-stable JSON encoding of the telemetry snapshot.
//!
//! `serde_json::to_string_pretty` is the obvious idiomatic tool, but its
//! float serialization prints the shortest round-trippable
//! representation, not a fixed number of decimal places — §4.5 pins
//! `%.4f`/`%.3f`/`%.2f`/`%.6f`/`%.1f` per field, exactly like
//! `rocket_c/src/aggregator.c`'s `sb_append_format` calls. So this is a
//! small hand-rolled pretty-printer, string-builder style, the same
//! shape as the C original's `struct string_builder` but backed by a
//! `String`.

use telemetry_types::{format_iso8601_utc, BaroFrame, GpsFrame, ImuFrame, SensorId, SensorSample};

const INDENT: &str = "  ";

struct Builder {
    out: String,
}

impl Builder {
    fn new() -> Self {
        Self { out: String::with_capacity(512) }
    }

    fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn push_indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    fn push_number(&mut self, value: f64, decimals: usize) {
        self.out.push_str(&format!("{value:.decimals$}"));
    }

    fn push_escaped_string(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    self.out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

/// Encodes the full snapshot: `reported_at` plus each expected sensor's
/// latest sample (or `null` if none has arrived yet), in canonical
/// order. Pretty-printed with 2-space indentation and a trailing
/// newline.
pub fn encode_snapshot(reported_at: f64, latest: &[Option<SensorSample>; 3]) -> String {
    let mut b = Builder::new();
    b.push_str("{\n");
    b.push_indent(1);
    b.push_str("\"reported_at\": ");
    b.push_escaped_string(&format_iso8601_utc(reported_at));
    b.push_str(",\n");
    b.push_indent(1);
    b.push_str("\"sensors\": {\n");

    for (i, id) in SensorId::ALL.iter().enumerate() {
        let sample = &latest[i];
        b.push_indent(2);
        b.push_escaped_string(id.name());
        b.push_str(": ");
        match sample {
            Some(sample) => encode_sample(&mut b, sample),
            None => b.push_str("null"),
        }
        if i + 1 < SensorId::ALL.len() {
            b.push_str(",");
        }
        b.push_str("\n");
    }

    b.push_indent(1);
    b.push_str("}\n");
    b.push_str("}\n");
    b.out
}

fn encode_sample(b: &mut Builder, sample: &SensorSample) {
    match &sample.payload {
        telemetry_types::SensorPayload::Imu(frame) => encode_imu(b, sample.timestamp, frame),
        telemetry_types::SensorPayload::Baro(frame) => encode_baro(b, sample.timestamp, frame),
        telemetry_types::SensorPayload::Gps(frame) => encode_gps(b, sample.timestamp, frame),
    }
}

fn encode_imu(b: &mut Builder, timestamp: f64, frame: &ImuFrame) {
    b.push_str("{\n");
    b.push_indent(3);
    b.push_str("\"timestamp\": ");
    b.push_escaped_string(&format_iso8601_utc(timestamp));
    b.push_str(",\n");

    b.push_indent(3);
    b.push_str("\"accel_g\": {\"x\": ");
    b.push_number(frame.ax, 4);
    b.push_str(", \"y\": ");
    b.push_number(frame.ay, 4);
    b.push_str(", \"z\": ");
    b.push_number(frame.az, 4);
    b.push_str("},\n");

    b.push_indent(3);
    b.push_str("\"gyro_dps\": {\"x\": ");
    b.push_number(frame.gx, 3);
    b.push_str(", \"y\": ");
    b.push_number(frame.gy, 3);
    b.push_str(", \"z\": ");
    b.push_number(frame.gz, 3);
    b.push_str("},\n");

    b.push_indent(3);
    b.push_str("\"attitude_deg\": {\"pitch\": ");
    b.push_number(frame.pitch, 2);
    b.push_str(", \"roll\": ");
    b.push_number(frame.roll, 2);
    b.push_str(", \"yaw\": ");
    b.push_number(frame.yaw, 2);
    b.push_str("}");

    if frame.dummy {
        b.push_str(",\n");
        b.push_indent(3);
        b.push_str("\"dummy\": true\n");
    } else {
        b.push_str("\n");
    }
    b.push_indent(2);
    b.push_str("}");
}

fn encode_baro(b: &mut Builder, timestamp: f64, frame: &BaroFrame) {
    b.push_str("{\n");
    b.push_indent(3);
    b.push_str("\"timestamp\": ");
    b.push_escaped_string(&format_iso8601_utc(timestamp));
    b.push_str(",\n");

    b.push_indent(3);
    b.push_str("\"raw\": ");
    match &frame.raw {
        Some(raw) => b.push_escaped_string(raw),
        None => {
            b.push_str("{\"T\": ");
            push_optional_number(b, frame.temperature, 2);
            b.push_str(", \"P\": ");
            push_optional_number(b, frame.pressure, 2);
            b.push_str("}");
        }
    }

    if frame.dummy {
        b.push_str(",\n");
        b.push_indent(3);
        b.push_str("\"dummy\": true\n");
    } else {
        b.push_str("\n");
    }
    b.push_indent(2);
    b.push_str("}");
}

fn encode_gps(b: &mut Builder, timestamp: f64, frame: &GpsFrame) {
    b.push_str("{\n");
    b.push_indent(3);
    b.push_str("\"timestamp\": ");
    b.push_escaped_string(&format_iso8601_utc(timestamp));

    let mut fields: Vec<(&str, String)> = Vec::new();
    if let Some(lat) = frame.latitude {
        fields.push(("latitude", format!("{lat:.6}")));
    }
    if let Some(lon) = frame.longitude {
        fields.push(("longitude", format!("{lon:.6}")));
    }
    if let Some(alt) = frame.altitude {
        fields.push(("altitude", format!("{alt:.1}")));
    }
    if let Some(fix_time) = &frame.fix_time {
        let mut sb = Builder::new();
        sb.push_escaped_string(fix_time);
        fields.push(("fix_time", sb.out));
    }
    if let Some(raw) = &frame.raw {
        let mut sb = Builder::new();
        sb.push_escaped_string(raw);
        fields.push(("raw", sb.out));
    }

    for (name, value) in &fields {
        b.push_str(",\n");
        b.push_indent(3);
        b.push_str("\"");
        b.push_str(name);
        b.push_str("\": ");
        b.push_str(value);
    }

    if frame.dummy {
        b.push_str(",\n");
        b.push_indent(3);
        b.push_str("\"dummy\": true\n");
    } else {
        b.push_str("\n");
    }
    b.push_indent(2);
    b.push_str("}");
}

fn push_optional_number(b: &mut Builder, value: Option<f64>, decimals: usize) {
    match value {
        Some(v) => b.push_number(v, decimals),
        None => b.push_str("null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_types::{BaroFrame, GpsFrame, ImuFrame};

    fn empty_latest() -> [Option<SensorSample>; 3] {
        [None, None, None]
    }

    // S5 from spec §8.
    #[test]
    fn s5_snapshot_schema_with_only_imu_present() {
        let mut latest = empty_latest();
        latest[0] = Some(SensorSample::imu(1_609_459_200.0, ImuFrame {
            ax: 0.1234, ay: -0.5678, az: 0.9999,
            gx: 1.234, gy: 0.0, gz: 0.0,
            pitch: 1.23, roll: -4.56, yaw: 7.89,
            dummy: false,
        }));
        let json = encode_snapshot(1_609_459_200.0, &latest);

        assert!(json.starts_with("{\n  \"reported_at\": "));
        assert!(json.contains("\"sensors\": {"));
        assert!(json.contains("\"accel_g\": {\"x\": 0.1234, \"y\": -0.5678, \"z\": 0.9999}"));
        assert!(json.contains("\"bmp180\": null"));
        assert!(json.contains("\"neo6m\": null"));
        assert!(!json.contains("\"dummy\""));
    }

    #[test]
    fn baro_emits_raw_string_when_present() {
        let mut latest = empty_latest();
        latest[1] = Some(SensorSample::baro(5.0, BaroFrame {
            temperature: None,
            pressure: None,
            raw: Some("T=25.01,P=1013.27".to_string()),
            dummy: true,
        }));
        let json = encode_snapshot(5.0, &latest);
        assert!(json.contains("\"raw\": \"T=25.01,P=1013.27\""));
        assert!(json.contains("\"dummy\": true"));
    }

    #[test]
    fn baro_emits_nested_object_when_only_parsed_values_present() {
        let mut latest = empty_latest();
        latest[1] = Some(SensorSample::baro(5.0, BaroFrame {
            temperature: Some(24.5),
            pressure: Some(1012.3),
            raw: None,
            dummy: false,
        }));
        let json = encode_snapshot(5.0, &latest);
        assert!(json.contains("\"raw\": {\"T\": 24.50, \"P\": 1012.30}"));
    }

    #[test]
    fn gps_omits_absent_optional_fields() {
        let mut latest = empty_latest();
        latest[2] = Some(SensorSample::gps(9.0, GpsFrame {
            latitude: Some(25.651),
            longitude: None,
            altitude: None,
            fix_time: None,
            raw: None,
            dummy: false,
        }));
        let json = encode_snapshot(9.0, &latest);
        assert!(json.contains("\"latitude\": 25.651000"));
        assert!(!json.contains("\"longitude\""));
        assert!(!json.contains("\"altitude\""));
    }

    #[test]
    fn escapes_control_characters_in_raw_strings() {
        let mut latest = empty_latest();
        latest[1] = Some(SensorSample::baro(0.0, BaroFrame {
            temperature: None,
            pressure: None,
            raw: Some("a\tb\u{01}".to_string()),
            dummy: false,
        }));
        let json = encode_snapshot(0.0, &latest);
        assert!(json.contains("a\\tb\\u0001"));
    }

    #[test]
    fn output_is_pretty_printed_with_trailing_newline() {
        let json = encode_snapshot(0.0, &empty_latest());
        assert!(json.ends_with("}\n"));
        assert!(json.contains("  \"sensors\": {"));
    }
}

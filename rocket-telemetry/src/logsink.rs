//! The six-level log sink from spec §6, layered on top of `tracing`.
//!
//! `rocket_c/src/logger.c` serializes every call through one mutex so
//! interleaved lines never tear, and recognizes six levels where two
//! (`SYS`, `PAYLOAD`) have no equivalent in most logging frameworks.
//! `tracing`'s target string stands in for the C logger's free-form
//! `source_tag`, and `SYS`/`PAYLOAD` are modeled as `INFO`-level events
//! tagged on a reserved target so a `tracing-subscriber` filter can
//! still split them out if desired. `tracing`'s own per-subscriber
//! writer already serializes output, so there is no separate mutex
//! here.

use tracing::{debug, error, info, warn};

/// Installs a `tracing-subscriber` formatting layer reading
/// `RUST_LOG`, defaulting to `info` when unset.
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

pub fn log_info(tag: &str, message: &str) {
    info!(target: "rocket_telemetry", source = tag, "{message}");
}

pub fn log_warn(tag: &str, message: &str) {
    warn!(target: "rocket_telemetry", source = tag, "{message}");
}

pub fn log_error(tag: &str, message: &str) {
    error!(target: "rocket_telemetry", source = tag, "{message}");
}

pub fn log_debug(tag: &str, message: &str) {
    debug!(target: "rocket_telemetry", source = tag, "{message}");
}

/// SYS-level: process lifecycle milestones (startup, shutdown,
/// summaries) rather than per-sample chatter.
pub fn log_sys(tag: &str, message: &str) {
    info!(target: "rocket_telemetry::sys", source = tag, "{message}");
}

/// PAYLOAD: writes a banner line followed by the JSON snapshot
/// verbatim, matching `logger_payload`'s "===SNAPSHOT===\n<json>" shape.
pub fn log_payload(tag: &str, json: &str) {
    info!(target: "rocket_telemetry::payload", source = tag, "===SNAPSHOT===\n{json}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_calls_do_not_panic_without_a_subscriber_installed() {
        log_info("test", "hello");
        log_warn("test", "hello");
        log_error("test", "hello");
        log_debug("test", "hello");
        log_sys("test", "hello");
        log_payload("test", "{}");
    }
}

mod activity;
mod aggregator;
mod caps;
mod channel;
mod clock;
mod config;
mod error;
mod json;
mod logsink;
mod radio;
mod summary;
mod workers;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use activity::{ActivityTracker, ZeroSignal};
use caps::Capabilities;
use channel::SensorChannel;
use config::Config;
use error::SetupError;
use radio::{NullRadioDriver, RadioTransport};

fn main() -> ExitCode {
    logsink::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logsink::log_error("SUPERVISOR", &format!("fatal setup error: {e}"));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), SetupError> {
    let config = Config::default();
    let stop = Arc::new(AtomicBool::new(false));

    install_signal_handlers(&stop)?;

    let channel = Arc::new(SensorChannel::new(config.channel_capacity));
    let activity = Arc::new(ActivityTracker::new());
    let zero_signal = Arc::new(ZeroSignal::new());
    let caps = Capabilities::new();

    let radio = RadioTransport::new(
        Box::new(NullRadioDriver),
        config.radio_channel,
        config.radio_freq_hz,
        config.radio_spreading_factor,
    );

    let aggregator_handle = {
        let channel = channel.clone();
        let activity = activity.clone();
        let zero_signal = zero_signal.clone();
        let emit_interval = config.emit_interval_seconds;
        std::thread::Builder::new()
            .name("aggregator".into())
            .spawn(move || {
                let mut aggregator =
                    aggregator::Aggregator::new(channel, activity, zero_signal, Some(radio), emit_interval);
                aggregator.run();
            })
            .map_err(|source| SetupError::ThreadSpawn { worker: "aggregator", source })?
    };

    let imu_handle = spawn_worker("imu", &channel, &stop, &caps, &config, workers::imu::run)?;
    let baro_handle = spawn_worker("baro", &channel, &stop, &caps, &config, workers::baro::run)?;
    let gps_handle = spawn_worker("gps", &channel, &stop, &caps, &config, workers::gps::run)?;

    summary::log_start_summary(&config);

    while !stop.load(Ordering::Relaxed) {
        std::thread::sleep(config.supervisor_poll_interval);
    }

    channel.close();

    let _ = imu_handle.join();
    let _ = baro_handle.join();
    let _ = gps_handle.join();
    let _ = aggregator_handle.join();

    summary::log_final_summary(&caps, &activity, zero_signal.details());

    Ok(())
}

fn spawn_worker(
    name: &'static str,
    channel: &Arc<SensorChannel>,
    stop: &workers::StopFlag,
    caps: &Capabilities,
    config: &Config,
    worker: fn(Arc<SensorChannel>, workers::StopFlag, Capabilities, Config),
) -> Result<std::thread::JoinHandle<()>, SetupError> {
    let channel = channel.clone();
    let stop = stop.clone();
    let caps = caps.clone();
    let config = config.clone();
    std::thread::Builder::new()
        .name(name.into())
        .spawn(move || worker(channel, stop, caps, config))
        .map_err(|source| SetupError::ThreadSpawn { worker: name, source })
}

fn install_signal_handlers(stop: &Arc<AtomicBool>) -> Result<(), SetupError> {
    signal_hook::flag::register(signal_hook::consts::SIGINT, stop.clone())
        .map_err(|source| SetupError::SignalHandler { signal: "SIGINT", source })?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, stop.clone())
        .map_err(|source| SetupError::SignalHandler { signal: "SIGTERM", source })?;
    Ok(())
}

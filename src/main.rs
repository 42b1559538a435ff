mod config;
mod control;
mod error;
mod logger;
mod publisher;
mod recorder;
mod sensor;
mod telemetry;
mod types;
mod utils;

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;
use crossbeam_channel::unbounded;
use log::{debug, error, info, warn};

use config::{AppConfig, ConfigManager};
use error::InitError;
use publisher::{run_command_listener, ChannelPublisher, EventPublisher, MqttPublisher};
use recorder::{FileLog, Recorder};
use telemetry::TelemetryHub;
use utils::MonotonicClock;

fn main() {
    let manager = match ConfigManager::discover() {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let config = manager.get_config().clone();

    logger::init_logger(&config.runtime.log_level);
    match manager.config_path() {
        Some(path) => info!("WandHub starting with {}", path.display()),
        None => info!("WandHub starting with default configuration"),
    }

    if let Err(e) = run(config) {
        error!("Startup failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: AppConfig) -> Result<(), InitError> {
    // no telemetry is possible without the sensor
    let sensor = sensor::open_sensor(&config.sensor)?;

    let recorder = Recorder::start(FileLog::new(config.get_recording_path()), &config.recording)?;

    let (command_sender, command_receiver) = unbounded();
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let mut mqtt_client = None;

    let publisher: Box<dyn EventPublisher> = if config.mqtt.enabled {
        let (publisher, connection) = MqttPublisher::connect(&config.mqtt)?;
        let client = publisher.client();
        mqtt_client = Some(publisher.client());

        let mqtt_config = config.mqtt.clone();
        let mqtt_commands = command_sender.clone();
        let mqtt_shutdown = Arc::clone(&shutdown_signal);
        thread::spawn(move || {
            if let Err(e) = run_command_listener(connection, client, mqtt_config, mqtt_commands, mqtt_shutdown) {
                error!("MQTT thread failed: {}", e);
            }
        });
        Box::new(publisher)
    } else {
        let mut publisher = ChannelPublisher::new(config.runtime.listener_capacity);
        let events = publisher.subscribe();
        thread::spawn(move || {
            for event in events.iter() {
                debug!("[{}] {} @{}", event.event, event.data, event.id);
            }
        });
        info!("MQTT disabled, telemetry goes to the local log listener");
        Box::new(publisher)
    };

    let console_commands = command_sender.clone();
    thread::spawn(move || {
        control::run_console(io::stdin().lock(), io::stdout(), console_commands);
    });
    drop(command_sender);

    let mut hub = TelemetryHub::new(sensor, publisher, recorder, &config);
    let clock = MonotonicClock::start();
    control::run_control_loop(
        &mut hub,
        &command_receiver,
        &clock,
        Duration::from_millis(config.runtime.idle_sleep_ms),
        &shutdown_signal,
    );

    if let Some(client) = mqtt_client {
        if let Err(e) = client.try_disconnect() {
            warn!("MQTT disconnect request failed: {}", e);
        }
    }

    let status = hub.status();
    info!(
        "WandHub stopped: {} rows recorded, {} gyro / {} accelerometer / {} temperature events",
        status.rows_recorded,
        status.published.gyro,
        status.published.accelerometer,
        status.published.temperature
    );
    Ok(())
}

use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use crossbeam_channel::Sender;
use dotenv::dotenv;
use log::{debug, error, info, warn};
use rumqttc::{Client, Connection, Event, LastWill, MqttOptions, Packet, QoS};

use super::{EventPublisher, TelemetryEvent};
use crate::config::MqttConfig;
use crate::control::{dispatch, DispatchError, REPLY_TIMEOUT};
use crate::types::{Command, CommandRequest};

#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),
    #[error("Invalid MQTT setting {0}: {1}")]
    Setting(&'static str, String),
}

/// Publishes telemetry events on `<base_topic>/<stream>`
pub struct MqttPublisher {
    client: Client,
    base_topic: String,
    failures: u64,
}

impl MqttPublisher {
    /// Opens the broker session and subscribes to the command topic.
    /// The returned `Connection` must be driven by `run_command_listener`.
    pub fn connect(config: &MqttConfig) -> Result<(Self, Connection), MqttError> {
        dotenv().ok();

        let host = env::var("MQTT_HOST").unwrap_or_else(|_| config.broker.clone());
        let port = match env::var("MQTT_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|e| MqttError::Setting("MQTT_PORT", e.to_string()))?,
            Err(_) => config.port,
        };

        let mut mqtt_options = MqttOptions::new(config.client_id.clone(), host.clone(), port);

        if let (Ok(user), Ok(pass)) = (env::var("MQTT_USER"), env::var("MQTT_PASS")) {
            mqtt_options.set_credentials(user, pass);
        }

        mqtt_options
            .set_keep_alive(Duration::from_secs(config.keep_alive as u64))
            .set_max_packet_size(config.max_packet_size, config.max_packet_size)
            .set_last_will(LastWill::new(
                topic(&config.base_topic, "status"),
                "offline",
                QoS::AtLeastOnce,
                false,
            ));

        let (client, connection) = Client::new(mqtt_options, config.queue_capacity);
        client.subscribe(config.command_topic.clone(), QoS::AtLeastOnce)?;

        info!("MQTT session to {}:{} prepared, commands on '{}'", host, port, config.command_topic);

        Ok((
            Self {
                client,
                base_topic: config.base_topic.clone(),
                failures: 0,
            },
            connection,
        ))
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }
}

impl EventPublisher for MqttPublisher {
    fn broadcast(&mut self, stream: &str, payload: &str, timestamp: u64) {
        let event = TelemetryEvent::new(stream, payload, timestamp);
        let body = match serde_json::to_vec(&event) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to encode '{}' event: {}", stream, e);
                return;
            }
        };

        match self.client.try_publish(topic(&self.base_topic, stream), QoS::AtMostOnce, false, body) {
            Ok(()) => {
                if self.failures > 0 {
                    info!("MQTT publishing recovered after {} dropped events", self.failures);
                    self.failures = 0;
                }
            }
            Err(e) => {
                if self.failures == 0 {
                    warn!("MQTT publish of '{}' failed: {}", stream, e);
                }
                self.failures += 1;
            }
        }
    }
}

fn topic(base: &str, leaf: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), leaf)
}

/// Topic length prefix, packet id, fixed header and remaining length
const PUBLISH_OVERHEAD: usize = 16;

/// Replaces a reply that would exceed the packet limit with an error body.
/// An oversized publish makes rumqttc drop the whole connection.
fn sized_reply(reply_topic: &str, body: String, max_packet_size: usize) -> String {
    if body.len() + reply_topic.len() + PUBLISH_OVERHEAD <= max_packet_size {
        return body;
    }
    warn!(
        "Reply on '{}' is {} bytes, over the {} byte packet limit",
        reply_topic,
        body.len(),
        max_packet_size
    );
    serde_json::json!({
        "error": format!(
            "reply of {} bytes exceeds mqtt.max_packet_size ({})",
            body.len(),
            max_packet_size
        )
    })
    .to_string()
}

/// Drives the MQTT network loop and forwards remote commands to the control loop.
/// Replies to `fetch_log` and `status` go to `<base_topic>/log` and `<base_topic>/status`.
pub fn run_command_listener(
    mut connection: Connection,
    client: Client,
    config: MqttConfig,
    command_sender: Sender<Command>,
    shutdown_signal: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reconnect_delay = Duration::from_millis(config.reconnect_delay_ms);

    for event in connection.iter() {
        if shutdown_signal.load(Ordering::Relaxed) {
            info!("MQTT thread received shutdown signal, exiting gracefully");
            break;
        }

        match event {
            Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == config.command_topic => {
                let request = match CommandRequest::parse(&publish.payload) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!("Invalid command: {}", e);
                        continue;
                    }
                };

                info!("Remote command: {:?}", request);
                match dispatch(request, &command_sender, REPLY_TIMEOUT) {
                    Ok(Some((leaf, body))) => {
                        let reply_topic = topic(&config.base_topic, leaf);
                        let body = sized_reply(&reply_topic, body, config.max_packet_size);
                        if let Err(e) = client.try_publish(reply_topic, QoS::AtLeastOnce, false, body) {
                            warn!("Failed to publish '{}' reply: {}", leaf, e);
                        }
                    }
                    Ok(None) => {}
                    Err(DispatchError::Disconnected) => {
                        info!("Command channel disconnected, MQTT thread exiting");
                        break;
                    }
                    Err(DispatchError::NoReply) => warn!("Control loop did not answer in time"),
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Connected to MQTT broker");
                if let Err(e) = client.try_publish(topic(&config.base_topic, "status"), QoS::AtLeastOnce, false, "online") {
                    debug!("Failed to announce presence: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!("MQTT connection error: {}, retrying in {:?}", e, reconnect_delay);
                thread::sleep(reconnect_delay);
            }
        }
    }

    Ok(())
}

pub mod local;
pub mod mqtt;

pub use local::ChannelPublisher;
pub use mqtt::{MqttPublisher, run_command_listener};

use serde::{Deserialize, Serialize};

pub const GYRO_STREAM: &str = "gyro_readings";
pub const ACCEL_STREAM: &str = "accelerometer_readings";
pub const TEMPERATURE_STREAM: &str = "temperature_reading";

/// One broadcast event, shaped like a server-sent event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub event: String,
    pub data: String,
    pub id: u64,
}

impl TelemetryEvent {
    pub fn new(stream: &str, payload: &str, timestamp: u64) -> Self {
        Self {
            event: stream.to_string(),
            data: payload.to_string(),
            id: timestamp,
        }
    }
}

/// Fire-and-forget broadcast to whoever is listening
pub trait EventPublisher {
    fn broadcast(&mut self, stream: &str, payload: &str, timestamp: u64);
}

impl EventPublisher for Box<dyn EventPublisher> {
    fn broadcast(&mut self, stream: &str, payload: &str, timestamp: u64) {
        (**self).broadcast(stream, payload, timestamp)
    }
}

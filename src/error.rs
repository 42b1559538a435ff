use crate::config::ConfigError;
use crate::publisher::mqtt::MqttError;
use crate::recorder::LogError;
use crate::sensor::SensorError;

/// Startup failures. Any of these stops the service before the first tick.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Sensor: {0}")]
    Sensor(#[from] SensorError),
    #[error("Recording log: {0}")]
    Log(#[from] LogError),
    #[error("MQTT: {0}")]
    Mqtt(#[from] MqttError),
}

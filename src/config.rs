//! Application configuration: one section per concern, defaults for every
//! key, and validation before anything starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "wandhub.toml";
pub const CONFIG_PATH_ENV: &str = "WANDHUB_CONFIG";

/// rumqttc's default packet limit
pub const MIN_MQTT_PACKET_SIZE: usize = 10 * 1024;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sensor: SensorConfig,
    pub cadence: CadenceConfig,
    pub integration: IntegrationConfig,
    pub recording: RecordingConfig,
    pub mqtt: MqttConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Simulated,
    Replay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub kind: SensorKind,
    /// Recorded log to play back when `kind = "replay"`
    pub replay_path: String,
    pub simulated: SimulatedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedConfig {
    pub present: bool,
    pub seed: Option<u64>,
    pub gyro_noise: f32,
    pub accel_noise: f32,
    pub temperature_noise: f32,
    pub base_temperature: f32,
    pub swing_amplitude: f32,
    pub swing_period_reads: u64,
}

/// Periods of the four independent cadences, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub gyro_period_ms: u64,
    pub accel_period_ms: u64,
    pub temperature_period_ms: u64,
    pub recording_period_ms: u64,
}

/// Noise gate and scale for one gyro axis. Empirical tuning, not derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisParams {
    pub threshold: f32,
    pub divisor: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    pub x: AxisParams,
    pub y: AxisParams,
    pub z: AxisParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub path: String,
    pub start_armed: bool,
    /// Keep an existing log across restarts instead of starting fresh
    pub preserve_history: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub enabled: bool,
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub base_topic: String,
    pub command_topic: String,
    pub keep_alive: u16,
    pub queue_capacity: usize,
    /// Largest MQTT packet sent or accepted, in bytes. Bounds `fetch_log` replies.
    pub max_packet_size: usize,
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub idle_sleep_ms: u64,
    pub listener_capacity: usize,
    pub log_level: String,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            kind: SensorKind::Simulated,
            replay_path: "data/replay.csv".to_string(),
            simulated: SimulatedConfig::default(),
        }
    }
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            present: true,
            seed: None,
            gyro_noise: 0.05,
            accel_noise: 0.15,
            temperature_noise: 0.1,
            base_temperature: 24.0,
            swing_amplitude: 2.0,
            swing_period_reads: 300,
        }
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            gyro_period_ms: 10,
            accel_period_ms: 200,
            temperature_period_ms: 1000,
            recording_period_ms: 500,
        }
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            x: AxisParams { threshold: 0.14, divisor: 50.0 },
            y: AxisParams { threshold: 0.06, divisor: 70.0 },
            z: AxisParams { threshold: 0.02, divisor: 90.0 },
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            path: "data/recording.csv".to_string(),
            start_armed: false,
            preserve_history: false,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            broker: "localhost".to_string(),
            port: 1883,
            client_id: "wandhub".to_string(),
            base_topic: "wand".to_string(),
            command_topic: "wand/commands".to_string(),
            keep_alive: 30,
            queue_capacity: 64,
            max_packet_size: 1024 * 1024,
            reconnect_delay_ms: 2000,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            idle_sleep_ms: 1,
            listener_capacity: 256,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("gyro", self.cadence.gyro_period_ms),
            ("accelerometer", self.cadence.accel_period_ms),
            ("temperature", self.cadence.temperature_period_ms),
            ("recording", self.cadence.recording_period_ms),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(ConfigError::ValidationError(format!("{} period must be positive", name)));
            }
        }

        for (name, axis) in [("x", self.integration.x), ("y", self.integration.y), ("z", self.integration.z)] {
            if !(axis.divisor.is_finite() && axis.divisor != 0.0) {
                return Err(ConfigError::ValidationError(format!("Integration divisor for {} must be non-zero", name)));
            }
            if !(axis.threshold.is_finite() && axis.threshold >= 0.0) {
                return Err(ConfigError::ValidationError(format!("Noise threshold for {} must be non-negative", name)));
            }
        }

        if self.recording.path.trim().is_empty() {
            return Err(ConfigError::ValidationError("Recording path must not be empty".to_string()));
        }

        if self.sensor.kind == SensorKind::Replay && self.sensor.replay_path.trim().is_empty() {
            return Err(ConfigError::ValidationError("Replay sensor needs a replay_path".to_string()));
        }

        // startup would wipe the file being replayed
        if self.sensor.kind == SensorKind::Replay
            && !self.recording.preserve_history
            && Path::new(&self.sensor.replay_path) == Path::new(&self.recording.path)
        {
            return Err(ConfigError::ValidationError("Replay file must differ from the recording log".to_string()));
        }

        if self.mqtt.enabled {
            if self.mqtt.base_topic.trim().is_empty() || self.mqtt.command_topic.trim().is_empty() {
                return Err(ConfigError::ValidationError("MQTT topics must not be empty".to_string()));
            }
            if self.mqtt.keep_alive < 5 {
                return Err(ConfigError::ValidationError("MQTT keep alive must be at least 5 seconds".to_string()));
            }
            if self.mqtt.queue_capacity == 0 {
                return Err(ConfigError::ValidationError("MQTT queue capacity must be positive".to_string()));
            }
            if self.mqtt.max_packet_size < MIN_MQTT_PACKET_SIZE {
                return Err(ConfigError::ValidationError(format!(
                    "MQTT max packet size must be at least {} bytes",
                    MIN_MQTT_PACKET_SIZE
                )));
            }
        }

        if self.runtime.listener_capacity == 0 {
            return Err(ConfigError::ValidationError("Listener capacity must be positive".to_string()));
        }

        Ok(())
    }

    pub fn get_recording_path(&self) -> PathBuf {
        PathBuf::from(&self.recording.path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration and where it came from
pub struct ConfigManager {
    config: AppConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_path: None,
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from_file(&path)?;
        Ok(Self {
            config,
            config_path: Some(path.as_ref().to_path_buf()),
        })
    }

    /// Loads `$WANDHUB_CONFIG` or `wandhub.toml`; a missing file means defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        if Path::new(&path).exists() {
            Self::load_from_file(&path)
        } else {
            let manager = Self::new();
            manager.config.validate()?;
            Ok(manager)
        }
    }

    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.cadence.gyro_period_ms, 10);
        assert_eq!(config.cadence.accel_period_ms, 200);
        assert_eq!(config.cadence.temperature_period_ms, 1000);
        assert_eq!(config.cadence.recording_period_ms, 500);
        assert_eq!(config.integration.x, AxisParams { threshold: 0.14, divisor: 50.0 });
        assert_eq!(config.integration.y, AxisParams { threshold: 0.06, divisor: 70.0 });
        assert_eq!(config.integration.z, AxisParams { threshold: 0.02, divisor: 90.0 });
        assert!(!config.recording.start_armed);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [cadence]
            gyro_period_ms = 20

            [mqtt]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.cadence.gyro_period_ms, 20);
        assert_eq!(config.cadence.recording_period_ms, 500);
        assert!(!config.mqtt.enabled);
        assert_eq!(config.sensor.kind, SensorKind::Simulated);
    }

    #[test]
    fn rejects_zero_period_and_divisor() {
        let mut config = AppConfig::default();
        config.cadence.temperature_period_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = AppConfig::default();
        config.integration.y.divisor = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = AppConfig::default();
        config.sensor.kind = SensorKind::Replay;
        config.sensor.replay_path = config.recording.path.clone();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn load_reads_file_and_remembers_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wandhub.toml");
        let mut config = AppConfig::default();
        config.recording.start_armed = true;
        config.sensor.kind = SensorKind::Replay;
        config.sensor.simulated.seed = Some(9);
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = ConfigManager::load_from_file(&path).unwrap();
        assert!(loaded.get_config().recording.start_armed);
        assert_eq!(loaded.get_config().sensor.kind, SensorKind::Replay);
        assert_eq!(loaded.get_config().sensor.simulated.seed, Some(9));
        assert_eq!(loaded.config_path(), Some(path.as_path()));
    }

    #[test]
    fn packet_limit_leaves_room_for_large_logs() {
        let config = AppConfig::default();
        // about two hours of rows at the default recording period
        assert!(config.mqtt.max_packet_size > 14_400 * 50);

        let mut config = AppConfig::default();
        config.mqtt.max_packet_size = 512;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = AppConfig::default();
        config.mqtt.enabled = false;
        config.mqtt.max_packet_size = 0;
        config.validate().unwrap();
    }
}

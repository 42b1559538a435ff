pub mod simulated;
pub mod replay;

pub use simulated::SimulatedImu;
pub use replay::ReplaySensor;

use crate::config::{SensorConfig, SensorKind};
use crate::types::ImuReading;

/// Sensor driver errors
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor not detected: {0}")]
    NotDetected(String),
    #[error("Sensor read failed: {0}")]
    Read(String),
    #[error("Replay source error: {0}")]
    Replay(String),
}

/// Blocking 6-axis IMU with a temperature channel
pub trait SensorDriver {
    /// Checks the device is present. Called once before the first read.
    fn probe(&mut self) -> Result<(), SensorError>;

    fn read(&mut self) -> Result<ImuReading, SensorError>;

    fn name(&self) -> &str;
}

impl SensorDriver for Box<dyn SensorDriver> {
    fn probe(&mut self) -> Result<(), SensorError> {
        (**self).probe()
    }

    fn read(&mut self) -> Result<ImuReading, SensorError> {
        (**self).read()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Builds the driver selected in the config and probes it
pub fn open_sensor(config: &SensorConfig) -> Result<Box<dyn SensorDriver>, SensorError> {
    let mut driver: Box<dyn SensorDriver> = match config.kind {
        SensorKind::Simulated => Box::new(SimulatedImu::new(config.simulated.clone())),
        SensorKind::Replay => Box::new(ReplaySensor::open(&config.replay_path)?),
    };

    driver.probe()?;
    log::info!("Sensor '{}' detected", driver.name());
    Ok(driver)
}

use log::{debug, info, warn};

use super::{Cadence, Integrator};
use crate::config::AppConfig;
use crate::publisher::{EventPublisher, ACCEL_STREAM, GYRO_STREAM, TEMPERATURE_STREAM};
use crate::recorder::{AppendLog, Recorder};
use crate::sensor::SensorDriver;
use crate::types::{
    AccelPayload, AxisSelection, Command, IntegratedOrientation, PublishCounts, SensorSample,
    TelemetryStatus,
};
use crate::utils::format_uptime;

/// Cadences that fired during one `tick`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fired {
    pub gyro: bool,
    pub accel: bool,
    pub temperature: bool,
    pub record: bool,
}

/// Telemetry publisher and recorder.
///
/// Owns every piece of mutable state; driven by repeated `tick(now)` calls
/// from a single control loop. A slow log append delays all cadences of
/// that tick.
pub struct TelemetryHub<S: SensorDriver, P: EventPublisher, L: AppendLog> {
    sensor: S,
    publisher: P,
    recorder: Recorder<L>,
    integrator: Integrator,
    orientation: IntegratedOrientation,
    gyro: Cadence,
    accel: Cadence,
    temperature: Cadence,
    recording: Cadence,
    published: PublishCounts,
    last_now: u64,
}

impl<S: SensorDriver, P: EventPublisher, L: AppendLog> TelemetryHub<S, P, L> {
    pub fn new(sensor: S, publisher: P, recorder: Recorder<L>, config: &AppConfig) -> Self {
        let cadence = &config.cadence;
        Self {
            sensor,
            publisher,
            recorder,
            integrator: Integrator::new(config.integration.clone()),
            orientation: IntegratedOrientation::default(),
            gyro: Cadence::new(cadence.gyro_period_ms),
            accel: Cadence::new(cadence.accel_period_ms),
            temperature: Cadence::new(cadence.temperature_period_ms),
            recording: Cadence::new(cadence.recording_period_ms),
            published: PublishCounts::default(),
            last_now: 0,
        }
    }

    /// Runs every cadence whose period has elapsed. Several may fire in one call.
    pub fn tick(&mut self, now: u64) -> Fired {
        self.last_now = now;
        let mut fired = Fired::default();

        if self.gyro.poll(now) {
            self.publish_angular_rate(now);
            fired.gyro = true;
        }
        if self.accel.poll(now) {
            self.publish_acceleration(now);
            fired.accel = true;
        }
        if self.temperature.poll(now) {
            self.publish_temperature(now);
            fired.temperature = true;
        }
        if self.recording.poll(now) {
            self.record(now);
            fired.record = true;
        }

        fired
    }

    fn read_sample(&mut self, now: u64, purpose: &str) -> Option<SensorSample> {
        match self.sensor.read() {
            Ok(reading) => Some(SensorSample::from_reading(reading, now)),
            Err(e) => {
                warn!("Skipping {} at {}: {}", purpose, now, e);
                None
            }
        }
    }

    fn publish_angular_rate(&mut self, now: u64) {
        let Some(sample) = self.read_sample(now, GYRO_STREAM) else {
            return;
        };
        self.integrator.apply(&mut self.orientation, sample.angular_rate);

        match serde_json::to_string(&self.orientation) {
            Ok(payload) => {
                self.publisher.broadcast(GYRO_STREAM, &payload, now);
                self.published.gyro += 1;
            }
            Err(e) => warn!("Failed to encode gyro payload: {}", e),
        }
    }

    fn publish_acceleration(&mut self, now: u64) {
        let Some(sample) = self.read_sample(now, ACCEL_STREAM) else {
            return;
        };

        match serde_json::to_string(&AccelPayload::from(sample.acceleration)) {
            Ok(payload) => {
                self.publisher.broadcast(ACCEL_STREAM, &payload, now);
                self.published.accelerometer += 1;
            }
            Err(e) => warn!("Failed to encode accelerometer payload: {}", e),
        }
    }

    fn publish_temperature(&mut self, now: u64) {
        let Some(sample) = self.read_sample(now, TEMPERATURE_STREAM) else {
            return;
        };
        let payload = format!("{:.2}", sample.temperature);
        self.publisher.broadcast(TEMPERATURE_STREAM, &payload, now);
        self.published.temperature += 1;
    }

    fn record(&mut self, now: u64) {
        if !self.recorder.is_armed() {
            return;
        }
        let Some(sample) = self.read_sample(now, "recording") else {
            return;
        };
        if let Err(e) = self.recorder.record(&sample) {
            warn!("Recording row at {} skipped: {}", now, e);
        }
    }

    pub fn arm_recording(&mut self) {
        self.recorder.arm();
    }

    pub fn disarm_recording(&mut self) {
        self.recorder.disarm();
    }

    pub fn reset_orientation(&mut self, selection: AxisSelection) {
        self.orientation.reset(selection);
        debug!("Orientation reset ({:?})", selection);
    }

    #[cfg(test)]
    pub fn orientation(&self) -> IntegratedOrientation {
        self.orientation
    }

    pub fn is_armed(&self) -> bool {
        self.recorder.is_armed()
    }

    pub fn status(&self) -> TelemetryStatus {
        TelemetryStatus {
            armed: self.recorder.is_armed(),
            orientation: self.orientation,
            rows_recorded: self.recorder.rows_recorded(),
            published: self.published,
            uptime: format_uptime(self.last_now),
        }
    }

    pub fn fetch_log(&self) -> Result<String, String> {
        self.recorder.contents().map_err(|e| e.to_string())
    }

    /// Applies one command. Returns false once the loop should stop.
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::ArmRecording => self.arm_recording(),
            Command::DisarmRecording => self.disarm_recording(),
            Command::ResetOrientation(selection) => self.reset_orientation(selection),
            Command::FetchLog { response_sender } => {
                if response_sender.try_send(self.fetch_log()).is_err() {
                    warn!("Log requester went away before the reply");
                }
            }
            Command::GetStatus { response_sender } => {
                if response_sender.try_send(self.status()).is_err() {
                    warn!("Status requester went away before the reply");
                }
            }
            Command::Shutdown => {
                info!("Shutdown requested");
                return false;
            }
        }
        true
    }

    #[cfg(test)]
    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    #[cfg(test)]
    pub fn recorder(&self) -> &Recorder<L> {
        &self.recorder
    }
}

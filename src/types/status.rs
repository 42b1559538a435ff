use serde::Serialize;

use super::IntegratedOrientation;

/// Events broadcast per stream since startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishCounts {
    pub gyro: u64,
    pub accelerometer: u64,
    pub temperature: u64,
}

/// Snapshot returned by the status command
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryStatus {
    pub armed: bool,
    pub orientation: IntegratedOrientation,
    pub rows_recorded: u64,
    pub published: PublishCounts,
    pub uptime: String,
}

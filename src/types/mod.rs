pub mod sample;
pub mod orientation;
pub mod commands;
pub mod status;

pub use sample::{Vec3, ImuReading, SensorSample, AccelPayload};
pub use orientation::{IntegratedOrientation, Axis, AxisSelection};
pub use commands::{Command, CommandRequest};
pub use status::{TelemetryStatus, PublishCounts};

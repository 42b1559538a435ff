use serde::{Deserialize, Serialize};

/// Three-axis vector as reported by the IMU
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Raw driver output before it is stamped with the tick time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImuReading {
    /// Angular rate (rad/s)
    pub angular_rate: Vec3,
    /// Linear acceleration (m/s^2)
    pub acceleration: Vec3,
    /// Die temperature (°C)
    pub temperature: f32,
}

/// One instantaneous reading, produced fresh on every read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub angular_rate: Vec3,
    pub acceleration: Vec3,
    pub temperature: f32,
    pub timestamp: u64,
}

impl SensorSample {
    pub fn from_reading(reading: ImuReading, timestamp: u64) -> Self {
        Self {
            angular_rate: reading.angular_rate,
            acceleration: reading.acceleration,
            temperature: reading.temperature,
            timestamp,
        }
    }

    pub fn reading(&self) -> ImuReading {
        ImuReading {
            angular_rate: self.angular_rate,
            acceleration: self.acceleration,
            temperature: self.temperature,
        }
    }
}

/// Payload of the `accelerometer_readings` stream
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccelPayload {
    #[serde(rename = "accX")]
    pub acc_x: f32,
    #[serde(rename = "accY")]
    pub acc_y: f32,
    #[serde(rename = "accZ")]
    pub acc_z: f32,
}

impl From<Vec3> for AccelPayload {
    fn from(v: Vec3) -> Self {
        Self {
            acc_x: v.x,
            acc_y: v.y,
            acc_z: v.z,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Running sum of filtered angular rate. Drifts; not a calibrated attitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegratedOrientation {
    #[serde(rename = "gyroX")]
    pub gyro_x: f32,
    #[serde(rename = "gyroY")]
    pub gyro_y: f32,
    #[serde(rename = "gyroZ")]
    pub gyro_z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Which fields a reset command zeroes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSelection {
    #[default]
    All,
    X,
    Y,
    Z,
}

impl IntegratedOrientation {
    pub fn get_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.gyro_x,
            Axis::Y => &mut self.gyro_y,
            Axis::Z => &mut self.gyro_z,
        }
    }

    pub fn reset(&mut self, selection: AxisSelection) {
        match selection {
            AxisSelection::All => *self = Self::default(),
            AxisSelection::X => self.gyro_x = 0.0,
            AxisSelection::Y => self.gyro_y = 0.0,
            AxisSelection::Z => self.gyro_z = 0.0,
        }
    }
}

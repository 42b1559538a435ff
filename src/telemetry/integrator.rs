use crate::config::{AxisParams, IntegrationConfig};
use crate::types::{Axis, IntegratedOrientation, Vec3};

/// Gated accumulation of angular rate into `IntegratedOrientation`
#[derive(Debug, Clone)]
pub struct Integrator {
    params: IntegrationConfig,
}

impl Integrator {
    pub fn new(params: IntegrationConfig) -> Self {
        Self { params }
    }

    fn axis_params(&self, axis: Axis) -> AxisParams {
        match axis {
            Axis::X => self.params.x,
            Axis::Y => self.params.y,
            Axis::Z => self.params.z,
        }
    }

    /// Readings inside (-threshold, +threshold) are noise and leave the axis untouched.
    pub fn apply(&self, orientation: &mut IntegratedOrientation, rate: Vec3) {
        for (axis, value) in [(Axis::X, rate.x), (Axis::Y, rate.y), (Axis::Z, rate.z)] {
            let params = self.axis_params(axis);
            if value.abs() >= params.threshold {
                *orientation.get_mut(axis) += value / params.divisor;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_threshold_rates_are_dropped() {
        let integrator = Integrator::new(IntegrationConfig::default());
        let mut o = IntegratedOrientation::default();
        integrator.apply(&mut o, Vec3::new(0.13, -0.05, 0.019));
        assert_eq!(o, IntegratedOrientation::default());
    }

    #[test]
    fn above_threshold_adds_rate_over_divisor() {
        let integrator = Integrator::new(IntegrationConfig::default());
        let mut o = IntegratedOrientation {
            gyro_x: 1.0,
            gyro_y: 0.0,
            gyro_z: 0.0,
        };
        integrator.apply(&mut o, Vec3::new(5.0, -7.0, 0.9));
        assert_eq!(o.gyro_x, 1.0 + 5.0 / 50.0);
        assert_eq!(o.gyro_y, -7.0 / 70.0);
        assert_eq!(o.gyro_z, 0.9 / 90.0);
    }

    #[test]
    fn axes_are_gated_independently() {
        let integrator = Integrator::new(IntegrationConfig::default());
        let mut o = IntegratedOrientation::default();
        integrator.apply(&mut o, Vec3::new(0.1, 0.1, 0.1));
        assert_eq!(o.gyro_x, 0.0);
        assert_eq!(o.gyro_y, 0.1 / 70.0);
        assert_eq!(o.gyro_z, 0.1 / 90.0);
    }
}

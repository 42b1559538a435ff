use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{SensorDriver, SensorError};
use crate::config::SimulatedConfig;
use crate::types::{ImuReading, Vec3};

const GRAVITY: f32 = 9.81;

/// Synthetic IMU: a slow wand "swing" on X plus uniform noise on every channel
pub struct SimulatedImu {
    config: SimulatedConfig,
    rng: StdRng,
    reads: u64,
}

impl SimulatedImu {
    pub fn new(config: SimulatedConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng, reads: 0 }
    }

    fn noise(&mut self, amplitude: f32) -> f32 {
        if amplitude <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(-amplitude..amplitude)
    }

    fn swing(&self) -> f32 {
        if self.config.swing_period_reads == 0 {
            return 0.0;
        }
        let phase = (self.reads % self.config.swing_period_reads) as f32
            / self.config.swing_period_reads as f32;
        self.config.swing_amplitude * (phase * std::f32::consts::TAU).sin()
    }
}

impl SensorDriver for SimulatedImu {
    fn probe(&mut self) -> Result<(), SensorError> {
        if self.config.present {
            Ok(())
        } else {
            Err(SensorError::NotDetected("simulated IMU configured as absent".to_string()))
        }
    }

    fn read(&mut self) -> Result<ImuReading, SensorError> {
        let gyro_noise = self.config.gyro_noise;
        let accel_noise = self.config.accel_noise;
        let swing = self.swing();
        self.reads = self.reads.wrapping_add(1);

        let angular_rate = Vec3::new(
            swing + self.noise(gyro_noise),
            self.noise(gyro_noise),
            self.noise(gyro_noise),
        );
        let acceleration = Vec3::new(
            self.noise(accel_noise),
            self.noise(accel_noise),
            GRAVITY + self.noise(accel_noise),
        );
        let temperature = self.config.base_temperature + self.noise(self.config.temperature_noise);

        Ok(ImuReading {
            angular_rate,
            acceleration,
            temperature,
        })
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SimulatedConfig {
        SimulatedConfig {
            seed: Some(7),
            gyro_noise: 0.0,
            accel_noise: 0.0,
            temperature_noise: 0.0,
            ..SimulatedConfig::default()
        }
    }

    #[test]
    fn absent_sensor_fails_probe() {
        let mut imu = SimulatedImu::new(SimulatedConfig {
            present: false,
            ..quiet_config()
        });
        assert!(matches!(imu.probe(), Err(SensorError::NotDetected(_))));
    }

    #[test]
    fn noiseless_reading_is_gravity_and_base_temperature() {
        let mut imu = SimulatedImu::new(SimulatedConfig {
            swing_amplitude: 0.0,
            ..quiet_config()
        });
        imu.probe().unwrap();
        let reading = imu.read().unwrap();
        assert_eq!(reading.acceleration, Vec3::new(0.0, 0.0, GRAVITY));
        assert_eq!(reading.angular_rate, Vec3::default());
        assert_eq!(reading.temperature, quiet_config().base_temperature);
    }

    #[test]
    fn noise_stays_within_amplitude() {
        let mut imu = SimulatedImu::new(SimulatedConfig {
            swing_amplitude: 0.0,
            gyro_noise: 0.05,
            accel_noise: 0.2,
            ..quiet_config()
        });
        for _ in 0..200 {
            let r = imu.read().unwrap();
            assert!(r.angular_rate.y.abs() < 0.05);
            assert!((r.acceleration.z - GRAVITY).abs() < 0.2);
        }
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let config = SimulatedConfig {
            seed: Some(42),
            ..SimulatedConfig::default()
        };
        let mut a = SimulatedImu::new(config.clone());
        let mut b = SimulatedImu::new(config);
        for _ in 0..10 {
            assert_eq!(a.read().unwrap(), b.read().unwrap());
        }
    }
}

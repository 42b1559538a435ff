use std::path::{Path, PathBuf};

use super::{SensorDriver, SensorError};
use crate::recorder::row::{parse_row, is_header};
use crate::types::ImuReading;

/// Plays back the rows of a recorded log in a loop
pub struct ReplaySensor {
    source: PathBuf,
    readings: Vec<ImuReading>,
    cursor: usize,
}

impl ReplaySensor {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SensorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SensorError::NotDetected(format!("{}: {}", path.display(), e)))?;

        let mut readings = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || is_header(line) {
                continue;
            }
            let sample = parse_row(line)
                .map_err(|e| SensorError::Replay(format!("{} line {}: {}", path.display(), line_no + 1, e)))?;
            readings.push(sample.reading());
        }

        log::info!("Loaded {} replay samples from {}", readings.len(), path.display());
        Ok(Self {
            source: path.to_path_buf(),
            readings,
            cursor: 0,
        })
    }
}

impl SensorDriver for ReplaySensor {
    fn probe(&mut self) -> Result<(), SensorError> {
        if self.readings.is_empty() {
            return Err(SensorError::NotDetected(format!(
                "replay file {} has no samples",
                self.source.display()
            )));
        }
        Ok(())
    }

    fn read(&mut self) -> Result<ImuReading, SensorError> {
        let reading = self
            .readings
            .get(self.cursor)
            .copied()
            .ok_or_else(|| SensorError::Read("replay source is empty".to_string()))?;
        self.cursor = (self.cursor + 1) % self.readings.len();
        Ok(reading)
    }

    fn name(&self) -> &str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::row::{format_row, CSV_HEADER};
    use crate::types::{SensorSample, Vec3};
    use tempfile::NamedTempFile;

    fn replay_file(content: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    fn sample(t: u64, gx: f32) -> SensorSample {
        SensorSample {
            angular_rate: Vec3::new(gx, 0.5, -0.25),
            acceleration: Vec3::new(1.0, 0.0, 9.81),
            temperature: 25.5,
            timestamp: t,
        }
    }

    #[test]
    fn replays_recorded_rows_in_a_loop() {
        let file = replay_file(&format!(
            "{}\n{}{}",
            CSV_HEADER,
            format_row(&sample(500, 1.0)),
            format_row(&sample(1000, 2.0))
        ));

        let mut sensor = ReplaySensor::open(file.path()).unwrap();
        sensor.probe().unwrap();
        assert_eq!(sensor.read().unwrap(), sample(0, 1.0).reading());
        assert_eq!(sensor.read().unwrap(), sample(0, 2.0).reading());
        assert_eq!(sensor.read().unwrap(), sample(0, 1.0).reading());
    }

    #[test]
    fn header_only_file_is_not_detected() {
        let file = replay_file(&format!("{}\n", CSV_HEADER));

        let mut sensor = ReplaySensor::open(file.path()).unwrap();
        assert!(matches!(sensor.probe(), Err(SensorError::NotDetected(_))));
    }

    #[test]
    fn missing_file_is_not_detected() {
        let dir = tempfile::tempdir().unwrap();
        let result = ReplaySensor::open(dir.path().join("does-not-exist.csv"));
        assert!(matches!(result, Err(SensorError::NotDetected(_))));
    }

    #[test]
    fn malformed_row_reports_line() {
        let file = replay_file(&format!("{}\n1,2,3\n", CSV_HEADER));

        match ReplaySensor::open(file.path()) {
            Err(SensorError::Replay(msg)) => assert!(msg.contains("line 2")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("malformed row was accepted"),
        }
    }
}

use crate::types::{SensorSample, Vec3};

pub const CSV_HEADER: &str = "Timestamp_ms,Gyro_X,Gyro_Y,Gyro_Z,Acc_X,Acc_Y,Acc_Z,Temperature_C";
pub const FIELD_COUNT: usize = 8;

pub fn is_header(line: &str) -> bool {
    line.starts_with("Timestamp")
}

/// One log row, newline terminated, columns in `CSV_HEADER` order
pub fn format_row(sample: &SensorSample) -> String {
    let g = sample.angular_rate;
    let a = sample.acceleration;
    format!(
        "{},{},{},{},{},{},{},{}\n",
        sample.timestamp, g.x, g.y, g.z, a.x, a.y, a.z, sample.temperature
    )
}

pub fn parse_row(line: &str) -> Result<SensorSample, String> {
    let fields: Vec<&str> = line.trim_end().split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!("expected {} fields, got {}", FIELD_COUNT, fields.len()));
    }

    let timestamp = fields[0]
        .parse::<u64>()
        .map_err(|e| format!("invalid timestamp '{}': {}", fields[0], e))?;

    let mut values = [0.0f32; FIELD_COUNT - 1];
    for (slot, field) in values.iter_mut().zip(&fields[1..]) {
        *slot = field
            .parse::<f32>()
            .map_err(|e| format!("invalid value '{}': {}", field, e))?;
    }

    Ok(SensorSample {
        angular_rate: Vec3::new(values[0], values[1], values[2]),
        acceleration: Vec3::new(values[3], values[4], values[5]),
        temperature: values[6],
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_has_eight_columns() {
        assert_eq!(CSV_HEADER.split(',').count(), FIELD_COUNT);
        assert!(is_header(CSV_HEADER));
    }

    #[test]
    fn row_follows_header_order() {
        let sample = SensorSample {
            angular_rate: Vec3::new(0.5, -1.25, 2.0),
            acceleration: Vec3::new(1.0, 0.0, 0.0),
            temperature: 25.0,
            timestamp: 1500,
        };
        let row = format_row(&sample);
        assert_eq!(row, "1500,0.5,-1.25,2,1,0,0,25\n");
        assert_eq!(row.trim_end().split(',').count(), FIELD_COUNT);
        assert_eq!(parse_row(&row).unwrap(), sample);
    }

    #[test]
    fn rejects_short_rows_and_bad_numbers() {
        assert!(parse_row("1,2,3").is_err());
        assert!(parse_row("x,0,0,0,0,0,0,0").is_err());
        assert!(parse_row("1,0,0,0,0,0,0,warm").is_err());
    }
}

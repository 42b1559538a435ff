use std::time::Instant;

/// Formats a millisecond uptime as HH:MM:SS.mmm
pub fn format_uptime(uptime_ms: u64) -> String {
    let seconds = uptime_ms / 1000;
    let ms = uptime_ms % 1000;

    let hours = seconds / 3600;
    let minutes = (seconds / 60) % 60;
    let secs = seconds % 60;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
}

/// Milliseconds since the clock was created, the `millis()` of the control loop
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(0), "00:00:00.000");
        assert_eq!(format_uptime(61_005), "00:01:01.005");
        assert_eq!(format_uptime(90_000_250), "25:00:00.250");
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = MonotonicClock::start();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}

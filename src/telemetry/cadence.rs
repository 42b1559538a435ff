/// Elapsed-time gate for one periodic action.
///
/// `last_fired` starts at 0, so a first poll at `now = 0` does not fire.
/// Missed periods are not queued: a late poll fires once and re-arms from `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    period_ms: u64,
    last_fired: u64,
}

impl Cadence {
    pub fn new(period_ms: u64) -> Self {
        Self { period_ms, last_fired: 0 }
    }

    #[cfg(test)]
    pub fn last_fired(&self) -> u64 {
        self.last_fired
    }

    /// Returns true and re-arms when a full period has elapsed.
    /// A clock that went backwards counts as no time elapsed.
    pub fn poll(&mut self, now: u64) -> bool {
        if now.saturating_sub(self.last_fired) >= self.period_ms {
            self.last_fired = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_fire_at_time_zero() {
        let mut cadence = Cadence::new(500);
        assert!(!cadence.poll(0));
        assert!(cadence.poll(500));
        assert!(cadence.poll(1000));
    }

    #[test]
    fn fires_once_per_elapsed_period() {
        let mut cadence = Cadence::new(10);
        let fires = (0..=100u64).filter(|&now| cadence.poll(now)).count();
        assert_eq!(fires, 10);
    }

    #[test]
    fn late_poll_fires_once_without_backlog() {
        let mut cadence = Cadence::new(500);
        assert!(cadence.poll(2600));
        assert!(!cadence.poll(2601));
        assert!(!cadence.poll(3099));
        assert!(cadence.poll(3100));
        assert_eq!(cadence.last_fired(), 3100);
    }

    #[test]
    fn backwards_clock_does_not_fire() {
        let mut cadence = Cadence::new(10);
        assert!(cadence.poll(1000));
        assert!(!cadence.poll(5));
        assert_eq!(cadence.last_fired(), 1000);
    }

    #[test]
    fn never_starves_under_irregular_ticks() {
        let period = 200;
        let mut cadence = Cadence::new(period);
        let mut now = 0;
        let mut last = 0;
        // steps of 1..=37 ms, all shorter than the period
        for step in (1..=37u64).cycle().take(2000) {
            now += step;
            if cadence.poll(now) {
                assert!(now - last >= period);
                last = now;
            }
            assert!(now - last < 2 * period);
        }
    }
}

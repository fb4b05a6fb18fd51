use std::time::{Duration, Instant};

pub const TIMER_DEC_PER_SECOND: u64 = 60;

/// An 8-bit countdown register (delay or sound).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub count: u8,
}

impl Timer {
    pub fn new(init_count: u8) -> Self {
        Self { count: init_count }
    }

    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    /// One externally paced decrement; stays at zero.
    pub fn tick(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// Fires at a fixed wall-clock interval. Used by the driver to pace timer
/// ticks independently of instruction throughput.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    last_tick: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: Instant::now(),
        }
    }

    pub fn per_second(hz: u64) -> Self {
        Self::new(Duration::from_micros(1_000_000 / hz.max(1)))
    }

    /// Number of whole intervals elapsed since the previous call.
    pub fn poll(&mut self) -> u32 {
        self.poll_at(Instant::now())
    }

    fn poll_at(&mut self, now: Instant) -> u32 {
        let mut fired = 0;
        while now.saturating_duration_since(self.last_tick) >= self.interval {
            self.last_tick += self.interval;
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_decrements() {
        let mut timer = Timer::new(2);
        timer.tick();
        assert_eq!(timer.count, 1);
        assert!(timer.is_active());
        timer.tick();
        assert_eq!(timer.count, 0);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_tick_stops_at_zero() {
        let mut timer = Timer::default();
        timer.tick();
        assert_eq!(timer.count, 0);
    }

    #[test]
    fn test_ticker_counts_elapsed_intervals() {
        let mut ticker = Ticker::new(Duration::from_millis(10));
        let start = ticker.last_tick;
        assert_eq!(ticker.poll_at(start + Duration::from_millis(5)), 0);
        assert_eq!(ticker.poll_at(start + Duration::from_millis(35)), 3);
        assert_eq!(ticker.poll_at(start + Duration::from_millis(39)), 0);
        assert_eq!(ticker.poll_at(start + Duration::from_millis(40)), 1);
    }

    #[test]
    fn test_ticker_per_second() {
        let ticker = Ticker::per_second(TIMER_DEC_PER_SECOND);
        assert_eq!(ticker.interval, Duration::from_micros(16_666));
    }
}

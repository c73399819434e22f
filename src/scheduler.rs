/// Cancellable fixed-interval timer driven by simulated time.
///
/// Stopping discards any partial countdown; `start` always begins a fresh
/// interval, so pause/resume never continues a suspended countdown.
#[derive(Clone, Debug)]
pub struct RepeatingTimer {
    interval_ms: u64,
    until_next_ms: Option<u64>,
}

impl RepeatingTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            until_next_ms: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn start(&mut self) {
        self.until_next_ms = Some(self.interval_ms);
    }

    pub fn stop(&mut self) {
        self.until_next_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.until_next_ms.is_some()
    }

    pub fn until_next_ms(&self) -> Option<u64> {
        self.until_next_ms
    }

    /// Moves the countdown forward and reports whether it fired. Callers never
    /// advance past the next fire time, so at most one fire happens per call.
    pub fn advance(&mut self, elapsed_ms: u64) -> bool {
        let Some(remaining) = self.until_next_ms else {
            return false;
        };
        if elapsed_ms >= remaining {
            self.until_next_ms = Some(self.interval_ms);
            return true;
        }
        self.until_next_ms = Some(remaining - elapsed_ms);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_timer_never_fires() {
        let mut timer = RepeatingTimer::new(200);
        assert!(!timer.is_active());
        assert!(!timer.advance(10_000));
        assert_eq!(timer.until_next_ms(), None);
    }

    #[test]
    fn fires_on_interval_boundaries() {
        let mut timer = RepeatingTimer::new(200);
        timer.start();
        assert!(!timer.advance(150));
        assert_eq!(timer.until_next_ms(), Some(50));
        assert!(timer.advance(50));
        assert_eq!(timer.until_next_ms(), Some(200));
    }

    #[test]
    fn restart_discards_partial_progress() {
        let mut timer = RepeatingTimer::new(200);
        timer.start();
        assert!(!timer.advance(190));
        timer.stop();
        timer.start();
        assert!(!timer.advance(190));
        assert!(timer.advance(10));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let timer = RepeatingTimer::new(0);
        assert_eq!(timer.interval_ms(), 1);
    }
}

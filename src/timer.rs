use std::time::{Duration, Instant};

/// A repeating deadline polled from the game loop. Stands in for a
/// self-rearming interval timer: `poll` fires at most once per call and
/// re-arms itself, and `set_period` replaces the schedule in one step.
pub struct RepeatTimer {
    period: Duration,
    deadline: Instant,
}

impl RepeatTimer {
    pub fn new(period: Duration) -> Self {
        RepeatTimer { period, deadline: Instant::now() + period }
    }

    /// True once `period` has elapsed since the last firing (or since
    /// creation). Re-arms relative to `now` rather than the missed
    /// deadline, so a stalled loop doesn't fire in bursts to catch up.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now >= self.deadline {
            self.deadline = now + self.period;
            true
        } else {
            false
        }
    }

    /// Cancels the pending deadline and installs a fresh schedule with the
    /// new period.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
        self.deadline = Instant::now() + period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_fire_before_the_period() {
        let start = Instant::now();
        let mut timer = RepeatTimer::new(Duration::from_secs(3600));
        assert!(!timer.poll(start));
        assert!(!timer.poll(start + Duration::from_secs(3599)));
    }

    #[test]
    fn fires_once_then_rearms() {
        let mut timer = RepeatTimer::new(Duration::from_millis(100));
        let later = Instant::now() + Duration::from_millis(150);

        assert!(timer.poll(later));
        assert!(!timer.poll(later)); // re-armed, next deadline is later+100ms
        assert!(timer.poll(later + Duration::from_millis(100)));
    }

    #[test]
    fn set_period_replaces_the_pending_deadline() {
        let mut timer = RepeatTimer::new(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(2));

        // Due under the old schedule, but rescheduling cancels that.
        timer.set_period(Duration::from_secs(3600));
        assert!(!timer.poll(Instant::now()));
    }
}

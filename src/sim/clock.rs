use std::time::Duration;

/// Frame budget of the animation loop. A frame whose work overruns the
/// budget is counted as delayed and the next one is due immediately.
#[derive(Debug, Clone)]
pub struct FrameClock {
    budget: Duration,
    delayed: u64,
}

impl FrameClock {
    pub fn new(fps: f64) -> Self {
        Self { budget: Duration::from_secs_f64(1.0 / fps), delayed: 0 }
    }

    pub fn set_fps(&mut self, fps: f64) {
        self.budget = Duration::from_secs_f64(1.0 / fps);
    }

    #[cfg(test)]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn delayed(&self) -> u64 {
        self.delayed
    }

    pub fn reset_delayed(&mut self) {
        self.delayed = 0;
    }

    /// Wait before the next frame, given how long this frame's work took.
    pub fn next_delay(&mut self, work: Duration) -> Duration {
        match self.budget.checked_sub(work) {
            Some(rest) => rest,
            None => {
                self.delayed += 1;
                Duration::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_for_the_rest_of_the_budget() {
        let mut clock = FrameClock::new(100.0);
        assert_eq!(clock.budget(), Duration::from_millis(10));
        assert_eq!(clock.next_delay(Duration::from_millis(4)), Duration::from_millis(6));
        assert_eq!(clock.next_delay(Duration::from_millis(10)), Duration::ZERO);
        assert_eq!(clock.delayed(), 0);
    }

    #[test]
    fn overrun_fires_immediately_and_counts() {
        let mut clock = FrameClock::new(100.0);
        assert_eq!(clock.next_delay(Duration::from_millis(15)), Duration::ZERO);
        assert_eq!(clock.next_delay(Duration::from_millis(11)), Duration::ZERO);
        assert_eq!(clock.delayed(), 2);
        clock.reset_delayed();
        assert_eq!(clock.delayed(), 0);
    }

    #[test]
    fn fps_change_moves_the_budget() {
        let mut clock = FrameClock::new(100.0);
        clock.set_fps(50.0);
        assert_eq!(clock.budget(), Duration::from_millis(20));
    }
}

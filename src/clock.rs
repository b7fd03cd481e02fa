use std::time::Instant;

/// Wall-clock timing of simulation steps
///
/// Keeps a rolling history of the last 60 step durations.
pub struct StepClock {
    last_time: Instant,
    dt_history: Vec<f64>,
}

impl StepClock {
    const HISTORY: usize = 60;

    pub fn new() -> Self {
        Self {
            last_time: Instant::now(),
            dt_history: Vec::with_capacity(Self::HISTORY),
        }
    }

    /// Records the time since the previous tick
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.record(now.duration_since(self.last_time).as_secs_f64());
        self.last_time = now;
    }

    fn record(&mut self, dt: f64) {
        self.dt_history.push(dt);
        if self.dt_history.len() > Self::HISTORY {
            self.dt_history.remove(0);
        }
    }

    /// Returns the last step time in milliseconds
    pub fn last_step_millis(&self) -> f64 {
        self.dt_history.last().copied().unwrap_or(0.0) * 1000.0
    }

    /// Average steps per second over the history, zero before the first tick
    pub fn steps_per_second(&self) -> f64 {
        if self.dt_history.is_empty() {
            return 0.0;
        }
        let avg_dt = self.dt_history.iter().sum::<f64>() / self.dt_history.len() as f64;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_over_a_bounded_history() {
        let mut clock = StepClock::new();
        assert_eq!(clock.steps_per_second(), 0.0);
        for _ in 0..100 {
            clock.record(0.5);
        }
        clock.record(0.25);
        assert_eq!(clock.dt_history.len(), StepClock::HISTORY);
        assert_eq!(clock.last_step_millis(), 250.0);
        let expected = 1.0 / ((59.0 * 0.5 + 0.25) / 60.0);
        assert!((clock.steps_per_second() - expected).abs() < 1e-9);
    }
}

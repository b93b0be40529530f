// src/clock.rs

/// Simulated time, counted in whole timesteps so repeated advances never
/// accumulate floating-point drift. Time is expressed in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    step: u64,
    steps_per_day: u32,
}

impl Clock {
    pub fn new(steps_per_day: u32) -> Self {
        Self {
            step: 0,
            steps_per_day: steps_per_day.max(1),
        }
    }

    /// Current simulated time in days.
    #[inline]
    pub fn now(&self) -> f64 {
        self.step as f64 / self.steps_per_day as f64
    }

    /// Timesteps taken so far.
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn steps_per_day(&self) -> u32 {
        self.steps_per_day
    }

    /// Zero-based day the current timestep belongs to. Step `n` of a day
    /// with `n` steps still belongs to that day.
    pub fn day(&self) -> u64 {
        self.step.saturating_sub(1) / self.steps_per_day as u64
    }

    /// True on the first timestep of each day.
    pub fn is_day_start(&self) -> bool {
        self.step > 0 && (self.step - 1) % self.steps_per_day as u64 == 0
    }

    /// Moves forward one timestep and returns the new time.
    pub fn advance(&mut self) -> f64 {
        self.step += 1;
        self.now()
    }
}

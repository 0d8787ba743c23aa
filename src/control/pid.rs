//! Scalar PID filter with wall-clock spaced samples.

use serde::Deserialize;
use std::time::Duration;

use super::clock::{Clock, SystemClock};

/// Lower bound on the sample interval (seconds).
///
/// Back-to-back calls would otherwise divide the derivative by ~0.
pub const DT_FLOOR: f32 = 1e-4;

/// Proportional, integral and derivative gains.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }
}

/// PID controller over an error signal.
///
/// The integral is unbounded unless a limit is set with
/// [`Pid::with_integral_limit`]; the owner is expected to [`Pid::reset`]
/// between episodes.
#[derive(Clone, Debug)]
pub struct Pid<C: Clock = SystemClock> {
    gains: PidGains,
    integral_limit: Option<f32>,
    integral: f32,
    prev_error: f32,
    last_sample: Duration,
    clock: C,
}

impl Pid<SystemClock> {
    /// Create a controller on the wall clock.
    pub fn new(gains: PidGains) -> Self {
        Self::with_clock(gains, SystemClock::new())
    }
}

impl<C: Clock> Pid<C> {
    /// Create a controller reading time from `clock`.
    ///
    /// The time reference is anchored immediately, as after [`Pid::reset`].
    pub fn with_clock(gains: PidGains, clock: C) -> Self {
        let last_sample = clock.now();
        Self {
            gains,
            integral_limit: None,
            integral: 0.0,
            prev_error: 0.0,
            last_sample,
            clock,
        }
    }

    /// Bound the accumulated integral to `±limit`.
    pub fn with_integral_limit(mut self, limit: Option<f32>) -> Self {
        self.integral_limit = limit.map(f32::abs);
        self
    }

    /// Clear integral and derivative history and re-anchor time.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.last_sample = self.clock.now();
    }

    /// Feed one error sample and return the control output.
    pub fn step(&mut self, error: f32) -> f32 {
        let now = self.clock.now();
        let dt = now
            .saturating_sub(self.last_sample)
            .as_secs_f32()
            .max(DT_FLOOR);
        self.last_sample = now;

        self.integral += error * dt;
        if let Some(limit) = self.integral_limit {
            self.integral = self.integral.clamp(-limit, limit);
        }

        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;

        self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn prev_error(&self) -> f32 {
        self.prev_error
    }

    pub fn integral_limit(&self) -> Option<f32> {
        self.integral_limit
    }
}

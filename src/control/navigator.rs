//! Approach controller: detection in, clamped velocity command out.
//!
//! Image-space conventions:
//! - `cx` error positive means the target sits right of centre, so the base
//!   turns clockwise (negative turn).
//! - A large area means the target is close; at or above the arrival
//!   threshold the base stops.
//!
//! The controller is reactive. Apart from PID history it remembers nothing
//! between frames, so a single missed detection drops it back into the
//! search spin.

use std::fmt;

use super::clock::{Clock, SystemClock};
use super::command::VelocityCommand;
use super::pid::Pid;
use crate::config::NavigatorConfig;
use crate::error::Result;
use crate::perception::Detection;

/// Navigation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NavigatorState {
    /// Target not visible, spinning in place
    #[default]
    Searching,
    /// Target visible, closing in
    Approaching,
    /// Target area at or above the arrival threshold
    Arrived,
}

impl NavigatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigatorState::Searching => "SEARCHING",
            NavigatorState::Approaching => "APPROACHING",
            NavigatorState::Arrived => "ARRIVED",
        }
    }
}

impl fmt::Display for NavigatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual-servoing navigator with one PID per axis.
pub struct Navigator<C: Clock + Clone = SystemClock> {
    config: NavigatorConfig,
    turn_pid: Pid<C>,
    forward_pid: Pid<C>,
    state: NavigatorState,
}

impl Navigator<SystemClock> {
    /// Create a navigator on the wall clock.
    pub fn new(config: NavigatorConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock + Clone> Navigator<C> {
    /// Create a navigator whose PIDs read time from `clock`.
    ///
    /// Fails if the configuration has non-positive thresholds or caps.
    pub fn with_clock(config: NavigatorConfig, clock: C) -> Result<Self> {
        config.validate()?;

        let turn_pid = Pid::with_clock(config.turn_gains, clock.clone())
            .with_integral_limit(config.integral_limit);
        let forward_pid =
            Pid::with_clock(config.forward_gains, clock).with_integral_limit(config.integral_limit);

        tracing::debug!(
            "Navigator: threshold={:.0}px², image={}x{}, max_fwd={:.2}m/s, max_turn={:.2}rad/s",
            config.arrive_area_threshold,
            config.image_width,
            config.image_height,
            config.max_forward_velocity,
            config.max_turn_velocity
        );

        let mut navigator = Self {
            config,
            turn_pid,
            forward_pid,
            state: NavigatorState::Searching,
        };
        navigator.restart();
        Ok(navigator)
    }

    /// Start a new approach episode: clear PID history and search again.
    pub fn restart(&mut self) {
        self.turn_pid.reset();
        self.forward_pid.reset();
        self.state = NavigatorState::Searching;
    }

    /// Compute the velocity command for one detection and update the state.
    pub fn compute_command(&mut self, det: &Detection) -> VelocityCommand {
        let Some((cx, _cy)) = det.centroid() else {
            // PID history is kept so a brief dropout does not restart the approach.
            self.transition(NavigatorState::Searching);
            return VelocityCommand::new(0.0, self.config.search_turn_rate);
        };

        if det.area >= self.config.arrive_area_threshold {
            self.transition(NavigatorState::Arrived);
            return VelocityCommand::stop();
        }

        self.transition(NavigatorState::Approaching);

        let cx_error = cx - self.config.center_x();
        let area_error = self.config.arrive_area_threshold - det.area;

        let turn = -self.turn_pid.step(cx_error);
        let forward = self.forward_pid.step(area_error);

        let command = VelocityCommand::new(
            clamp_or_zero(forward, 0.0, self.config.max_forward_velocity),
            clamp_or_zero(
                turn,
                -self.config.max_turn_velocity,
                self.config.max_turn_velocity,
            ),
        );

        tracing::debug!(
            "approach: cx_err={:+.1}px, area_err={:+.0}px², raw=({:.3},{:.3}), cmd=({:.3},{:.3})",
            cx_error,
            area_error,
            forward,
            turn,
            command.forward,
            command.turn
        );

        command
    }

    /// True once the target area reached the arrival threshold.
    pub fn arrived(&self) -> bool {
        self.state == NavigatorState::Arrived
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn turn_pid(&self) -> &Pid<C> {
        &self.turn_pid
    }

    pub fn forward_pid(&self) -> &Pid<C> {
        &self.forward_pid
    }

    fn transition(&mut self, next: NavigatorState) {
        if self.state != next {
            tracing::info!("Navigator: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

/// Clamp to `[lo, hi]`; NaN maps to zero rather than propagating.
#[inline]
fn clamp_or_zero(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        0.0_f32.clamp(lo, hi)
    } else {
        value.clamp(lo, hi)
    }
}

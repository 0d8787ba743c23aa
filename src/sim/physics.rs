//! Kinematic base for simulation.
//!
//! Integrates unicycle motion without collisions; the scene has no walls.

use std::f32::consts::{PI, TAU};

use crate::actuator::BaseSink;
use crate::control::VelocityCommand;
use crate::error::Result;

/// Planar pose (meters, radians CCW from +X).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Pose2D {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

impl Pose2D {
    pub const fn new(x: f32, y: f32, theta: f32) -> Self {
        Self { x, y, theta }
    }
}

/// Simulated differential-drive base.
#[derive(Clone, Debug)]
pub struct SimulatedBase {
    pose: Pose2D,
    command: VelocityCommand,
}

impl SimulatedBase {
    pub fn new(pose: Pose2D) -> Self {
        Self {
            pose: Pose2D {
                theta: normalize_angle(pose.theta),
                ..pose
            },
            command: VelocityCommand::stop(),
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Last command received.
    pub fn command(&self) -> VelocityCommand {
        self.command
    }

    /// Advance `dt` seconds under the last command.
    pub fn update(&mut self, dt: f32) {
        let VelocityCommand {
            forward: v,
            turn: w,
        } = self.command;
        let Pose2D { x, y, theta } = self.pose;

        let (new_x, new_y, new_theta) = if w.abs() < 1e-6 {
            // Straight line motion
            (x + v * theta.cos() * dt, y + v * theta.sin() * dt, theta)
        } else {
            // Arc motion
            let r = v / w;
            let new_theta = theta + w * dt;
            (
                x + r * (new_theta.sin() - theta.sin()),
                y + r * (theta.cos() - new_theta.cos()),
                new_theta,
            )
        };

        self.pose = Pose2D::new(new_x, new_y, normalize_angle(new_theta));
    }
}

impl BaseSink for SimulatedBase {
    fn send(&mut self, command: VelocityCommand) -> Result<()> {
        self.command = command;
        Ok(())
    }
}

/// Normalize angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a >= PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

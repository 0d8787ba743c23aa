//! Velocity command sent to the base once per control cycle.

use std::fmt;

/// Forward and turn velocity pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityCommand {
    /// Forward velocity (m/s)
    pub forward: f32,

    /// Turn velocity (rad/s), positive is counter-clockwise
    pub turn: f32,
}

impl VelocityCommand {
    pub const fn new(forward: f32, turn: f32) -> Self {
        Self { forward, turn }
    }

    /// Zero command.
    pub const fn stop() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn is_stop(&self) -> bool {
        self.forward == 0.0 && self.turn == 0.0
    }
}

impl From<VelocityCommand> for (f32, f32) {
    fn from(cmd: VelocityCommand) -> Self {
        (cmd.forward, cmd.turn)
    }
}

impl fmt::Display for VelocityCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fwd={:+.3} m/s  turn={:+.3} rad/s", self.forward, self.turn)
    }
}

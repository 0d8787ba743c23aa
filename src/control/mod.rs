//! Closed-loop approach control.
//!
//! [`Navigator`] composes two [`Pid`] filters, one per axis, and maps each
//! detection to a clamped [`VelocityCommand`].

pub mod clock;
mod command;
mod navigator;
mod pid;

pub use clock::{Clock, ManualClock, SystemClock};
pub use command::VelocityCommand;
pub use navigator::{Navigator, NavigatorState};
pub use pid::{DT_FLOOR, Pid, PidGains};

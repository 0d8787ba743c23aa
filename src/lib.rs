//! Drishti - visual-servoing approach controller for a mobile base
//!
//! Drives the base toward a target seen by its camera: a detector reduces
//! each frame to a centroid and an area, and a PID-driven state machine turns
//! that into bounded forward and turn velocities.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Detection   ┌──────────────┐  VelocityCommand  ┌──────────────┐
//! │ perception/  │ ────────────▶ │  control/    │ ────────────────▶ │  actuator    │
//! │ (Detector)   │               │ (Navigator)  │                   │ (BaseSink)   │
//! └──────────────┘               └──────────────┘                   └──────────────┘
//!        ▲                                                                 │
//!        │                       servo (ServoLoop)                         │
//!        └──────────── FrameSource ◀──── sim/ (SimulatedScene) ◀──────────┘
//! ```
//!
//! - [`control`]: [`Pid`], [`Navigator`], injectable [`Clock`]
//! - [`perception`]: [`Detection`], colour and model-backed detectors
//! - [`actuator`]: [`BaseSink`] and a logging sink
//! - [`servo`]: the fixed-rate capture/detect/command loop
//! - [`sim`]: kinematic base and synthetic camera for running without hardware

pub mod actuator;
pub mod config;
pub mod control;
pub mod error;
pub mod perception;
pub mod servo;
pub mod sim;

pub use actuator::{BaseSink, LogSink};
pub use config::{ControlConfig, DetectorConfig, DrishtiConfig, NavigatorConfig, SimulationConfig};
pub use control::{
    Clock, ManualClock, Navigator, NavigatorState, Pid, PidGains, SystemClock, VelocityCommand,
};
pub use error::{DrishtiError, Result};
pub use perception::{
    BoundingBox, ColorDetector, Detection, Detector, InferenceBackend, ModelDetector, ScoredBox,
};
pub use servo::{FrameSource, LoopOutcome, LoopReport, ServoLoop};
pub use sim::{Pose2D, SimulatedScene};

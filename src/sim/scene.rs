//! Closed-loop simulated scene.
//!
//! The scene is shared between two handles so a servo loop can own the
//! actuator side while borrowing the camera side:
//!
//! - [`SceneCamera`]: advances physics by one control period, then renders
//! - [`SceneBase`]: stores the latest command for the next physics step
//!
//! Scene time drives a [`ManualClock`]; hand that clock to the navigator so
//! PID `dt` follows simulated time rather than wall time.

use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;
use parking_lot::Mutex;

use super::camera::{SyntheticCamera, Target};
use super::physics::{Pose2D, SimulatedBase};
use crate::actuator::BaseSink;
use crate::config::SimulationConfig;
use crate::control::{ManualClock, VelocityCommand};
use crate::error::Result;
use crate::servo::FrameSource;

#[derive(Debug)]
struct SceneState {
    base: SimulatedBase,
    frames: u64,
}

/// Simulated base, camera and clock.
#[derive(Clone)]
pub struct SimulatedScene {
    state: Arc<Mutex<SceneState>>,
    camera: Arc<SyntheticCamera>,
    clock: ManualClock,
    dt: f32,
}

impl SimulatedScene {
    /// Build a scene rendering `width`x`height` frames, stepping `dt` seconds
    /// per frame.
    pub fn new(config: &SimulationConfig, width: u32, height: u32, dt: f32) -> Result<Self> {
        config.validate()?;

        let target = Target {
            x: config.target_x,
            y: config.target_y,
            size: config.target_size,
            rgb: config.target_rgb,
        };
        let camera = SyntheticCamera::new(width, height, config.fov_deg, target);
        let base = SimulatedBase::new(Pose2D::new(
            config.start_x,
            config.start_y,
            config.start_theta,
        ));

        tracing::debug!(
            "SimulatedScene: {}x{} frames, focal={:.1}px, dt={:.3}s",
            width,
            height,
            camera.focal_px(),
            dt
        );

        Ok(Self {
            state: Arc::new(Mutex::new(SceneState { base, frames: 0 })),
            camera: Arc::new(camera),
            clock: ManualClock::new(),
            dt,
        })
    }

    /// Clock advanced by one period per rendered frame.
    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    pub fn camera(&self) -> SceneCamera {
        SceneCamera {
            scene: self.clone(),
        }
    }

    pub fn base(&self) -> SceneBase {
        SceneBase {
            scene: self.clone(),
        }
    }

    pub fn pose(&self) -> Pose2D {
        self.state.lock().base.pose()
    }

    pub fn frames(&self) -> u64 {
        self.state.lock().frames
    }

    /// Straight-line distance from the base to the target (meters).
    pub fn distance_to_target(&self) -> f32 {
        let pose = self.pose();
        let target = self.camera.target();
        (target.x - pose.x).hypot(target.y - pose.y)
    }

    fn step_and_render(&self) -> RgbImage {
        let mut state = self.state.lock();
        state.base.update(self.dt);
        state.frames += 1;
        self.clock.advance(Duration::from_secs_f32(self.dt));
        self.camera.render(&state.base.pose())
    }
}

/// Frame-source half of a [`SimulatedScene`].
pub struct SceneCamera {
    scene: SimulatedScene,
}

impl FrameSource for SceneCamera {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(Some(self.scene.step_and_render()))
    }
}

/// Actuator half of a [`SimulatedScene`].
pub struct SceneBase {
    scene: SimulatedScene,
}

impl BaseSink for SceneBase {
    fn send(&mut self, command: VelocityCommand) -> Result<()> {
        self.scene.state.lock().base.send(command)
    }
}

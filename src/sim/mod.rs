//! Hardware-free stand-ins for the camera and the base.

mod camera;
mod physics;
mod scene;

pub use camera::{Projection, SyntheticCamera, Target};
pub use physics::{Pose2D, SimulatedBase, normalize_angle};
pub use scene::{SceneBase, SceneCamera, SimulatedScene};

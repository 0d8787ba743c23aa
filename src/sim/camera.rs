//! Pinhole camera rendering a single coloured target.
//!
//! The camera sits at target height and looks along the base heading, so the
//! target always projects onto the middle row band of the image.

use image::{Rgb, RgbImage};

use super::physics::Pose2D;

const SKY: Rgb<u8> = Rgb([180, 180, 180]);
const FLOOR: Rgb<u8> = Rgb([110, 110, 110]);

/// Targets closer than this are not drawn (meters).
const NEAR_PLANE: f32 = 0.05;

/// A square target standing in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub x: f32,
    pub y: f32,
    /// Edge length (meters)
    pub size: f32,
    pub rgb: [u8; 3],
}

/// Where the target lands in the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Horizontal pixel coordinate of the target centre
    pub u: f32,
    /// Half edge length in pixels
    pub half_px: f32,
    /// Depth along the optical axis (meters)
    pub depth: f32,
}

/// Synthetic camera.
#[derive(Clone, Debug)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    focal_px: f32,
    target: Target,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, fov_deg: f32, target: Target) -> Self {
        let focal_px = (width as f32 / 2.0) / (fov_deg.to_radians() / 2.0).tan();
        Self {
            width,
            height,
            focal_px,
            target,
        }
    }

    pub fn focal_px(&self) -> f32 {
        self.focal_px
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Project the target for a camera at `pose`; `None` when behind the camera.
    pub fn project(&self, pose: &Pose2D) -> Option<Projection> {
        let dx = self.target.x - pose.x;
        let dy = self.target.y - pose.y;
        let (sin, cos) = pose.theta.sin_cos();

        let depth = dx * cos + dy * sin;
        let left = -dx * sin + dy * cos;
        if depth < NEAR_PLANE {
            return None;
        }

        Some(Projection {
            u: self.width as f32 / 2.0 - self.focal_px * left / depth,
            half_px: self.focal_px * self.target.size / (2.0 * depth),
            depth,
        })
    }

    /// Render the view from `pose`.
    pub fn render(&self, pose: &Pose2D) -> RgbImage {
        let horizon = self.height / 2;
        let mut img = RgbImage::from_fn(self.width, self.height, |_, y| {
            if y < horizon { SKY } else { FLOOR }
        });

        let Some(p) = self.project(pose) else {
            return img;
        };

        let v = self.height as f32 / 2.0;
        let x0 = (p.u - p.half_px).round().max(0.0);
        let x1 = (p.u + p.half_px).round().min(self.width as f32);
        let y0 = (v - p.half_px).round().max(0.0);
        let y1 = (v + p.half_px).round().min(self.height as f32);
        if x0 >= x1 || y0 >= y1 {
            return img;
        }

        let color = Rgb(self.target.rgb);
        for y in y0 as u32..y1 as u32 {
            for x in x0 as u32..x1 as u32 {
                img.put_pixel(x, y, color);
            }
        }
        img
    }
}

//! Perception front-end.
//!
//! Anything that turns a camera frame into a [`Detection`] can drive the
//! navigator. Two providers ship with the crate:
//!
//! - [`ColorDetector`]: HSV thresholding, largest blob wins
//! - [`ModelDetector`]: wraps a bounding-box inference backend
//!
//! Detectors are plain owned values; build one and thread it through the
//! control loop.

mod annotate;
mod color;
mod model;

pub use annotate::annotate;
pub use color::{Blob, ColorDetector, ColorRange, Mask, largest_component, named_ranges, rgb_to_hsv};
pub use model::{InferenceBackend, ModelDetector, ScoredBox};

use image::RgbImage;

use crate::error::Result;

/// Integer pixel rectangle `(x, y, w, h)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Centre of the rectangle in pixels.
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    pub fn area(&self) -> f32 {
        self.w as f32 * self.h as f32
    }
}

/// Result of detecting the target in one frame.
///
/// When `found` is false the remaining fields carry no information; use
/// [`Detection::centroid`] rather than reading `cx`/`cy` directly.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Detection {
    pub found: bool,
    /// Centroid x (pixels)
    pub cx: f32,
    /// Centroid y (pixels)
    pub cy: f32,
    /// Target area (pixels²)
    pub area: f32,
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    /// Target not visible.
    pub const fn missing() -> Self {
        Self {
            found: false,
            cx: 0.0,
            cy: 0.0,
            area: 0.0,
            bbox: None,
        }
    }

    /// Target visible at the given centroid and area.
    pub const fn found_at(cx: f32, cy: f32, area: f32, bbox: Option<BoundingBox>) -> Self {
        Self {
            found: true,
            cx,
            cy,
            area,
            bbox,
        }
    }

    /// Centroid, only when the target was found.
    pub fn centroid(&self) -> Option<(f32, f32)> {
        self.found.then_some((self.cx, self.cy))
    }
}

/// Produces a detection for each frame.
pub trait Detector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Detection>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, frame: &RgbImage) -> Result<Detection> {
        (**self).detect(frame)
    }
}

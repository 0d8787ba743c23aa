//! Colour-segmentation detector.
//!
//! Pipeline per frame:
//! 1. RGB → HSV (H in 0..180, S and V in 0..255)
//! 2. Threshold against the configured hue bands
//! 3. Opening, then dilation, with a square kernel to drop speckle
//!    (`imageproc` morphology)
//! 4. 8-connected labelling; the largest component is the target
//!
//! Area is the component pixel count, the centroid is the centre of its
//! bounding rectangle.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::map::map_colors;
use imageproc::morphology::{dilate, erode};
use imageproc::region_labelling::{Connectivity, connected_components};

use super::{BoundingBox, Detection, Detector};
use crate::config::DetectorConfig;
use crate::error::{DrishtiError, Result};

/// Inclusive HSV band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorRange {
    pub lo: [u8; 3],
    pub hi: [u8; 3],
}

impl ColorRange {
    pub const fn new(lo: [u8; 3], hi: [u8; 3]) -> Self {
        Self { lo, hi }
    }

    #[inline]
    fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lo[i] && hsv[i] <= self.hi[i])
    }
}

const COLOR_NAMES: [&str; 4] = ["red", "green", "blue", "yellow"];

/// HSV bands for a named colour. Red wraps around hue 0 and needs two.
pub fn named_ranges(color: &str) -> Option<Vec<ColorRange>> {
    let ranges = match color.to_lowercase().as_str() {
        "red" => vec![
            ColorRange::new([0, 120, 70], [10, 255, 255]),
            ColorRange::new([170, 120, 70], [180, 255, 255]),
        ],
        "green" => vec![ColorRange::new([36, 100, 70], [86, 255, 255])],
        "blue" => vec![ColorRange::new([100, 150, 70], [140, 255, 255])],
        "yellow" => vec![ColorRange::new([20, 100, 70], [35, 255, 255])],
        _ => return None,
    };
    Some(ranges)
}

/// Largest-blob colour detector.
#[derive(Clone, Debug)]
pub struct ColorDetector {
    ranges: Vec<ColorRange>,
    min_area: u32,
    open_iterations: u32,
    dilate_iterations: u32,
    kernel_radius: u8,
}

impl ColorDetector {
    /// Build a detector for a named colour.
    pub fn new(color: &str, min_area: u32) -> Result<Self> {
        let ranges = named_ranges(color).ok_or_else(|| {
            DrishtiError::Config(format!("Unknown color: {}. Options: {:?}", color, COLOR_NAMES))
        })?;
        Ok(Self::with_ranges(ranges, min_area))
    }

    /// Build a detector from explicit HSV bands.
    pub fn with_ranges(ranges: Vec<ColorRange>, min_area: u32) -> Self {
        Self {
            ranges,
            min_area,
            open_iterations: 2,
            dilate_iterations: 1,
            kernel_radius: 2,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        Ok(Self::new(&config.color, config.min_area)?.with_morphology(
            config.open_iterations,
            config.dilate_iterations,
            config.kernel_radius,
        ))
    }

    /// Override mask cleanup passes.
    pub fn with_morphology(mut self, open: u32, dilate: u32, kernel_radius: u8) -> Self {
        self.open_iterations = open;
        self.dilate_iterations = dilate;
        self.kernel_radius = kernel_radius;
        self
    }

    /// Binary mask of pixels inside any band, after cleanup.
    pub fn mask(&self, frame: &RgbImage) -> Mask {
        let mut mask = map_colors(frame, |pixel: Rgb<u8>| {
            let hsv = rgb_to_hsv(pixel.0);
            if self.ranges.iter().any(|r| r.contains(hsv)) {
                ON
            } else {
                OFF
            }
        });

        // LInf distance gives the square (2r+1)x(2r+1) kernel.
        let r = self.kernel_radius;
        if r == 0 {
            return mask;
        }
        for _ in 0..self.open_iterations {
            mask = erode(&mask, Norm::LInf, r);
        }
        for _ in 0..self.open_iterations {
            mask = dilate(&mask, Norm::LInf, r);
        }
        for _ in 0..self.dilate_iterations {
            mask = dilate(&mask, Norm::LInf, r);
        }
        mask
    }
}

impl Detector for ColorDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Detection> {
        let mask = self.mask(frame);
        let Some(blob) = largest_component(&mask) else {
            return Ok(Detection::missing());
        };

        if blob.pixels < self.min_area as usize {
            tracing::trace!(
                "color: largest blob {}px below min_area {}",
                blob.pixels,
                self.min_area
            );
            return Ok(Detection::missing());
        }

        let (cx, cy) = blob.bbox.center();
        Ok(Detection::found_at(cx, cy, blob.pixels as f32, Some(blob.bbox)))
    }
}

/// Convert RGB to HSV on the 0..180 / 0..255 / 0..255 scale.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let h_deg = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let h_deg = if h_deg < 0.0 { h_deg + 360.0 } else { h_deg };

    [
        (h_deg / 2.0).round().min(180.0) as u8,
        s.round() as u8,
        v.round() as u8,
    ]
}

/// Binary mask, 255 where the colour matched.
pub type Mask = GrayImage;

const ON: Luma<u8> = Luma([255]);
const OFF: Luma<u8> = Luma([0]);

/// One connected component of a mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blob {
    pub pixels: usize,
    pub bbox: BoundingBox,
}

#[derive(Clone, Copy)]
struct Extent {
    pixels: usize,
    min: (u32, u32),
    max: (u32, u32),
}

/// Largest 8-connected component of `mask`, first in raster order on ties.
pub fn largest_component(mask: &Mask) -> Option<Blob> {
    let labels = connected_components(mask, Connectivity::Eight, OFF);

    let mut extents: Vec<Option<Extent>> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }
        if label >= extents.len() {
            extents.resize(label + 1, None);
        }
        let e = extents[label].get_or_insert(Extent {
            pixels: 0,
            min: (x, y),
            max: (x, y),
        });
        e.pixels += 1;
        e.min = (e.min.0.min(x), e.min.1.min(y));
        e.max = (e.max.0.max(x), e.max.1.max(y));
    }

    let mut best: Option<Extent> = None;
    for e in extents.into_iter().flatten() {
        if best.is_none_or(|b| e.pixels > b.pixels) {
            best = Some(e);
        }
    }

    best.map(|e| Blob {
        pixels: e.pixels,
        bbox: BoundingBox::new(
            e.min.0 as i32,
            e.min.1 as i32,
            e.max.0 - e.min.0 + 1,
            e.max.1 - e.min.1 + 1,
        ),
    })
}

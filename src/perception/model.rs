//! Detector backed by a bounding-box inference model.
//!
//! The model itself lives behind [`InferenceBackend`]; this module only picks
//! the best matching box and turns it into a [`Detection`].

use std::fmt::Display;

use image::RgbImage;

use super::{BoundingBox, Detection, Detector};
use crate::config::DetectorConfig;
use crate::error::{DrishtiError, Result};

/// One labelled box from a model, corners in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredBox {
    pub label: String,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl ScoredBox {
    pub fn new(label: impl Into<String>, confidence: f32, xyxy: [f32; 4]) -> Self {
        let [x1, y1, x2, y2] = xyxy;
        Self {
            label: label.into(),
            confidence,
            x1,
            y1,
            x2,
            y2,
        }
    }
}

/// Runs a detection model over a frame.
pub trait InferenceBackend {
    type Error: Display;

    fn infer(&mut self, frame: &RgbImage) -> std::result::Result<Vec<ScoredBox>, Self::Error>;
}

/// Highest-confidence box matching a label.
pub struct ModelDetector<B: InferenceBackend> {
    backend: B,
    label: String,
    conf_threshold: f32,
}

impl<B: InferenceBackend> ModelDetector<B> {
    pub fn new(backend: B, label: impl Into<String>, conf_threshold: f32) -> Self {
        Self {
            backend,
            label: label.into(),
            conf_threshold,
        }
    }

    pub fn from_config(backend: B, config: &DetectorConfig) -> Self {
        Self::new(backend, config.label.clone(), config.conf_threshold)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Pick the best box for the configured label.
    ///
    /// Boxes must beat the confidence threshold strictly; empty boxes are
    /// skipped. On equal confidence the earlier box wins.
    pub fn select(&self, boxes: &[ScoredBox]) -> Detection {
        let best = boxes
            .iter()
            .filter(|b| b.label.eq_ignore_ascii_case(&self.label))
            .filter(|b| b.confidence > self.conf_threshold)
            .filter(|b| b.x2 > b.x1 && b.y2 > b.y1)
            .reduce(|best, b| if b.confidence > best.confidence { b } else { best });

        let Some(best) = best else {
            return Detection::missing();
        };

        let (x1, y1) = (best.x1 as i32, best.y1 as i32);
        let (x2, y2) = (best.x2 as i32, best.y2 as i32);
        let (w, h) = ((x2 - x1).max(0) as u32, (y2 - y1).max(0) as u32);

        Detection::found_at(
            (x1 + x2) as f32 / 2.0,
            (y1 + y2) as f32 / 2.0,
            w as f32 * h as f32,
            Some(BoundingBox::new(x1, y1, w, h)),
        )
    }
}

impl<B: InferenceBackend> Detector for ModelDetector<B> {
    fn detect(&mut self, frame: &RgbImage) -> Result<Detection> {
        let boxes = self
            .backend
            .infer(frame)
            .map_err(|e| DrishtiError::Detector(format!("inference failed: {}", e)))?;
        tracing::trace!("model: {} boxes", boxes.len());
        Ok(self.select(&boxes))
    }
}

//! Overlay a detection on a frame for inspection.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::Detection;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CENTROID_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const BOX_THICKNESS: u32 = 2;
const CENTROID_RADIUS: i32 = 5;

/// Copy of `frame` with the bounding box outlined and the centroid marked.
///
/// Missing detections return the frame unchanged. Shapes are clipped to the
/// frame.
pub fn annotate(frame: &RgbImage, det: &Detection) -> RgbImage {
    let mut vis = frame.clone();
    let (Some((cx, cy)), Some(bbox)) = (det.centroid(), det.bbox) else {
        return vis;
    };

    // Thickness grows inwards, one hollow rectangle per pixel.
    for t in 0..BOX_THICKNESS {
        let (Some(w), Some(h)) = (bbox.w.checked_sub(2 * t), bbox.h.checked_sub(2 * t)) else {
            break;
        };
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at(bbox.x + t as i32, bbox.y + t as i32).of_size(w, h);
        draw_hollow_rect_mut(&mut vis, rect, BOX_COLOR);
    }

    draw_filled_circle_mut(&mut vis, (cx as i32, cy as i32), CENTROID_RADIUS, CENTROID_COLOR);
    vis
}

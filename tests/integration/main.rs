//! Integration tests for drishti
//!
//! Exercise the navigator, detectors and servo loop together through the
//! public API, with the simulated scene standing in for camera and base.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration -- --nocapture
//!
//! # Closed-loop runs only
//! cargo test --test integration closed_loop
//! ```

mod closed_loop;
mod properties;
mod scenarios;

use drishti::{Detection, ManualClock, Navigator, NavigatorConfig};

/// Navigator on a manual clock; advance the returned handle between calls.
pub fn manual_navigator(config: NavigatorConfig) -> (Navigator<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let navigator = Navigator::with_clock(config, clock.clone()).unwrap();
    (navigator, clock)
}

/// Found detection at `cx` on the image centre row.
pub fn seen(cx: f32, area: f32) -> Detection {
    Detection::found_at(cx, 240.0, area, None)
}

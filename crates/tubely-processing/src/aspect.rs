//! Aspect ratio classification.

use tubely_core::models::{AspectClass, MediaGeometry};

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Relative tolerance around each target ratio.
const TOLERANCE: f64 = 0.05;

fn within_band(ratio: f64, target: f64) -> bool {
    (ratio - target).abs() <= target * TOLERANCE
}

/// Classify a frame size. Landscape is checked first and wins any overlap.
pub fn classify(geometry: MediaGeometry) -> AspectClass {
    let ratio = geometry.ratio();
    if within_band(ratio, LANDSCAPE_RATIO) {
        AspectClass::Landscape
    } else if within_band(ratio, PORTRAIT_RATIO) {
        AspectClass::Portrait
    } else {
        AspectClass::Other
    }
}

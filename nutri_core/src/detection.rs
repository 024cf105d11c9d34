//! Food detection boundary and its fallback policy.
//!
//! There is no inference model in this crate. [`UnavailableDetector`] is the
//! stub shipped by default; it always fails, so every scan resolves through
//! [`detect_or_fallback`] to a random catalog food. A real backend only has
//! to implement [`FoodDetector`], optionally using [`resolve_predictions`] to
//! map raw class scores onto the scanner catalog.

use crate::config::DetectionConfig;
use crate::{Catalog, Error, Macros, Result, ScannerFood};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Food reported when no prediction beats the threshold
pub const DEFAULT_FOOD: &str = "Basmati Rice";

/// Encoded camera frame handed to a detector
#[derive(Clone, Debug, Default)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

/// Result of a scan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub food_name: String,
    pub confidence: f64,
    pub calories: u32,
    pub nutrition: Macros,
    /// True when the result came from the fallback policy
    #[serde(default)]
    pub fallback: bool,
}

/// Anything that can turn an image into a food guess
pub trait FoodDetector {
    fn detect(&self, image: &ImagePayload) -> Result<Detection>;
}

/// Stub detector: no model is bundled, every call fails
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableDetector;

impl FoodDetector for UnavailableDetector {
    fn detect(&self, _image: &ImagePayload) -> Result<Detection> {
        Err(Error::Detection("no inference model loaded".into()))
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn to_detection(food: &ScannerFood, confidence: f64, fallback: bool) -> Detection {
    Detection {
        food_name: food.name.clone(),
        confidence: round2(confidence),
        calories: food.calories,
        nutrition: food.macros,
        fallback,
    }
}

/// Map raw model output onto the scanner catalog
///
/// Class ids wrap around the catalog size. The highest score strictly above
/// the threshold wins; otherwise the default food is reported at the
/// threshold confidence.
pub fn resolve_predictions(
    catalog: &Catalog,
    scores: &[f32],
    classes: &[u32],
    threshold: f64,
) -> Option<Detection> {
    if catalog.scanner_foods.is_empty() {
        return None;
    }

    let mut best: Option<(&ScannerFood, f64)> = None;
    let mut best_score = threshold;
    for (score, class) in scores.iter().zip(classes) {
        let score = f64::from(*score);
        let food = &catalog.scanner_foods[*class as usize % catalog.scanner_foods.len()];
        if score > best_score {
            best_score = score;
            best = Some((food, score));
        }
    }

    let (food, confidence) = match best {
        Some(found) => found,
        None => (catalog.scanner_food(DEFAULT_FOOD)?, threshold),
    };
    Some(to_detection(food, confidence, false))
}

/// Uniformly random scanner food with a plausible confidence
pub fn fallback_detection<R: Rng + ?Sized>(
    catalog: &Catalog,
    config: &DetectionConfig,
    rng: &mut R,
) -> Option<Detection> {
    if catalog.scanner_foods.is_empty() {
        return None;
    }
    let food = &catalog.scanner_foods[rng.gen_range(0..catalog.scanner_foods.len())];
    let confidence =
        rng.gen_range(config.fallback_confidence_min..=config.fallback_confidence_max);
    Some(to_detection(food, confidence, true))
}

/// Reject responses a caller cannot log
fn check_response(catalog: &Catalog, detection: &Detection) -> Result<()> {
    if !(0.0..=1.0).contains(&detection.confidence) {
        return Err(Error::Detection(format!(
            "confidence {} outside 0..=1",
            detection.confidence
        )));
    }
    if catalog.scanner_food(&detection.food_name).is_none() {
        return Err(Error::Detection(format!(
            "unknown food '{}'",
            detection.food_name
        )));
    }
    Ok(())
}

/// Run `detector`, substituting the fallback on any failure
///
/// Failures are logged and never surfaced. `None` only when the catalog has
/// no scanner foods at all.
pub fn detect_or_fallback<D, R>(
    detector: &D,
    image: &ImagePayload,
    catalog: &Catalog,
    config: &DetectionConfig,
    rng: &mut R,
) -> Option<Detection>
where
    D: FoodDetector + ?Sized,
    R: Rng + ?Sized,
{
    let attempt = if image.bytes.is_empty() {
        Err(Error::Detection("empty image".into()))
    } else {
        detector
            .detect(image)
            .and_then(|d| check_response(catalog, &d).map(|_| d))
    };

    match attempt {
        Ok(detection) => Some(detection),
        Err(e) => {
            tracing::warn!("Food detection failed ({}), using fallback", e);
            fallback_detection(catalog, config, rng)
        }
    }
}

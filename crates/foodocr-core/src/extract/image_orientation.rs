//! Image rotation prediction from word-level orientation votes.

use serde_json::json;

use crate::ocr::{ImageOrientation, OcrDocument};
use crate::prediction::{Prediction, PredictionType};

/// Agreement fraction above which the rotation is applied automatically.
const AUTOMATIC_THRESHOLD: f64 = 0.95;

/// Predict the rotation needed to bring the image text upright.
///
/// Emits nothing for upright or unclassifiable images.
pub fn find_image_orientation(document: &OcrDocument) -> Vec<Prediction> {
    let result = document.detect_orientation();

    if result.orientation == ImageOrientation::Up
        || result.orientation == ImageOrientation::Unknown
    {
        return Vec::new();
    }

    let total = result.total();
    let winning = result
        .count
        .get(&result.orientation)
        .copied()
        .unwrap_or(0);
    let agreement = if total == 0 {
        0.0
    } else {
        winning as f64 / total as f64
    };

    let count: serde_json::Map<String, serde_json::Value> = result
        .count
        .iter()
        .map(|(orientation, votes)| (orientation.as_str().to_string(), json!(votes)))
        .collect();

    vec![
        Prediction::new(PredictionType::ImageOrientation)
            .with_data(json!({
                "orientation": result.orientation.as_str(),
                "rotation": result.rotation(),
                "count": count,
            }))
            .with_confidence(agreement)
            .with_automatic_processing(agreement >= AUTOMATIC_THRESHOLD),
    ]
}

//! Image moderation flagging from safe-search, face and label annotations.

use serde_json::json;

use crate::ocr::{Likelihood, OcrDocument};
use crate::prediction::{Prediction, PredictionType};

/// Minimum label-annotation score to flag.
const LABEL_SCORE_THRESHOLD: f64 = 0.6;

/// Minimum face detection confidence to flag.
const FACE_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Label descriptions that indicate a human subject rather than a product.
const LABELS_TO_FLAG: [&str; 21] = [
    "face",
    "head",
    "selfie",
    "hair",
    "forehead",
    "chin",
    "cheek",
    "arm",
    "tooth",
    "human leg",
    "ankle",
    "eyebrow",
    "ear",
    "neck",
    "jaw",
    "nose",
    "facial expression",
    "glasses",
    "eyewear",
    "child",
    "baby",
];

/// Flag an image for human moderation.
///
/// Three independent signals; each contributes at most one prediction:
/// safe-search adult/violence at `VeryLikely`, a confident face detection,
/// and human-subject label annotations.
pub fn flag_image(document: &OcrDocument) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    if let Some(safe_search) = &document.safe_search_annotation {
        for (label, likelihood) in [
            ("adult", safe_search.adult),
            ("violence", safe_search.violence),
        ] {
            if likelihood >= Likelihood::VeryLikely {
                predictions.push(
                    Prediction::new(PredictionType::ImageFlag)
                        .with_data(json!({
                            "type": "safe_search_annotation",
                            "label": label,
                            "likelihood": likelihood,
                        }))
                        .with_predictor("google-cloud-vision"),
                );
                break;
            }
        }
    }

    let max_face_confidence = document
        .face_annotations
        .iter()
        .map(|face| face.detection_confidence)
        .fold(f64::NEG_INFINITY, f64::max);
    if !document.face_annotations.is_empty() && max_face_confidence >= FACE_CONFIDENCE_THRESHOLD {
        predictions.push(
            Prediction::new(PredictionType::ImageFlag)
                .with_data(json!({
                    "type": "face_annotation",
                    "label": "face",
                    "likelihood": max_face_confidence,
                }))
                .with_predictor("google-cloud-vision"),
        );
    }

    for label in &document.label_annotations {
        let description = label.description.to_lowercase();
        if label.score >= LABEL_SCORE_THRESHOLD && LABELS_TO_FLAG.contains(&description.as_str())
        {
            predictions.push(
                Prediction::new(PredictionType::ImageFlag)
                    .with_data(json!({
                        "type": "label_annotation",
                        "label": description,
                        "likelihood": label.score,
                    }))
                    .with_predictor("google-cloud-vision"),
            );
            break;
        }
    }

    predictions
}

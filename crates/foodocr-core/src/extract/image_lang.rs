//! Dominant-language prediction from word-level language counts.

use serde_json::json;

use crate::ocr::{OcrDocument, WORD_COUNT};
use crate::prediction::{Prediction, PredictionType};

/// Predict the language mix of the image text.
///
/// Emits one prediction carrying the raw counts and the derived
/// percentages (`count * 100 / words`); nothing when no word was detected.
pub fn find_image_lang(document: &OcrDocument) -> Vec<Prediction> {
    let counts = document.get_languages();
    let words = counts.get(WORD_COUNT).copied().unwrap_or(0);

    if words == 0 {
        return Vec::new();
    }

    let percent: serde_json::Map<String, serde_json::Value> = counts
        .iter()
        .filter(|(key, _)| key.as_str() != WORD_COUNT)
        .map(|(key, count)| {
            (
                key.clone(),
                json!(*count as f64 * 100.0 / words as f64),
            )
        })
        .collect();

    let count: serde_json::Map<String, serde_json::Value> = counts
        .iter()
        .map(|(key, value)| (key.clone(), json!(value)))
        .collect();

    vec![
        Prediction::new(PredictionType::ImageLang)
            .with_data(json!({"count": count, "percent": percent})),
    ]
}

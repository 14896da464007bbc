//! Allergen trace statement extraction.
//!
//! A mention regex finds "traces of"-style phrases, then the allergen
//! dictionary scans a bounded window of text after the mention.

use lazy_static::lazy_static;
use serde_json::json;

use crate::matcher::{OcrField, OcrRegex};
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::resources;

/// How far past a mention allergens are searched, in bytes.
const TRACE_WINDOW: usize = 100;

lazy_static! {
    static ref TRACES_REGEX: OcrRegex = OcrRegex::new(
        r"(?:traces? [ée]ventuelles? de|traces? possibles? de|peut contenir des traces de|peut contenir|may contain traces of|may contain|kann spuren von)\s?:?\s?",
        OcrField::FullTextContiguous,
    )
    .lowercase();
}

fn clamp_to_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Extract allergen-trace predictions.
pub fn find_traces(document: &OcrDocument) -> Vec<Prediction> {
    let text = document.get_text(&TRACES_REGEX);
    let allergens = resources::trace_processor();
    let mut predictions = Vec::new();

    for mention in TRACES_REGEX.regex.find_iter(text) {
        let window_end = clamp_to_char_boundary(text, mention.end() + TRACE_WINDOW);
        let window = &text[mention.end()..window_end];

        for keyword_match in allergens.extract(window) {
            predictions.push(
                Prediction::new(PredictionType::Trace)
                    .with_value_tag(keyword_match.payload.tag.clone())
                    .with_data(json!({
                        "text": keyword_match.matched(window),
                        "mention": mention.as_str().trim(),
                        "extract": window,
                    })),
            );
        }
    }

    predictions
}

//! Brand extraction from the curated list and detected logos.

use serde_json::json;

use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::resources;
use crate::text::get_tag;

/// Minimum logo-annotation score to accept a logo signal.
const LOGO_SCORE_THRESHOLD: f64 = 0.6;

/// Vision-API logo descriptions mapped to brands.
const LOGO_BRANDS: &[(&str, &str)] = &[
    ("coca-cola", "Coca-Cola"),
    ("nestlé", "Nestlé"),
    ("nestle", "Nestlé"),
    ("kellogg's", "Kellogg's"),
    ("danone", "Danone"),
    ("milka", "Milka"),
    ("lu", "LU"),
    ("president", "Président"),
    ("haribo", "Haribo"),
    ("lindt", "Lindt"),
];

/// Extract brand predictions.
///
/// Dictionary and logo signals both fire without deduplication; duplicate
/// suppression is the importer's responsibility.
pub fn find_brands(document: &OcrDocument) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    let dictionary = resources::brand_processor();
    let text = document.get_full_text_contiguous(true);
    for keyword_match in dictionary.extract(text) {
        predictions.push(
            Prediction::new(PredictionType::Brand)
                .with_value(keyword_match.payload.display.clone())
                .with_value_tag(keyword_match.payload.tag.clone())
                .with_data(json!({
                    "text": keyword_match.matched(text),
                    "span": [keyword_match.start, keyword_match.end],
                }))
                .with_predictor("curated-list"),
        );
    }

    for logo in &document.logo_annotations {
        if logo.score < LOGO_SCORE_THRESHOLD {
            continue;
        }
        let description = logo.description.to_lowercase();
        for (logo_description, brand) in LOGO_BRANDS {
            if description == *logo_description {
                predictions.push(
                    Prediction::new(PredictionType::Brand)
                        .with_value(*brand)
                        .with_value_tag(get_tag(brand))
                        .with_data(json!({"text": logo.description}))
                        .with_predictor("google-cloud-vision")
                        .with_confidence(logo.score),
                );
            }
        }
    }

    predictions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_brand_from_dictionary() {
        let document = OcrDocument::from_text("Confiture Bonne Maman fraises");
        let predictions = find_brands(&document);

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].value.as_deref(), Some("Bonne Maman"));
        assert_eq!(predictions[0].value_tag.as_deref(), Some("bonne-maman"));
        assert_eq!(predictions[0].predictor, "curated-list");
    }

    #[test]
    fn test_brand_span_indexes_source_text() {
        let text = "Confiture Bonne Maman fraises";
        let document = OcrDocument::from_text(text);
        let predictions = find_brands(&document);

        let span = &predictions[0].data["span"];
        let start = span[0].as_u64().unwrap() as usize;
        let end = span[1].as_u64().unwrap() as usize;
        assert_eq!(&text.to_lowercase()[start..end], "bonne maman");
    }

    #[test]
    fn test_brand_from_logo() {
        let document = OcrDocument::from_json(&json!({
            "responses": [{
                "logoAnnotations": [{"description": "Coca-Cola", "score": 0.97}]
            }]
        }))
        .unwrap();

        let predictions = find_brands(&document);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].value.as_deref(), Some("Coca-Cola"));
        assert_eq!(predictions[0].predictor, "google-cloud-vision");
        assert_eq!(predictions[0].confidence, Some(0.97));
    }

    #[test]
    fn test_low_score_logo_ignored() {
        let document = OcrDocument::from_json(&json!({
            "responses": [{
                "logoAnnotations": [{"description": "Coca-Cola", "score": 0.3}]
            }]
        }))
        .unwrap();

        assert_eq!(find_brands(&document).len(), 0);
    }

    #[test]
    fn test_no_text_no_predictions() {
        assert_eq!(find_brands(&OcrDocument::from_text("")).len(), 0);
    }
}

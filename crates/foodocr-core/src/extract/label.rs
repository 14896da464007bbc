//! Label / certification claim extraction.
//!
//! Three independent signals: hand-written multilingual regexes, the
//! curated label dictionary, and detected logos. All three fire into the
//! same result list without deduplication; the importer dedupes.

use lazy_static::lazy_static;
use regex::Captures;
use serde_json::json;

use crate::matcher::{OcrField, OcrRegex};
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::resources;
use crate::text::get_tag;

/// Minimum logo-annotation score to accept a logo signal.
const LOGO_SCORE_THRESHOLD: f64 = 0.6;

/// Vision-API logo descriptions that map directly to a label tag.
const LOGO_LABELS: &[(&str, &str)] = &[
    ("fairtrade", "en:fairtrade-international"),
    ("max havelaar", "en:fairtrade-international"),
    ("label rouge", "en:label-rouge"),
    ("rainforest alliance", "en:rainforest-alliance"),
    ("utz", "en:utz-certified"),
    ("marine stewardship council", "en:msc"),
    ("european union organic", "en:eu-organic"),
];

fn process_es_eco(captures: &Captures) -> Option<String> {
    let matched = captures.get(0)?.as_str();
    Some(format!("en:{}", get_tag(matched)))
}

fn process_fr_bio(captures: &Captures) -> Option<String> {
    let number = captures.get(1)?.as_str();
    Some(format!("en:fr-bio-{number}"))
}

struct LabelMatcher {
    /// Fixed tag, or None when the tag is computed by post-processing.
    tag: Option<&'static str>,
    matcher: OcrRegex,
}

lazy_static! {
    static ref LABELS_REGEX: Vec<LabelMatcher> = vec![
        LabelMatcher {
            tag: Some("en:organic"),
            matcher: OcrRegex::new(
                r"\b(?:issu de l'agriculture biologique|agriculture biologique|organic farming)\b",
                OcrField::FullTextContiguous,
            )
            .lowercase(),
        },
        LabelMatcher {
            // Bare "bio" is noisy (and legitimately part of certifier codes
            // like FR-BIO-01), so hyphen-adjacent occurrences are excluded
            // and the prediction is flagged for moderation.
            tag: Some("en:organic"),
            matcher: OcrRegex::new(
                r"(?:^|[\s,;:!?.(])bio(?:[\s,;:!?.)]|$)",
                OcrField::FullTextContiguous,
            )
            .lowercase()
            .notify(),
        },
        LabelMatcher {
            // Spanish organic operator codes, e.g. ES-ECO-001-AN.
            tag: None,
            matcher: OcrRegex::new(r"\bes-eco-\d{3}-[a-z]{2}\b", OcrField::FullTextContiguous)
                .lowercase()
                .with_processing(process_es_eco),
        },
        LabelMatcher {
            // French organic certifier numbers, e.g. FR-BIO-01.
            tag: None,
            matcher: OcrRegex::new(r"\bfr[-\s]?bio[-\s]?(\d{2})\b", OcrField::FullTextContiguous)
                .lowercase()
                .with_processing(process_fr_bio),
        },
        LabelMatcher {
            tag: Some("en:no-gluten"),
            matcher: OcrRegex::new(
                r"\b(?:sans gluten|gluten[- ]free|glutenfrei|sin gluten)\b",
                OcrField::FullTextContiguous,
            )
            .lowercase(),
        },
        LabelMatcher {
            tag: Some("en:vegan"),
            matcher: OcrRegex::new(
                r"\b(?:100\s?%\s?)?(?:vegan|v[ée]g[ée]talien)\b",
                OcrField::FullTextContiguous,
            )
            .lowercase(),
        },
        LabelMatcher {
            tag: Some("en:no-additives"),
            matcher: OcrRegex::new(
                r"\b(?:sans additifs?|no additives?)\b",
                OcrField::FullTextContiguous,
            )
            .lowercase(),
        },
        LabelMatcher {
            tag: Some("en:no-palm-oil"),
            matcher: OcrRegex::new(
                r"\b(?:sans huile de palme|palm oil free)\b",
                OcrField::FullTextContiguous,
            )
            .lowercase(),
        },
        LabelMatcher {
            tag: Some("fr:aoc"),
            matcher: OcrRegex::new(
                r"\b(?:appellation d'origine contr[ôo]l[ée]e|aoc)\b",
                OcrField::FullTextContiguous,
            )
            .lowercase()
            .notify(),
        },
        LabelMatcher {
            tag: Some("en:pdo"),
            matcher: OcrRegex::new(r"\baop\b", OcrField::FullTextContiguous).lowercase(),
        },
        LabelMatcher {
            tag: Some("en:pgi"),
            matcher: OcrRegex::new(r"\bigp\b", OcrField::FullTextContiguous).lowercase(),
        },
    ];
}

/// Extract label predictions from regexes, the curated dictionary and logo
/// annotations.
pub fn find_labels(document: &OcrDocument) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    for entry in LABELS_REGEX.iter() {
        let text = document.get_text(&entry.matcher);
        for captures in entry.matcher.regex.captures_iter(text) {
            let tag = match entry.tag {
                Some(tag) => Some(tag.to_string()),
                None => entry.matcher.process(&captures),
            };
            let Some(tag) = tag else { continue };

            let raw = captures.get(0).map(|m| m.as_str()).unwrap_or_default();
            predictions.push(
                Prediction::new(PredictionType::Label)
                    .with_value_tag(tag)
                    .with_data(json!({"text": raw.trim(), "notify": entry.matcher.notify})),
            );
        }
    }

    let dictionary = resources::label_processor();
    let text = document.get_full_text_contiguous(true);
    for keyword_match in dictionary.extract(text) {
        predictions.push(
            Prediction::new(PredictionType::Label)
                .with_value_tag(keyword_match.payload.tag.clone())
                .with_data(json!({"text": keyword_match.matched(text), "notify": false}))
                .with_predictor("curated-list"),
        );
    }

    for logo in &document.logo_annotations {
        if logo.score < LOGO_SCORE_THRESHOLD {
            continue;
        }
        let description = logo.description.to_lowercase();
        for (logo_description, tag) in LOGO_LABELS {
            if description == *logo_description {
                predictions.push(
                    Prediction::new(PredictionType::Label)
                        .with_value_tag(*tag)
                        .with_data(json!({"text": logo.description, "notify": false}))
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

    fn tags(text: &str) -> Vec<String> {
        find_labels(&OcrDocument::from_text(text))
            .into_iter()
            .filter_map(|p| p.value_tag)
            .collect()
    }

    #[test]
    fn test_es_eco_code() {
        assert_eq!(tags("certificado ES-ECO-001-AN"), vec!["en:es-eco-001-an"]);
        // Without the trailing region letters, no match.
        assert_eq!(tags("certificado ES-ECO-001"), Vec::<String>::new());
    }

    #[test]
    fn test_fr_bio_code() {
        assert_eq!(tags("certifié FR-BIO-01"), vec!["en:fr-bio-01"]);
    }

    #[test]
    fn test_organic_phrases() {
        // Both the regex table and the curated dictionary fire.
        let found = tags("issu de l'agriculture biologique");
        assert_eq!(found, vec!["en:organic", "en:organic"]);
    }

    #[test]
    fn test_bare_bio_notifies() {
        let predictions = find_labels(&OcrDocument::from_text("yaourt bio nature"));
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].value_tag.as_deref(), Some("en:organic"));
        assert_eq!(predictions[0].data["notify"], json!(true));
    }

    #[test]
    fn test_gluten_free() {
        assert_eq!(tags("100% gluten free"), vec!["en:no-gluten"]);
        assert_eq!(tags("sans gluten"), vec!["en:no-gluten"]);
    }

    #[test]
    fn test_dictionary_signal() {
        let found = tags("pêche durable msc certifiée");
        assert!(found.contains(&"en:msc".to_string()));
    }

    #[test]
    fn test_logo_signal() {
        let document = OcrDocument::from_json(&json!({
            "responses": [{
                "logoAnnotations": [
                    {"description": "Fairtrade", "score": 0.92},
                    {"description": "Label Rouge", "score": 0.2}
                ]
            }]
        }))
        .unwrap();

        let predictions = find_labels(&document);
        assert_eq!(predictions.len(), 1);
        assert_eq!(
            predictions[0].value_tag.as_deref(),
            Some("en:fairtrade-international")
        );
        assert_eq!(predictions[0].predictor, "google-cloud-vision");
    }

    #[test]
    fn test_signals_are_not_deduplicated() {
        // "agriculture biologique" fires both the regex table and the
        // curated dictionary; both predictions are kept.
        let predictions = find_labels(&OcrDocument::from_text("agriculture biologique"));
        let organic = predictions
            .iter()
            .filter(|p| p.value_tag.as_deref() == Some("en:organic"))
            .count();
        assert_eq!(organic, 2);
    }
}

//! Net weight / volume extraction.
//!
//! Four competing matchers with explicit priorities: an explicit prompt
//! word beats a multi-pack expression, which beats a bare number+unit.
//! Overlapping candidates resolve to the highest-priority span, so
//! "poids net: 500g" yields a single prediction instead of also firing the
//! bare-number matcher on "500g".

use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::debug;

use crate::matcher::{OcrField, OcrRegex};
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::units::{is_suspicious_weight, is_valid_weight, normalize_weight};

const MENTIONS: &str = "poids net [àa] l'emballage|poids net [ée]goutt[ée]|poids net|poids|\
                        masse nette|volume net total|net weight|net wt\\.?|peso neto|\
                        peso l[íi]quido|netto[ -]?gewicht|contenu net|contenance|contenu";

const UNITS: &str = "fl oz|dl|cl|mg|ml|lbs|oz|g|kg|l";

/// How a candidate match should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeightKind {
    Mention,
    EndingMention,
    NoMention,
    MultiPackaging,
}

struct WeightMatcher {
    name: &'static str,
    kind: WeightKind,
    matcher: OcrRegex,
}

lazy_static! {
    static ref PRODUCT_WEIGHT_REGEX: Vec<WeightMatcher> = vec![
        WeightMatcher {
            name: "with_mention",
            kind: WeightKind::Mention,
            matcher: OcrRegex::new(
                &format!(r"(?:{MENTIONS})\s?:?\s?([0-9]+[,.]?[0-9]*)\s*({UNITS})\b"),
                OcrField::FullTextContiguous,
            )
            .lowercase()
            .with_priority(1),
        },
        WeightMatcher {
            name: "with_ending_mention",
            kind: WeightKind::EndingMention,
            matcher: OcrRegex::new(
                &format!(r"([0-9]+[,.]?[0-9]*)\s*({UNITS})\s(?:net)\b"),
                OcrField::FullTextContiguous,
            )
            .lowercase()
            .with_priority(2),
        },
        WeightMatcher {
            name: "multi_packaging",
            kind: WeightKind::MultiPackaging,
            matcher: OcrRegex::new(
                &format!(r"(\d+)\s?[x*]\s?([0-9]+[,.]?[0-9]*)\s*({UNITS})\b"),
                OcrField::FullTextContiguous,
            )
            .lowercase()
            .with_priority(2),
        },
        WeightMatcher {
            name: "no_mention",
            kind: WeightKind::NoMention,
            matcher: OcrRegex::new(
                &format!(r"([0-9]+[,.]?[0-9]*)\s*({UNITS})\b"),
                OcrField::FullTextContiguous,
            )
            .lowercase()
            .with_priority(3),
        },
    ];
}

struct Candidate {
    start: usize,
    end: usize,
    priority: u8,
    automatic_processing: bool,
    value: String,
    data: Value,
}

fn process_single(
    entry: &WeightMatcher,
    captures: &regex::Captures,
) -> Option<Candidate> {
    let full = captures.get(0)?;
    let value = captures.get(1)?.as_str();
    let unit = captures.get(2)?.as_str();

    if !is_valid_weight(value) {
        return None;
    }

    let normalized = normalize_weight(value, unit).ok()?;
    let suspicious = is_suspicious_weight(normalized.value, normalized.unit);
    if suspicious {
        debug!("suspicious weight kept for review: {} {}", value, unit);
    }

    Some(Candidate {
        start: full.start(),
        end: full.end(),
        priority: entry.matcher.priority.unwrap_or(u8::MAX),
        automatic_processing: !suspicious,
        value: format!("{value} {unit}"),
        data: json!({
            "raw": full.as_str(),
            "matcher_type": entry.name,
            "value": value,
            "unit": unit,
            "normalized_value": normalized.value,
            "normalized_unit": normalized.unit,
        }),
    })
}

fn process_multi_packaging(
    entry: &WeightMatcher,
    captures: &regex::Captures,
) -> Option<Candidate> {
    let full = captures.get(0)?;
    let count: u32 = captures.get(1)?.as_str().parse().ok()?;
    let value = captures.get(2)?.as_str();
    let unit = captures.get(3)?.as_str();

    if !is_valid_weight(value) {
        return None;
    }

    let normalized = normalize_weight(value, unit).ok()?;
    let suspicious = is_suspicious_weight(normalized.value, normalized.unit);

    Some(Candidate {
        start: full.start(),
        end: full.end(),
        priority: entry.matcher.priority.unwrap_or(u8::MAX),
        automatic_processing: !suspicious,
        value: format!("{count} x {value} {unit}"),
        data: json!({
            "raw": full.as_str(),
            "matcher_type": entry.name,
            "count": count,
            "value": value,
            "unit": unit,
            "normalized_value": normalized.value,
            "normalized_unit": normalized.unit,
        }),
    })
}

/// Extract product-weight predictions.
///
/// Implausible but not impossible values are kept with
/// `automatic_processing = false` so a human confirms them; only values
/// rejected by [`is_valid_weight`] are dropped outright.
pub fn find_product_weight(document: &OcrDocument) -> Vec<Prediction> {
    let mut candidates: Vec<Candidate> = Vec::new();

    for entry in PRODUCT_WEIGHT_REGEX.iter() {
        let text = document.get_text(&entry.matcher);
        for captures in entry.matcher.regex.captures_iter(text) {
            let candidate = match entry.kind {
                WeightKind::MultiPackaging => process_multi_packaging(entry, &captures),
                WeightKind::Mention | WeightKind::EndingMention | WeightKind::NoMention => {
                    process_single(entry, &captures)
                }
            };
            if let Some(candidate) = candidate {
                candidates.push(candidate);
            }
        }
    }

    // Priority filter: keep a candidate only if no better-ranked kept
    // candidate overlaps its span.
    candidates.sort_by_key(|c| (c.priority, c.start));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let overlaps = kept
            .iter()
            .any(|k| candidate.start < k.end && k.start < candidate.end);
        if !overlaps {
            kept.push(candidate);
        }
    }

    kept.sort_by_key(|c| c.start);
    kept.into_iter()
        .map(|candidate| {
            Prediction::new(PredictionType::ProductWeight)
                .with_value(candidate.value)
                .with_data(candidate.data)
                .with_automatic_processing(candidate.automatic_processing)
        })
        .collect()
}

/// Normalized value of a prediction's data payload, for tests and callers.
pub fn normalized_value(prediction: &Prediction) -> Option<Decimal> {
    prediction.data["normalized_value"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| {
            prediction.data["normalized_value"]
                .as_f64()
                .and_then(|f| Decimal::try_from(f).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> Vec<Prediction> {
        find_product_weight(&OcrDocument::from_text(text))
    }

    #[test]
    fn test_with_mention_wins_over_no_mention() {
        let predictions = extract("poids net à l'emballage: 500g");

        assert_eq!(predictions.len(), 1);
        let prediction = &predictions[0];
        assert_eq!(prediction.data["matcher_type"], "with_mention");
        assert_eq!(normalized_value(prediction), Some(Decimal::from(500)));
        assert_eq!(prediction.data["normalized_unit"], "g");
        assert!(prediction.automatic_processing);
    }

    #[test]
    fn test_unit_boundary_rejects_trailing_letter() {
        assert_eq!(extract("poids 2kgv").len(), 0);
    }

    #[test]
    fn test_no_mention_lower_priority_still_fires_alone() {
        let predictions = extract("contient 330 ml");
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].data["matcher_type"], "no_mention");
        assert_eq!(predictions[0].value.as_deref(), Some("330 ml"));
    }

    #[test]
    fn test_multi_packaging() {
        let predictions = extract("10 x 60g");
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].data["matcher_type"], "multi_packaging");
        assert_eq!(predictions[0].value.as_deref(), Some("10 x 60 g"));
        assert_eq!(predictions[0].data["count"], 10);
    }

    #[test]
    fn test_ending_mention() {
        let predictions = extract("500 g net");
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].data["matcher_type"], "with_ending_mention");
    }

    #[test]
    fn test_suspicious_weight_needs_review() {
        let predictions = extract("poids net: 1253 g");
        assert_eq!(predictions.len(), 1);
        assert!(!predictions[0].automatic_processing);
    }

    #[test]
    fn test_extreme_weight_needs_review() {
        let predictions = extract("poids net: 15000 g");
        assert_eq!(predictions.len(), 1);
        assert!(!predictions[0].automatic_processing);
    }

    #[test]
    fn test_invalid_weight_dropped() {
        // Leading zero without separator.
        assert_eq!(extract("poids net: 0500 g").len(), 0);
    }

    #[test]
    fn test_volume_normalization() {
        let predictions = extract("contenance 75 cl");
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].data["matcher_type"], "with_mention");
        assert_eq!(normalized_value(&predictions[0]), Some(Decimal::from(750)));
        assert_eq!(predictions[0].data["normalized_unit"], "ml");
    }

    #[test]
    fn test_independent_matches_all_kept() {
        let predictions = extract("poids net: 500g - lot de 4 x 125 g");
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].data["matcher_type"], "with_mention");
        assert_eq!(predictions[1].data["matcher_type"], "multi_packaging");
    }
}

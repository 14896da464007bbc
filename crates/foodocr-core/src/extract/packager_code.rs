//! Packager/approval code extraction (EMB, EU approval numbers, FSC, RSPO,
//! fishing areas).

use lazy_static::lazy_static;
use regex::Captures;
use serde_json::json;

use crate::matcher::{OcrField, OcrRegex};
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::resources;
use crate::text::get_tag;

/// German Bundesland abbreviations that can issue approval numbers.
const GERMAN_STATES: [&str; 16] = [
    "bw", "by", "be", "bb", "hb", "hh", "he", "mv", "ni", "nw", "rp", "sl", "sn", "st", "sh",
    "th",
];

fn process_fr_emb(captures: &Captures) -> Option<String> {
    let city_code = captures.get(1)?.as_str();
    let company_code = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
    Some(format!("EMB {city_code}{company_code}").to_uppercase())
}

fn process_eu_fr(captures: &Captures) -> Option<String> {
    let department = captures.get(1)?.as_str();
    let commune = captures.get(2)?.as_str();
    let company = captures.get(3)?.as_str();
    Some(format!("FR {department}.{commune}.{company} EC").to_uppercase())
}

fn process_eu_de(captures: &Captures) -> Option<String> {
    let state = captures.get(1)?.as_str();
    let company = captures.get(2)?.as_str();

    // Only real Bundesland prefixes issue approval numbers; anything else
    // is an OCR artifact that happens to fit the shape.
    if !GERMAN_STATES.contains(&state) {
        return None;
    }
    if company.is_empty() || company.len() > 5 {
        return None;
    }

    Some(format!("DE {state}-{company} EC").to_uppercase())
}

fn process_fsc(captures: &Captures) -> Option<String> {
    let code = captures.get(1)?.as_str();
    Some(format!("FSC-{code}").to_uppercase())
}

fn process_rspo(captures: &Captures) -> Option<String> {
    let code = captures.get(1)?.as_str();
    Some(format!("RSPO-{code}"))
}

lazy_static! {
    static ref PACKAGER_CODE_REGEX: Vec<(&'static str, OcrRegex)> = vec![
        (
            "fr_emb",
            OcrRegex::new(r"emb\s?(\d{5})\s?([a-z])?\b", OcrField::FullTextContiguous)
                .lowercase()
                .with_processing(process_fr_emb),
        ),
        (
            "eu_fr",
            OcrRegex::new(
                r"fr\s(\d{2,3}|2[ab])[-\s.](\d{3})[-\s.](\d{3})\s(?:ce|ec)\b",
                OcrField::FullTextContiguous,
            )
            .lowercase()
            .with_processing(process_eu_fr)
            .notify(),
        ),
        (
            "eu_de",
            OcrRegex::new(
                r"de\s([a-z]{2})[-\s.](\d{1,5})[-\s.]?\s?(?:eg|ec)\b",
                OcrField::FullTextContiguous,
            )
            .lowercase()
            .with_processing(process_eu_de)
            .notify(),
        ),
        (
            "fsc",
            OcrRegex::new(r"\bfsc(?:\s|-)?(c\d{6})\b", OcrField::FullTextContiguous)
                .lowercase()
                .with_processing(process_fsc),
        ),
        (
            "rspo",
            OcrRegex::new(r"\brspo-(\d{7})\b", OcrField::FullTextContiguous)
                .lowercase()
                .with_processing(process_rspo),
        ),
    ];
}

/// Extract packager-code predictions from regex matches plus the fishing
/// area dictionary. Both sources contribute independently; deduplication is
/// the importer's responsibility.
pub fn find_packager_codes(document: &OcrDocument) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    for (name, matcher) in PACKAGER_CODE_REGEX.iter() {
        let text = document.get_text(matcher);
        for captures in matcher.regex.captures_iter(text) {
            let Some(value) = matcher.process(&captures) else {
                continue;
            };

            let raw = captures.get(0).map(|m| m.as_str()).unwrap_or_default();
            predictions.push(
                Prediction::new(PredictionType::PackagerCode)
                    .with_value(value)
                    .with_data(json!({
                        "raw": raw,
                        "matcher": name,
                        "notify": matcher.notify,
                    }))
                    .with_automatic_processing(true),
            );
        }
    }

    let fishing_codes = resources::fishing_code_processor();
    let text = document.get_full_text_contiguous(true);
    for keyword_match in fishing_codes.extract(text) {
        predictions.push(
            Prediction::new(PredictionType::PackagerCode)
                .with_value(keyword_match.payload.display.clone())
                .with_value_tag(get_tag(&keyword_match.payload.tag))
                .with_data(json!({
                    "raw": keyword_match.matched(text),
                    "matcher": "fishing",
                    "notify": false,
                }))
                .with_predictor("curated-list"),
        );
    }

    predictions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(text: &str) -> Vec<String> {
        let document = OcrDocument::from_text(text);
        find_packager_codes(&document)
            .into_iter()
            .filter_map(|p| p.value)
            .collect()
    }

    #[test]
    fn test_fr_emb() {
        assert_eq!(values("estampille EMB 50155A dos du paquet"), vec!["EMB 50155A"]);
        assert_eq!(values("emb 29181"), vec!["EMB 29181"]);
    }

    #[test]
    fn test_eu_fr() {
        assert_eq!(values("FR 50.155.001 EC"), vec!["FR 50.155.001 EC"]);
        assert_eq!(values("fr 2a-001-002 ce"), vec!["FR 2A.001.002 EC"]);
        // Missing the CE/EC suffix.
        assert_eq!(values("FR 50.155.001"), Vec::<String>::new());
    }

    #[test]
    fn test_eu_fr_roundtrip() {
        // A canonical value re-matches its own source regex.
        let canonical = values("FR 50.155.001 EC");
        assert_eq!(values(&canonical[0].to_lowercase()), canonical);
    }

    #[test]
    fn test_eu_de() {
        assert_eq!(values("DE BY-718 EC"), vec!["DE BY-718 EC"]);
        // Unknown Bundesland prefix is rejected by post-processing.
        assert_eq!(values("DE ZZ-718 EC"), Vec::<String>::new());
    }

    #[test]
    fn test_fsc() {
        assert_eq!(values("certified FSC C012345"), vec!["FSC-C012345"]);
        assert_eq!(values("fsc-c104342"), vec!["FSC-C104342"]);
    }

    #[test]
    fn test_rspo() {
        assert_eq!(
            values("Sustainable palm oil RSPO-5068502"),
            vec!["RSPO-5068502"]
        );
        // Extra trailing digit breaks the code boundary.
        assert_eq!(values("RSPO-50685022"), Vec::<String>::new());
    }

    #[test]
    fn test_fishing_codes_layered_on_top() {
        let document = OcrDocument::from_text("pêché en Atlantique FAO 27 et EMB 29181");
        let predictions = find_packager_codes(&document);

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].value.as_deref(), Some("EMB 29181"));
        assert_eq!(predictions[1].value.as_deref(), Some("FAO 27"));
        assert_eq!(predictions[1].value_tag.as_deref(), Some("fao-27"));
        assert_eq!(predictions[1].predictor, "curated-list");
    }

    #[test]
    fn test_empty_text_no_predictions() {
        assert_eq!(values(""), Vec::<String>::new());
    }
}

//! Expiration date extraction.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Captures;
use serde_json::json;

use crate::config::ExpirationConfig;
use crate::matcher::{OcrField, OcrRegex};
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};

lazy_static! {
    static ref EXPIRATION_DATE_REGEX: Vec<(&'static str, OcrRegex)> = vec![
        (
            "full_digits",
            OcrRegex::new(
                r"\b(\d{1,2})[-./](\d{1,2})[-./](\d{4})\b",
                OcrField::FullTextContiguous,
            ),
        ),
        (
            "short_digits",
            OcrRegex::new(
                r"\b(\d{2})[-./](\d{2})[-./](\d{2})\b",
                OcrField::FullTextContiguous,
            ),
        ),
    ];
}

fn parse_date(matcher_name: &str, captures: &Captures) -> Option<NaiveDate> {
    let day: u32 = captures.get(1)?.as_str().parse().ok()?;
    let month: u32 = captures.get(2)?.as_str().parse().ok()?;
    let mut year: i32 = captures.get(3)?.as_str().parse().ok()?;

    if matcher_name == "short_digits" {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Extract expiration-date predictions using the default plausibility window.
pub fn find_expiration_dates(document: &OcrDocument) -> Vec<Prediction> {
    find_expiration_dates_with(document, &ExpirationConfig::default())
}

/// Extract expiration-date predictions.
///
/// A syntactically valid date outside the `[min_year, max_year]` window is
/// silently discarded: it is a business-rule filter, not a parsing error.
/// Accepted dates are re-serialized to ISO-8601.
pub fn find_expiration_dates_with(
    document: &OcrDocument,
    config: &ExpirationConfig,
) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    for (name, matcher) in EXPIRATION_DATE_REGEX.iter() {
        let text = document.get_text(matcher);
        for captures in matcher.regex.captures_iter(text) {
            let Some(date) = parse_date(name, &captures) else {
                continue;
            };

            let year = date.year();
            if year < config.min_year || year > config.max_year {
                continue;
            }

            let raw = captures.get(0).map(|m| m.as_str()).unwrap_or_default();
            predictions.push(
                Prediction::new(PredictionType::ExpirationDate)
                    .with_value(date.format("%Y-%m-%d").to_string())
                    .with_data(json!({"raw": raw, "matcher": name})),
            );
        }
    }

    predictions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(text: &str) -> Vec<String> {
        let document = OcrDocument::from_text(text);
        find_expiration_dates(&document)
            .into_iter()
            .filter_map(|p| p.value)
            .collect()
    }

    #[test]
    fn test_short_year_branch() {
        assert_eq!(values("à consommer avant le 15/06/23"), vec!["2023-06-15"]);
    }

    #[test]
    fn test_full_year_branch() {
        assert_eq!(values("best before 15/06/2023"), vec!["2023-06-15"]);
        assert_eq!(values("DLC: 01.12.2024"), vec!["2024-12-01"]);
        assert_eq!(values("exp 3-6-2021"), vec!["2021-06-03"]);
    }

    #[test]
    fn test_date_outside_window_is_discarded() {
        assert_eq!(values("15/06/30"), Vec::<String>::new());
        assert_eq!(values("15/06/2030"), Vec::<String>::new());
        assert_eq!(values("15/06/2010"), Vec::<String>::new());
    }

    #[test]
    fn test_invalid_calendar_date_is_discarded() {
        assert_eq!(values("32/13/2023"), Vec::<String>::new());
        assert_eq!(values("31/02/2023"), Vec::<String>::new());
    }

    #[test]
    fn test_custom_window() {
        let document = OcrDocument::from_text("15/06/2030");
        let config = ExpirationConfig {
            min_year: 2015,
            max_year: 2035,
        };
        let predictions = find_expiration_dates_with(&document, &config);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].value.as_deref(), Some("2030-06-15"));
    }

    #[test]
    fn test_matcher_recorded_in_data() {
        let document = OcrDocument::from_text("15/06/23");
        let predictions = find_expiration_dates(&document);
        assert_eq!(predictions[0].data["matcher"], "short_digits");
        assert_eq!(predictions[0].data["raw"], "15/06/23");
    }
}

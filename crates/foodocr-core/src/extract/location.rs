//! City + postal code extraction (France).
//!
//! City names from the gazetteer are scanned with the keyword processor;
//! every city match then looks for its own postal code in a bounded window
//! of surrounding text. A postal code adjacent to another digit does not
//! count (it is part of a longer number, an EAN for instance).

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

use crate::cache::CachedStore;
use crate::config::LocationConfig;
use crate::keywords::KeywordProcessor;
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::resources::{self, City};

lazy_static! {
    // Postal codes must not touch other digits; the bracket classes stand
    // in for lookaround, with the code itself in group 1.
    static ref POSTAL_CODE_REGEX: Regex =
        Regex::new(r"(?:^|[^0-9])(\d{5})(?:[^0-9]|$)").expect("postal code regex must compile");
}

fn clamp_start(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn clamp_end(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// City/postal-code extractor over a gazetteer.
pub struct LocationExtractor {
    processor: KeywordProcessor<City>,
    postal_distance: usize,
    extract_window: usize,
}

impl LocationExtractor {
    /// Build an extractor over the given cities with default windows.
    pub fn new(cities: impl IntoIterator<Item = City>) -> Self {
        let config = LocationConfig::default();
        Self {
            processor: KeywordProcessor::new(
                cities.into_iter().map(|city| (city.name.clone(), city)),
                false,
            ),
            postal_distance: config.postal_distance,
            extract_window: config.extract_window,
        }
    }

    /// Set the maximum city-to-postal-code distance, in bytes.
    pub fn with_postal_distance(mut self, distance: usize) -> Self {
        self.postal_distance = distance;
        self
    }

    /// Set the surrounding-extract padding, in bytes.
    pub fn with_extract_window(mut self, window: usize) -> Self {
        self.extract_window = window;
        self
    }

    /// Extract location predictions from the document.
    pub fn find_locations(&self, document: &OcrDocument) -> Vec<Prediction> {
        let text = document.get_full_text_contiguous(true);
        let mut predictions = Vec::new();

        for city_match in self.processor.extract(text) {
            let city = city_match.payload;
            let code_len = city.postal_code.len();

            // Bounded search region around the city name.
            let region_start =
                clamp_start(text, city_match.start.saturating_sub(self.postal_distance + code_len));
            let region_end =
                clamp_end(text, (city_match.end + self.postal_distance + code_len).min(text.len()));
            let region = &text[region_start..region_end];

            let Some((postal_start, postal_end)) = find_postal_code(region, &city.postal_code)
            else {
                continue;
            };
            let postal_start = region_start + postal_start;
            let postal_end = region_start + postal_end;

            let extract_start = clamp_start(
                text,
                city_match
                    .start
                    .min(postal_start)
                    .saturating_sub(self.extract_window),
            );
            let extract_end = clamp_end(
                text,
                (city_match.end.max(postal_end) + self.extract_window).min(text.len()),
            );

            let mut data = json!({
                "country_code": "fr",
                "city_name": city.name,
                "postal_code": city.postal_code,
                "text_extract": &text[extract_start..extract_end],
            });
            if let (Some(lat), Some(lng)) = (city.lat, city.lng) {
                data["lat"] = json!(lat);
                data["lng"] = json!(lng);
            }

            predictions.push(Prediction::new(PredictionType::Location).with_data(data));
        }

        predictions
    }
}

/// Find `code` in `region`, not adjacent to any other digit.
fn find_postal_code(region: &str, code: &str) -> Option<(usize, usize)> {
    for captures in POSTAL_CODE_REGEX.captures_iter(region) {
        let group = captures.get(1)?;
        if group.as_str() == code {
            return Some((group.start(), group.end()));
        }
    }
    None
}

fn build_default_extractor() -> LocationExtractor {
    LocationExtractor::new(resources::city_gazetteer().iter().cloned())
}

static DEFAULT_EXTRACTOR: CachedStore<LocationExtractor> =
    CachedStore::new(build_default_extractor);

/// Extract location predictions using the embedded French gazetteer.
pub fn find_locations(document: &OcrDocument) -> Vec<Prediction> {
    DEFAULT_EXTRACTOR.get().find_locations(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn city(name: &str, postal_code: &str) -> City {
        City {
            name: name.to_string(),
            postal_code: postal_code.to_string(),
            lat: None,
            lng: None,
        }
    }

    #[test]
    fn test_city_with_postal_code() {
        let extractor = LocationExtractor::new([city("paris", "75000"), city("poya", "98827")])
            .with_extract_window(3);
        let document = OcrDocument::from_text("blah paris 75000 poya foo");

        let predictions = extractor.find_locations(&document);
        assert_eq!(predictions.len(), 1);

        let data = &predictions[0].data;
        assert_eq!(data["city_name"], "paris");
        assert_eq!(data["postal_code"], "75000");
        assert_eq!(data["country_code"], "fr");
        assert_eq!(data["text_extract"], "ah paris 75000 po");
    }

    #[test]
    fn test_postal_code_before_city() {
        let extractor = LocationExtractor::new([city("lyon", "69000")]);
        let document = OcrDocument::from_text("fabriqué à 69000 lyon france");

        let predictions = extractor.find_locations(&document);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].data["city_name"], "lyon");
    }

    #[test]
    fn test_postal_code_too_far() {
        let extractor = LocationExtractor::new([city("paris", "75000")]);
        let document =
            OcrDocument::from_text("paris est une grande ville lointaine 75000 habitants");

        assert_eq!(extractor.find_locations(&document).len(), 0);
    }

    #[test]
    fn test_postal_code_adjacent_to_digits_rejected() {
        let extractor = LocationExtractor::new([city("paris", "75000")]);
        // 75000 is part of a longer number.
        let document = OcrDocument::from_text("paris 750001234");

        assert_eq!(extractor.find_locations(&document).len(), 0);
    }

    #[test]
    fn test_wrong_postal_code_rejected() {
        let extractor = LocationExtractor::new([city("paris", "75000")]);
        let document = OcrDocument::from_text("paris 31000");

        assert_eq!(extractor.find_locations(&document).len(), 0);
    }

    #[test]
    fn test_embedded_gazetteer() {
        let document = OcrDocument::from_text("Conditionné par X, 35400 saint-malo, France");
        let predictions = find_locations(&document);

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].data["city_name"], "saint-malo");
    }

    #[test]
    fn test_gps_coordinates_included() {
        let extractor = LocationExtractor::new([City {
            name: "paris".to_string(),
            postal_code: "75000".to_string(),
            lat: Some(48.8566),
            lng: Some(2.3522),
        }]);
        let document = OcrDocument::from_text("paris 75000");

        let predictions = extractor.find_locations(&document);
        assert_eq!(predictions[0].data["lat"], 48.8566);
    }
}

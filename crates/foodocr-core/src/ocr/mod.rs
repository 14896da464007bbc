//! Structured, queryable representation of a raw OCR JSON payload.

pub mod annotations;
pub mod full_text;
pub mod orientation;

pub use annotations::{
    BoundingPoly, FaceAnnotation, LabelAnnotation, Likelihood, LogoAnnotation,
    SafeSearchAnnotation, TextAnnotation, Vertex,
};
pub use full_text::{
    Block, BreakType, DetectedBreak, DetectedLanguage, FullTextAnnotation, Page, Paragraph,
    Symbol, TextProperty, Word,
};
pub use orientation::{ImageOrientation, OrientationResult};

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{FoodOcrError, OcrParsingError};
use crate::matcher::{OcrField, OcrRegex};
use crate::text::fold_contiguous;

/// Counter key for words carrying no detected language.
pub const NULL_LANG: &str = "null";
/// Counter key for the total word count.
pub const WORD_COUNT: &str = "words";

/// An immutable OCR document with cached normalized text views.
///
/// Constructed once per OCR JSON payload; the page tree inside
/// [`FullTextAnnotation`] is the only lazily-expanded part.
#[derive(Debug, Default)]
pub struct OcrDocument {
    /// Flat text annotations; the first one spans the whole image.
    pub text_annotations: Vec<TextAnnotation>,
    /// Structured full text, when the response carries one.
    pub full_text_annotation: Option<FullTextAnnotation>,
    pub logo_annotations: Vec<LogoAnnotation>,
    pub label_annotations: Vec<LabelAnnotation>,
    pub safe_search_annotation: Option<SafeSearchAnnotation>,
    pub face_annotations: Vec<FaceAnnotation>,

    // Cached views, computed once at construction.
    full_text: String,
    full_text_lower: String,
    full_text_contiguous: String,
    full_text_contiguous_lower: String,
    text_annotations_str: String,
    text_annotations_str_lower: String,
}

impl OcrDocument {
    /// Parse a raw OCR JSON envelope.
    ///
    /// Fails if `responses` is missing or not a list, if the list is empty,
    /// or if the first response carries an `error` payload. On success the
    /// document wraps `responses[0]`.
    pub fn from_json(data: &Value) -> Result<Self, OcrParsingError> {
        let responses = data
            .get("responses")
            .and_then(Value::as_array)
            .ok_or(OcrParsingError::MissingResponses)?;

        let response = responses.first().ok_or(OcrParsingError::EmptyResponses)?;

        if let Some(error) = response.get("error") {
            return Err(OcrParsingError::ResponseError(error.to_string()));
        }

        Self::from_response(response)
    }

    /// Parse an OCR JSON envelope from its string form.
    pub fn from_json_str(data: &str) -> Result<Self, FoodOcrError> {
        let value: Value = serde_json::from_str(data)?;
        Ok(Self::from_json(&value)?)
    }

    /// Degenerate document exposing only the given text, no annotations.
    pub fn from_text(text: &str) -> Self {
        let mut document = Self::default();
        document.text_annotations_str = text.to_string();
        document.text_annotations_str_lower = text.to_lowercase();
        document
    }

    fn from_response(response: &Value) -> Result<Self, OcrParsingError> {
        let text_annotations: Vec<TextAnnotation> =
            parse_list(response, "textAnnotations")?;

        let full_text_annotation = response
            .get("fullTextAnnotation")
            .map(FullTextAnnotation::from_value);

        let logo_annotations: Vec<LogoAnnotation> = parse_list(response, "logoAnnotations")?;
        let label_annotations: Vec<LabelAnnotation> = parse_list(response, "labelAnnotations")?;
        let face_annotations: Vec<FaceAnnotation> = parse_list(response, "faceAnnotations")?;

        let safe_search_annotation = match response.get("safeSearchAnnotation") {
            Some(value) => Some(serde_json::from_value(value.clone()).map_err(|_| {
                OcrParsingError::InvalidField {
                    field: "safeSearchAnnotation",
                    context: "response",
                }
            })?),
            None => None,
        };

        let full_text = full_text_annotation
            .as_ref()
            .map(|fta| fta.text.clone())
            .unwrap_or_default();
        let full_text_contiguous = fold_contiguous(&full_text);

        let text_annotations_str = text_annotations
            .first()
            .map(|annotation| annotation.text.clone())
            .unwrap_or_default();

        Ok(Self {
            full_text_lower: full_text.to_lowercase(),
            full_text_contiguous_lower: full_text_contiguous.to_lowercase(),
            text_annotations_str_lower: text_annotations_str.to_lowercase(),
            full_text,
            full_text_contiguous,
            text_annotations_str,
            text_annotations,
            full_text_annotation,
            logo_annotations,
            label_annotations,
            safe_search_annotation,
            face_annotations,
        })
    }

    /// The structured full text, falling back to the text-annotations
    /// string when absent; empty string when neither exists, never null.
    pub fn get_full_text(&self, lowercase: bool) -> &str {
        if self.full_text.is_empty() {
            return self.get_text_annotations_str(lowercase);
        }
        if lowercase {
            &self.full_text_lower
        } else {
            &self.full_text
        }
    }

    /// The full text with newlines folded to single spaces and space runs
    /// collapsed, with the same fallback as [`Self::get_full_text`].
    pub fn get_full_text_contiguous(&self, lowercase: bool) -> &str {
        if self.full_text.is_empty() {
            return self.get_text_annotations_str(lowercase);
        }
        if lowercase {
            &self.full_text_contiguous_lower
        } else {
            &self.full_text_contiguous
        }
    }

    /// The raw text of the first (whole-image) text annotation.
    pub fn get_text_annotations_str(&self, lowercase: bool) -> &str {
        if lowercase {
            &self.text_annotations_str_lower
        } else {
            &self.text_annotations_str
        }
    }

    /// Select the text view a matcher should search.
    pub fn get_text(&self, matcher: &OcrRegex) -> &str {
        match matcher.field {
            OcrField::FullText => self.get_full_text(matcher.lowercase),
            OcrField::FullTextContiguous => self.get_full_text_contiguous(matcher.lowercase),
            OcrField::TextAnnotations => self.get_text_annotations_str(matcher.lowercase),
        }
    }

    /// Word-level language-mention counts.
    ///
    /// Every word increments the `"words"` total; each detected language of
    /// a word increments its language-code bucket; words without any
    /// detected language increment the `"null"` bucket. Callers derive
    /// percentages as `count * 100 / words`.
    pub fn get_languages(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        counts.insert(WORD_COUNT.to_string(), 0);
        counts.insert(NULL_LANG.to_string(), 0);

        if let Some(fta) = &self.full_text_annotation {
            for word in fta.words() {
                *counts.entry(WORD_COUNT.to_string()).or_insert(0) += 1;

                let languages = word.detected_languages();
                if languages.is_empty() {
                    *counts.entry(NULL_LANG.to_string()).or_insert(0) += 1;
                    continue;
                }

                for language in languages {
                    *counts.entry(language.language_code.clone()).or_insert(0) += 1;
                }
            }
        }

        counts
    }

    /// Majority-vote orientation over all words of the document.
    pub fn detect_orientation(&self) -> OrientationResult {
        match &self.full_text_annotation {
            Some(fta) => fta.detect_orientation(),
            None => OrientationResult::from_counts(HashMap::new()),
        }
    }

    /// Absolute bounding box `(y_min, x_min, y_max, x_max)` covering every
    /// word overlapping the given full-text byte span.
    pub fn get_match_bounding_box(&self, start: usize, end: usize) -> Option<(i32, i32, i32, i32)> {
        let fta = self.full_text_annotation.as_ref()?;
        let words = fta.words_in_range(start, end);

        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for word in words {
            let Some(poly) = &word.bounding_box else {
                continue;
            };
            let (y_min, x_min, y_max, x_max) = poly.bounds();
            bounds = Some(match bounds {
                None => (y_min, x_min, y_max, x_max),
                Some((by_min, bx_min, by_max, bx_max)) => (
                    by_min.min(y_min),
                    bx_min.min(x_min),
                    by_max.max(y_max),
                    bx_max.max(x_max),
                ),
            });
        }

        bounds
    }
}

fn parse_list<T: serde::de::DeserializeOwned>(
    response: &Value,
    field: &'static str,
) -> Result<Vec<T>, OcrParsingError> {
    match response.get(field) {
        None => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|_| {
            OcrParsingError::InvalidField {
                field,
                context: "response",
            }
        }),
    }
}

//! Typed prediction records emitted by every extractor.
//!
//! A [`Prediction`] is a machine-derived fact candidate about a product.
//! Extractors build them purely from an OCR document; the external importer
//! owns persistence, deduplication and the human-review voting workflow.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of insight categories a prediction can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    /// Packager/approval code (EMB, EU approval numbers, FSC, RSPO, fishing codes).
    PackagerCode,
    /// Product label or certification claim.
    Label,
    /// Product category.
    Category,
    /// Image flagged for human moderation.
    ImageFlag,
    /// Net weight or volume.
    ProductWeight,
    /// Expiration date.
    ExpirationDate,
    /// Product brand.
    Brand,
    /// Image rotation correction.
    ImageOrientation,
    /// Store or retail chain.
    Store,
    /// Nutrient value (name + amount + unit).
    Nutrient,
    /// Nutrient keyword mention without a value.
    NutrientMention,
    /// Allergen trace statement.
    Trace,
    /// Packaging shape/material/recycling element.
    Packaging,
    /// Postal address fragment (city + postal code).
    Location,
    /// Dominant detected language of the image text.
    ImageLang,
    /// Origin of one or all ingredients.
    Origin,
}

impl PredictionType {
    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PackagerCode => "packager_code",
            Self::Label => "label",
            Self::Category => "category",
            Self::ImageFlag => "image_flag",
            Self::ProductWeight => "product_weight",
            Self::ExpirationDate => "expiration_date",
            Self::Brand => "brand",
            Self::ImageOrientation => "image_orientation",
            Self::Store => "store",
            Self::Nutrient => "nutrient",
            Self::NutrientMention => "nutrient_mention",
            Self::Trace => "trace",
            Self::Packaging => "packaging",
            Self::Location => "location",
            Self::ImageLang => "image_lang",
            Self::Origin => "origin",
        }
    }
}

impl std::fmt::Display for PredictionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A machine-derived fact candidate about a product.
///
/// Serialize-only: predictions are produced here and consumed by the
/// external importer, never read back.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Insight category.
    #[serde(rename = "type")]
    pub prediction_type: PredictionType,

    /// Free-form extracted value (canonical code, display name, ISO date...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Taxonomy-normalized identifier: lower-case, hyphen-separated, no
    /// accents, so it can be matched against canonical ids downstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_tag: Option<String>,

    /// Type-specific payload (raw matched text, units, spans, notify flag...).
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,

    /// Whether the match is trusted enough to apply without human review.
    pub automatic_processing: bool,

    /// Name of the predictor that produced this record.
    pub predictor: &'static str,

    /// Version of the predictor.
    pub predictor_version: &'static str,

    /// Optional numeric confidence (0.0 - 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Product barcode, when known by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    /// Source image reference, when known by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
}

impl Prediction {
    /// Create a prediction with the regex predictor defaults.
    pub fn new(prediction_type: PredictionType) -> Self {
        Self {
            prediction_type,
            value: None,
            value_tag: None,
            data: Value::Null,
            automatic_processing: false,
            predictor: "regex",
            predictor_version: "1",
            confidence: None,
            barcode: None,
            source_image: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_value_tag(mut self, value_tag: impl Into<String>) -> Self {
        self.value_tag = Some(value_tag.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_automatic_processing(mut self, automatic: bool) -> Self {
        self.automatic_processing = automatic;
        self
    }

    pub fn with_predictor(mut self, predictor: &'static str) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_type_roundtrip() {
        let json = serde_json::to_string(&PredictionType::PackagerCode).unwrap();
        assert_eq!(json, "\"packager_code\"");

        let back: PredictionType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PredictionType::PackagerCode);
    }

    #[test]
    fn test_prediction_serialization_skips_empty_fields() {
        let prediction = Prediction::new(PredictionType::Brand).with_value("Ferrero");
        let json = serde_json::to_value(&prediction).unwrap();

        assert_eq!(json["type"], "brand");
        assert_eq!(json["value"], "Ferrero");
        assert!(json.get("value_tag").is_none());
        assert!(json.get("barcode").is_none());
    }

    #[test]
    fn test_prediction_builder() {
        let prediction = Prediction::new(PredictionType::Label)
            .with_value_tag("en:organic")
            .with_automatic_processing(true)
            .with_confidence(0.9);

        assert_eq!(prediction.value_tag.as_deref(), Some("en:organic"));
        assert!(prediction.automatic_processing);
        assert_eq!(prediction.confidence, Some(0.9));
    }
}

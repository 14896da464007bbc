//! Per-category insight extractors.
//!
//! Every extractor is a pure function from an immutable [`OcrDocument`] to
//! a list of predictions; a document with no matching text yields an empty
//! list, never an error.

pub mod brand;
pub mod expiration_date;
pub mod image_flag;
pub mod image_lang;
pub mod image_orientation;
pub mod label;
pub mod location;
pub mod nutrient;
pub mod origin;
pub mod packager_code;
pub mod packaging;
pub mod product_weight;
pub mod store;
pub mod trace;

pub use brand::find_brands;
pub use expiration_date::{find_expiration_dates, find_expiration_dates_with};
pub use image_flag::flag_image;
pub use image_lang::find_image_lang;
pub use image_orientation::find_image_orientation;
pub use label::find_labels;
pub use location::{LocationExtractor, find_locations};
pub use nutrient::{find_nutrient_mentions, find_nutrient_values};
pub use origin::find_origins;
pub use packager_code::find_packager_codes;
pub use packaging::find_packaging;
pub use product_weight::find_product_weight;
pub use store::find_stores;
pub use trace::find_traces;

use crate::error::ExtractionError;
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};

/// Prediction types with an OCR extractor, in default execution order.
pub const DEFAULT_PREDICTION_TYPES: [PredictionType; 15] = [
    PredictionType::PackagerCode,
    PredictionType::ExpirationDate,
    PredictionType::ProductWeight,
    PredictionType::Nutrient,
    PredictionType::NutrientMention,
    PredictionType::Label,
    PredictionType::Brand,
    PredictionType::Store,
    PredictionType::Trace,
    PredictionType::Location,
    PredictionType::Origin,
    PredictionType::Packaging,
    PredictionType::ImageFlag,
    PredictionType::ImageOrientation,
    PredictionType::ImageLang,
];

/// Run the extractor for one prediction type.
///
/// Requesting a type without an OCR extractor (e.g. `category`, produced by
/// ML models elsewhere) is a programming error and returns
/// [`ExtractionError::UnsupportedType`].
pub fn extract_predictions(
    document: &OcrDocument,
    prediction_type: PredictionType,
) -> Result<Vec<Prediction>, ExtractionError> {
    match prediction_type {
        PredictionType::PackagerCode => Ok(find_packager_codes(document)),
        PredictionType::ExpirationDate => Ok(find_expiration_dates(document)),
        PredictionType::ProductWeight => Ok(find_product_weight(document)),
        PredictionType::Nutrient => Ok(find_nutrient_values(document)),
        PredictionType::NutrientMention => Ok(find_nutrient_mentions(document)),
        PredictionType::Label => Ok(find_labels(document)),
        PredictionType::Brand => Ok(find_brands(document)),
        PredictionType::Store => Ok(find_stores(document)),
        PredictionType::Trace => Ok(find_traces(document)),
        PredictionType::Location => Ok(find_locations(document)),
        PredictionType::Origin => Ok(find_origins(document)),
        PredictionType::Packaging => Ok(find_packaging(document)),
        PredictionType::ImageFlag => Ok(flag_image(document)),
        PredictionType::ImageOrientation => Ok(find_image_orientation(document)),
        PredictionType::ImageLang => Ok(find_image_lang(document)),
        PredictionType::Category => Err(ExtractionError::UnsupportedType(
            prediction_type.as_str().to_string(),
        )),
    }
}

/// Run every default extractor and concatenate the results.
pub fn extract_all(document: &OcrDocument) -> Vec<Prediction> {
    let mut predictions = Vec::new();
    for prediction_type in DEFAULT_PREDICTION_TYPES {
        if let Ok(mut found) = extract_predictions(document, prediction_type) {
            predictions.append(&mut found);
        }
    }
    predictions
}

//! Core library for product-photo OCR insight extraction.
//!
//! This crate provides:
//! - A structured, queryable document model over Vision-API-shaped OCR JSON
//! - A declarative regex/dictionary matching framework over its text views
//! - Per-category extractors (packager codes, dates, weights, nutrients,
//!   labels, brands, stores, traces, locations, origins, packaging, image
//!   signals)
//! - The typed `Prediction` record consumed by the external importer

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod matcher;
pub mod ocr;
pub mod prediction;
pub mod resources;
pub mod taxonomy;
pub mod text;
pub mod units;

pub use cache::CachedStore;
pub use config::FoodOcrConfig;
pub use error::{ExtractionError, FoodOcrError, OcrParsingError, ResourceError, Result};
pub use extract::{DEFAULT_PREDICTION_TYPES, extract_all, extract_predictions};
pub use keywords::{DictionaryEntry, KeywordMatch, KeywordProcessor};
pub use matcher::{OcrField, OcrRegex};
pub use ocr::{ImageOrientation, OcrDocument, OrientationResult};
pub use prediction::{Prediction, PredictionType};
pub use taxonomy::Taxonomy;

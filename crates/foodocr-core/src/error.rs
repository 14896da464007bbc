//! Error types for the foodocr-core library.

use thiserror::Error;

/// Main error type for the foodocr library.
#[derive(Error, Debug)]
pub enum FoodOcrError {
    /// OCR envelope parsing error.
    #[error("OCR parsing error: {0}")]
    OcrParsing(#[from] OcrParsingError),

    /// Reference-data loading error.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Insight extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while parsing a raw OCR JSON envelope.
///
/// These are always surfaced to the caller, never swallowed: the caller
/// decides whether to skip the document, re-fetch it, or log the failure.
#[derive(Error, Debug)]
pub enum OcrParsingError {
    /// The top-level `responses` key is missing or not a list.
    #[error("missing or malformed 'responses' field")]
    MissingResponses,

    /// The `responses` list is empty.
    #[error("empty 'responses' list")]
    EmptyResponses,

    /// The first response carries an `error` payload from the vision API.
    #[error("OCR response contains an error: {0}")]
    ResponseError(String),

    /// A required key is absent from an annotation object.
    #[error("missing field '{field}' in {context}")]
    MissingField {
        field: &'static str,
        context: &'static str,
    },

    /// A field has the wrong JSON type.
    #[error("invalid type for field '{field}' in {context}")]
    InvalidField {
        field: &'static str,
        context: &'static str,
    },
}

/// Errors related to embedded or external reference data.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A pipe-delimited dictionary line could not be parsed.
    #[error("malformed dictionary line {line} in {name}")]
    MalformedLine { name: &'static str, line: usize },

    /// A gzip resource failed to decompress.
    #[error("failed to decompress {name}: {reason}")]
    Decompression { name: &'static str, reason: String },

    /// A JSON resource failed to deserialize.
    #[error("failed to parse {name}: {source}")]
    Parse {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors related to insight extraction dispatch.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No OCR extractor exists for the requested prediction type.
    ///
    /// This is a programming error with a closed enum, equivalent to an
    /// unknown dispatch key: fatal, not a user-data condition.
    #[error("no OCR extractor for prediction type '{0}'")]
    UnsupportedType(String),
}

/// Result type for the foodocr library.
pub type Result<T> = std::result::Result<T, FoodOcrError>;

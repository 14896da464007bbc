//! Declarative regex descriptors bound to a document text view.

use regex::{Captures, Regex};

/// Which text view of a document a matcher searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrField {
    /// The structured full text, newlines preserved.
    FullText,
    /// The full text with newlines folded to single spaces.
    FullTextContiguous,
    /// The raw text-annotations string.
    TextAnnotations,
}

/// Post-processing hook: turn a regex match into the prediction value.
///
/// Returning `None` means "syntactically matched but semantically invalid";
/// the match is dropped, not surfaced as a low-confidence prediction.
pub type ProcessingFn = fn(&Captures) -> Option<String>;

/// A pure matching rule: a compiled pattern plus the field it searches and
/// how its matches become values. Never mutates the document; multiple
/// matchers may legitimately match the same substring and extractors decide
/// how to merge or prioritize.
pub struct OcrRegex {
    pub regex: Regex,
    pub field: OcrField,
    pub lowercase: bool,
    pub processing: Option<ProcessingFn>,
    /// Rank for overlapping candidate matches; lower wins.
    pub priority: Option<u8>,
    /// Flag resulting predictions for external moderation.
    pub notify: bool,
}

impl OcrRegex {
    /// Build a matcher over the given field; panics on an invalid pattern,
    /// which is a programming error in a static table.
    pub fn new(pattern: &str, field: OcrField) -> Self {
        Self {
            regex: Regex::new(pattern).expect("invalid static regex pattern"),
            field,
            lowercase: false,
            processing: None,
            priority: None,
            notify: false,
        }
    }

    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub fn with_processing(mut self, processing: ProcessingFn) -> Self {
        self.processing = Some(processing);
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn notify(mut self) -> Self {
        self.notify = true;
        self
    }

    /// Run the post-processing hook, defaulting to the full match text.
    pub fn process<'t>(&self, captures: &Captures<'t>) -> Option<String> {
        match self.processing {
            Some(processing) => processing(captures),
            None => Some(captures.get(0).map(|m| m.as_str())?.to_string()),
        }
    }
}

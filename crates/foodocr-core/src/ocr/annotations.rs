//! Flat (non-hierarchical) Vision-API annotation records.
//!
//! One immutable struct per annotation kind; required JSON keys are
//! enforced by deserialization, optional ones default.

use serde::{Deserialize, Serialize};

/// A single polygon vertex in absolute image coordinates.
///
/// The vision API omits `x` or `y` when the coordinate is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// A bounding polygon, normally four vertices in clockwise order starting
/// from the top-left corner of the (possibly rotated) text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

impl BoundingPoly {
    /// Axis-aligned bounds as `(y_min, x_min, y_max, x_max)`.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let mut y_min = i32::MAX;
        let mut x_min = i32::MAX;
        let mut y_max = i32::MIN;
        let mut x_max = i32::MIN;

        for vertex in &self.vertices {
            y_min = y_min.min(vertex.y);
            x_min = x_min.min(vertex.x);
            y_max = y_max.max(vertex.y);
            x_max = x_max.max(vertex.x);
        }

        (y_min, x_min, y_max, x_max)
    }
}

/// A text annotation: one detected text region with its raw content.
///
/// The first text annotation of a response spans the whole image and its
/// `text` is the concatenation of everything detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    #[serde(default)]
    pub locale: Option<String>,

    #[serde(rename = "description")]
    pub text: String,

    #[serde(default)]
    pub bounding_poly: Option<BoundingPoly>,
}

/// A detected logo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoAnnotation {
    #[serde(default)]
    pub mid: Option<String>,

    pub score: f64,

    pub description: String,
}

/// A detected semantic label (e.g. "Food", "Face").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelAnnotation {
    #[serde(default)]
    pub mid: Option<String>,

    pub score: f64,

    pub description: String,
}

/// Vision-API likelihood buckets, ordered from least to most likely.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

/// Safe-search moderation signals for the whole image.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafeSearchAnnotation {
    pub adult: Likelihood,
    pub spoof: Likelihood,
    pub medical: Likelihood,
    pub violence: Likelihood,
    pub racy: Likelihood,
}

/// A detected face.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaceAnnotation {
    pub detection_confidence: f64,
    pub joy_likelihood: Likelihood,
    pub sorrow_likelihood: Likelihood,
    pub anger_likelihood: Likelihood,
    pub surprise_likelihood: Likelihood,
    pub blurred_likelihood: Likelihood,
    pub headwear_likelihood: Likelihood,
}

//! Hierarchical structured text: pages, blocks, paragraphs, words, symbols.
//!
//! The page tree is parsed lazily: the raw JSON is retained at document
//! construction and materialized on first access, since most documents are
//! only ever queried through the flat text views. Word character offsets
//! are assigned during materialization and index the reconstructed full
//! text, which is what maps regex match positions back to bounding boxes.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::annotations::BoundingPoly;
use super::orientation::{ImageOrientation, OrientationResult};

/// A language detected for a word.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedLanguage {
    pub language_code: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Kind of whitespace/break following (or preceding) a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakType {
    #[default]
    Unknown,
    Space,
    SureSpace,
    EolSureSpace,
    Hyphen,
    LineBreak,
}

/// A detected break attached to a symbol.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedBreak {
    #[serde(rename = "type")]
    pub break_type: BreakType,
    #[serde(default)]
    pub is_prefix: bool,
}

impl DetectedBreak {
    /// The characters this break contributes to the full text.
    pub fn as_text(&self) -> &'static str {
        match self.break_type {
            BreakType::Space | BreakType::SureSpace => " ",
            BreakType::EolSureSpace | BreakType::LineBreak => "\n",
            BreakType::Hyphen => "-\n",
            BreakType::Unknown => "",
        }
    }
}

/// Language/break metadata attached to words and symbols.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperty {
    #[serde(default)]
    pub detected_languages: Vec<DetectedLanguage>,
    #[serde(default)]
    pub detected_break: Option<DetectedBreak>,
}

/// A single detected glyph.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    #[serde(default)]
    pub bounding_box: Option<BoundingPoly>,
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub property: Option<TextProperty>,
}

/// A word: a run of symbols sharing language metadata and a bounding box.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    #[serde(default)]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub property: Option<TextProperty>,

    /// Reconstructed word text (symbols concatenated, breaks excluded).
    #[serde(skip)]
    pub text: String,

    /// Byte offset of the word's first symbol in the full text.
    #[serde(skip)]
    pub start_idx: usize,

    /// Byte offset just past the word's last symbol in the full text.
    #[serde(skip)]
    pub end_idx: usize,
}

impl Word {
    /// Languages detected for this word, empty when none.
    pub fn detected_languages(&self) -> &[DetectedLanguage] {
        self.property
            .as_ref()
            .map(|p| p.detected_languages.as_slice())
            .unwrap_or(&[])
    }

    /// Orientation of this word's bounding polygon.
    pub fn orientation(&self) -> ImageOrientation {
        self.bounding_box
            .as_ref()
            .map(BoundingPoly::detect_orientation)
            .unwrap_or(ImageOrientation::Unknown)
    }
}

/// A paragraph of words.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(default)]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    pub words: Vec<Word>,
}

/// A block of paragraphs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

/// One page of structured text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// The structured full-text annotation of a response.
///
/// Two-state value: raw page JSON is retained until [`Self::pages`] is
/// first called, then the parsed tree is memoized. The parse is pure and
/// idempotent, so sharing across threads only needs the `OnceLock` guard.
#[derive(Debug, Clone, Default)]
pub struct FullTextAnnotation {
    /// Flat text of the whole annotation.
    pub text: String,
    raw_pages: Vec<Value>,
    pages: OnceLock<Vec<Page>>,
}

impl FullTextAnnotation {
    /// Extract from the `fullTextAnnotation` JSON object.
    pub fn from_value(value: &Value) -> Self {
        let text = value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let raw_pages = value
            .get("pages")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            text,
            raw_pages,
            pages: OnceLock::new(),
        }
    }

    /// The parsed page tree, materialized on first access.
    ///
    /// Pages that fail to deserialize are skipped with a warning; the
    /// envelope was already validated, so a malformed page is a partial
    /// upstream response rather than a caller error.
    pub fn pages(&self) -> &[Page] {
        self.pages.get_or_init(|| {
            let mut pages: Vec<Page> = Vec::with_capacity(self.raw_pages.len());

            for (index, raw) in self.raw_pages.iter().enumerate() {
                match serde_json::from_value::<Page>(raw.clone()) {
                    Ok(page) => pages.push(page),
                    Err(error) => {
                        warn!("skipping malformed OCR page {index}: {error}");
                    }
                }
            }

            assign_offsets(&mut pages);
            pages
        })
    }

    /// Iterate over every word of every page in reading order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.pages()
            .iter()
            .flat_map(|page| &page.blocks)
            .flat_map(|block| &block.paragraphs)
            .flat_map(|paragraph| &paragraph.words)
    }

    /// Words whose character span overlaps `[start, end)`.
    pub fn words_in_range(&self, start: usize, end: usize) -> Vec<&Word> {
        self.words()
            .filter(|word| word.end_idx > start && word.start_idx < end)
            .collect()
    }

    /// Majority-vote orientation over all word bounding boxes.
    pub fn detect_orientation(&self) -> OrientationResult {
        let mut count: HashMap<ImageOrientation, usize> = HashMap::new();

        for word in self.words() {
            *count.entry(word.orientation()).or_insert(0) += 1;
        }

        OrientationResult::from_counts(count)
    }
}

/// Walk the tree and assign word offsets by replaying symbol texts and
/// detected breaks the way the flat text was produced.
fn assign_offsets(pages: &mut [Page]) {
    let mut cursor = 0usize;

    for page in pages {
        for block in &mut page.blocks {
            for paragraph in &mut block.paragraphs {
                for word in &mut paragraph.words {
                    let mut text = String::new();
                    let mut start = None;
                    let mut end = cursor;

                    for symbol in &word.symbols {
                        let detected_break = symbol
                            .property
                            .as_ref()
                            .and_then(|p| p.detected_break.as_ref());

                        if let Some(br) = detected_break {
                            if br.is_prefix {
                                cursor += br.as_text().len();
                            }
                        }

                        start.get_or_insert(cursor);
                        text.push_str(&symbol.text);
                        cursor += symbol.text.len();
                        end = cursor;

                        if let Some(br) = detected_break {
                            if !br.is_prefix {
                                cursor += br.as_text().len();
                            }
                        }
                    }

                    word.start_idx = start.unwrap_or(cursor);
                    word.end_idx = end.max(word.start_idx);
                    word.text = text;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn symbol(text: &str, break_type: Option<&str>) -> Value {
        let mut value = json!({"text": text});
        if let Some(bt) = break_type {
            value["property"] = json!({"detectedBreak": {"type": bt}});
        }
        value
    }

    fn word(symbols: Vec<Value>) -> Value {
        json!({
            "boundingBox": {"vertices": [
                {"x": 0, "y": 0}, {"x": 10, "y": 0},
                {"x": 10, "y": 5}, {"x": 0, "y": 5}
            ]},
            "symbols": symbols,
        })
    }

    fn annotation(text: &str, words: Vec<Value>) -> FullTextAnnotation {
        FullTextAnnotation::from_value(&json!({
            "text": text,
            "pages": [{"blocks": [{"paragraphs": [{"words": words}]}]}],
        }))
    }

    #[test]
    fn test_word_offsets_match_full_text() {
        let fta = annotation(
            "net 30g\n",
            vec![
                word(vec![
                    symbol("n", None),
                    symbol("e", None),
                    symbol("t", Some("SPACE")),
                ]),
                word(vec![
                    symbol("3", None),
                    symbol("0", None),
                    symbol("g", Some("LINE_BREAK")),
                ]),
            ],
        );

        let words: Vec<&Word> = fta.words().collect();
        assert_eq!(words.len(), 2);

        assert_eq!(words[0].text, "net");
        assert_eq!((words[0].start_idx, words[0].end_idx), (0, 3));

        assert_eq!(words[1].text, "30g");
        assert_eq!((words[1].start_idx, words[1].end_idx), (4, 7));

        // Offsets index the flat text.
        assert_eq!(&fta.text[words[1].start_idx..words[1].end_idx], "30g");
    }

    #[test]
    fn test_words_in_range() {
        let fta = annotation(
            "net 30g\n",
            vec![
                word(vec![symbol("net", Some("SPACE"))]),
                word(vec![symbol("30g", Some("LINE_BREAK"))]),
            ],
        );

        let in_range = fta.words_in_range(4, 7);
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].text, "30g");

        let spanning = fta.words_in_range(2, 5);
        assert_eq!(spanning.len(), 2);
    }

    #[test]
    fn test_lazy_parse_skips_malformed_pages() {
        let fta = FullTextAnnotation::from_value(&json!({
            "text": "x",
            "pages": [
                {"blocks": []},
                {"blocks": "not-a-list"},
            ],
        }));

        assert_eq!(fta.pages().len(), 1);
    }

    #[test]
    fn test_detected_break_text() {
        let space = DetectedBreak { break_type: BreakType::SureSpace, is_prefix: false };
        let eol = DetectedBreak { break_type: BreakType::EolSureSpace, is_prefix: false };
        assert_eq!(space.as_text(), " ");
        assert_eq!(eol.as_text(), "\n");
    }
}

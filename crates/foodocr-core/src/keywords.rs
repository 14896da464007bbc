//! Multi-keyword text scanning with longest-match-first resolution.
//!
//! Brand, store, label, fishing-code, allergen and packaging lists are all
//! matched in a single pass over the text. Overlapping candidate keywords
//! resolve to the longest match at each position; matches come back in
//! left-to-right order of occurrence.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::error::ResourceError;

/// One line of a pipe-delimited dictionary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Stable identifier (taxonomy tag or slug).
    pub tag: String,
    /// Human-readable display name.
    pub display: String,
    /// Optional third column (e.g. a regex override for alternation-based
    /// matchers).
    pub extra: Option<String>,
}

/// Parse `key||display_name` (or `key||display_name||extra`) lines.
///
/// Empty lines and `#` comments are skipped.
pub fn parse_dictionary(
    name: &'static str,
    content: &str,
) -> Result<Vec<DictionaryEntry>, ResourceError> {
    let mut entries = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split("||");
        let (Some(tag), Some(display)) = (parts.next(), parts.next()) else {
            return Err(ResourceError::MalformedLine {
                name,
                line: index + 1,
            });
        };

        entries.push(DictionaryEntry {
            tag: tag.trim().to_string(),
            display: display.trim().to_string(),
            extra: parts.next().map(|s| s.trim().to_string()),
        });
    }

    Ok(entries)
}

/// A keyword occurrence, with byte offsets into the *original* text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch<'a, T> {
    pub payload: &'a T,
    pub start: usize,
    pub end: usize,
}

impl<T> KeywordMatch<'_, T> {
    /// The matched slice of the original text.
    pub fn matched<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

/// An Aho-Corasick scanner carrying a metadata payload per keyword.
pub struct KeywordProcessor<T> {
    automaton: AhoCorasick,
    payloads: Vec<T>,
    case_sensitive: bool,
}

impl<T> KeywordProcessor<T> {
    /// Build a scanner from `(keyword, payload)` pairs.
    ///
    /// When `case_sensitive` is false, keywords are folded at build time and
    /// the haystack is folded at scan time; reported spans always index the
    /// original text even when case folding changes string lengths.
    pub fn new(pairs: impl IntoIterator<Item = (String, T)>, case_sensitive: bool) -> Self {
        let mut patterns = Vec::new();
        let mut payloads = Vec::new();

        for (keyword, payload) in pairs {
            let keyword = if case_sensitive {
                keyword
            } else {
                keyword.to_lowercase()
            };
            patterns.push(keyword);
            payloads.push(payload);
        }

        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .expect("keyword automaton construction cannot fail on valid patterns");

        Self {
            automaton,
            payloads,
            case_sensitive,
        }
    }

    /// Number of keywords in the scanner.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Scan `text`, returning matches in left-to-right order.
    ///
    /// Only whole-word occurrences are reported: a keyword flanked by an
    /// alphanumeric character on either side is not a match ("paris" does
    /// not match inside "parisien").
    pub fn extract<'a>(&'a self, text: &str) -> Vec<KeywordMatch<'a, T>> {
        if self.case_sensitive {
            return self
                .automaton
                .find_iter(text)
                .filter(|m| on_word_boundaries(text, m.start(), m.end()))
                .map(|m| KeywordMatch {
                    payload: &self.payloads[m.pattern().as_usize()],
                    start: m.start(),
                    end: m.end(),
                })
                .collect();
        }

        let (folded, offsets) = fold_with_offsets(text);

        self.automaton
            .find_iter(&folded)
            .map(|m| {
                let start = offsets[m.start()];
                // The match covers the whole original character that
                // produced its last folded byte, even if case folding
                // expanded that character to several.
                let last_char_start = offsets[m.end() - 1];
                let last_char_len = text[last_char_start..]
                    .chars()
                    .next()
                    .map_or(0, |c| c.len_utf8());
                KeywordMatch {
                    payload: &self.payloads[m.pattern().as_usize()],
                    start,
                    end: last_char_start + last_char_len,
                }
            })
            .filter(|m| on_word_boundaries(text, m.start, m.end))
            .collect()
    }
}

fn on_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Lower-case `text`, recording for every folded byte the byte offset of the
/// original character it came from.
fn fold_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut folded = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len());

    for (index, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            let before = folded.len();
            folded.push(lower);
            for _ in before..folded.len() {
                offsets.push(index);
            }
        }
    }

    (folded, offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn processor(keywords: &[&str]) -> KeywordProcessor<String> {
        KeywordProcessor::new(
            keywords.iter().map(|k| (k.to_string(), k.to_string())),
            false,
        )
    }

    #[test]
    fn test_parse_dictionary() {
        let entries = parse_dictionary(
            "test",
            "# comment\ncarrefour||Carrefour\ncarrefour-market||Carrefour Market||carrefour\\s?market\n",
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tag, "carrefour");
        assert_eq!(entries[0].extra, None);
        assert_eq!(entries[1].extra.as_deref(), Some("carrefour\\s?market"));
    }

    #[test]
    fn test_parse_dictionary_malformed() {
        let result = parse_dictionary("test", "valid||Valid\nnot-valid\n");
        assert!(matches!(
            result,
            Err(ResourceError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_longest_match_wins() {
        let scanner = processor(&["carrefour", "carrefour market"]);
        let matches = scanner.extract("bought at carrefour market yesterday");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].payload, "carrefour market");
    }

    #[test]
    fn test_matches_in_text_order() {
        let scanner = processor(&["lidl", "aldi"]);
        let matches = scanner.extract("aldi then lidl");

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].payload, "aldi");
        assert_eq!(matches[1].payload, "lidl");
    }

    #[test]
    fn test_case_insensitive_spans_index_original_text() {
        let scanner = processor(&["bio"]);
        let text = "Label BIO certifie";
        let matches = scanner.extract(text);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched(text), "BIO");
    }

    #[test]
    fn test_case_fold_with_length_change() {
        // Turkish dotted capital I folds to "i" + combining dot (3 bytes
        // from 2), shifting every byte offset after it in the folded copy.
        // Spans of later matches must still index the original string.
        let scanner = processor(&["carrefour market"]);
        let text = "İzmir store: Carrefour Market aisle 3";
        let matches = scanner.extract(text);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched(text), "Carrefour Market");
    }

    #[test]
    fn test_whole_word_matching_only() {
        let scanner = processor(&["paris"]);
        assert_eq!(scanner.extract("jambon de paris").len(), 1);
        assert_eq!(scanner.extract("esprit parisien").len(), 0);
        assert_eq!(scanner.extract("comparais").len(), 0);
    }

    #[test]
    fn test_case_sensitive_scanner() {
        let scanner = KeywordProcessor::new(
            [("AOP".to_string(), "aop".to_string())],
            true,
        );
        assert_eq!(scanner.extract("certified AOP cheese").len(), 1);
        assert_eq!(scanner.extract("certified aop cheese").len(), 0);
    }
}

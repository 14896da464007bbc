//! Text normalization helpers: accent stripping, tag slugs, whitespace folding.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Strip diacritics by NFKD decomposition and dropping combining marks.
///
/// `"éléphant"` becomes `"elephant"`, `"Müsli"` becomes `"Musli"`.
pub fn strip_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Build a taxonomy-style tag slug: lower-case, accent-free, with runs of
/// non-alphanumeric characters replaced by a single hyphen.
///
/// `"Pâturages Comté"` becomes `"paturages-comte"`.
pub fn get_tag(value: &str) -> String {
    let stripped = strip_accents(&value.to_lowercase());
    let mut tag = String::with_capacity(stripped.len());
    let mut last_was_dash = true;

    for c in stripped.chars() {
        if c.is_alphanumeric() {
            tag.push(c);
            last_was_dash = false;
        } else if !last_was_dash {
            tag.push('-');
            last_was_dash = true;
        }
    }

    while tag.ends_with('-') {
        tag.pop();
    }

    tag
}

/// Replace newlines with spaces and collapse runs of 2+ spaces into one.
///
/// Downstream regexes assume single-space separators, so this must stay
/// byte-for-byte stable: every `'\n'` becomes one `' '`, then any run of
/// consecutive spaces is reduced to a single space.
pub fn fold_contiguous(text: &str) -> String {
    let replaced = text.replace('\n', " ");
    let mut folded = String::with_capacity(replaced.len());
    let mut last_was_space = false;

    for c in replaced.chars() {
        if c == ' ' {
            if !last_was_space {
                folded.push(c);
            }
            last_was_space = true;
        } else {
            folded.push(c);
            last_was_space = false;
        }
    }

    folded
}

/// Normalize free text for keyword parsing: lower-case, accent-free, all
/// whitespace runs collapsed to single spaces.
pub fn normalize_for_matching(text: &str) -> String {
    let lowered = strip_accents(&text.to_lowercase());
    let mut normalized = String::with_capacity(lowered.len());
    let mut last_was_space = true;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                normalized.push(' ');
            }
            last_was_space = true;
        } else {
            normalized.push(c);
            last_was_space = false;
        }
    }

    while normalized.ends_with(' ') {
        normalized.pop();
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("éléphant"), "elephant");
        assert_eq!(strip_accents("Müsli"), "Musli");
        assert_eq!(strip_accents("żółć"), "zołc");
        assert_eq!(strip_accents("plain"), "plain");
    }

    #[test]
    fn test_get_tag() {
        assert_eq!(get_tag("Pâturages Comté"), "paturages-comte");
        assert_eq!(get_tag("ES-ECO-001-AN"), "es-eco-001-an");
        assert_eq!(get_tag("  Carrefour  Market  "), "carrefour-market");
        assert_eq!(get_tag("bio!"), "bio");
    }

    #[test]
    fn test_fold_contiguous() {
        assert_eq!(fold_contiguous("a\nb"), "a b");
        assert_eq!(fold_contiguous("a \n b"), "a b");
        assert_eq!(fold_contiguous("a    b"), "a b");
        assert_eq!(fold_contiguous("a\n\n\nb"), "a b");
    }

    #[test]
    fn test_fold_contiguous_no_newline_no_double_space() {
        let folded = fold_contiguous("one\ntwo  three\n\nfour");
        assert!(!folded.contains('\n'));
        assert!(!folded.contains("  "));
    }

    #[test]
    fn test_normalize_for_matching() {
        assert_eq!(
            normalize_for_matching("Bouteille  en\tVERRE  recyclée"),
            "bouteille en verre recyclee"
        );
    }
}

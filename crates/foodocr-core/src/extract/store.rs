//! Store / retail chain extraction.
//!
//! Stores are matched with a single compiled alternation regex built from
//! the store file. Entries are sorted longest-name-first before joining so
//! the leftmost-first alternation is greedy-correct ("carrefour market"
//! wins over "carrefour"); an entry's optional third column overrides the
//! escaped display name in the alternation.

use regex::Regex;
use serde_json::json;

use crate::cache::CachedStore;
use crate::keywords::DictionaryEntry;
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::resources;

struct StoreMatcher {
    regex: Regex,
    entries: Vec<DictionaryEntry>,
}

fn build_store_matcher() -> StoreMatcher {
    let mut entries: Vec<DictionaryEntry> = resources::store_entries().as_ref().clone();
    entries.sort_by(|a, b| {
        b.display
            .len()
            .cmp(&a.display.len())
            .then_with(|| a.display.cmp(&b.display))
    });

    let alternation = entries
        .iter()
        .map(|entry| {
            let pattern = match &entry.extra {
                Some(custom) => custom.clone(),
                None => regex::escape(&entry.display.to_lowercase()),
            };
            format!("({pattern})")
        })
        .collect::<Vec<_>>()
        .join("|");

    let regex = Regex::new(&format!(r"\b(?:{alternation})\b"))
        .expect("store alternation regex must compile");

    StoreMatcher { regex, entries }
}

static STORE_MATCHER: CachedStore<StoreMatcher> = CachedStore::new(build_store_matcher);

/// Extract store predictions from the curated store list.
pub fn find_stores(document: &OcrDocument) -> Vec<Prediction> {
    let matcher = STORE_MATCHER.get();
    let text = document.get_full_text_contiguous(true);
    let mut predictions = Vec::new();

    for captures in matcher.regex.captures_iter(text) {
        // Group i+1 corresponds to entry i in sorted order.
        let Some(index) = (1..=matcher.entries.len())
            .find(|&i| captures.get(i).is_some())
        else {
            continue;
        };
        let entry = &matcher.entries[index - 1];
        let raw = captures.get(0).map(|m| m.as_str()).unwrap_or_default();

        predictions.push(
            Prediction::new(PredictionType::Store)
                .with_value(entry.display.clone())
                .with_value_tag(entry.tag.clone())
                .with_data(json!({"text": raw})),
        );
    }

    predictions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stores(text: &str) -> Vec<(String, String)> {
        find_stores(&OcrDocument::from_text(text))
            .into_iter()
            .map(|p| (p.value.unwrap_or_default(), p.value_tag.unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_simple_store() {
        assert_eq!(
            stores("vendu chez Picard surgelés"),
            vec![("Picard".to_string(), "picard".to_string())]
        );
    }

    #[test]
    fn test_longest_name_wins() {
        assert_eq!(
            stores("distribué par carrefour market"),
            vec![("Carrefour Market".to_string(), "carrefour-market".to_string())]
        );
    }

    #[test]
    fn test_regex_override_column() {
        // "intermarch[ée]" override matches the accented form.
        assert_eq!(
            stores("INTERMARCHÉ rayon frais"),
            vec![("Intermarché".to_string(), "intermarche".to_string())]
        );
        // And the compact "carrefourmarket" spelling.
        assert_eq!(
            stores("carrefourmarket"),
            vec![("Carrefour Market".to_string(), "carrefour-market".to_string())]
        );
    }

    #[test]
    fn test_multiple_stores_in_text_order() {
        let found = stores("disponible chez lidl et aldi");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "Lidl");
        assert_eq!(found[1].0, "Aldi");
    }

    #[test]
    fn test_no_store() {
        assert_eq!(stores("aucun magasin mentionné"), Vec::new());
    }
}

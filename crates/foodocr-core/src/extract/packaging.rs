//! Packaging element extraction (shape + material + recycling).
//!
//! French packaging statements are parsed from normalized text: the three
//! term tables are scanned in one pass each, then a small parser folds the
//! token stream into elements. A shape token opens a new element; material
//! and recycling tokens attach to the open element when they are close
//! enough, otherwise they open an element of their own.

use serde_json::{Value, json};

use crate::keywords::DictionaryEntry;
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::resources;
use crate::text::normalize_for_matching;

/// Maximum bytes of connector text ("en", "100%", punctuation) between two
/// tokens of the same element.
const MAX_TOKEN_GAP: usize = 8;

/// Generic shapes that are only meaningful with a material or a recycling
/// instruction attached.
const EXCLUDED_SHAPES: [&str; 2] = ["en:packaging", "en:tray"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentKind {
    Shape,
    Material,
    Recycling,
}

struct Token<'a> {
    kind: ComponentKind,
    entry: &'a DictionaryEntry,
    start: usize,
    end: usize,
}

#[derive(Default)]
struct Element {
    shape: Option<(String, String)>,
    material: Option<(String, String)>,
    recycling: Option<(String, String)>,
    end: usize,
}

impl Element {
    fn is_empty(&self) -> bool {
        self.shape.is_none() && self.material.is_none() && self.recycling.is_none()
    }

    fn slot(&self, kind: ComponentKind) -> &Option<(String, String)> {
        match kind {
            ComponentKind::Shape => &self.shape,
            ComponentKind::Material => &self.material,
            ComponentKind::Recycling => &self.recycling,
        }
    }

    fn set(&mut self, kind: ComponentKind, value: (String, String), end: usize) {
        match kind {
            ComponentKind::Shape => self.shape = Some(value),
            ComponentKind::Material => self.material = Some(value),
            ComponentKind::Recycling => self.recycling = Some(value),
        }
        self.end = end;
    }

    fn to_json(&self) -> Value {
        let component = |slot: &Option<(String, String)>| match slot {
            Some((value, tag)) => json!({"value": value, "value_tag": tag}),
            None => Value::Null,
        };
        json!({
            "shape": component(&self.shape),
            "material": component(&self.material),
            "recycling": component(&self.recycling),
        })
    }
}

/// Extract packaging-element predictions from French text.
pub fn find_packaging(document: &OcrDocument) -> Vec<Prediction> {
    let text = normalize_for_matching(document.get_full_text_contiguous(true));

    let shapes = resources::packaging_shape_processor();
    let materials = resources::packaging_material_processor();
    let recyclings = resources::packaging_recycling_processor();

    let mut tokens: Vec<Token> = Vec::new();
    for keyword_match in shapes.extract(&text) {
        tokens.push(Token {
            kind: ComponentKind::Shape,
            entry: keyword_match.payload,
            start: keyword_match.start,
            end: keyword_match.end,
        });
    }
    for keyword_match in materials.extract(&text) {
        tokens.push(Token {
            kind: ComponentKind::Material,
            entry: keyword_match.payload,
            start: keyword_match.start,
            end: keyword_match.end,
        });
    }
    for keyword_match in recyclings.extract(&text) {
        tokens.push(Token {
            kind: ComponentKind::Recycling,
            entry: keyword_match.payload,
            start: keyword_match.start,
            end: keyword_match.end,
        });
    }
    tokens.sort_by_key(|token| token.start);

    let mut elements: Vec<Element> = Vec::new();
    let mut current = Element::default();

    for token in tokens {
        let surface = text[token.start..token.end].to_string();
        let value = (surface, token.entry.tag.clone());

        let gap_ok = !current.is_empty() && token.start.saturating_sub(current.end) <= MAX_TOKEN_GAP;
        let starts_new = token.kind == ComponentKind::Shape
            || !gap_ok
            || current.slot(token.kind).is_some();

        if starts_new && !current.is_empty() {
            elements.push(std::mem::take(&mut current));
        }
        current.set(token.kind, value, token.end);
    }
    if !current.is_empty() {
        elements.push(current);
    }

    elements
        .into_iter()
        .filter(|element| {
            let excluded_shape = element
                .shape
                .as_ref()
                .is_some_and(|(_, tag)| EXCLUDED_SHAPES.contains(&tag.as_str()));
            !(excluded_shape && element.material.is_none() && element.recycling.is_none())
        })
        .map(|element| {
            Prediction::new(PredictionType::Packaging)
                .with_data(json!({"element": element.to_json()}))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn elements(text: &str) -> Vec<Value> {
        find_packaging(&OcrDocument::from_text(text))
            .into_iter()
            .map(|p| p.data["element"].clone())
            .collect()
    }

    #[test]
    fn test_shape_material_recycling_triple() {
        let found = elements("Bouteille en verre recyclable");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["shape"]["value_tag"], "en:bottle");
        assert_eq!(found[0]["material"]["value_tag"], "en:glass");
        assert_eq!(found[0]["recycling"]["value_tag"], "en:recycle");
    }

    #[test]
    fn test_accents_are_normalized() {
        let found = elements("Étui carton à recycler");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["shape"]["value_tag"], "en:box");
        assert_eq!(found[0]["material"]["value_tag"], "en:cardboard");
        assert_eq!(found[0]["recycling"]["value_tag"], "en:recycle");
    }

    #[test]
    fn test_multiple_elements() {
        let found = elements("pot verre et couvercle métal");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0]["shape"]["value_tag"], "en:jar");
        assert_eq!(found[0]["material"]["value_tag"], "en:glass");
        assert_eq!(found[1]["shape"]["value_tag"], "en:lid");
        assert_eq!(found[1]["material"]["value_tag"], "en:metal");
    }

    #[test]
    fn test_generic_shape_alone_is_dropped() {
        assert_eq!(elements("emballage soigné").len(), 0);
        assert_eq!(elements("barquette fraîcheur").len(), 0);
    }

    #[test]
    fn test_generic_shape_with_recycling_is_kept() {
        let found = elements("emballage à recycler");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["shape"]["value_tag"], "en:packaging");
        assert_eq!(found[0]["recycling"]["value_tag"], "en:recycle");
    }

    #[test]
    fn test_distant_material_starts_its_own_element() {
        let found = elements("bouteille consignée, étiquette imprimée sur papier");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0]["shape"]["value_tag"], "en:bottle");
        assert_eq!(found[1]["material"]["value_tag"], "en:paper");
        assert!(found[1]["shape"].is_null());
    }

    #[test]
    fn test_no_packaging_words() {
        assert_eq!(elements("confiture de fraises maison").len(), 0);
    }
}

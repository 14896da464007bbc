//! Nutrient mention and nutrient value extraction.
//!
//! Every nutrient gets one compiled regex combining its multilingual
//! keyword alternations; value extraction additionally requires a number
//! and unit, mention extraction only records that (and in which language)
//! the nutrient is named.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::matcher::{OcrField, OcrRegex};
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};

/// Keyword table: nutrient, per-language term groups, value units (None for
/// header-like entries that never carry a value).
const NUTRIENT_TERMS: &[(&str, &[(&[&str], &[&str])], Option<&str>)] = &[
    (
        "energy",
        &[
            (&["fr"], &["valeurs? [ée]nerg[ée]tiques?", "[ée]nergie"]),
            (&["en"], &["energy value", "energy"]),
            (&["de"], &["energie", "brennwert"]),
        ],
        Some("kj|kcal"),
    ),
    (
        "saturated_fat",
        &[
            (
                &["fr"],
                &[
                    "dont acides gras satur[ée]s",
                    "acides gras satur[ée]s",
                    "graisses satur[ée]es",
                ],
            ),
            (&["en"], &["of which saturates", "saturated fat"]),
        ],
        Some("g"),
    ),
    (
        "trans_fat",
        &[(&["fr"], &["graisses trans"]), (&["en"], &["trans fat"])],
        Some("g"),
    ),
    (
        "fat",
        &[
            (&["fr"], &["mati[èe]res grasses", "graisses", "lipides"]),
            (&["en"], &["total fat", "fat"]),
            (&["de"], &["fett"]),
        ],
        Some("g"),
    ),
    (
        "sugar",
        &[
            (&["fr"], &["dont sucres", "sucres"]),
            (&["en"], &["of which sugars", "sugars"]),
            (&["de"], &["davon zucker", "zucker"]),
        ],
        Some("g"),
    ),
    (
        "carbohydrate",
        &[
            (&["fr"], &["glucides"]),
            (&["en"], &["carbohydrates?"]),
            (&["de"], &["kohlenhydrate"]),
        ],
        Some("g"),
    ),
    (
        "protein",
        &[
            (&["fr"], &["prot[ée]ines"]),
            (&["en"], &["proteins?"]),
            (&["de"], &["eiwei[ßs]"]),
        ],
        Some("g"),
    ),
    (
        "salt",
        &[(&["fr"], &["sel"]), (&["en"], &["salt"]), (&["de"], &["salz"])],
        Some("g"),
    ),
    (
        "fiber",
        &[
            (&["fr"], &["fibres alimentaires", "fibres"]),
            (&["en"], &["dietary fib(?:er|re)", "fib(?:er|re)s?"]),
        ],
        Some("g"),
    ),
    (
        "nutrition_values",
        &[
            (
                &["fr"],
                &["valeurs nutritionnelles", "informations nutritionnelles"],
            ),
            (
                &["en"],
                &["nutrition facts", "nutritional values", "nutrition information"],
            ),
            (&["de"], &["n[äa]hrwerte"]),
        ],
        None,
    ),
];

struct NutrientRegex {
    nutrient: &'static str,
    /// Named group -> languages of that group.
    groups: Vec<(String, Vec<&'static str>)>,
    mention: OcrRegex,
    value: Option<OcrRegex>,
}

fn build_nutrient_regex() -> Vec<NutrientRegex> {
    NUTRIENT_TERMS
        .iter()
        .map(|&(nutrient, term_groups, units)| {
            let mut groups = Vec::new();
            let mut named_parts = Vec::new();
            let mut flat_parts = Vec::new();

            for (index, (langs, terms)) in term_groups.iter().enumerate() {
                // Group naming convention: languages joined by '_' plus a
                // trailing index, parsed back at match time.
                let name = format!("{}_{}", langs.join("_"), index);
                let alternation = terms.join("|");
                named_parts.push(format!("(?P<{name}>{alternation})"));
                flat_parts.push(alternation);
                groups.push((name, langs.to_vec()));
            }

            let mention_pattern = format!(r"\b(?:{})\b", named_parts.join("|"));
            let mention =
                OcrRegex::new(&mention_pattern, OcrField::FullTextContiguous).lowercase();

            let value = units.map(|units| {
                let value_pattern = format!(
                    r"\b(?:{})\s?:?\s?([0-9]+[,.]?[0-9]*)\s?({units})\b",
                    flat_parts.join("|")
                );
                OcrRegex::new(&value_pattern, OcrField::FullText).lowercase()
            });

            NutrientRegex {
                nutrient,
                groups,
                mention,
                value,
            }
        })
        .collect()
}

lazy_static! {
    static ref NUTRIENT_REGEX: Vec<NutrientRegex> = build_nutrient_regex();
}

/// Languages encoded in a named-group identifier (`"fr_en_2"` -> `["fr","en"]`).
fn group_languages<'a>(entry: &'a NutrientRegex, captures: &regex::Captures) -> Option<&'a [&'static str]> {
    entry
        .groups
        .iter()
        .find(|(name, _)| captures.name(name).is_some())
        .map(|(_, langs)| langs.as_slice())
}

/// Record which nutrients are mentioned, and in which language, without
/// requiring a numeric value nearby.
pub fn find_nutrient_mentions(document: &OcrDocument) -> Vec<Prediction> {
    let mut mentions: BTreeMap<&'static str, Vec<Value>> = BTreeMap::new();

    for entry in NUTRIENT_REGEX.iter() {
        let text = document.get_text(&entry.mention);
        for captures in entry.mention.regex.captures_iter(text) {
            let Some(full) = captures.get(0) else { continue };
            let languages = group_languages(entry, &captures).unwrap_or(&[]);

            mentions.entry(entry.nutrient).or_default().push(json!({
                "raw": full.as_str(),
                "span": [full.start(), full.end()],
                "languages": languages,
            }));
        }
    }

    if mentions.is_empty() {
        return Vec::new();
    }

    let mentions: Map<String, Value> = mentions
        .into_iter()
        .map(|(nutrient, found)| (nutrient.to_string(), Value::Array(found)))
        .collect();

    vec![
        Prediction::new(PredictionType::NutrientMention)
            .with_data(json!({"mentions": mentions})),
    ]
}

/// Extract nutrient name + value + unit triples.
pub fn find_nutrient_values(document: &OcrDocument) -> Vec<Prediction> {
    let mut nutrients: BTreeMap<&'static str, Vec<Value>> = BTreeMap::new();

    for entry in NUTRIENT_REGEX.iter() {
        let Some(value_matcher) = &entry.value else {
            continue;
        };

        let text = document.get_text(value_matcher);
        for captures in value_matcher.regex.captures_iter(text) {
            let (Some(full), Some(value), Some(unit)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };

            let mut found = json!({
                "raw": full.as_str(),
                "value": value.as_str().replace(',', "."),
                "unit": unit.as_str(),
            });

            if let Some((y_min, x_min, y_max, x_max)) =
                document.get_match_bounding_box(full.start(), full.end())
            {
                found["bounding_box"] = json!([y_min, x_min, y_max, x_max]);
            }

            nutrients.entry(entry.nutrient).or_default().push(found);
        }
    }

    if nutrients.is_empty() {
        return Vec::new();
    }

    let nutrients: Map<String, Value> = nutrients
        .into_iter()
        .map(|(nutrient, found)| (nutrient.to_string(), Value::Array(found)))
        .collect();

    vec![Prediction::new(PredictionType::Nutrient).with_data(json!({"nutrients": nutrients}))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nutrient_values() {
        let document = OcrDocument::from_text(
            "valeurs nutritionnelles\nénergie: 2252 kj\nmatières grasses 30 g\nsel 0,9 g",
        );
        let predictions = find_nutrient_values(&document);
        assert_eq!(predictions.len(), 1);

        let nutrients = &predictions[0].data["nutrients"];
        assert_eq!(nutrients["energy"][0]["value"], "2252");
        assert_eq!(nutrients["energy"][0]["unit"], "kj");
        assert_eq!(nutrients["fat"][0]["value"], "30");
        assert_eq!(nutrients["salt"][0]["value"], "0.9");
    }

    #[test]
    fn test_nutrient_mentions_record_language() {
        let document = OcrDocument::from_text("informations nutritionnelles: sugars, zucker");
        let predictions = find_nutrient_mentions(&document);
        assert_eq!(predictions.len(), 1);

        let mentions = &predictions[0].data["mentions"];
        assert_eq!(mentions["nutrition_values"][0]["languages"], json!(["fr"]));
        assert_eq!(mentions["sugar"][0]["languages"], json!(["en"]));
        assert_eq!(mentions["sugar"][1]["languages"], json!(["de"]));
    }

    #[test]
    fn test_mention_without_value() {
        let document = OcrDocument::from_text("riche en protéines");
        assert_eq!(find_nutrient_values(&document).len(), 0);

        let mentions = find_nutrient_mentions(&document);
        assert_eq!(mentions.len(), 1);
        assert!(mentions[0].data["mentions"]["protein"].is_array());
    }

    #[test]
    fn test_no_mentions_no_predictions() {
        let document = OcrDocument::from_text("ingrédients: farine, eau, sel marin");
        // "sel" still matches as a mention; use text without nutrient words.
        let empty = OcrDocument::from_text("code barre 3560070976737");
        assert_eq!(find_nutrient_mentions(&empty).len(), 0);
        assert_eq!(find_nutrient_values(&document).len(), 0);
    }

    #[test]
    fn test_energy_units() {
        let document = OcrDocument::from_text("energy 539 kcal");
        let predictions = find_nutrient_values(&document);
        assert_eq!(
            predictions[0].data["nutrients"]["energy"][0]["unit"],
            "kcal"
        );
    }
}

//! Origin-of-ingredient extraction.
//!
//! One large regex per supported language combines taxonomy-derived
//! ingredient and country alternations with the linguistic scaffolding
//! around origin statements (verbs of origin, negation markers, "outside
//! of" markers, diffuse-origin phrases). Text is matched accent-stripped
//! so the alternations line up with normalized taxonomy terms.

use regex::Regex;
use serde_json::json;

use crate::cache::CachedStore;
use crate::ocr::OcrDocument;
use crate::prediction::{Prediction, PredictionType};
use crate::resources;
use crate::text::normalize_for_matching;

/// Sentinel for a diffuse/unknown/multi-country origin.
pub const LARGE_ORIGIN_TAG: &str = "en:large-origin";

/// Capture-group words that mean "all ingredients", not a specific one.
const GENERIC_INGREDIENT_WORDS: [&str; 6] = [
    "ingredient",
    "ingredients",
    "produit",
    "produits",
    "production",
    "produce",
];

struct OriginRegex {
    lang: &'static str,
    regex: Regex,
}

fn ingredient_alternation(lang: &str) -> String {
    let taxonomy = resources::ingredient_taxonomy();
    let mut terms: Vec<String> = taxonomy
        .alternation_terms(lang)
        .iter()
        .map(|term| regex::escape(term))
        .collect();
    terms.extend(GENERIC_INGREDIENT_WORDS.iter().map(|w| w.to_string()));
    terms.join("|")
}

fn country_alternation(lang: &str) -> String {
    let taxonomy = resources::country_taxonomy();
    taxonomy
        .alternation_terms(lang)
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|")
}

fn build_origin_regex() -> Vec<OriginRegex> {
    let fr_ingredients = ingredient_alternation("fr");
    let fr_countries = country_alternation("fr");
    let fr_intro = r"(?:(?:d'|de\s)?origine\s|cultivee?s?\s(?:en|au)\s|produite?s?\s(?:en|au)\s|fabriquee?s?\s(?:en|au)\s|recoltee?s?\s(?:en|au)\s|provenance\s(?:de\s|du\s|des\s)?)";
    let fr_several = r"divers\spays|plusieurs\spays|differents\spays|ue\set\shors\sue";
    let fr_pattern = format!(
        r"\b(?:(?P<ingredients>{fr_ingredients})\s)?{fr_intro}(?P<neg>non\s)?(?P<outside>hors\s)?(?:de\s|d'|du\s|des\s|la\s|le\s|l')?(?:(?P<country>{fr_countries})|(?P<several>{fr_several}))\b"
    );

    let en_ingredients = ingredient_alternation("en");
    let en_countries = country_alternation("en");
    let en_intro = r"(?:(?P<neg>not\s)?(?:produced|made|grown|harvested|originat(?:es|ing))\s|origin\s?:?\s|from\s)(?:in\s|from\s|of\s)?(?:the\s)?";
    let en_several = r"several\scountries|various\scountries|more\sthan\sone\scountry";
    let en_pattern = format!(
        r"\b(?:(?P<ingredients>{en_ingredients})\s)?{en_intro}(?P<outside>outside\s(?:of\s)?(?:the\s)?)?(?:(?P<country>{en_countries})|(?P<several>{en_several}))\b"
    );

    vec![
        OriginRegex {
            lang: "fr",
            regex: Regex::new(&fr_pattern).expect("french origin regex must compile"),
        },
        OriginRegex {
            lang: "en",
            regex: Regex::new(&en_pattern).expect("english origin regex must compile"),
        },
    ]
}

static ORIGIN_REGEX: CachedStore<Vec<OriginRegex>> = CachedStore::new(build_origin_regex);

/// Extract origin predictions.
///
/// Classification ladder: negation or "outside of" markers mean the large
/// (diffuse) origin; a captured country resolves through the taxonomy; a
/// diffuse-countries phrase also means the large origin; anything else is
/// an unknown origin and is discarded.
pub fn find_origins(document: &OcrDocument) -> Vec<Prediction> {
    let text = normalize_for_matching(document.get_full_text_contiguous(true));
    let entries = ORIGIN_REGEX.get();
    let countries = resources::country_taxonomy();
    let ingredients = resources::ingredient_taxonomy();
    let mut predictions = Vec::new();

    for entry in entries.iter() {
        for captures in entry.regex.captures_iter(&text) {
            let negated = captures.name("neg").is_some();
            let outside = captures.name("outside").is_some();
            let country = captures.name("country").map(|m| m.as_str());
            let several = captures.name("several").is_some();

            let origin_tag = if negated || outside {
                Some(LARGE_ORIGIN_TAG.to_string())
            } else if let Some(country) = country {
                countries
                    .resolve(entry.lang, country)
                    .map(|tag| tag.to_string())
            } else if several {
                Some(LARGE_ORIGIN_TAG.to_string())
            } else {
                None
            };

            // Unknown origin: discarded, not surfaced.
            let Some(origin_tag) = origin_tag else {
                continue;
            };

            let matched_ingredients = captures
                .name("ingredients")
                .map(|m| m.as_str())
                .filter(|word| !GENERIC_INGREDIENT_WORDS.contains(word))
                .map(|word| {
                    vec![
                        ingredients
                            .resolve(entry.lang, word)
                            .map(|tag| tag.to_string())
                            .unwrap_or_else(|| word.to_string()),
                    ]
                });

            let raw = captures.get(0).map(|m| m.as_str()).unwrap_or_default();
            predictions.push(
                Prediction::new(PredictionType::Origin)
                    .with_value_tag(origin_tag.clone())
                    .with_data(json!({
                        "origin": origin_tag,
                        "ingredients": matched_ingredients,
                        "raw": raw,
                        "lang": entry.lang,
                    })),
            );
        }
    }

    predictions
}

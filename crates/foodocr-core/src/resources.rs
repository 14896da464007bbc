//! Embedded reference data and the process-wide cached stores around it.
//!
//! Dictionaries and taxonomies are compiled into the binary and parsed on
//! first use. Parse failures are programming errors in checked-in data
//! files, caught by the tests below, so loaders panic instead of
//! propagating errors into every extractor signature.

use std::io::Read;
use std::sync::Arc;

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::cache::CachedStore;
use crate::keywords::{DictionaryEntry, KeywordProcessor, parse_dictionary};
use crate::taxonomy::Taxonomy;

const BRANDS_DATA: &str = include_str!("../data/brands.txt");
const STORES_DATA: &str = include_str!("../data/stores.txt");
const LABELS_DATA: &str = include_str!("../data/labels.txt");
const TRACES_DATA: &str = include_str!("../data/traces.txt");
const FISHING_CODES_DATA: &str = include_str!("../data/fishing_codes.txt");
const PACKAGING_SHAPES_DATA: &str = include_str!("../data/packaging_shapes_fr.txt");
const PACKAGING_MATERIALS_DATA: &str = include_str!("../data/packaging_materials_fr.txt");
const PACKAGING_RECYCLING_DATA: &str = include_str!("../data/packaging_recycling_fr.txt");
const COUNTRIES_TAXONOMY_DATA: &str = include_str!("../data/taxonomies/countries.json");
const INGREDIENTS_TAXONOMY_DATA: &str = include_str!("../data/taxonomies/ingredients.json");
const FR_CITIES_DATA: &[u8] = include_bytes!("../data/fr_cities.json.gz");

/// One entry of the French city gazetteer.
#[derive(Debug, Clone, Deserialize)]
pub struct City {
    /// Lower-case city name.
    pub name: String,
    /// Five-digit postal code.
    pub postal_code: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

fn load_entries(name: &'static str, content: &str) -> Vec<DictionaryEntry> {
    parse_dictionary(name, content)
        .unwrap_or_else(|error| panic!("embedded dictionary {name} is malformed: {error}"))
}

fn entry_processor(name: &'static str, content: &str) -> KeywordProcessor<DictionaryEntry> {
    let entries = load_entries(name, content);
    KeywordProcessor::new(
        entries
            .into_iter()
            .map(|entry| (entry.display.clone(), entry)),
        false,
    )
}

fn load_brand_processor() -> KeywordProcessor<DictionaryEntry> {
    entry_processor("brands.txt", BRANDS_DATA)
}

fn load_label_processor() -> KeywordProcessor<DictionaryEntry> {
    entry_processor("labels.txt", LABELS_DATA)
}

fn load_trace_processor() -> KeywordProcessor<DictionaryEntry> {
    entry_processor("traces.txt", TRACES_DATA)
}

fn load_fishing_code_processor() -> KeywordProcessor<DictionaryEntry> {
    entry_processor("fishing_codes.txt", FISHING_CODES_DATA)
}

fn load_packaging_shape_processor() -> KeywordProcessor<DictionaryEntry> {
    entry_processor("packaging_shapes_fr.txt", PACKAGING_SHAPES_DATA)
}

fn load_packaging_material_processor() -> KeywordProcessor<DictionaryEntry> {
    entry_processor("packaging_materials_fr.txt", PACKAGING_MATERIALS_DATA)
}

fn load_packaging_recycling_processor() -> KeywordProcessor<DictionaryEntry> {
    entry_processor("packaging_recycling_fr.txt", PACKAGING_RECYCLING_DATA)
}

fn load_store_entries() -> Vec<DictionaryEntry> {
    load_entries("stores.txt", STORES_DATA)
}

fn load_cities() -> Vec<City> {
    let mut decoder = GzDecoder::new(FR_CITIES_DATA);
    let mut json = String::new();
    decoder
        .read_to_string(&mut json)
        .unwrap_or_else(|error| panic!("embedded city gazetteer is not valid gzip: {error}"));

    serde_json::from_str(&json)
        .unwrap_or_else(|error| panic!("embedded city gazetteer is malformed: {error}"))
}

fn load_country_taxonomy() -> Taxonomy {
    Taxonomy::from_json_str("countries.json", COUNTRIES_TAXONOMY_DATA)
        .unwrap_or_else(|error| panic!("embedded country taxonomy is malformed: {error}"))
}

fn load_ingredient_taxonomy() -> Taxonomy {
    Taxonomy::from_json_str("ingredients.json", INGREDIENTS_TAXONOMY_DATA)
        .unwrap_or_else(|error| panic!("embedded ingredient taxonomy is malformed: {error}"))
}

static BRAND_PROCESSOR: CachedStore<KeywordProcessor<DictionaryEntry>> =
    CachedStore::new(load_brand_processor);
static LABEL_PROCESSOR: CachedStore<KeywordProcessor<DictionaryEntry>> =
    CachedStore::new(load_label_processor);
static TRACE_PROCESSOR: CachedStore<KeywordProcessor<DictionaryEntry>> =
    CachedStore::new(load_trace_processor);
static FISHING_CODE_PROCESSOR: CachedStore<KeywordProcessor<DictionaryEntry>> =
    CachedStore::new(load_fishing_code_processor);
static PACKAGING_SHAPE_PROCESSOR: CachedStore<KeywordProcessor<DictionaryEntry>> =
    CachedStore::new(load_packaging_shape_processor);
static PACKAGING_MATERIAL_PROCESSOR: CachedStore<KeywordProcessor<DictionaryEntry>> =
    CachedStore::new(load_packaging_material_processor);
static PACKAGING_RECYCLING_PROCESSOR: CachedStore<KeywordProcessor<DictionaryEntry>> =
    CachedStore::new(load_packaging_recycling_processor);
static STORE_ENTRIES: CachedStore<Vec<DictionaryEntry>> = CachedStore::new(load_store_entries);
static CITIES: CachedStore<Vec<City>> = CachedStore::new(load_cities);
static COUNTRY_TAXONOMY: CachedStore<Taxonomy> = CachedStore::new(load_country_taxonomy);
static INGREDIENT_TAXONOMY: CachedStore<Taxonomy> = CachedStore::new(load_ingredient_taxonomy);

pub fn brand_processor() -> Arc<KeywordProcessor<DictionaryEntry>> {
    BRAND_PROCESSOR.get()
}

pub fn label_processor() -> Arc<KeywordProcessor<DictionaryEntry>> {
    LABEL_PROCESSOR.get()
}

pub fn trace_processor() -> Arc<KeywordProcessor<DictionaryEntry>> {
    TRACE_PROCESSOR.get()
}

pub fn fishing_code_processor() -> Arc<KeywordProcessor<DictionaryEntry>> {
    FISHING_CODE_PROCESSOR.get()
}

pub fn packaging_shape_processor() -> Arc<KeywordProcessor<DictionaryEntry>> {
    PACKAGING_SHAPE_PROCESSOR.get()
}

pub fn packaging_material_processor() -> Arc<KeywordProcessor<DictionaryEntry>> {
    PACKAGING_MATERIAL_PROCESSOR.get()
}

pub fn packaging_recycling_processor() -> Arc<KeywordProcessor<DictionaryEntry>> {
    PACKAGING_RECYCLING_PROCESSOR.get()
}

pub fn store_entries() -> Arc<Vec<DictionaryEntry>> {
    STORE_ENTRIES.get()
}

pub fn city_gazetteer() -> Arc<Vec<City>> {
    CITIES.get()
}

pub fn country_taxonomy() -> Arc<Taxonomy> {
    COUNTRY_TAXONOMY.get()
}

pub fn ingredient_taxonomy() -> Arc<Taxonomy> {
    INGREDIENT_TAXONOMY.get()
}

/// Drop every cached store; the next access reloads. Intended for tests.
pub fn invalidate_all() {
    BRAND_PROCESSOR.invalidate();
    LABEL_PROCESSOR.invalidate();
    TRACE_PROCESSOR.invalidate();
    FISHING_CODE_PROCESSOR.invalidate();
    PACKAGING_SHAPE_PROCESSOR.invalidate();
    PACKAGING_MATERIAL_PROCESSOR.invalidate();
    PACKAGING_RECYCLING_PROCESSOR.invalidate();
    STORE_ENTRIES.invalidate();
    CITIES.invalidate();
    COUNTRY_TAXONOMY.invalidate();
    INGREDIENT_TAXONOMY.invalidate();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_embedded_dictionaries_load() {
        assert!(!brand_processor().is_empty());
        assert!(!label_processor().is_empty());
        assert!(!trace_processor().is_empty());
        assert!(!fishing_code_processor().is_empty());
        assert!(!packaging_shape_processor().is_empty());
        assert!(!packaging_material_processor().is_empty());
        assert!(!packaging_recycling_processor().is_empty());
        assert!(!store_entries().is_empty());
    }

    #[test]
    fn test_city_gazetteer_loads() {
        let cities = city_gazetteer();
        assert!(cities.len() > 50);
        assert!(cities.iter().any(|c| c.name == "paris"));
        assert!(cities.iter().all(|c| c.postal_code.len() == 5));
    }

    #[test]
    fn test_taxonomies_load() {
        assert!(country_taxonomy().resolve("fr", "française").is_some());
        assert!(ingredient_taxonomy().resolve("fr", "tomates").is_some());
    }

    #[test]
    fn test_invalidate_all_reloads() {
        let before = brand_processor();
        invalidate_all();
        let after = brand_processor();
        assert_eq!(before.len(), after.len());
    }
}

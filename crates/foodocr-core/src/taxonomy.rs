//! Hierarchical vocabularies (countries, ingredients) with per-language
//! synonyms, used to canonicalize free-text matches into stable identifiers.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ResourceError;
use crate::text::normalize_for_matching;

/// One taxonomy node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonomyNode {
    /// Canonical name per language code.
    #[serde(default)]
    pub names: HashMap<String, String>,

    /// Synonyms per language code.
    #[serde(default)]
    pub synonyms: HashMap<String, Vec<String>>,

    /// Parent node identifiers.
    #[serde(default)]
    pub parents: Vec<String>,
}

/// A loaded taxonomy: nodes by id plus a normalized synonym index.
#[derive(Debug, Default)]
pub struct Taxonomy {
    nodes: HashMap<String, TaxonomyNode>,
    /// `"{lang}:{normalized term}"` -> node id.
    index: HashMap<String, String>,
}

impl Taxonomy {
    /// Parse a taxonomy from its JSON representation.
    pub fn from_json_str(name: &'static str, content: &str) -> Result<Self, ResourceError> {
        let nodes: HashMap<String, TaxonomyNode> = serde_json::from_str(content)
            .map_err(|source| ResourceError::Parse { name, source })?;

        let mut index = HashMap::new();
        for (id, node) in &nodes {
            for (lang, node_name) in &node.names {
                index.insert(index_key(lang, node_name), id.clone());
            }
            for (lang, synonyms) in &node.synonyms {
                for synonym in synonyms {
                    index.insert(index_key(lang, synonym), id.clone());
                }
            }
        }

        Ok(Self { nodes, index })
    }

    pub fn get(&self, id: &str) -> Option<&TaxonomyNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TaxonomyNode)> {
        self.nodes.iter()
    }

    /// Resolve a free-text term to a node id, matching the canonical name or
    /// any synonym of the given language, accent- and case-insensitively.
    pub fn resolve(&self, lang: &str, term: &str) -> Option<&str> {
        self.index.get(&index_key(lang, term)).map(String::as_str)
    }

    /// All surface forms (names + synonyms) for a language, longest first,
    /// ready to be joined into a regex alternation.
    pub fn alternation_terms(&self, lang: &str) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();

        for node in self.nodes.values() {
            if let Some(name) = node.names.get(lang) {
                terms.push(normalize_for_matching(name));
            }
            if let Some(synonyms) = node.synonyms.get(lang) {
                terms.extend(synonyms.iter().map(|s| normalize_for_matching(s)));
            }
        }

        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();
        terms
    }
}

fn index_key(lang: &str, term: &str) -> String {
    format!("{}:{}", lang, normalize_for_matching(term))
}

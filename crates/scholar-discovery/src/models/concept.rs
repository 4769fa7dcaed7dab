//! Concept expansion and extraction results.

use serde::{Deserialize, Serialize};

/// Expansion of a single query term through the ontology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptExpansion {
    /// Term as it appeared (lowercased) in the query.
    pub original_term: String,

    /// Synonyms and domain terms, sorted.
    pub expanded_terms: Vec<String>,

    /// 1.0 for synonym-group members, 0.7 for domain-only matches, 0.5 otherwise.
    pub semantic_weight: f64,

    /// Requested domains whose ontology terms matched.
    pub domain_context: Vec<String>,
}

/// A key concept found in free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedConcept {
    /// Concept term.
    pub term: String,

    /// Occurrences in the analysed text.
    pub frequency: usize,

    /// Ontology domain the term belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Ontology expansion of the term.
    pub expansion: ConceptExpansion,
}

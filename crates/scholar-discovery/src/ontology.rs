//! Concept ontology: synonym groups, domain vocabularies and stopwords.
//!
//! Loaded once at startup and shared read-only (`Arc<ConceptOntology>`).
//! Every member of a synonym group maps to the whole group, so expanding
//! an expansion never introduces new synonyms.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Ontology shipped with the crate.
const EMBEDDED_ONTOLOGY: &str = include_str!("../data/ontology.json");

/// Tokens this short carry no meaning for expansion.
const MIN_TOKEN_LEN: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OntologyData {
    #[serde(default = "default_semantic_weight")]
    semantic_weight: f64,
    #[serde(default)]
    synonym_groups: Vec<Vec<String>>,
    #[serde(default)]
    domains: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    stopwords: Vec<String>,
}

fn default_semantic_weight() -> f64 {
    1.0
}

/// Immutable term and domain lookup tables.
#[derive(Debug, Clone)]
pub struct ConceptOntology {
    semantic_weight: f64,
    synonyms: HashMap<String, Vec<String>>,
    domains: BTreeMap<String, Vec<String>>,
    stopwords: HashSet<String>,
}

impl ConceptOntology {
    /// Parse an ontology from JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON does not match the ontology schema.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let data: OntologyData = serde_json::from_str(json).context("invalid ontology JSON")?;

        let mut synonyms: HashMap<String, Vec<String>> = HashMap::new();
        for group in &data.synonym_groups {
            let mut members: Vec<String> = group.iter().map(|t| t.trim().to_lowercase()).collect();
            members.sort();
            members.dedup();
            for member in &members {
                synonyms.entry(member.clone()).or_default().extend(members.iter().cloned());
            }
        }
        for group in synonyms.values_mut() {
            group.sort();
            group.dedup();
        }

        let domains = data
            .domains
            .into_iter()
            .map(|(domain, terms)| {
                (domain.to_lowercase(), terms.into_iter().map(|t| t.to_lowercase()).collect())
            })
            .collect();

        let stopwords = data.stopwords.into_iter().map(|w| w.to_lowercase()).collect();

        Ok(Self { semantic_weight: data.semantic_weight, synonyms, domains, stopwords })
    }

    /// Load an ontology from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ontology {}", path.display()))?;
        Self::from_json(&json)
    }

    /// The ontology embedded in the crate.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(EMBEDDED_ONTOLOGY).expect("embedded ontology is valid")
    }

    /// Load from `path` when given, otherwise use the embedded ontology.
    ///
    /// # Errors
    ///
    /// Returns error if the given file cannot be loaded.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading ontology from file");
                Self::from_path(path)
            }
            None => Ok(Self::embedded()),
        }
    }

    /// Weight given to synonym-group members.
    #[must_use]
    pub const fn semantic_weight(&self) -> f64 {
        self.semantic_weight
    }

    /// Synonym group of a term (case-insensitive), including the term itself.
    #[must_use]
    pub fn synonyms(&self, term: &str) -> Option<&[String]> {
        self.synonyms.get(&term.to_lowercase()).map(Vec::as_slice)
    }

    /// Ontology terms of a domain (case-insensitive).
    #[must_use]
    pub fn domain_terms(&self, domain: &str) -> Option<&[String]> {
        self.domains.get(&domain.to_lowercase()).map(Vec::as_slice)
    }

    /// Domain names in alphabetical order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    /// Whether a (lowercase) word is a stopword.
    #[must_use]
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// First domain, alphabetically, whose vocabulary contains `term` exactly.
    #[must_use]
    pub fn domain_of_term(&self, term: &str) -> Option<&str> {
        let term = term.to_lowercase();
        self.domains
            .iter()
            .find(|(_, terms)| terms.iter().any(|t| *t == term))
            .map(|(domain, _)| domain.as_str())
    }

    /// Domain whose vocabulary occurs most often in `text`. Ties go to the
    /// alphabetically first domain; `None` when nothing matches.
    #[must_use]
    pub fn classify_domain(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        let mut best: Option<(&str, usize)> = None;

        for (domain, terms) in &self.domains {
            let hits: usize = terms.iter().map(|t| lowered.matches(t.as_str()).count()).sum();
            if hits == 0 {
                continue;
            }
            if best.is_none_or(|(_, top)| hits > top) {
                best = Some((domain.as_str(), hits));
            }
        }

        best.map(|(domain, _)| domain)
    }

    /// Lowercase content words of `text`: whitespace-separated, edge
    /// punctuation trimmed, purely alphabetic, longer than two characters,
    /// and not stopwords. Order of first occurrence is kept; duplicates are not removed.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
            .filter(|token| token.chars().all(char::is_alphabetic))
            .filter(|token| !self.is_stopword(token))
            .collect()
    }
}

impl Default for ConceptOntology {
    fn default() -> Self {
        Self::embedded()
    }
}

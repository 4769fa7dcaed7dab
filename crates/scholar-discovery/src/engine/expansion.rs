//! Query expansion and concept extraction over the concept ontology.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::models::{ConceptExpansion, ExtractedConcept};
use crate::ontology::ConceptOntology;

/// Weight of a term matched only through a domain vocabulary.
const DOMAIN_MATCH_WEIGHT: f64 = 0.7;

/// Weight of a term unknown to the ontology.
const UNKNOWN_TERM_WEIGHT: f64 = 0.5;

/// Expands free-text queries into deduplicated term sets. Pure, no I/O.
#[derive(Debug, Clone)]
pub struct QueryExpander {
    ontology: Arc<ConceptOntology>,
}

impl QueryExpander {
    /// Create an expander over a shared ontology.
    #[must_use]
    pub const fn new(ontology: Arc<ConceptOntology>) -> Self {
        Self { ontology }
    }

    /// The underlying ontology.
    #[must_use]
    pub fn ontology(&self) -> &ConceptOntology {
        &self.ontology
    }

    /// Expand `query` into a deduplicated term list.
    ///
    /// The original query always comes first. With `enabled == false` the
    /// result is just `[query]`. Otherwise each content word contributes its
    /// synonym group and, per requested domain, every domain term that
    /// contains the word or is contained in it. Words of added terms are
    /// expanded in turn, so re-expanding any output term adds nothing new.
    #[must_use]
    pub fn expand(&self, query: &str, domains: &[String], enabled: bool) -> Vec<String> {
        if !enabled {
            return vec![query.to_string()];
        }

        let mut seen = HashSet::new();
        let mut expanded = Vec::new();
        let mut visited = HashSet::new();
        let mut pending: VecDeque<String> = self.ontology.tokenize(query).into();

        seen.insert(query.to_string());
        expanded.push(query.to_string());

        while let Some(token) = pending.pop_front() {
            if !visited.insert(token.clone()) {
                continue;
            }
            for term in self.related_terms(&token, domains) {
                if seen.insert(term.clone()) {
                    pending.extend(self.ontology.tokenize(term));
                    expanded.push(term.clone());
                }
            }
        }

        expanded
    }

    /// Per-term expansion details for `query`.
    #[must_use]
    pub fn expand_concepts(&self, query: &str, domains: &[String]) -> Vec<ConceptExpansion> {
        let mut seen = HashSet::new();
        self.ontology
            .tokenize(query)
            .into_iter()
            .filter(|token| seen.insert(token.clone()))
            .map(|token| self.expand_term(&token, domains))
            .collect()
    }

    /// Expansion of a single lowercase term.
    #[must_use]
    pub fn expand_term(&self, term: &str, domains: &[String]) -> ConceptExpansion {
        let group = self.ontology.synonyms(term);
        let mut expanded: Vec<String> = group
            .map(|g| g.iter().filter(|s| s.as_str() != term).cloned().collect())
            .unwrap_or_default();

        let mut domain_context = Vec::new();
        let mut domain_hit = false;
        if domains.is_empty() {
            domain_context.extend(
                self.ontology
                    .domains()
                    .filter(|d| {
                        self.ontology
                            .domain_terms(d)
                            .is_some_and(|terms| terms.iter().any(|t| t == term))
                    })
                    .map(str::to_string),
            );
        } else {
            for domain in domains {
                let matches = self.group_domain_matches(domain, term, group);
                if !matches.is_empty() {
                    domain_hit = true;
                    domain_context.push(domain.to_lowercase());
                    expanded.extend(matches.into_iter().filter(|t| t.as_str() != term).cloned());
                }
            }
        }

        expanded.sort();
        expanded.dedup();

        let semantic_weight = if group.is_some() {
            self.ontology.semantic_weight()
        } else if domain_hit || !domain_context.is_empty() {
            DOMAIN_MATCH_WEIGHT
        } else {
            UNKNOWN_TERM_WEIGHT
        };

        ConceptExpansion {
            original_term: term.to_string(),
            expanded_terms: expanded,
            semantic_weight,
            domain_context,
        }
    }

    /// Up to `limit` key concepts of `text`.
    ///
    /// Terms known to the ontology rank ahead of unknown terms, then by
    /// frequency, then alphabetically.
    #[must_use]
    pub fn extract_concepts(&self, text: &str, limit: usize) -> Vec<ExtractedConcept> {
        let mut frequencies: BTreeMap<String, usize> = BTreeMap::new();
        for token in self.ontology.tokenize(text) {
            *frequencies.entry(token).or_insert(0) += 1;
        }

        let mut ranked: Vec<(String, usize, Option<String>)> = frequencies
            .into_iter()
            .map(|(term, frequency)| {
                let domain = self.term_domain(&term);
                (term, frequency, domain)
            })
            .collect();

        ranked.sort_by(|a, b| {
            let a_known = self.is_known(&a.0);
            let b_known = self.is_known(&b.0);
            b_known.cmp(&a_known).then(b.1.cmp(&a.1)).then(a.0.cmp(&b.0))
        });

        ranked
            .into_iter()
            .take(limit)
            .map(|(term, frequency, domain)| ExtractedConcept {
                expansion: self.expand_term(&term, &[]),
                term,
                frequency,
                domain,
            })
            .collect()
    }

    /// Synonyms of `token` plus the domain matches of every group member.
    fn related_terms(&self, token: &str, domains: &[String]) -> Vec<&String> {
        let group = self.ontology.synonyms(token);
        let mut related: Vec<&String> = group.map(|g| g.iter().collect()).unwrap_or_default();
        for domain in domains {
            related.extend(self.group_domain_matches(domain, token, group));
        }
        related
    }

    fn group_domain_matches(
        &self,
        domain: &str,
        term: &str,
        group: Option<&[String]>,
    ) -> Vec<&String> {
        let mut matches = self.domain_matches(domain, term);
        for member in group.unwrap_or_default() {
            for hit in self.domain_matches(domain, member) {
                if !matches.contains(&hit) {
                    matches.push(hit);
                }
            }
        }
        matches
    }

    fn domain_matches(&self, domain: &str, term: &str) -> Vec<&String> {
        self.ontology
            .domain_terms(domain)
            .map(|terms| {
                terms.iter().filter(|t| t.contains(term) || term.contains(t.as_str())).collect()
            })
            .unwrap_or_default()
    }

    fn is_known(&self, term: &str) -> bool {
        self.ontology.synonyms(term).is_some() || self.ontology.domain_of_term(term).is_some()
    }

    fn term_domain(&self, term: &str) -> Option<String> {
        if let Some(domain) = self.ontology.domain_of_term(term) {
            return Some(domain.to_string());
        }
        self.ontology
            .synonyms(term)?
            .iter()
            .find_map(|s| self.ontology.domain_of_term(s))
            .map(str::to_string)
    }
}

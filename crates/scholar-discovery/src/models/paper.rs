//! Paper record returned by retrieval collaborators.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Immutable snapshot of a paper as returned by a retrieval collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    /// Unique paper identifier (PMID).
    #[serde(alias = "paperId", alias = "id")]
    pub pmid: String,

    /// Paper title.
    #[serde(default)]
    pub title: Option<String>,

    /// Paper abstract.
    #[serde(default)]
    pub r#abstract: Option<String>,

    /// Author names.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Journal name.
    #[serde(default)]
    pub journal: Option<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Number of citations this paper has received.
    #[serde(default)]
    pub citation_count: Option<i32>,

    /// MeSH subject headings.
    #[serde(default)]
    pub mesh_terms: Vec<String>,

    /// Author keywords.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Research domain (e.g. "oncology").
    #[serde(default)]
    pub research_domain: Option<String>,

    /// Methodology type (e.g. "randomized_controlled_trial").
    #[serde(default)]
    pub methodology_type: Option<String>,

    /// Study type (e.g. "clinical", "observational").
    #[serde(default)]
    pub study_type: Option<String>,

    /// Relevance score assigned by the collaborator, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl PaperRecord {
    /// Create a record with just an identifier and year.
    #[must_use]
    pub fn new(pmid: impl Into<String>, year: i32) -> Self {
        Self { pmid: pmid.into(), year: Some(year), ..Default::default() }
    }

    /// Get the paper title, falling back to "Untitled" if not available.
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Get citation count or 0 if not available.
    #[must_use]
    pub fn citations(&self) -> i32 {
        self.citation_count.unwrap_or(0)
    }

    /// Domain key used for grouping; "unknown" when absent.
    #[must_use]
    pub fn domain_key(&self) -> &str {
        self.research_domain.as_deref().unwrap_or("unknown")
    }

    /// Methodology key used for grouping; "unknown" when absent.
    #[must_use]
    pub fn methodology_key(&self) -> &str {
        self.methodology_type.as_deref().unwrap_or("unknown")
    }

    /// Lowercased union of keywords and MeSH terms.
    #[must_use]
    pub fn keyword_set(&self) -> HashSet<String> {
        self.keywords
            .iter()
            .chain(&self.mesh_terms)
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Title and abstract joined for text analysis.
    #[must_use]
    pub fn text(&self) -> String {
        match (&self.title, &self.r#abstract) {
            (Some(t), Some(a)) => format!("{t} {a}"),
            (Some(t), None) => t.clone(),
            (None, Some(a)) => a.clone(),
            (None, None) => String::new(),
        }
    }

    /// Years since publication relative to `reference_year`, floored at zero.
    #[must_use]
    pub fn age(&self, reference_year: i32) -> Option<f64> {
        self.year.map(|y| f64::from(reference_year.saturating_sub(y).max(0)))
    }
}

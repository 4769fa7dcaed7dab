//! User profile: explicit preferences, implicit history and derived scores.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{PaperRecord, ReadingFrequency, ResearchLevel};

/// Increment applied to expertise/familiarity per read paper.
const EXPERTISE_STEP: f64 = 0.1;

/// Reads needed for a full citation-influence score.
const INFLUENCE_SATURATION: f64 = 100.0;

/// Preferences stated by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplicitPreferences {
    /// Preferred research domains.
    #[serde(default)]
    pub preferred_domains: Vec<String>,

    /// Preferred methodologies.
    #[serde(default)]
    pub preferred_methodologies: Vec<String>,

    /// Preferred journals.
    #[serde(default)]
    pub preferred_journals: Vec<String>,
}

/// Partial update of a profile's stated preferences. Absent fields are
/// left unchanged; present lists replace the stored ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceUpdate {
    #[serde(default)]
    pub preferred_domains: Option<Vec<String>>,

    #[serde(default)]
    pub preferred_methodologies: Option<Vec<String>>,

    #[serde(default)]
    pub preferred_journals: Option<Vec<String>>,

    #[serde(default)]
    pub research_level: Option<ResearchLevel>,

    /// Preferred paper age in years; must be finite and non-negative.
    #[serde(default)]
    pub preferred_paper_age: Option<f64>,

    /// Appetite for novel work; must lie in [0, 1].
    #[serde(default)]
    pub novelty_preference: Option<f64>,
}

impl PreferenceUpdate {
    /// First invalid field with its reason, if any.
    #[must_use]
    pub fn invalid_field(&self) -> Option<(&'static str, &'static str)> {
        if self.preferred_paper_age.is_some_and(|age| !age.is_finite() || age < 0.0) {
            return Some(("preferredPaperAge", "must be a non-negative number of years"));
        }
        if self.novelty_preference.is_some_and(|n| !(0.0..=1.0).contains(&n)) {
            return Some(("noveltyPreference", "must be between 0 and 1"));
        }
        None
    }
}

/// Behaviour observed from the user's interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplicitHistory {
    /// Identifiers of papers the user has read.
    #[serde(default)]
    pub reading_history: BTreeSet<String>,

    /// Past search queries, oldest first.
    #[serde(default)]
    pub search_history: Vec<String>,

    /// Keywords of bookmarked papers.
    #[serde(default)]
    pub bookmark_patterns: Vec<String>,
}

/// Temporal reading preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalPreferences {
    /// How often the user reads.
    #[serde(default)]
    pub reading_frequency: ReadingFrequency,

    /// Preferred paper age in years.
    #[serde(default = "default_preferred_age")]
    pub preferred_paper_age: f64,

    /// Appetite for novel work in [0, 1].
    #[serde(default = "default_novelty_preference")]
    pub novelty_preference: f64,
}

fn default_preferred_age() -> f64 {
    3.0
}

fn default_novelty_preference() -> f64 {
    0.5
}

impl Default for TemporalPreferences {
    fn default() -> Self {
        Self {
            reading_frequency: ReadingFrequency::default(),
            preferred_paper_age: default_preferred_age(),
            novelty_preference: default_novelty_preference(),
        }
    }
}

/// Collaboration metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationMetadata {
    /// Institution, if known.
    #[serde(default)]
    pub institution: Option<String>,

    /// Known collaborator user ids.
    #[serde(default)]
    pub collaborators: Vec<String>,
}

/// Scores derived from the user's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedScores {
    /// Expertise per domain in [0, 1].
    #[serde(default)]
    pub domain_expertise: BTreeMap<String, f64>,

    /// Familiarity per methodology in [0, 1].
    #[serde(default)]
    pub methodology_familiarity: BTreeMap<String, f64>,

    /// Citation influence in [0, 1].
    #[serde(default)]
    pub citation_influence: f64,
}

/// A researcher's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier.
    pub user_id: String,

    /// Stated preferences.
    #[serde(default)]
    pub preferences: ExplicitPreferences,

    /// Observed history.
    #[serde(default)]
    pub history: ImplicitHistory,

    /// Career stage.
    #[serde(default)]
    pub research_level: ResearchLevel,

    /// Temporal preferences.
    #[serde(default)]
    pub temporal: TemporalPreferences,

    /// Collaboration metadata.
    #[serde(default)]
    pub collaboration: CollaborationMetadata,

    /// Derived scores.
    #[serde(default)]
    pub derived: DerivedScores,
}

impl UserProfile {
    /// Create an empty profile for a user.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), ..Default::default() }
    }

    /// Builder-style helper setting preferred domains.
    #[must_use]
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferences.preferred_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper setting preferred methodologies.
    #[must_use]
    pub fn with_methodologies<I, S>(mut self, methodologies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferences.preferred_methodologies =
            methodologies.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper marking papers as read.
    #[must_use]
    pub fn with_read<I, S>(mut self, paper_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.history.reading_history.extend(paper_ids.into_iter().map(Into::into));
        self
    }

    /// Whether the user has read a paper.
    #[must_use]
    pub fn has_read(&self, paper_id: &str) -> bool {
        self.history.reading_history.contains(paper_id)
    }

    /// Case-insensitive membership in preferred domains.
    #[must_use]
    pub fn prefers_domain(&self, domain: &str) -> bool {
        self.preferences.preferred_domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }

    /// Case-insensitive membership in preferred methodologies.
    #[must_use]
    pub fn prefers_methodology(&self, methodology: &str) -> bool {
        self.preferences.preferred_methodologies.iter().any(|m| m.eq_ignore_ascii_case(methodology))
    }

    /// Register a read paper and update derived scores.
    pub fn record_read(&mut self, paper: &PaperRecord) {
        self.history.reading_history.insert(paper.pmid.clone());

        if let Some(domain) = &paper.research_domain {
            let entry = self.derived.domain_expertise.entry(domain.to_lowercase()).or_insert(0.0);
            *entry = (*entry + EXPERTISE_STEP).min(1.0);
        }
        if let Some(methodology) = &paper.methodology_type {
            let entry = self
                .derived
                .methodology_familiarity
                .entry(methodology.to_lowercase())
                .or_insert(0.0);
            *entry = (*entry + EXPERTISE_STEP).min(1.0);
        }

        self.derived.citation_influence =
            (self.history.reading_history.len() as f64 / INFLUENCE_SATURATION).min(1.0);
    }

    /// Register a bookmarked paper's keywords.
    pub fn record_bookmark(&mut self, paper: &PaperRecord) {
        let mut keywords: Vec<String> = paper.keyword_set().into_iter().collect();
        keywords.sort();
        for keyword in keywords {
            if !self.history.bookmark_patterns.contains(&keyword) {
                self.history.bookmark_patterns.push(keyword);
            }
        }
    }

    /// Apply stated preferences. Domain and methodology names are stored
    /// lowercase and deduplicated.
    pub fn apply_preferences(&mut self, update: &PreferenceUpdate) {
        let normalise = |values: &[String]| -> Vec<String> {
            let mut out: Vec<String> = Vec::new();
            for value in values.iter().map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty()) {
                if !out.contains(&value) {
                    out.push(value);
                }
            }
            out
        };

        if let Some(domains) = &update.preferred_domains {
            self.preferences.preferred_domains = normalise(domains);
        }
        if let Some(methodologies) = &update.preferred_methodologies {
            self.preferences.preferred_methodologies = normalise(methodologies);
        }
        if let Some(journals) = &update.preferred_journals {
            self.preferences.preferred_journals = journals.clone();
        }
        if let Some(level) = update.research_level {
            self.research_level = level;
        }
        if let Some(age) = update.preferred_paper_age {
            self.temporal.preferred_paper_age = age;
        }
        if let Some(novelty) = update.novelty_preference {
            self.temporal.novelty_preference = novelty;
        }
    }

    /// Register a search query.
    pub fn record_search(&mut self, query: &str) {
        let query = query.trim();
        if !query.is_empty() {
            self.history.search_history.push(query.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oncology_paper(id: &str) -> PaperRecord {
        PaperRecord {
            pmid: id.to_string(),
            year: Some(2022),
            research_domain: Some("Oncology".to_string()),
            methodology_type: Some("cohort_study".to_string()),
            keywords: vec!["Tumor".to_string(), "immunotherapy".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_record_read_updates_derived_scores() {
        let mut profile = UserProfile::new("u1");
        for i in 0..12 {
            profile.record_read(&oncology_paper(&i.to_string()));
        }

        assert!(profile.has_read("3"));
        assert!((profile.derived.domain_expertise["oncology"] - 1.0).abs() < f64::EPSILON);
        assert!((profile.derived.citation_influence - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_record_bookmark_deduplicates() {
        let mut profile = UserProfile::new("u1");
        profile.record_bookmark(&oncology_paper("1"));
        profile.record_bookmark(&oncology_paper("2"));
        assert_eq!(profile.history.bookmark_patterns, vec!["immunotherapy", "tumor"]);
    }

    #[test]
    fn test_preferences_are_case_insensitive() {
        let profile = UserProfile::new("u1").with_domains(["Oncology"]).with_methodologies(["RCT"]);
        assert!(profile.prefers_domain("oncology"));
        assert!(profile.prefers_methodology("rct"));
        assert!(!profile.prefers_domain("cardiology"));
    }

    #[test]
    fn test_apply_preferences_replaces_only_given_fields() {
        let mut profile = UserProfile::new("u1").with_methodologies(["cohort_study"]);
        profile.apply_preferences(&PreferenceUpdate {
            preferred_domains: Some(vec!["Oncology".into(), "oncology".into(), " ".into()]),
            research_level: Some(ResearchLevel::Faculty),
            preferred_paper_age: Some(8.0),
            ..Default::default()
        });

        assert_eq!(profile.preferences.preferred_domains, vec!["oncology"]);
        assert_eq!(profile.preferences.preferred_methodologies, vec!["cohort_study"]);
        assert_eq!(profile.research_level, ResearchLevel::Faculty);
        assert!((profile.temporal.preferred_paper_age - 8.0).abs() < f64::EPSILON);
        assert!((profile.temporal.novelty_preference - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_preference_update_validation() {
        let negative = PreferenceUpdate { preferred_paper_age: Some(-1.0), ..Default::default() };
        assert_eq!(negative.invalid_field().map(|(f, _)| f), Some("preferredPaperAge"));

        let novelty = PreferenceUpdate { novelty_preference: Some(1.5), ..Default::default() };
        assert_eq!(novelty.invalid_field().map(|(f, _)| f), Some("noveltyPreference"));

        assert!(PreferenceUpdate::default().invalid_field().is_none());
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let mut profile = UserProfile::new("u1");
        profile.record_search("   ");
        profile.record_search("tumor microenvironment");
        assert_eq!(profile.history.search_history, vec!["tumor microenvironment"]);
    }
}

//! Scored, explained recommendation candidates.

use serde::{Deserialize, Serialize};

use super::PaperRecord;

/// The four normalized component scores of a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScores {
    /// Overlap with the user's stated interests.
    pub content: f64,
    /// Behaviour of similar users.
    pub collaborative: f64,
    /// Age, domain and citation novelty.
    pub novelty: f64,
    /// Fit with the requested time horizon.
    pub temporal: f64,
}

/// A paper with its scores and explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    /// The scored paper.
    pub paper: PaperRecord,

    /// Component scores, each in [0, 1].
    pub scores: ComponentScores,

    /// Weighted sum of the component scores, in [0, 1].
    pub overall_score: f64,

    /// `min(overall_score + 0.2, 1.0)`.
    pub confidence: f64,

    /// Human-readable justification.
    #[serde(default)]
    pub explanation: String,
}

impl ScoredCandidate {
    /// Paper identifier.
    #[must_use]
    pub fn pmid(&self) -> &str {
        &self.paper.pmid
    }

    /// Content score.
    #[must_use]
    pub const fn content_score(&self) -> f64 {
        self.scores.content
    }

    /// Collaborative score.
    #[must_use]
    pub const fn collaborative_score(&self) -> f64 {
        self.scores.collaborative
    }

    /// Novelty score.
    #[must_use]
    pub const fn novelty_score(&self) -> f64 {
        self.scores.novelty
    }

    /// Temporal score.
    #[must_use]
    pub const fn temporal_score(&self) -> f64 {
        self.scores.temporal
    }
}

/// Sort candidates by overall score, highest first. Ties keep their order.
pub fn sort_by_score(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
}

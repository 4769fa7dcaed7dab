//! JSON output formatting with token efficiency.

use serde_json::{Value, json};

use crate::models::{PaperRecord, ScoredCandidate};

/// Round to three decimals for display.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Create a compact paper representation for JSON output.
#[must_use]
pub fn compact_paper(paper: &PaperRecord) -> Value {
    let mut obj = json!({
        "id": paper.pmid,
        "title": paper.title_or_default(),
        "year": paper.year,
        "citations": paper.citations(),
    });

    if !paper.authors.is_empty() {
        obj["authors"] = json!(paper.authors);
    }

    if let Some(journal) = &paper.journal {
        obj["journal"] = json!(journal);
    }

    if let Some(domain) = &paper.research_domain {
        obj["domain"] = json!(domain);
    }

    if let Some(methodology) = &paper.methodology_type {
        obj["methodology"] = json!(methodology);
    }

    obj
}

/// Create a compact scored-candidate representation for JSON output.
#[must_use]
pub fn compact_candidate(candidate: &ScoredCandidate) -> Value {
    let mut obj = compact_paper(&candidate.paper);
    obj["score"] = json!(round3(candidate.overall_score));
    obj["confidence"] = json!(round3(candidate.confidence));
    obj["components"] = json!({
        "content": round3(candidate.scores.content),
        "collaborative": round3(candidate.scores.collaborative),
        "novelty": round3(candidate.scores.novelty),
        "temporal": round3(candidate.scores.temporal),
    });
    obj["explanation"] = json!(candidate.explanation);
    obj
}

/// Compact JSON list of candidates with a count.
#[must_use]
pub fn candidates_json(candidates: &[ScoredCandidate]) -> Value {
    json!({
        "count": candidates.len(),
        "results": candidates.iter().map(compact_candidate).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentScores;

    #[test]
    fn test_compact_paper_omits_missing_fields() {
        let value = compact_paper(&PaperRecord::new("1", 2020));
        assert_eq!(value["id"], "1");
        assert_eq!(value["title"], "Untitled");
        assert!(value.get("journal").is_none());
    }

    #[test]
    fn test_compact_candidate_rounds_scores() {
        let candidate = ScoredCandidate {
            paper: PaperRecord::new("1", 2020),
            scores: ComponentScores { content: 0.123_456, ..Default::default() },
            overall_score: 2.0 / 3.0,
            confidence: 0.866_666,
            explanation: "why".to_string(),
        };
        let value = compact_candidate(&candidate);
        assert_eq!(value["score"], 0.667);
        assert_eq!(value["components"]["content"], 0.123);
        assert_eq!(value["explanation"], "why");
    }
}

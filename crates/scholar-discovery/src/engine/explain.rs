//! Rule-based recommendation explanations.

use crate::models::{ContextType, ScoredCandidate};

/// Component score at or above which a rule fires.
const DOMINANT_SCORE: f64 = 0.7;

/// Domain text used when a paper carries no domain.
const FALLBACK_DOMAIN: &str = "your field";

/// Deterministic explanation rules; the first matching rule wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplanationGenerator;

impl ExplanationGenerator {
    /// Explanation for a scored candidate under an optional context type.
    #[must_use]
    pub fn explain(candidate: &ScoredCandidate, context_type: Option<ContextType>) -> String {
        let scores = &candidate.scores;
        let mut explanation = if scores.content >= DOMINANT_SCORE {
            let domain = candidate.paper.research_domain.as_deref().unwrap_or(FALLBACK_DOMAIN);
            format!("matches your research interests in {domain}")
        } else if scores.collaborative >= DOMINANT_SCORE {
            "highly cited by researchers with similar interests".to_string()
        } else if scores.novelty >= DOMINANT_SCORE {
            "emerging research that might interest you".to_string()
        } else if scores.temporal >= DOMINANT_SCORE {
            "recent publication in your field".to_string()
        } else {
            "recommended based on your reading patterns".to_string()
        };

        match context_type {
            Some(ContextType::CrossDomain) => {
                explanation.push_str(" (expanding into a new research area)");
            }
            Some(ContextType::Trending) => {
                explanation.push_str(" (currently trending in the research community)");
            }
            _ => {}
        }

        explanation
    }

    /// Fill in the explanation of every candidate.
    pub fn annotate(candidates: &mut [ScoredCandidate], context_type: Option<ContextType>) {
        for candidate in candidates {
            candidate.explanation = Self::explain(candidate, context_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComponentScores, PaperRecord};

    fn scored(content: f64, collaborative: f64, novelty: f64, temporal: f64) -> ScoredCandidate {
        ScoredCandidate {
            paper: PaperRecord {
                research_domain: Some("oncology".to_string()),
                ..PaperRecord::new("1", 2024)
            },
            scores: ComponentScores { content, collaborative, novelty, temporal },
            overall_score: 0.5,
            confidence: 0.7,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(
            ExplanationGenerator::explain(&scored(0.9, 0.9, 0.9, 0.9), None),
            "matches your research interests in oncology"
        );
        assert_eq!(
            ExplanationGenerator::explain(&scored(0.1, 0.8, 0.9, 0.9), None),
            "highly cited by researchers with similar interests"
        );
        assert_eq!(
            ExplanationGenerator::explain(&scored(0.1, 0.1, 0.8, 0.9), None),
            "emerging research that might interest you"
        );
        assert_eq!(
            ExplanationGenerator::explain(&scored(0.1, 0.1, 0.1, 0.9), None),
            "recent publication in your field"
        );
        assert_eq!(
            ExplanationGenerator::explain(&scored(0.1, 0.1, 0.1, 0.1), None),
            "recommended based on your reading patterns"
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let text = ExplanationGenerator::explain(&scored(0.4 + 0.3, 0.0, 0.0, 0.0), None);
        assert!(text.starts_with("matches your research interests in oncology"));
    }

    #[test]
    fn test_context_suffixes() {
        let candidate = scored(0.1, 0.1, 0.8, 0.1);
        assert!(
            ExplanationGenerator::explain(&candidate, Some(ContextType::CrossDomain))
                .ends_with("(expanding into a new research area)")
        );
        assert!(
            ExplanationGenerator::explain(&candidate, Some(ContextType::Trending))
                .ends_with("(currently trending in the research community)")
        );
        assert_eq!(
            ExplanationGenerator::explain(&candidate, Some(ContextType::Discovery)),
            "emerging research that might interest you"
        );
    }

    #[test]
    fn test_missing_domain_falls_back() {
        let mut candidate = scored(0.8, 0.0, 0.0, 0.0);
        candidate.paper.research_domain = None;
        assert_eq!(
            ExplanationGenerator::explain(&candidate, None),
            "matches your research interests in your field"
        );
    }
}

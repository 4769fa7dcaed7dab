//! Markdown output formatting.

use std::fmt::Write;

use crate::models::{
    ConceptExpansion, ExtractedConcept, PaperRecord, QualityMetrics, ScoredCandidate,
    SemanticDeepDiveResponse, SemanticReviewResponse, UserProfile, UserRelevance,
};

/// Abstract characters shown before truncation.
const ABSTRACT_PREVIEW: usize = 300;

/// Format a ranked candidate list as Markdown.
#[must_use]
pub fn format_candidates_markdown(heading: &str, candidates: &[ScoredCandidate]) -> String {
    if candidates.is_empty() {
        return "No papers found.".to_string();
    }

    let mut output = format!("# {heading} ({} results)\n\n", candidates.len());

    for (i, candidate) in candidates.iter().enumerate() {
        output.push_str(&format_candidate_markdown(candidate, i + 1));
        output.push_str("\n---\n\n");
    }

    output
}

/// Format a single scored candidate as Markdown.
#[must_use]
pub fn format_candidate_markdown(candidate: &ScoredCandidate, index: usize) -> String {
    let mut output = format_paper_markdown(&candidate.paper, index);

    let _ = writeln!(
        output,
        "**Score**: {:.2} (confidence {:.2}) | content {:.2} | collaborative {:.2} | novelty {:.2} | temporal {:.2}\n",
        candidate.overall_score,
        candidate.confidence,
        candidate.scores.content,
        candidate.scores.collaborative,
        candidate.scores.novelty,
        candidate.scores.temporal,
    );

    if !candidate.explanation.is_empty() {
        let _ = writeln!(output, "> {}\n", candidate.explanation);
    }

    output
}

/// Format a single paper as Markdown.
#[must_use]
pub fn format_paper_markdown(paper: &PaperRecord, index: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## {}. {}\n", index, paper.title_or_default());

    if !paper.authors.is_empty() {
        let _ = writeln!(output, "**Authors**: {}\n", paper.authors.join(", "));
    }

    let mut meta = vec![format!("**PMID**: {}", paper.pmid)];
    if let Some(year) = paper.year {
        meta.push(format!("**Year**: {year}"));
    }
    meta.push(format!("**Citations**: {}", paper.citations()));
    if let Some(journal) = &paper.journal {
        meta.push(format!("**Journal**: {journal}"));
    }
    let _ = writeln!(output, "{}\n", meta.join(" | "));

    let mut topic = Vec::new();
    if let Some(domain) = &paper.research_domain {
        topic.push(format!("**Domain**: {domain}"));
    }
    if let Some(methodology) = &paper.methodology_type {
        topic.push(format!("**Methodology**: {methodology}"));
    }
    if !topic.is_empty() {
        let _ = writeln!(output, "{}\n", topic.join(" | "));
    }

    if let Some(abs) = &paper.r#abstract {
        let mut preview: String = abs.chars().take(ABSTRACT_PREVIEW).collect();
        if abs.chars().count() > ABSTRACT_PREVIEW {
            preview.push_str("...");
        }
        let _ = writeln!(output, "**Abstract**: {preview}");
    }

    output
}

/// Format a query expansion as Markdown.
#[must_use]
pub fn format_expansion_markdown(
    query: &str,
    terms: &[String],
    concepts: &[ConceptExpansion],
) -> String {
    let mut output = format!("# Query Expansion: {query}\n\n");

    let _ = writeln!(output, "**Expanded terms** ({}): {}\n", terms.len(), terms.join(", "));

    if !concepts.is_empty() {
        output.push_str("| Term | Weight | Expansions | Domains |\n|---|---|---|---|\n");
        for concept in concepts {
            let _ = writeln!(
                output,
                "| {} | {:.1} | {} | {} |",
                concept.original_term,
                concept.semantic_weight,
                dash_if_empty(&concept.expanded_terms.join(", ")),
                dash_if_empty(&concept.domain_context.join(", ")),
            );
        }
    }

    output
}

/// Format a profile summary as Markdown.
#[must_use]
pub fn format_profile_markdown(profile: &UserProfile) -> String {
    let mut output = format!("# Profile: {}\n\n", profile.user_id);

    let preferences = &profile.preferences;
    if !preferences.preferred_domains.is_empty() {
        let _ = writeln!(output, "- **Domains**: {}", preferences.preferred_domains.join(", "));
    }
    if !preferences.preferred_methodologies.is_empty() {
        let _ = writeln!(
            output,
            "- **Methodologies**: {}",
            preferences.preferred_methodologies.join(", ")
        );
    }

    let _ = writeln!(output, "- **Papers read**: {}", profile.history.reading_history.len());
    let _ = writeln!(output, "- **Searches**: {}", profile.history.search_history.len());
    let _ = writeln!(output, "- **Bookmark keywords**: {}", profile.history.bookmark_patterns.len());
    let _ = writeln!(output, "- **Citation influence**: {:.2}", profile.derived.citation_influence);

    if !profile.derived.domain_expertise.is_empty() {
        output.push_str("\n## Domain expertise\n\n");
        for (domain, level) in &profile.derived.domain_expertise {
            let _ = writeln!(output, "- {domain}: {level:.1}");
        }
    }

    output
}

/// Format a semantic deep dive as Markdown.
#[must_use]
pub fn format_deep_dive_markdown(response: &SemanticDeepDiveResponse) -> String {
    let semantic = &response.semantic;
    let mut output = String::from("# Semantic Deep Dive\n\n");

    if let Some(domain) = &semantic.research_domain {
        let _ = writeln!(output, "**Research domain**: {domain}\n");
    }

    output.push_str("## Analysis\n\n");
    if response.analysis.sections.is_empty() {
        output.push_str("_No sections returned._\n\n");
    }
    for (name, content) in &response.analysis.sections {
        let text = content.as_str().map_or_else(|| content.to_string(), str::to_string);
        let _ = writeln!(output, "### {name}\n\n{text}\n");
    }

    push_concepts(&mut output, &semantic.concepts);

    let related = &semantic.related_papers;
    let _ = writeln!(output, "## Related Papers ({})\n", related.len());
    push_titles(&mut output, "Same domain", &related.same_domain);
    push_titles(&mut output, "Cross domain", &related.cross_domain);
    push_titles(&mut output, "Same methodology", &related.same_methodology);

    if let Some(relevance) = &semantic.user_relevance {
        push_relevance(&mut output, std::slice::from_ref(relevance));
    }
    push_suggestions(&mut output, &semantic.follow_up_suggestions);
    push_quality(&mut output, &semantic.quality_metrics);

    output
}

/// Format a semantic review as Markdown.
#[must_use]
pub fn format_review_markdown(response: &SemanticReviewResponse) -> String {
    let semantic = &response.semantic;
    let mut output = format!("# Semantic Review ({} results)\n\n", response.results.len());

    if !response.queries.is_empty() {
        let _ = writeln!(output, "**Queries**: {}\n", response.queries.join("; "));
    }

    for (i, result) in response.results.iter().enumerate() {
        let title = result
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or("Untitled");
        let _ = writeln!(output, "{}. {title}", i + 1);
    }
    output.push('\n');

    push_concepts(&mut output, &semantic.concepts);

    if !semantic.related_by_domain.is_empty() {
        output.push_str("## Related Papers by Domain\n\n");
        for (domain, candidates) in &semantic.related_by_domain {
            push_titles(&mut output, domain, candidates);
        }
    }

    push_relevance(&mut output, &semantic.user_relevance);
    push_suggestions(&mut output, &semantic.follow_up_suggestions);
    push_quality(&mut output, &semantic.quality_metrics);

    output
}

fn dash_if_empty(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

fn push_concepts(output: &mut String, concepts: &[ExtractedConcept]) {
    if concepts.is_empty() {
        return;
    }
    output.push_str("## Key Concepts\n\n");
    for concept in concepts {
        let domain = concept.domain.as_deref().unwrap_or("general");
        let _ = writeln!(output, "- **{}** ({domain}, ×{})", concept.term, concept.frequency);
    }
    output.push('\n');
}

fn push_titles(output: &mut String, heading: &str, candidates: &[ScoredCandidate]) {
    if candidates.is_empty() {
        return;
    }
    let _ = writeln!(output, "### {heading}\n");
    for candidate in candidates {
        let _ = writeln!(
            output,
            "- {} ({}, score {:.2})",
            candidate.paper.title_or_default(),
            candidate.pmid(),
            candidate.overall_score
        );
    }
    output.push('\n');
}

fn push_relevance(output: &mut String, relevance: &[UserRelevance]) {
    if relevance.is_empty() {
        return;
    }
    output.push_str("## Relevance to You\n\n| PMID | Content | Collaborative | Combined |\n|---|---|---|---|\n");
    for r in relevance {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} | {:.2} |",
            r.pmid, r.content, r.collaborative, r.combined
        );
    }
    output.push('\n');
}

fn push_suggestions(output: &mut String, suggestions: &[String]) {
    if suggestions.is_empty() {
        return;
    }
    output.push_str("## Follow-up Suggestions\n\n");
    for suggestion in suggestions {
        let _ = writeln!(output, "- {suggestion}");
    }
    output.push('\n');
}

fn push_quality(output: &mut String, metrics: &QualityMetrics) {
    let _ = writeln!(
        output,
        "_Concepts: {} | Related: {} | Expansions: {} | Coverage: {:.0}% | Mean relevance: {:.2}_",
        metrics.concept_count,
        metrics.related_paper_count,
        metrics.expansion_count,
        metrics.strategy_coverage * 100.0,
        metrics.mean_related_relevance,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentScores;

    #[test]
    fn test_empty_candidates() {
        assert_eq!(format_candidates_markdown("Recommendations", &[]), "No papers found.");
    }

    #[test]
    fn test_candidate_markdown_includes_explanation() {
        let candidate = ScoredCandidate {
            paper: PaperRecord {
                title: Some("Checkpoint blockade".to_string()),
                research_domain: Some("oncology".to_string()),
                ..PaperRecord::new("123", 2022)
            },
            scores: ComponentScores { content: 0.7, ..Default::default() },
            overall_score: 0.28,
            confidence: 0.48,
            explanation: "matches your research interests in oncology".to_string(),
        };
        let md = format_candidates_markdown("Recommendations", &[candidate]);
        assert!(md.contains("# Recommendations (1 results)"));
        assert!(md.contains("## 1. Checkpoint blockade"));
        assert!(md.contains("**PMID**: 123"));
        assert!(md.contains("> matches your research interests in oncology"));
    }

    #[test]
    fn test_abstract_truncation_is_char_safe() {
        let paper = PaperRecord {
            r#abstract: Some("é".repeat(400)),
            ..PaperRecord::new("1", 2020)
        };
        let md = format_paper_markdown(&paper, 1);
        assert!(md.contains("..."));
    }

    #[test]
    fn test_expansion_table() {
        let concepts = vec![ConceptExpansion {
            original_term: "zebrafish".to_string(),
            expanded_terms: Vec::new(),
            semantic_weight: 0.5,
            domain_context: Vec::new(),
        }];
        let md = format_expansion_markdown("zebrafish", &["zebrafish".to_string()], &concepts);
        assert!(md.contains("| zebrafish | 0.5 | - | - |"));
    }
}

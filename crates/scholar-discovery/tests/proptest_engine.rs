//! Property-based tests for scoring, diversification and expansion.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;

use scholar_discovery::ConceptOntology;
use scholar_discovery::engine::{
    DiversificationFilter, ExplanationGenerator, HybridScorer, QueryExpander, WeightProfile,
};
use scholar_discovery::models::{
    ComponentScores, ContextType, PaperRecord, RecommendationContext, ScoredCandidate, TimeHorizon,
    UserProfile,
};

const DOMAINS: [&str; 4] = ["oncology", "genetics", "neurology", "cardiology"];
const VOCABULARY: [&str; 10] = [
    "treatment", "therapy", "cancer", "heart", "gene", "immune", "brain", "drug", "trial", "zebrafish",
];
const METHODOLOGIES: [&str; 3] = ["randomized_controlled_trial", "cohort_study", "meta_analysis"];

fn arb_paper() -> impl Strategy<Value = PaperRecord> {
    (
        "[a-z0-9]{1,12}",
        1950i32..2030,
        proptest::option::of(0i32..5_000),
        proptest::option::of(prop::sample::select(DOMAINS.to_vec())),
        proptest::option::of(prop::sample::select(METHODOLOGIES.to_vec())),
        prop::collection::vec("[a-z]{3,10}", 0..5),
    )
        .prop_map(|(pmid, year, citation_count, domain, methodology, keywords)| PaperRecord {
            pmid,
            year: Some(year),
            citation_count,
            research_domain: domain.map(str::to_string),
            methodology_type: methodology.map(str::to_string),
            keywords,
            ..PaperRecord::default()
        })
}

fn arb_profile() -> impl Strategy<Value = UserProfile> {
    (
        prop::sample::subsequence(DOMAINS.to_vec(), 0..=DOMAINS.len()),
        prop::sample::subsequence(METHODOLOGIES.to_vec(), 0..=METHODOLOGIES.len()),
        prop::collection::vec("[a-z]{3,10}", 0..4),
    )
        .prop_map(|(domains, methodologies, searches)| {
            let mut profile =
                UserProfile::new("u").with_domains(domains).with_methodologies(methodologies);
            for search in searches {
                profile.record_search(&search);
            }
            profile
        })
}

fn arb_context() -> impl Strategy<Value = RecommendationContext> {
    (
        proptest::option::of(prop::sample::select(ContextType::ALL.to_vec())),
        prop::sample::select(vec![TimeHorizon::Recent, TimeHorizon::Classic, TimeHorizon::Mixed]),
    )
        .prop_map(|(context_type, horizon)| RecommendationContext {
            context_type,
            time_horizon: horizon,
            ..RecommendationContext::default()
        })
}

fn arb_candidates() -> impl Strategy<Value = Vec<ScoredCandidate>> {
    let unit = || 0.0f64..=1.0;
    let scores = (unit(), unit(), unit(), unit()).prop_map(
        |(content, collaborative, novelty, temporal)| ComponentScores {
            content,
            collaborative,
            novelty,
            temporal,
        },
    );

    prop::collection::vec((arb_paper(), scores, unit()), 0..40).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (paper, scores, score))| ScoredCandidate {
                paper: PaperRecord { pmid: format!("p{i}"), ..paper },
                scores,
                overall_score: score,
                confidence: (score + 0.2).min(1.0),
                explanation: String::new(),
            })
            .collect()
    })
}

fn in_unit(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

proptest! {
    /// Every component score and the overall score stay within [0, 1].
    #[test]
    fn scores_are_bounded(paper in arb_paper(), profile in arb_profile(), context in arb_context()) {
        let scorer = HybridScorer::with_reference_year(Arc::new(ConceptOntology::embedded()), 2024);
        let scored = scorer.score(paper, &profile, &context, &[]).unwrap();

        prop_assert!(in_unit(scored.scores.content));
        prop_assert!(in_unit(scored.scores.collaborative));
        prop_assert!(in_unit(scored.scores.novelty));
        prop_assert!(in_unit(scored.scores.temporal));
        prop_assert!(in_unit(scored.overall_score));
        prop_assert!((scored.confidence - (scored.overall_score + 0.2).min(1.0)).abs() < 1e-12);
    }

    /// Without similar users the collaborative component is zero.
    #[test]
    fn no_similar_users_no_collaborative_signal(paper in arb_paper()) {
        prop_assert!(HybridScorer::collaborative_score(&paper, &[]).abs() < f64::EPSILON);
    }

    /// Diversification with exploration at or below one half never lets a
    /// domain exceed its cap, and keeps score order.
    #[test]
    fn diversification_respects_cap(candidates in arb_candidates(), ef in 0.0f64..=0.5) {
        let n = candidates.len();
        let input: HashSet<String> = candidates.iter().map(|c| c.pmid().to_string()).collect();
        let cap = DiversificationFilter::max_per_domain(n, ef);

        let output = DiversificationFilter::default().apply(candidates, Some(ef));

        let mut per_domain: HashMap<String, usize> = HashMap::new();
        for candidate in &output {
            prop_assert!(input.contains(candidate.pmid()));
            *per_domain.entry(candidate.paper.domain_key().to_lowercase()).or_default() += 1;
        }
        prop_assert!(per_domain.values().all(|&count| count <= cap));
        prop_assert!(output.windows(2).all(|w| w[0].overall_score >= w[1].overall_score));
    }

    /// The cap is never below two.
    #[test]
    fn cap_has_floor_of_two(n in 0usize..500, ef in 0.0f64..=1.0) {
        prop_assert!(DiversificationFilter::max_per_domain(n, ef) >= 2);
    }

    /// Expansion starts with the query and contains no duplicates.
    #[test]
    fn expansion_is_ordered_and_unique(
        query in "[a-z]{3,10}( [a-z]{3,10}){0,3}",
        domains in prop::sample::subsequence(DOMAINS.to_vec(), 0..=2),
    ) {
        let expander = QueryExpander::new(Arc::new(ConceptOntology::embedded()));
        let domains: Vec<String> = domains.into_iter().map(str::to_string).collect();
        let terms = expander.expand(&query, &domains, true);

        prop_assert_eq!(&terms[0], &query);
        let unique: HashSet<&String> = terms.iter().collect();
        prop_assert_eq!(unique.len(), terms.len());
        prop_assert_eq!(expander.expand(&query, &domains, false), vec![query.clone()]);
    }

    /// Re-expanding any expanded term introduces nothing new, with or
    /// without a domain focus.
    #[test]
    fn re_expansion_is_fixed_point(
        words in prop::collection::vec(prop::sample::select(VOCABULARY.to_vec()), 1..4),
        domains in prop::sample::subsequence(DOMAINS.to_vec(), 0..=2),
    ) {
        let expander = QueryExpander::new(Arc::new(ConceptOntology::embedded()));
        let domains: Vec<String> = domains.into_iter().map(str::to_string).collect();
        let query = words.join(" ");
        let first: HashSet<String> = expander.expand(&query, &domains, true).into_iter().collect();

        for term in &first {
            for again in expander.expand(term, &domains, true) {
                prop_assert!(first.contains(&again), "{} introduced by re-expanding {}", again, term);
            }
        }
    }

    /// Explanations always start with one of the fixed phrases.
    #[test]
    fn explanation_uses_known_phrase(candidates in arb_candidates(), context in arb_context()) {
        const PHRASES: [&str; 5] = [
            "matches your research interests in ",
            "highly cited by researchers with similar interests",
            "emerging research that might interest you",
            "recent publication in your field",
            "recommended based on your reading patterns",
        ];
        for candidate in &candidates {
            let text = ExplanationGenerator::explain(candidate, context.context_type);
            prop_assert!(PHRASES.iter().any(|p| text.starts_with(p)), "{}", text);
        }
    }
}

#[test]
fn weight_profiles_sum_to_one() {
    for context_type in ContextType::ALL.map(Some).into_iter().chain([None]) {
        let weights = WeightProfile::for_context(context_type);
        assert!((weights.total() - 1.0).abs() < 1e-12, "{context_type:?}");
    }
}

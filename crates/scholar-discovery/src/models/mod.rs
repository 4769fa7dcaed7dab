//! Data models for the discovery engine.
//!
//! All wire models use `#[serde(default)]` for optional fields and
//! `#[serde(rename_all = "camelCase")]` to match the proxy's JSON.

mod concept;
mod context;
mod enums;
mod inputs;
mod paper;
mod pipeline;
mod profile;
mod scored;

pub use concept::{ConceptExpansion, ExtractedConcept};
pub use context::{InteractionEvent, RecommendationContext};
pub use enums::{ContextType, ReadingFrequency, ResearchLevel, ResponseFormat, TimeHorizon};
pub use inputs::*;
pub use paper::PaperRecord;
pub use pipeline::{
    DeepDiveEnrichment, DeepDiveRequest, PrimaryDeepDiveOutput, PrimaryReviewOutput,
    QualityMetrics, RelatedPaperBuckets, ReviewEnrichment, ReviewRequest, SemanticDeepDiveResponse,
    SemanticReviewResponse, UserRelevance,
};
pub use profile::{
    CollaborationMetadata, DerivedScores, ExplicitPreferences, ImplicitHistory, PreferenceUpdate,
    TemporalPreferences, UserProfile,
};
pub use scored::{ComponentScores, ScoredCandidate, sort_by_score};

//! Semantic review and deep-dive pipelines.
//!
//! Both pipelines delegate the primary analysis to an external collaborator
//! and merge its output, unmodified, with semantic enrichment. A failing
//! primary analysis fails the pipeline; a failing enrichment step only
//! empties its own field.

mod deep_dive;
mod enrichment;
mod review;

pub use deep_dive::SemanticDeepDivePipeline;
pub use review::SemanticReviewPipeline;

use crate::error::ClientResult;
use crate::models::{DeepDiveRequest, PrimaryDeepDiveOutput, PrimaryReviewOutput, ReviewRequest};

/// External multi-paper synthesis.
#[async_trait::async_trait]
pub trait PrimaryReviewAnalysis: Send + Sync {
    /// Produce `{results, queries, diagnostics}` for a review request.
    async fn review(&self, request: &ReviewRequest) -> ClientResult<PrimaryReviewOutput>;
}

/// External single-paper structured extraction.
#[async_trait::async_trait]
pub trait PrimaryDeepDiveAnalysis: Send + Sync {
    /// Produce structured sections for a paper.
    async fn deep_dive(&self, request: &DeepDiveRequest) -> ClientResult<PrimaryDeepDiveOutput>;
}

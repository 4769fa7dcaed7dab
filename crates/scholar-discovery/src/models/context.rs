//! Per-request recommendation context and profile interaction events.

use serde::{Deserialize, Serialize};

use super::{ContextType, PaperRecord, PreferenceUpdate, TimeHorizon};

/// Ephemeral request descriptor for recommendations and search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationContext {
    /// Caller intent; the default weight profile applies when absent.
    #[serde(default)]
    pub context_type: Option<ContextType>,

    /// Seed paper identifiers.
    #[serde(default)]
    pub seed_papers: Vec<String>,

    /// Domain to explore for cross-domain requests.
    #[serde(default)]
    pub target_domain: Option<String>,

    /// Diversity knob in [0, 1]; the engine default applies when absent.
    #[serde(default)]
    pub exploration_factor: Option<f64>,

    /// Publication-age window.
    #[serde(default)]
    pub time_horizon: TimeHorizon,
}

impl RecommendationContext {
    /// Context of the given type with defaults elsewhere.
    #[must_use]
    pub fn of_type(context_type: ContextType) -> Self {
        Self { context_type: Some(context_type), ..Default::default() }
    }

    /// Builder-style helper setting the time horizon.
    #[must_use]
    pub const fn with_time_horizon(mut self, time_horizon: TimeHorizon) -> Self {
        self.time_horizon = time_horizon;
        self
    }
}

/// An interaction that mutates a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionEvent {
    /// The user read a paper.
    Read {
        /// Paper that was read.
        paper: PaperRecord,
    },
    /// The user bookmarked a paper.
    Bookmark {
        /// Paper that was bookmarked.
        paper: PaperRecord,
    },
    /// The user ran a search.
    Search {
        /// Query text.
        query: String,
    },
    /// The user stated or changed preferences.
    Preferences {
        /// Fields to change.
        preferences: PreferenceUpdate,
    },
}

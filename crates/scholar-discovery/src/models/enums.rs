//! Enumeration types for engine and tool parameters.

use serde::{Deserialize, Serialize};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}

/// Career stage of a researcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchLevel {
    /// Undergraduate student.
    Undergraduate,
    /// Graduate student.
    #[default]
    Graduate,
    /// Postdoctoral researcher.
    Postdoc,
    /// Faculty member.
    Faculty,
    /// Industry researcher.
    Industry,
}

/// How often a user reads papers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingFrequency {
    /// Several papers a day.
    Daily,
    /// A few papers a week.
    #[default]
    Weekly,
    /// Occasional reading.
    Monthly,
}

/// Caller intent selecting a scoring-weight profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    /// Open-ended discovery.
    #[default]
    Discovery,
    /// Following up on papers already read.
    FollowUp,
    /// Looking outside the user's own domains.
    CrossDomain,
    /// What is popular right now.
    Trending,
    /// What similar researchers read.
    Collaborative,
}

impl ContextType {
    /// All context types.
    pub const ALL: [Self; 5] =
        [Self::Discovery, Self::FollowUp, Self::CrossDomain, Self::Trending, Self::Collaborative];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::FollowUp => "follow_up",
            Self::CrossDomain => "cross_domain",
            Self::Trending => "trending",
            Self::Collaborative => "collaborative",
        }
    }
}

/// Publication-age window favoured by temporal scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    /// Last couple of years.
    Recent,
    /// Established work older than five years.
    Classic,
    /// Close to the user's preferred paper age.
    #[default]
    Mixed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_type_wire_names() {
        for ctx in ContextType::ALL {
            let json = serde_json::to_value(ctx).unwrap();
            assert_eq!(json, ctx.as_str());
        }
    }

    #[test]
    fn test_time_horizon_parse() {
        let horizon: TimeHorizon = serde_json::from_str("\"recent\"").unwrap();
        assert_eq!(horizon, TimeHorizon::Recent);
    }
}

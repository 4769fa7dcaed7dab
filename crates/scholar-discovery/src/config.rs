//! Configuration for the discovery engine and its collaborators.

use std::path::PathBuf;
use std::time::Duration;

/// Collaborator (backend-for-frontend proxy) constants.
pub mod api {
    use std::time::Duration;

    /// Default base URL of the backend-for-frontend proxy.
    pub const PROXY_URL: &str = "http://localhost:3001/api";

    /// Request timeout. A timed-out retrieval strategy contributes zero results.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Cache TTL for GET responses (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cached responses.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Retries for transient collaborator failures.
    pub const MAX_RETRIES: u32 = 2;
}

/// Engine tuning constants.
pub mod engine {
    /// Expanded queries actually sent to retrieval per request.
    pub const MAX_QUERY_EXPANSIONS: usize = 5;

    /// Exploration factor used when a context does not carry one.
    pub const DEFAULT_EXPLORATION_FACTOR: f64 = 0.3;

    /// Upper bound on similar users consulted by collaborative scoring.
    pub const SIMILAR_USER_LIMIT: usize = 50;

    /// Users below this similarity are not considered similar.
    pub const MIN_USER_SIMILARITY: f64 = 0.1;

    /// Candidates taken from each candidate-generation strategy.
    pub const CANDIDATES_PER_STRATEGY: usize = 50;

    /// Related papers kept per pipeline response.
    pub const RELATED_PAPER_LIMIT: usize = 20;

    /// Key concepts extracted per pipeline response.
    pub const CONCEPT_LIMIT: usize = 10;

    /// Cached paper records held by the catalog.
    pub const CATALOG_CACHE_SIZE: u64 = 10_000;
}

/// Engine and collaborator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend-for-frontend proxy.
    pub proxy_url: String,

    /// Request timeout for collaborator calls.
    pub request_timeout: Duration,

    /// Connection timeout for collaborator calls.
    pub connect_timeout: Duration,

    /// Cache TTL for GET responses and catalog entries.
    pub cache_ttl: Duration,

    /// Maximum cached GET responses.
    pub cache_max_size: u64,

    /// Retries for transient collaborator failures.
    pub max_retries: u32,

    /// Expanded queries sent to retrieval per request.
    pub max_query_expansions: usize,

    /// Exploration factor applied when the context has none.
    pub default_exploration_factor: f64,

    /// Upper bound on similar users for collaborative scoring.
    pub similar_user_limit: usize,

    /// Minimum similarity for a user to count as similar.
    pub min_user_similarity: f64,

    /// Candidates taken from each candidate-generation strategy.
    pub candidates_per_strategy: usize,

    /// Whether the vector-similarity collaborator is wired in.
    pub enable_vector_search: bool,

    /// Optional ontology JSON file replacing the embedded default.
    pub ontology_path: Option<PathBuf>,

    /// Related papers kept per pipeline response.
    pub related_paper_limit: usize,

    /// Key concepts extracted per pipeline response.
    pub concept_limit: usize,
}

impl Config {
    /// Create a configuration pointing at the given proxy.
    #[must_use]
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_url: proxy_url.into(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            max_retries: api::MAX_RETRIES,
            max_query_expansions: engine::MAX_QUERY_EXPANSIONS,
            default_exploration_factor: engine::DEFAULT_EXPLORATION_FACTOR,
            similar_user_limit: engine::SIMILAR_USER_LIMIT,
            min_user_similarity: engine::MIN_USER_SIMILARITY,
            candidates_per_strategy: engine::CANDIDATES_PER_STRATEGY,
            enable_vector_search: false,
            ontology_path: None,
            related_paper_limit: engine::RELATED_PAPER_LIMIT,
            concept_limit: engine::CONCEPT_LIMIT,
        }
    }

    /// Create a test configuration for a mock proxy.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
            max_retries: 0,
            enable_vector_search: true,
            ..Self::new(base_url)
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if an environment variable holds an unparseable value.
    pub fn from_env() -> anyhow::Result<Self> {
        let proxy_url =
            std::env::var("DISCOVERY_PROXY_URL").unwrap_or_else(|_| api::PROXY_URL.to_string());
        let mut config = Self::new(proxy_url);

        if let Ok(path) = std::env::var("DISCOVERY_ONTOLOGY_PATH") {
            config.ontology_path = Some(PathBuf::from(path));
        }

        if let Ok(flag) = std::env::var("DISCOVERY_ENABLE_VECTOR_SEARCH") {
            config.enable_vector_search = flag.parse()?;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(api::PROXY_URL)
    }
}

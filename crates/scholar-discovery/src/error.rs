//! Error types for the discovery engine.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from the HTTP collaborator layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the proxy (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the proxy
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. })
    }
}

/// Errors from the recommendation and search engine.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// No stored profile for the requested user.
    #[error("No profile found for user '{user_id}'")]
    ProfileNotFound {
        /// Requested user identifier
        user_id: String,
    },

    /// A single retrieval strategy failed. Logged and treated as empty.
    #[error("Retrieval strategy '{strategy}' failed: {source}")]
    Retrieval {
        /// Strategy name
        strategy: String,
        /// Underlying collaborator error
        #[source]
        source: ClientError,
    },

    /// A candidate is missing fields required for scoring. Skipped.
    #[error("Malformed candidate '{paper_id}': {reason}")]
    MalformedCandidate {
        /// Candidate identifier (may be empty)
        paper_id: String,
        /// Missing or invalid field
        reason: String,
    },

    /// The external primary-analysis collaborator failed. Fatal to the pipeline.
    #[error("Primary {pipeline} analysis failed: {source}")]
    PrimaryAnalysis {
        /// Pipeline name ("review" or "deep dive")
        pipeline: &'static str,
        /// Underlying collaborator error
        #[source]
        source: ClientError,
    },

    /// Request validation failed.
    #[error("Validation error: {field}: {message}")]
    Validation {
        /// Offending field
        field: String,
        /// Validation message
        message: String,
    },
}

impl EngineError {
    /// Create a profile-not-found error.
    #[must_use]
    pub fn profile_not_found(user_id: impl Into<String>) -> Self {
        Self::ProfileNotFound { user_id: user_id.into() }
    }

    /// Create a malformed-candidate error.
    #[must_use]
    pub fn malformed(paper_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedCandidate { paper_id: paper_id.into(), reason: reason.into() }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from the engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Engine(EngineError::ProfileNotFound { user_id }) => {
                format!(
                    "No profile exists for user '{user_id}'. Record an interaction first to create one."
                )
            }
            Self::Engine(EngineError::PrimaryAnalysis { pipeline, .. }) => {
                format!("The {pipeline} analysis service is unavailable. Please try again later.")
            }
            Self::Validation { field, message }
            | Self::Engine(EngineError::Validation { field, message }) => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for collaborator operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

//! Error types for the odds engine

use thiserror::Error;

/// Errors that can occur while fetching, normalizing or querying odds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OddsError {
    /// A provider payload could not be turned into games
    #[error("Malformed upstream data from {provider}: {reason}")]
    MalformedUpstreamData { provider: String, reason: String },

    /// A source adapter failed on network, timeout or auth
    #[error("Upstream {source_name} unavailable: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    /// Every source adapter was tried and none produced games
    #[error("No odds available from any source")]
    NoOddsAvailable,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OddsError {
    pub fn malformed(provider: impl Into<String>, reason: impl ToString) -> Self {
        OddsError::MalformedUpstreamData { provider: provider.into(), reason: reason.to_string() }
    }

    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        OddsError::UpstreamUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error should move the aggregator on to the next source
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            OddsError::UpstreamUnavailable { .. } | OddsError::MalformedUpstreamData { .. }
        )
    }
}

/// Result type for odds engine operations
pub type OddsResult<T> = Result<T, OddsError>;

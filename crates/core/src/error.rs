//! Error types for the Innkeep domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error enum; the top-level `Error` names the four turn-level
//! failure classes and how they propagate:
//!
//! - `ModelUnavailable` — the only fatal condition for a guest turn
//! - `EmbeddingUnavailable` — retrieval degrades to an empty result
//! - `SearchUnavailable` — recovered inside the tool loop (empty tool result)
//! - `PersistenceUnavailable` — logged, conversation continues without
//!   durable identity

use thiserror::Error;

/// The top-level error type for all Innkeep operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The language model could not produce a response. Fatal for the turn.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ProviderError),

    /// The embedding service failed; retrieval must degrade, not abort.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),

    /// Live web search failed; the tool loop absorbs this.
    #[error("web search unavailable: {0}")]
    SearchUnavailable(#[from] SearchError),

    /// A durable store (sessions or knowledge) failed.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StoreError),

    /// The human-notification gateway failed.
    #[error("notification failed: {0}")]
    Notify(#[from] NotifyError),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the language-model service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Failures producing a query or document embedding.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("embedding service not configured: {0}")]
    NotConfigured(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("dimension mismatch: store has {store}, query has {query}")]
    DimensionMismatch { store: usize, query: usize },
}

/// Failures of the live web-search collaborator.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("search API failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("search service not configured: {0}")]
    NotConfigured(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Failures of a durable store (session or knowledge).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Failures of the outbound human-notification gateway.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("gateway not configured: {0}")]
    NotConfigured(String),

    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_displays_correctly() {
        let err = Error::ModelUnavailable(ProviderError::ApiError {
            status_code: 429,
            message: "too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("model unavailable"));
    }

    #[test]
    fn embedding_error_wraps_into_top_level() {
        let err: Error = EmbeddingError::NotConfigured("no api key".into()).into();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
        assert!(err.to_string().contains("no api key"));
    }

    #[test]
    fn store_error_maps_to_persistence() {
        let err: Error = StoreError::Storage("disk full".into()).into();
        assert!(matches!(err, Error::PersistenceUnavailable(_)));
    }
}

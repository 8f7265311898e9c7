//! Error types for the Mocktrial domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; callers convert at the edge.

use std::path::PathBuf;
use thiserror::Error;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of a single simulation run.
#[derive(Debug, Clone, Error)]
pub enum TrialError {
    #[error("Case {0} has no ingested chunks; upload a document first")]
    NoChunks(String),

    #[error("Invalid run configuration: {0}")]
    InvalidConfig(String),

    #[error("Model invocation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Structured output could not be parsed: {reason}")]
    Parse { reason: String, raw: String },

    #[error("Invalid verdict: {0}")]
    InvalidVerdict(String),

    #[error("Invalid case analysis: {0}")]
    InvalidAnalysis(String),
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge base at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Malformed knowledge base: {0}")]
    Malformed(String),

    #[error("Duplicate principle id: {0}")]
    DuplicateId(String),

    #[error("Knowledge base contains no principles")]
    Empty,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read document at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("No extractable text in document")]
    EmptyDocument,

    #[error("Document exceeds upload limit ({size} > {limit} bytes)")]
    TooLarge { size: usize, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = TrialError::from(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn trial_error_wraps_provider_error() {
        let err: TrialError = ProviderError::Network("connection refused".into()).into();
        assert!(matches!(err, TrialError::Provider(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn parse_error_hides_raw_output_in_display() {
        let err = TrialError::Parse {
            reason: "expected value".into(),
            raw: "the jury could not agree".into(),
        };
        let shown = err.to_string();
        assert!(shown.contains("expected value"));
        assert!(!shown.contains("could not agree"));
    }
}

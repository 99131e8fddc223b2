//! Error types for trust store operations

use thiserror::Error;

/// Errors that can occur while loading or populating a trust store
#[derive(Debug, Error)]
pub enum Error {
    /// JSON parsing error
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading configuration from disk failed
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Base64 decoding error
    #[error("failed to decode base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Certificate decoding error
    #[error("failed to load certificate: {0}")]
    Certificate(#[from] certpolicy_crypto::Error),

    /// An anchor with the same identifier is already registered
    #[error("duplicate trust anchor: {0}")]
    DuplicateAnchor(String),

    /// `maxChainDepth` is too small for any chain to reach an anchor
    #[error("invalid maximum chain depth {0}: a chain needs at least a leaf and its anchor")]
    InvalidChainDepth(usize),

    /// A distrust policy is not well formed
    #[error("invalid distrust policy {name}: {reason}")]
    InvalidPolicy {
        /// Name of the offending policy
        name: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for trust store operations
pub type Result<T> = std::result::Result<T, Error>;

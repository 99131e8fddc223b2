//! Error types for certpolicy-crypto

use thiserror::Error;

/// Errors that can occur while decoding certificates or checking signatures
#[derive(Error, Debug)]
pub enum Error {
    /// Certificate bytes could not be decoded as an X.509 certificate
    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),

    /// PEM encoding/decoding error
    #[error("PEM error: {0}")]
    Pem(String),

    /// DER encoding/decoding error
    #[error("DER error: {0}")]
    Der(String),

    /// Signature did not verify
    #[error("Verification error: {0}")]
    Verification(String),

    /// Signature or key algorithm not supported
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Invalid key error
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl From<der::Error> for Error {
    fn from(e: der::Error) -> Self {
        Error::Der(e.to_string())
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;

//! High-level validation API
//!
//! [`validate`] builds a chain and evaluates it in one call. [`Validator`]
//! wraps a shared [`TrustStore`] and [`ValidationOptions`] for handshake
//! drivers that validate many peer chains against the same configuration.

use crate::chain::{ChainBuilder, DEFAULT_MAX_CHAIN_DEPTH};
use crate::error::ErrorKind;
use crate::evaluate::PolicyEvaluator;
use certpolicy_crypto::Certificate;
use certpolicy_trust_root::{TrustStore, TrustStoreConfig};
use chrono::{DateTime, Utc};
use rustls_pki_types::CertificateDer;
use std::sync::Arc;

/// Code reported for an accepted chain
pub const CERT_OK: &str = "CERT_OK";

/// The verdict on a certificate chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationResult {
    /// The chain is trusted
    Ok,
    /// The chain is rejected for exactly one reason
    Rejected(ErrorKind),
}

impl ValidationResult {
    /// Whether the chain was accepted
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }

    /// The rejection reason, if any
    pub fn rejection(&self) -> Option<ErrorKind> {
        match self {
            ValidationResult::Ok => None,
            ValidationResult::Rejected(kind) => Some(*kind),
        }
    }

    /// Convert into a `Result` for `?` propagation
    pub fn into_result(self) -> Result<(), ErrorKind> {
        match self {
            ValidationResult::Ok => Ok(()),
            ValidationResult::Rejected(kind) => Err(kind),
        }
    }

    /// `CERT_OK` or the rejection's code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationResult::Ok => CERT_OK,
            ValidationResult::Rejected(kind) => kind.code(),
        }
    }
}

impl From<Result<(), ErrorKind>> for ValidationResult {
    fn from(result: Result<(), ErrorKind>) -> Self {
        match result {
            Ok(()) => ValidationResult::Ok,
            Err(kind) => ValidationResult::Rejected(kind),
        }
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Options for validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Maximum number of certificates in a chain, anchor included
    pub max_chain_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

impl ValidationOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chain depth
    ///
    /// Depths below 2 only accept a leaf that is itself an anchor; trust store
    /// documents refuse them at load time.
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }
}

/// Validate `leaf` against `store` at `time` with default options
///
/// # Example
///
/// ```no_run
/// use certpolicy_verify::{validate, ValidationResult};
/// use certpolicy_verify::crypto::Certificate;
/// use certpolicy_verify::trust_root::TrustStore;
///
/// # fn example(store: &TrustStore, leaf: &Certificate) {
/// let result = validate(leaf, &[], store, chrono::Utc::now());
/// if let ValidationResult::Rejected(kind) = result {
///     eprintln!("rejected: {}", kind.code());
/// }
/// # }
/// ```
pub fn validate(
    leaf: &Certificate,
    intermediates: &[Certificate],
    store: &TrustStore,
    time: DateTime<Utc>,
) -> ValidationResult {
    validate_with_options(leaf, intermediates, store, time, &ValidationOptions::default())
}

/// Validate with explicit options
pub fn validate_with_options(
    leaf: &Certificate,
    intermediates: &[Certificate],
    store: &TrustStore,
    time: DateTime<Utc>,
    options: &ValidationOptions,
) -> ValidationResult {
    let result = match ChainBuilder::new(options.max_chain_depth).build(leaf, intermediates, store)
    {
        Ok(chain) => PolicyEvaluator::evaluate(&chain, time),
        Err(kind) => ValidationResult::Rejected(kind),
    };

    match result {
        ValidationResult::Ok => tracing::debug!("Accepted {}", leaf.subject()),
        ValidationResult::Rejected(kind) => {
            tracing::warn!("Rejected {}: {} ({})", leaf.subject(), kind, kind.code())
        }
    }
    result
}

/// Validates peer chains against a shared trust store
///
/// Cloning is cheap; clones share the same store.
#[derive(Debug, Clone)]
pub struct Validator {
    store: Arc<TrustStore>,
    options: ValidationOptions,
}

impl Validator {
    /// Create a validator with default options
    pub fn new(store: Arc<TrustStore>) -> Self {
        Self::with_options(store, ValidationOptions::default())
    }

    /// Create a validator with explicit options
    pub fn with_options(store: Arc<TrustStore>, options: ValidationOptions) -> Self {
        Self { store, options }
    }

    /// Build the store described by `config`, honouring its `maxChainDepth`
    pub fn from_config(config: &TrustStoreConfig) -> certpolicy_trust_root::Result<Self> {
        let store = config.to_trust_store()?;
        let mut options = ValidationOptions::default();
        if let Some(depth) = config.max_chain_depth {
            options = options.with_max_chain_depth(depth);
        }
        Ok(Self::with_options(Arc::new(store), options))
    }

    /// The shared trust store
    pub fn store(&self) -> &Arc<TrustStore> {
        &self.store
    }

    /// The options in use
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate a parsed chain at `time`
    pub fn validate(
        &self,
        leaf: &Certificate,
        intermediates: &[Certificate],
        time: DateTime<Utc>,
    ) -> ValidationResult {
        validate_with_options(leaf, intermediates, &self.store, time, &self.options)
    }

    /// Validate a parsed chain at the current system time
    pub fn validate_now(&self, leaf: &Certificate, intermediates: &[Certificate]) -> ValidationResult {
        self.validate(leaf, intermediates, Utc::now())
    }

    /// Validate a peer chain as presented in a TLS handshake
    ///
    /// The first certificate is the leaf and the rest are intermediates in
    /// any order. An empty chain or any undecodable certificate yields
    /// [`ErrorKind::MalformedCertificate`].
    pub fn validate_der(
        &self,
        peer_chain: &[CertificateDer<'_>],
        time: DateTime<Utc>,
    ) -> ValidationResult {
        let parsed = peer_chain
            .iter()
            .map(|der| Certificate::from_der(der.as_ref()))
            .collect::<Result<Vec<_>, _>>();

        let certs = match parsed {
            Ok(certs) => certs,
            Err(e) => {
                tracing::warn!("Peer chain contains a malformed certificate: {}", e);
                return ValidationResult::Rejected(ErrorKind::MalformedCertificate);
            }
        };

        match certs.split_first() {
            Some((leaf, intermediates)) => self.validate(leaf, intermediates, time),
            None => {
                tracing::warn!("Peer presented an empty certificate chain");
                ValidationResult::Rejected(ErrorKind::MalformedCertificate)
            }
        }
    }
}

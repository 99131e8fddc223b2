//! Certificate chain validation with issuer-specific distrust policies
//!
//! Validation runs in two stages:
//! - [`ChainBuilder`] orders the leaf and supplied intermediates into a path
//!   ending at a configured trust anchor
//! - [`PolicyEvaluator`] checks signatures, validity windows and the anchor's
//!   temporal distrust policies, in that order
//!
//! Every failure is reported as a [`ValidationResult::Rejected`] carrying
//! exactly one [`ErrorKind`].

pub mod chain;
pub mod error;
pub mod evaluate;
pub mod validate;

// Re-export core crates
pub use certpolicy_crypto as crypto;
pub use certpolicy_trust_root as trust_root;

pub use chain::{Chain, ChainBuilder, DEFAULT_MAX_CHAIN_DEPTH};
pub use error::{ErrorKind, Result};
pub use evaluate::PolicyEvaluator;
pub use validate::{
    validate, validate_with_options, ValidationOptions, ValidationResult, Validator, CERT_OK,
};

//! Certificate model and cryptographic primitives for certpolicy
//!
//! This crate decodes X.509 certificates into an immutable model and verifies
//! the signature on each chain link, using aws-lc-rs as the cryptographic
//! backend.

pub mod encoding;
pub mod error;
pub mod hash;
pub mod verification;
pub mod x509;

pub use encoding::{der_to_pem, pem_bundle_to_der, pem_to_der, HexDigest};
pub use error::{Error, Result};
pub use hash::{sha256, Sha256Hasher};
pub use verification::{KeyType, SignatureAlgorithm, VerificationKey};
pub use x509::{Certificate, CertificateId, DistinguishedName};

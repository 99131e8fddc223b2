//! Encoding helpers for certificate material
//!
//! PEM unwrapping for single certificates and bundles, plus the hex-encoded
//! SHA-256 digest type used for certificate fingerprints and identifiers.

use crate::error::{Error, Result};
use crate::hash::sha256;
use serde::{Deserialize, Serialize};

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Decode a single PEM `CERTIFICATE` block to DER
pub fn pem_to_der(pem_str: &str) -> Result<Vec<u8>> {
    let parsed =
        pem::parse(pem_str).map_err(|e| Error::Pem(format!("failed to parse PEM: {}", e)))?;

    if parsed.tag() != CERTIFICATE_TAG {
        return Err(Error::Pem(format!(
            "expected CERTIFICATE PEM block, got {}",
            parsed.tag()
        )));
    }

    Ok(parsed.contents().to_vec())
}

/// Decode every `CERTIFICATE` block in a PEM bundle, in order
///
/// Blocks with other tags (keys, parameters) are skipped. An input without
/// any certificate block is an error.
pub fn pem_bundle_to_der(pem_str: &str) -> Result<Vec<Vec<u8>>> {
    let blocks = pem::parse_many(pem_str)
        .map_err(|e| Error::Pem(format!("failed to parse PEM bundle: {}", e)))?;

    let certs: Vec<Vec<u8>> = blocks
        .into_iter()
        .filter(|block| block.tag() == CERTIFICATE_TAG)
        .map(|block| block.into_contents())
        .collect();

    if certs.is_empty() {
        return Err(Error::Pem("no CERTIFICATE blocks found".to_string()));
    }

    Ok(certs)
}

/// Encode DER bytes as a PEM `CERTIFICATE` block
pub fn der_to_pem(der: &[u8]) -> String {
    pem::encode(&pem::Pem::new(CERTIFICATE_TAG, der.to_vec()))
}

/// Hex-encoded SHA-256 digest
///
/// Used for certificate fingerprints (digest of the full DER) and for
/// anchor identifiers (digest of subject and public key). Always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexDigest(String);

impl HexDigest {
    /// Digest the given bytes
    pub fn of(data: &[u8]) -> Self {
        HexDigest(hex::encode(sha256(data)))
    }

    /// Wrap a raw 32-byte digest
    pub fn from_bytes(digest: [u8; 32]) -> Self {
        HexDigest(hex::encode(digest))
    }

    /// Parse a hex string, accepting upper case and `:` separators
    pub fn from_hex(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != ':')
            .collect::<String>()
            .to_ascii_lowercase();
        let bytes = hex::decode(&normalized)
            .map_err(|e| Error::InvalidKey(format!("invalid hex digest: {}", e)))?;
        if bytes.len() != 32 {
            return Err(Error::InvalidKey(format!(
                "expected 32-byte SHA-256 digest, got {} bytes",
                bytes.len()
            )));
        }
        Ok(HexDigest(normalized))
    }

    /// Get the hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HexDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for HexDigest {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<HexDigest> for String {
    fn from(digest: HexDigest) -> Self {
        digest.0
    }
}

impl AsRef<str> for HexDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Trust store configuration documents
//!
//! The trust store is described by a JSON document loaded once at startup:
//!
//! ```json
//! {
//!   "mediaType": "application/vnd.certpolicy.truststore+json;version=0.1",
//!   "maxChainDepth": 10,
//!   "anchors": [{
//!     "certificate": {"pem": "-----BEGIN CERTIFICATE-----\n..."},
//!     "distrustPolicies": [
//!       {"preset": "startcomWosign"},
//!       {
//!         "name": "legacy-root",
//!         "issuerMatch": {"commonName": ["Legacy Root"]},
//!         "cutoff": "2020-01-01T00:00:00Z",
//!         "error": "revokedByIssuerPolicy",
//!         "exemptFingerprints": ["9f86d081..."]
//!       }
//!     ]
//!   }]
//! }
//! ```

use crate::anchor::TrustAnchor;
use crate::policy::DistrustPolicy;
use crate::store::TrustStore;
use crate::{Error, Result};
use base64::Engine;
use certpolicy_crypto::Certificate;
use serde::{Deserialize, Serialize};

/// Media type written by [`TrustStoreConfig::default`]
pub const TRUST_STORE_MEDIA_TYPE: &str = "application/vnd.certpolicy.truststore+json;version=0.1";

/// Smallest accepted `maxChainDepth`: a leaf plus its anchor
pub const MIN_CHAIN_DEPTH: usize = 2;

fn default_media_type() -> String {
    TRUST_STORE_MEDIA_TYPE.to_string()
}

/// A trust store configuration document
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustStoreConfig {
    /// Media type of the document
    #[serde(default = "default_media_type")]
    pub media_type: String,

    /// Maximum number of certificates in a built chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chain_depth: Option<usize>,

    /// Configured anchors
    #[serde(default)]
    pub anchors: Vec<AnchorConfig>,
}

impl Default for TrustStoreConfig {
    fn default() -> Self {
        Self {
            media_type: default_media_type(),
            max_chain_depth: None,
            anchors: Vec::new(),
        }
    }
}

/// One anchor entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorConfig {
    /// The root certificate
    pub certificate: CertificateSource,

    /// Distrust policies in evaluation order
    #[serde(default)]
    pub distrust_policies: Vec<PolicyConfig>,
}

/// Certificate material, either PEM text or base64 DER
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CertificateSource {
    /// PEM-encoded certificate
    Pem {
        /// PEM text
        pem: String,
    },
    /// Base64-encoded DER certificate
    Der {
        /// Base64 (standard alphabet) of the DER bytes
        #[serde(rename = "rawBytes")]
        raw_bytes: String,
    },
}

impl CertificateSource {
    /// Decode the certificate
    pub fn load(&self) -> Result<Certificate> {
        match self {
            CertificateSource::Pem { pem } => Ok(Certificate::from_pem(pem)?),
            CertificateSource::Der { raw_bytes } => {
                let der = base64::engine::general_purpose::STANDARD.decode(raw_bytes.trim())?;
                Ok(Certificate::from_der(&der)?)
            }
        }
    }
}

/// Named policy presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyPreset {
    /// [`DistrustPolicy::startcom_wosign`]
    StartcomWosign,
}

impl PolicyPreset {
    /// Expand the preset
    pub fn policy(self) -> DistrustPolicy {
        match self {
            PolicyPreset::StartcomWosign => DistrustPolicy::startcom_wosign(),
        }
    }
}

/// A policy entry: either a preset reference or a full policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PolicyConfig {
    /// `{"preset": "..."}`
    Preset {
        /// Which preset
        preset: PolicyPreset,
    },
    /// A fully specified policy
    Custom(DistrustPolicy),
}

impl PolicyConfig {
    /// Resolve to a concrete policy
    pub fn resolve(&self) -> DistrustPolicy {
        match self {
            PolicyConfig::Preset { preset } => preset.policy(),
            PolicyConfig::Custom(policy) => policy.clone(),
        }
    }
}

impl TrustStoreConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode every anchor and build the store
    ///
    /// Fails with [`Error::InvalidChainDepth`] if `maxChainDepth` is below
    /// [`MIN_CHAIN_DEPTH`], since no leaf could then reach an anchor.
    pub fn to_trust_store(&self) -> Result<TrustStore> {
        if let Some(depth) = self.max_chain_depth {
            if depth < MIN_CHAIN_DEPTH {
                return Err(Error::InvalidChainDepth(depth));
            }
        }

        let mut store = TrustStore::new();
        for entry in &self.anchors {
            let certificate = entry.certificate.load()?;
            let policies = entry.distrust_policies.iter().map(PolicyConfig::resolve);
            store.add_anchor(TrustAnchor::new(certificate).with_policies(policies))?;
        }
        tracing::debug!("Loaded trust store with {} anchors", store.len());
        Ok(store)
    }
}

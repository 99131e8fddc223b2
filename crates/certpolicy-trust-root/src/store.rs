//! The trust store
//!
//! Anchors are registered once at startup and the store is then shared
//! read-only between validation calls. There is no interior mutability, so a
//! `TrustStore` behind an `Arc` can be used from any number of threads.

use crate::anchor::TrustAnchor;
use crate::policy::DistrustPolicy;
use crate::{Error, Result};
use certpolicy_crypto::{Certificate, CertificateId, DistinguishedName};
use std::collections::HashMap;

/// Set of trust anchors keyed by certificate identifier
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    anchors: Vec<TrustAnchor>,
    by_id: HashMap<CertificateId, usize>,
    by_subject: HashMap<DistinguishedName, Vec<usize>>,
}

impl TrustStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from anchors, failing on the first duplicate
    pub fn from_anchors(anchors: impl IntoIterator<Item = TrustAnchor>) -> Result<Self> {
        let mut store = Self::new();
        for anchor in anchors {
            store.add_anchor(anchor)?;
        }
        Ok(store)
    }

    /// Register every certificate of a PEM bundle as an anchor carrying `policies`
    pub fn from_pem_bundle(pem: &str, policies: &[DistrustPolicy]) -> Result<Self> {
        let certs = Certificate::all_from_pem(pem)?;
        Self::from_anchors(
            certs
                .into_iter()
                .map(|cert| TrustAnchor::new(cert).with_policies(policies.iter().cloned())),
        )
    }

    /// Register an anchor
    ///
    /// Fails with [`Error::DuplicateAnchor`] if an anchor with the same
    /// identifier (subject and key) is already present, and with
    /// [`Error::InvalidPolicy`] if any attached policy does not validate.
    pub fn add_anchor(&mut self, anchor: TrustAnchor) -> Result<()> {
        for policy in anchor.policies() {
            policy.validate()?;
        }
        if self.by_id.contains_key(anchor.id()) {
            return Err(Error::DuplicateAnchor(format!(
                "{} ({})",
                anchor.subject(),
                anchor.id()
            )));
        }

        tracing::debug!(
            "Adding trust anchor {} with {} distrust policies",
            anchor.subject(),
            anchor.policies().len()
        );

        let index = self.anchors.len();
        self.by_id.insert(anchor.id().clone(), index);
        self.by_subject
            .entry(anchor.subject().clone())
            .or_default()
            .push(index);
        self.anchors.push(anchor);
        Ok(())
    }

    /// All anchors whose subject equals `issuer`, in registration order
    ///
    /// Issuer names are not globally unique, so several anchors may match.
    pub fn lookup(&self, issuer: &DistinguishedName) -> Vec<&TrustAnchor> {
        self.by_subject
            .get(issuer)
            .map(|indices| indices.iter().map(|&i| &self.anchors[i]).collect())
            .unwrap_or_default()
    }

    /// The anchor with the same identifier as `certificate`, if any
    pub fn anchor_for(&self, certificate: &Certificate) -> Option<&TrustAnchor> {
        self.get(certificate.id())
    }

    /// Look an anchor up by identifier
    pub fn get(&self, id: &CertificateId) -> Option<&TrustAnchor> {
        self.by_id.get(id).map(|&i| &self.anchors[i])
    }

    /// Whether an anchor with the certificate's identifier is registered
    pub fn contains(&self, certificate: &Certificate) -> bool {
        self.by_id.contains_key(certificate.id())
    }

    /// Iterate anchors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TrustAnchor> {
        self.anchors.iter()
    }

    /// Number of anchors
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether the store has no anchors
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

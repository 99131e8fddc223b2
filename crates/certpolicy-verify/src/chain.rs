//! Certification path building
//!
//! Starting from the leaf, the builder repeatedly resolves each certificate's
//! issuer among the trust anchors and the supplied intermediates until it
//! reaches a configured anchor. Resolution is deterministic: anchors are
//! preferred over intermediates, candidates whose subject key identifier
//! matches the child's authority key identifier are preferred over name-only
//! matches, and ties are broken by registration or supply order.

use crate::error::{ErrorKind, Result};
use certpolicy_crypto::Certificate;
use certpolicy_trust_root::{TrustAnchor, TrustStore};

/// Default maximum number of certificates in a chain, anchor included
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 10;

/// A built chain, ordered leaf to root
///
/// The last certificate is always the terminal anchor's configured
/// certificate.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    certificates: Vec<&'a Certificate>,
    anchor: &'a TrustAnchor,
}

impl<'a> Chain<'a> {
    /// Certificates from leaf to anchor
    pub fn certificates(&self) -> &[&'a Certificate] {
        &self.certificates
    }

    /// The end-entity certificate
    pub fn leaf(&self) -> &'a Certificate {
        // A chain always holds at least the anchor certificate
        self.certificates[0]
    }

    /// The anchor the chain terminates at
    pub fn anchor(&self) -> &'a TrustAnchor {
        self.anchor
    }

    /// Number of certificates, anchor included
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Always false; present for symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

/// Builds chains from a leaf to a trust anchor
#[derive(Debug, Clone, Copy)]
pub struct ChainBuilder {
    max_depth: usize,
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHAIN_DEPTH)
    }
}

impl ChainBuilder {
    /// Create a builder that refuses chains longer than `max_depth` certificates
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// The configured depth limit
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Build the chain for `leaf`
    ///
    /// Fails with [`ErrorKind::UntrustedRoot`] when the path ends at a
    /// self-issued certificate that is not an anchor,
    /// [`ErrorKind::BrokenChain`] when some issuer cannot be found, and
    /// [`ErrorKind::ChainTooLong`] when the depth limit is reached first
    /// (this is also how intermediate cycles terminate).
    pub fn build<'a>(
        &self,
        leaf: &'a Certificate,
        intermediates: &'a [Certificate],
        store: &'a TrustStore,
    ) -> Result<Chain<'a>> {
        let mut certificates = vec![leaf];
        let mut current = leaf;

        loop {
            if let Some(anchor) = store.anchor_for(current) {
                // Use the configured certificate, not the peer's copy
                certificates.pop();
                certificates.push(anchor.certificate());
                tracing::debug!(
                    "Built chain of {} certificates ending at {}",
                    certificates.len(),
                    anchor.subject()
                );
                return Ok(Chain {
                    certificates,
                    anchor,
                });
            }

            if certificates.len() >= self.max_depth {
                tracing::debug!(
                    "Chain reached {} certificates without an anchor",
                    certificates.len()
                );
                return Err(ErrorKind::ChainTooLong);
            }

            if current.is_self_issued() {
                tracing::debug!("Self-issued certificate {} is not an anchor", current.subject());
                return Err(ErrorKind::UntrustedRoot);
            }

            let issuer = find_issuer(current, intermediates, store).ok_or_else(|| {
                tracing::debug!("No issuer found for {}", current.issuer());
                ErrorKind::BrokenChain
            })?;

            tracing::debug!("{} issued by {}", current.subject(), issuer.subject());
            certificates.push(issuer);
            current = issuer;
        }
    }
}

/// Pick the issuer of `child`, or `None` if no candidate has its issuer name
fn find_issuer<'a>(
    child: &Certificate,
    intermediates: &'a [Certificate],
    store: &'a TrustStore,
) -> Option<&'a Certificate> {
    let name = child.issuer();
    let candidates: Vec<&'a Certificate> = store
        .lookup(name)
        .into_iter()
        .map(TrustAnchor::certificate)
        .chain(
            intermediates
                .iter()
                .filter(|cert| cert.subject() == name && cert.der() != child.der()),
        )
        .collect();

    if let Some(aki) = child.authority_key_id() {
        if let Some(matched) = candidates
            .iter()
            .copied()
            .find(|cert| cert.subject_key_id() == Some(aki))
        {
            return Some(matched);
        }
    }

    candidates.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, Issuer, KeyPair};

    struct Ca {
        cert: Certificate,
        issuer: Issuer<'static, KeyPair>,
    }

    fn params(cn: &str, ca: bool) -> CertificateParams {
        let mut params = CertificateParams::default();
        let mut dn = rcgen::DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        params.distinguished_name = dn;
        if ca {
            params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        }
        params
    }

    fn root(cn: &str) -> Ca {
        let params = params(cn, true);
        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        Ca {
            cert: Certificate::from_der(cert.der()).unwrap(),
            issuer: Issuer::new(params, key),
        }
    }

    fn sub_ca(cn: &str, parent: &Ca) -> Ca {
        let params = params(cn, true);
        let key = KeyPair::generate().unwrap();
        let cert = params.signed_by(&key, &parent.issuer).unwrap();
        Ca {
            cert: Certificate::from_der(cert.der()).unwrap(),
            issuer: Issuer::new(params, key),
        }
    }

    fn leaf(cn: &str, parent: &Ca) -> Certificate {
        let key = KeyPair::generate().unwrap();
        let cert = params(cn, false).signed_by(&key, &parent.issuer).unwrap();
        Certificate::from_der(cert.der()).unwrap()
    }

    fn store_of(roots: &[&Ca]) -> TrustStore {
        TrustStore::from_anchors(roots.iter().map(|ca| TrustAnchor::new(ca.cert.clone()))).unwrap()
    }

    #[test]
    fn test_direct_chain() {
        let root = root("Root");
        let leaf = leaf("leaf.example", &root);
        let store = store_of(&[&root]);

        let chain = ChainBuilder::default().build(&leaf, &[], &store).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.leaf().der(), leaf.der());
        assert_eq!(chain.anchor().id(), root.cert.id());
    }

    #[test]
    fn test_chain_through_intermediates_in_any_order() {
        let root = root("Root");
        let mid = sub_ca("Mid", &root);
        let low = sub_ca("Low", &mid);
        let leaf = leaf("leaf.example", &low);
        let store = store_of(&[&root]);
        let intermediates = vec![mid.cert.clone(), low.cert.clone()];

        let chain = ChainBuilder::default()
            .build(&leaf, &intermediates, &store)
            .unwrap();
        let subjects: Vec<_> = chain
            .certificates()
            .iter()
            .map(|c| c.subject().common_name().unwrap().to_string())
            .collect();
        assert_eq!(subjects, ["leaf.example", "Low", "Mid", "Root"]);
    }

    #[test]
    fn test_leaf_that_is_an_anchor() {
        let root = root("Root");
        let store = store_of(&[&root]);

        let chain = ChainBuilder::default()
            .build(&root.cert, &[], &store)
            .unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_unknown_issuer_is_broken_chain() {
        let root = root("Root");
        let other = root_ca_not_in_store();
        let leaf = leaf("leaf.example", &other);
        let store = store_of(&[&root]);

        assert_eq!(
            ChainBuilder::default().build(&leaf, &[], &store).unwrap_err(),
            ErrorKind::BrokenChain
        );
    }

    fn root_ca_not_in_store() -> Ca {
        root("Elsewhere")
    }

    #[test]
    fn test_self_issued_non_anchor_is_untrusted_root() {
        let trusted = root("Root");
        let rogue = root("Rogue");
        let leaf = leaf("leaf.example", &rogue);
        let store = store_of(&[&trusted]);

        assert_eq!(
            ChainBuilder::default()
                .build(&leaf, std::slice::from_ref(&rogue.cert), &store)
                .unwrap_err(),
            ErrorKind::UntrustedRoot
        );
    }

    #[test]
    fn test_depth_limit() {
        let root = root("Root");
        let mid = sub_ca("Mid", &root);
        let leaf = leaf("leaf.example", &mid);
        let store = store_of(&[&root]);
        let intermediates = vec![mid.cert.clone()];

        assert!(ChainBuilder::new(3)
            .build(&leaf, &intermediates, &store)
            .is_ok());
        assert_eq!(
            ChainBuilder::new(2)
                .build(&leaf, &intermediates, &store)
                .unwrap_err(),
            ErrorKind::ChainTooLong
        );
    }

    #[test]
    fn test_anchor_preferred_over_intermediate_with_same_name() {
        let root = root("Shared");
        let leaf = leaf("leaf.example", &root);
        let store = store_of(&[&root]);
        // An intermediate claiming the same subject but carrying another key
        let impostor = sub_ca("Shared", &root_ca_not_in_store());

        let chain = ChainBuilder::default()
            .build(&leaf, std::slice::from_ref(&impostor.cert), &store)
            .unwrap();
        assert_eq!(chain.anchor().id(), root.cert.id());
    }
}

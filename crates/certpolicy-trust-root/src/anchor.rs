//! Trust anchors

use crate::policy::DistrustPolicy;
use certpolicy_crypto::{Certificate, CertificateId, DistinguishedName};

/// A configured root certificate plus the distrust policies layered on
/// every chain that terminates at it
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    certificate: Certificate,
    policies: Vec<DistrustPolicy>,
}

impl TrustAnchor {
    /// Create an anchor without policies
    pub fn new(certificate: Certificate) -> Self {
        Self {
            certificate,
            policies: Vec::new(),
        }
    }

    /// Append a policy; policies are evaluated in the order they are added
    pub fn with_policy(mut self, policy: DistrustPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Append several policies in order
    pub fn with_policies(mut self, policies: impl IntoIterator<Item = DistrustPolicy>) -> Self {
        self.policies.extend(policies);
        self
    }

    /// The root certificate
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Policies in declared order
    pub fn policies(&self) -> &[DistrustPolicy] {
        &self.policies
    }

    /// Identifier of the root certificate
    pub fn id(&self) -> &CertificateId {
        self.certificate.id()
    }

    /// Subject of the root certificate
    pub fn subject(&self) -> &DistinguishedName {
        self.certificate.subject()
    }
}

//! Issuer-specific temporal distrust policies
//!
//! A policy attaches to a trust anchor and rejects leaf certificates whose
//! `notBefore` is at or after a cutoff instant. The built-in
//! [`DistrustPolicy::startcom_wosign`] preset reproduces the StartCom/WoSign
//! distrust rule.

use crate::{Error, Result};
use certpolicy_crypto::{Certificate, HexDigest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 2016-10-21T00:00:00Z in nanoseconds since the epoch
const STARTCOM_WOSIGN_CUTOFF_NANOS: i64 = 1_477_008_000 * 1_000_000_000;

/// Root common names covered by the StartCom/WoSign rule
pub const STARTCOM_WOSIGN_ROOTS: &[&str] = &[
    "StartCom Certification Authority",
    "StartCom Certification Authority G2",
    "Certification Authority of WoSign",
    "Certification Authority of WoSign G2",
    "CA 沃通根证书",
    "CA WoSign ECC Root",
];

/// Verdict reported when a policy rejects a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyViolation {
    /// The certificate is treated as revoked
    RevokedByIssuerPolicy,
    /// The certificate is treated as untrusted
    UntrustedByIssuerPolicy,
}

/// Predicate deciding whether a policy applies to an anchor certificate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssuerMatcher {
    /// Applies to every anchor the policy is attached to
    Any,
    /// Anchor subject has one of these common names
    CommonName(Vec<String>),
    /// Anchor subject has one of these organization names
    Organization(Vec<String>),
    /// Anchor subject renders (RFC 4514) to one of these strings
    Subject(Vec<String>),
    /// Anchor certificate has one of these SHA-256 fingerprints
    Fingerprint(Vec<HexDigest>),
}

impl IssuerMatcher {
    /// Check the predicate against an anchor certificate
    pub fn matches(&self, anchor: &Certificate) -> bool {
        match self {
            IssuerMatcher::Any => true,
            IssuerMatcher::CommonName(names) => anchor
                .subject()
                .common_names()
                .iter()
                .any(|cn| names.contains(cn)),
            IssuerMatcher::Organization(orgs) => anchor
                .subject()
                .organizations()
                .iter()
                .any(|o| orgs.contains(o)),
            IssuerMatcher::Subject(subjects) => {
                let rendered = anchor.subject().to_string();
                subjects.iter().any(|s| *s == rendered)
            }
            IssuerMatcher::Fingerprint(fingerprints) => fingerprints.contains(anchor.fingerprint()),
        }
    }
}

fn default_violation() -> PolicyViolation {
    PolicyViolation::RevokedByIssuerPolicy
}

/// A temporal distrust rule attached to a trust anchor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrustPolicy {
    /// Name used in logs
    pub name: String,

    /// Which anchors the rule applies to
    pub issuer_match: IssuerMatcher,

    /// Leaves with `notBefore >= cutoff` are rejected
    pub cutoff: DateTime<Utc>,

    /// Verdict reported on violation
    #[serde(default = "default_violation")]
    pub error: PolicyViolation,

    /// SHA-256 fingerprints of leaf certificates exempt from the rule
    #[serde(default)]
    pub exempt_fingerprints: Vec<HexDigest>,
}

impl DistrustPolicy {
    /// Create a policy without exemptions
    pub fn new(
        name: impl Into<String>,
        issuer_match: IssuerMatcher,
        cutoff: DateTime<Utc>,
        error: PolicyViolation,
    ) -> Self {
        Self {
            name: name.into(),
            issuer_match,
            cutoff,
            error,
            exempt_fingerprints: Vec::new(),
        }
    }

    /// The StartCom/WoSign rule: certificates issued on or after
    /// 2016-10-21T00:00:00Z under those roots are revoked
    pub fn startcom_wosign() -> Self {
        Self::new(
            "startcom-wosign",
            IssuerMatcher::CommonName(STARTCOM_WOSIGN_ROOTS.iter().map(|s| s.to_string()).collect()),
            DateTime::from_timestamp_nanos(STARTCOM_WOSIGN_CUTOFF_NANOS),
            PolicyViolation::RevokedByIssuerPolicy,
        )
    }

    /// Exempt a leaf certificate by fingerprint
    pub fn with_exemption(mut self, fingerprint: &HexDigest) -> Self {
        self.exempt_fingerprints.push(fingerprint.clone());
        self
    }

    /// Whether the rule is in force for chains ending at `anchor`
    pub fn applies_to(&self, anchor: &Certificate) -> bool {
        self.issuer_match.matches(anchor)
    }

    /// Whether `leaf` is on the exemption list
    pub fn is_exempt(&self, leaf: &Certificate) -> bool {
        self.exempt_fingerprints.contains(leaf.fingerprint())
    }

    /// Whether `leaf` falls on or after the cutoff and is not exempt
    ///
    /// The boundary is inclusive: a leaf issued exactly at the cutoff violates
    /// the rule.
    pub fn is_violated_by(&self, leaf: &Certificate) -> bool {
        leaf.not_before() >= self.cutoff && !self.is_exempt(leaf)
    }

    /// Check that the policy is usable: it has a name and its issuer
    /// predicate can match something
    ///
    /// Fingerprints are parsed when the policy is built, so a malformed one
    /// never reaches this point.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidPolicy {
                name: "<unnamed>".to_string(),
                reason: "policy name must not be empty".to_string(),
            });
        }
        let empty_matcher = match &self.issuer_match {
            IssuerMatcher::Any => false,
            IssuerMatcher::CommonName(values)
            | IssuerMatcher::Organization(values)
            | IssuerMatcher::Subject(values) => values.is_empty(),
            IssuerMatcher::Fingerprint(fingerprints) => fingerprints.is_empty(),
        };
        if empty_matcher {
            return Err(Error::InvalidPolicy {
                name: self.name.clone(),
                reason: "issuer match list must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair};

    fn root(cn: &str, org: &str) -> Certificate {
        let mut params = CertificateParams::default();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        dn.push(DnType::OrganizationName, org);
        params.distinguished_name = dn;
        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        Certificate::from_der(cert.der()).unwrap()
    }

    #[test]
    fn test_startcom_wosign_preset() {
        let policy = DistrustPolicy::startcom_wosign();
        assert_eq!(policy.cutoff.to_rfc3339(), "2016-10-21T00:00:00+00:00");
        assert_eq!(policy.error, PolicyViolation::RevokedByIssuerPolicy);

        let startcom = root("StartCom Certification Authority", "StartCom Ltd.");
        let wosign = root("CA 沃通根证书", "WoSign CA Limited");
        let other = root("Some Other Root", "StartCom Ltd.");
        assert!(policy.applies_to(&startcom));
        assert!(policy.applies_to(&wosign));
        assert!(!policy.applies_to(&other));
    }

    #[test]
    fn test_matchers() {
        let anchor = root("Fake Root", "Example Org");

        assert!(IssuerMatcher::Any.matches(&anchor));
        assert!(IssuerMatcher::Organization(vec!["Example Org".to_string()]).matches(&anchor));
        assert!(!IssuerMatcher::Organization(vec!["Other".to_string()]).matches(&anchor));
        assert!(IssuerMatcher::Subject(vec![anchor.subject().to_string()]).matches(&anchor));
        assert!(IssuerMatcher::Fingerprint(vec![anchor.fingerprint().clone()]).matches(&anchor));
        assert!(!IssuerMatcher::Fingerprint(vec![HexDigest::of(b"elsewhere")]).matches(&anchor));
    }

    #[test]
    fn test_policy_json_shape() {
        let json = r#"{
            "name": "legacy-ca",
            "issuerMatch": {"commonName": ["Legacy Root"]},
            "cutoff": "2020-01-01T00:00:00Z",
            "error": "untrustedByIssuerPolicy"
        }"#;
        let policy: DistrustPolicy = serde_json::from_str(json).unwrap();

        assert_eq!(
            policy.issuer_match,
            IssuerMatcher::CommonName(vec!["Legacy Root".to_string()])
        );
        assert_eq!(policy.error, PolicyViolation::UntrustedByIssuerPolicy);
        assert!(policy.exempt_fingerprints.is_empty());
        assert!(policy.validate().is_ok());

        let any: IssuerMatcher = serde_json::from_str(r#""any""#).unwrap();
        assert_eq!(any, IssuerMatcher::Any);
    }

    #[test]
    fn test_fingerprints_are_parsed_with_the_policy() {
        let anchor = root("Fake Root", "Example Org");
        let upper = anchor.fingerprint().as_str().to_ascii_uppercase();
        let json = serde_json::json!({
            "name": "pinned",
            "issuerMatch": {"fingerprint": [upper]},
            "cutoff": "2020-01-01T00:00:00Z",
            "exemptFingerprints": [upper]
        });
        let policy: DistrustPolicy = serde_json::from_value(json).unwrap();

        assert!(policy.applies_to(&anchor));
        assert!(policy.is_exempt(&anchor));
        assert_eq!(policy.exempt_fingerprints[0], *anchor.fingerprint());

        let malformed = serde_json::json!({
            "name": "broken",
            "issuerMatch": "any",
            "cutoff": "2020-01-01T00:00:00Z",
            "exemptFingerprints": ["zz"]
        });
        assert!(serde_json::from_value::<DistrustPolicy>(malformed).is_err());
    }

    #[test]
    fn test_validate_checks_name_first() {
        let mut policy = DistrustPolicy::startcom_wosign();
        policy.name = String::new();
        policy.issuer_match = IssuerMatcher::CommonName(Vec::new());

        let err = policy.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy { ref name, .. } if name == "<unnamed>"));
    }

    #[test]
    fn test_validate_rejects_empty_matcher() {
        let mut policy = DistrustPolicy::startcom_wosign();
        policy.issuer_match = IssuerMatcher::Fingerprint(Vec::new());

        let err = policy.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy { ref name, .. } if name == "startcom-wosign"));
        assert!(DistrustPolicy::startcom_wosign().validate().is_ok());
    }
}

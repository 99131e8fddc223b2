//! Error types for certpolicy-verify

use certpolicy_trust_root::PolicyViolation;
use thiserror::Error;

/// Why a certificate chain was rejected
///
/// Exactly one kind is reported per verdict, chosen by the fixed check order:
/// chain building, signatures, validity windows, then issuer policy.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A certificate could not be decoded
    #[error("certificate is malformed")]
    MalformedCertificate,

    /// The chain ends at a self-issued certificate that is not a trust anchor
    #[error("self-signed certificate in chain is not trusted")]
    UntrustedRoot,

    /// No issuer could be found for some certificate in the chain
    #[error("unable to find the issuer certificate")]
    BrokenChain,

    /// The chain exceeds the configured maximum depth
    #[error("certificate chain too long")]
    ChainTooLong,

    /// A signature in the chain did not verify against its issuer key
    #[error("certificate signature failure")]
    SignatureInvalid,

    /// The reference time is after a certificate's `notAfter`
    #[error("certificate has expired")]
    Expired,

    /// The reference time is before a certificate's `notBefore`
    #[error("certificate is not yet valid")]
    NotYetValid,

    /// An issuer distrust policy treats the leaf as revoked
    #[error("certificate revoked by issuer policy")]
    RevokedByIssuerPolicy,

    /// An issuer distrust policy treats the leaf as untrusted
    #[error("certificate untrusted by issuer policy")]
    UntrustedByIssuerPolicy,
}

impl ErrorKind {
    /// The OpenSSL-style code a TLS stack reports for this kind
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::MalformedCertificate => "CERT_MALFORMED",
            ErrorKind::UntrustedRoot => "SELF_SIGNED_CERT_IN_CHAIN",
            ErrorKind::BrokenChain => "UNABLE_TO_GET_ISSUER_CERT_LOCALLY",
            ErrorKind::ChainTooLong => "CERT_CHAIN_TOO_LONG",
            ErrorKind::SignatureInvalid => "CERT_SIGNATURE_FAILURE",
            ErrorKind::Expired => "CERT_HAS_EXPIRED",
            ErrorKind::NotYetValid => "CERT_NOT_YET_VALID",
            ErrorKind::RevokedByIssuerPolicy => "CERT_REVOKED",
            ErrorKind::UntrustedByIssuerPolicy => "CERT_UNTRUSTED",
        }
    }
}

impl From<PolicyViolation> for ErrorKind {
    fn from(violation: PolicyViolation) -> Self {
        match violation {
            PolicyViolation::RevokedByIssuerPolicy => ErrorKind::RevokedByIssuerPolicy,
            PolicyViolation::UntrustedByIssuerPolicy => ErrorKind::UntrustedByIssuerPolicy,
        }
    }
}

/// Result type for chain building
pub type Result<T> = std::result::Result<T, ErrorKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_violations_map_to_kinds() {
        assert_eq!(
            ErrorKind::from(PolicyViolation::RevokedByIssuerPolicy).code(),
            "CERT_REVOKED"
        );
        assert_eq!(
            ErrorKind::from(PolicyViolation::UntrustedByIssuerPolicy).code(),
            "CERT_UNTRUSTED"
        );
    }

    #[test]
    fn test_codes_are_distinct() {
        let kinds = [
            ErrorKind::MalformedCertificate,
            ErrorKind::UntrustedRoot,
            ErrorKind::BrokenChain,
            ErrorKind::ChainTooLong,
            ErrorKind::SignatureInvalid,
            ErrorKind::Expired,
            ErrorKind::NotYetValid,
            ErrorKind::RevokedByIssuerPolicy,
            ErrorKind::UntrustedByIssuerPolicy,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains("CERT_OK"));
    }
}

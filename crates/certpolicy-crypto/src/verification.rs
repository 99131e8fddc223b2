//! Signature verification using aws-lc-rs

use crate::error::{Error, Result};
use aws_lc_rs::signature::{
    UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_ASN1, ECDSA_P256_SHA384_ASN1,
    ECDSA_P384_SHA256_ASN1, ECDSA_P384_SHA384_ASN1, ED25519, RSA_PKCS1_2048_8192_SHA256,
    RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
};
use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1,
    SECP_384_R_1, SHA_256_WITH_RSA_ENCRYPTION, SHA_384_WITH_RSA_ENCRYPTION,
    SHA_512_WITH_RSA_ENCRYPTION,
};
use const_oid::db::rfc8410::ID_ED_25519;
use const_oid::ObjectIdentifier;

/// Public key family of a certificate's SubjectPublicKeyInfo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// EC key on NIST P-256
    EcP256,
    /// EC key on NIST P-384
    EcP384,
    /// RSA key
    Rsa,
    /// Ed25519 key
    Ed25519,
    /// Anything else (unknown curve or algorithm)
    Unsupported,
}

impl KeyType {
    /// Determine the key type from the SPKI algorithm OID and its parameters
    pub fn from_spki_algorithm(algorithm: ObjectIdentifier, curve: Option<ObjectIdentifier>) -> Self {
        if algorithm == ID_EC_PUBLIC_KEY {
            match curve {
                Some(c) if c == SECP_256_R_1 => KeyType::EcP256,
                Some(c) if c == SECP_384_R_1 => KeyType::EcP384,
                _ => KeyType::Unsupported,
            }
        } else if algorithm == RSA_ENCRYPTION {
            KeyType::Rsa
        } else if algorithm == ID_ED_25519 {
            KeyType::Ed25519
        } else {
            KeyType::Unsupported
        }
    }
}

/// Certificate signature algorithms accepted for chain links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// ecdsa-with-SHA256
    EcdsaSha256,
    /// ecdsa-with-SHA384
    EcdsaSha384,
    /// sha256WithRSAEncryption
    RsaPkcs1Sha256,
    /// sha384WithRSAEncryption
    RsaPkcs1Sha384,
    /// sha512WithRSAEncryption
    RsaPkcs1Sha512,
    /// Ed25519
    Ed25519,
}

impl SignatureAlgorithm {
    /// Map a certificate `signatureAlgorithm` OID
    pub fn from_oid(oid: ObjectIdentifier) -> Result<Self> {
        if oid == ECDSA_WITH_SHA_256 {
            Ok(SignatureAlgorithm::EcdsaSha256)
        } else if oid == ECDSA_WITH_SHA_384 {
            Ok(SignatureAlgorithm::EcdsaSha384)
        } else if oid == SHA_256_WITH_RSA_ENCRYPTION {
            Ok(SignatureAlgorithm::RsaPkcs1Sha256)
        } else if oid == SHA_384_WITH_RSA_ENCRYPTION {
            Ok(SignatureAlgorithm::RsaPkcs1Sha384)
        } else if oid == SHA_512_WITH_RSA_ENCRYPTION {
            Ok(SignatureAlgorithm::RsaPkcs1Sha512)
        } else if oid == ID_ED_25519 {
            Ok(SignatureAlgorithm::Ed25519)
        } else {
            Err(Error::UnsupportedAlgorithm(format!(
                "signature algorithm {}",
                oid
            )))
        }
    }

    /// Get the name of this algorithm
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::EcdsaSha256 => "ecdsa-with-SHA256",
            SignatureAlgorithm::EcdsaSha384 => "ecdsa-with-SHA384",
            SignatureAlgorithm::RsaPkcs1Sha256 => "sha256WithRSAEncryption",
            SignatureAlgorithm::RsaPkcs1Sha384 => "sha384WithRSAEncryption",
            SignatureAlgorithm::RsaPkcs1Sha512 => "sha512WithRSAEncryption",
            SignatureAlgorithm::Ed25519 => "Ed25519",
        }
    }

    /// Select the aws-lc-rs algorithm for this signature made by a key of `key_type`
    fn verification_algorithm(
        &self,
        key_type: KeyType,
    ) -> Result<&'static dyn VerificationAlgorithm> {
        let alg: &'static dyn VerificationAlgorithm = match (self, key_type) {
            (SignatureAlgorithm::EcdsaSha256, KeyType::EcP256) => &ECDSA_P256_SHA256_ASN1,
            (SignatureAlgorithm::EcdsaSha256, KeyType::EcP384) => &ECDSA_P384_SHA256_ASN1,
            (SignatureAlgorithm::EcdsaSha384, KeyType::EcP256) => &ECDSA_P256_SHA384_ASN1,
            (SignatureAlgorithm::EcdsaSha384, KeyType::EcP384) => &ECDSA_P384_SHA384_ASN1,
            (SignatureAlgorithm::RsaPkcs1Sha256, KeyType::Rsa) => &RSA_PKCS1_2048_8192_SHA256,
            (SignatureAlgorithm::RsaPkcs1Sha384, KeyType::Rsa) => &RSA_PKCS1_2048_8192_SHA384,
            (SignatureAlgorithm::RsaPkcs1Sha512, KeyType::Rsa) => &RSA_PKCS1_2048_8192_SHA512,
            (SignatureAlgorithm::Ed25519, KeyType::Ed25519) => &ED25519,
            (alg, key) => {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "{} signature with {:?} issuer key",
                    alg.name(),
                    key
                )))
            }
        };
        Ok(alg)
    }
}

/// An issuer public key for verification
///
/// `bytes` holds the contents of the SPKI `subjectPublicKey` BIT STRING:
/// the uncompressed point for EC keys, the PKCS#1 `RSAPublicKey` for RSA and
/// the 32 raw bytes for Ed25519.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey {
    /// Raw public key bytes
    pub bytes: Vec<u8>,
    /// The family of the key
    pub key_type: KeyType,
}

impl VerificationKey {
    /// Create a new verification key
    pub fn new(bytes: Vec<u8>, key_type: KeyType) -> Self {
        Self { bytes, key_type }
    }

    /// Verify `signature` over `data` made with `algorithm`
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        let alg = algorithm.verification_algorithm(self.key_type)?;
        UnparsedPublicKey::new(alg, &self.bytes)
            .verify(data, signature)
            .map_err(|_| Error::Verification(format!("{} signature invalid", algorithm.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{
        EcdsaKeyPair, Ed25519KeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
    };
    use rstest::rstest;

    fn p256_key() -> EcdsaKeyPair {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref()).unwrap()
    }

    #[test]
    fn test_verify_ecdsa_p256() {
        let kp = p256_key();
        let sig = kp.sign(&SystemRandom::new(), b"tbs").unwrap();

        let vk = VerificationKey::new(kp.public_key().as_ref().to_vec(), KeyType::EcP256);
        assert!(vk
            .verify(SignatureAlgorithm::EcdsaSha256, b"tbs", sig.as_ref())
            .is_ok());
        assert!(vk
            .verify(SignatureAlgorithm::EcdsaSha256, b"other", sig.as_ref())
            .is_err());
    }

    #[test]
    fn test_verify_ed25519() {
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&SystemRandom::new()).unwrap();
        let kp = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();
        let sig = kp.sign(b"tbs");

        let vk = VerificationKey::new(kp.public_key().as_ref().to_vec(), KeyType::Ed25519);
        assert!(vk
            .verify(SignatureAlgorithm::Ed25519, b"tbs", sig.as_ref())
            .is_ok());
    }

    #[test]
    fn test_mismatched_key_type_is_unsupported() {
        let vk = VerificationKey::new(vec![0u8; 32], KeyType::Ed25519);
        let err = vk
            .verify(SignatureAlgorithm::EcdsaSha256, b"tbs", &[0u8; 64])
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }

    #[rstest]
    #[case::ecdsa_sha256(ECDSA_WITH_SHA_256, SignatureAlgorithm::EcdsaSha256, "ecdsa-with-SHA256")]
    #[case::ecdsa_sha384(ECDSA_WITH_SHA_384, SignatureAlgorithm::EcdsaSha384, "ecdsa-with-SHA384")]
    #[case::rsa_sha256(
        SHA_256_WITH_RSA_ENCRYPTION,
        SignatureAlgorithm::RsaPkcs1Sha256,
        "sha256WithRSAEncryption"
    )]
    #[case::rsa_sha512(
        SHA_512_WITH_RSA_ENCRYPTION,
        SignatureAlgorithm::RsaPkcs1Sha512,
        "sha512WithRSAEncryption"
    )]
    #[case::ed25519(ID_ED_25519, SignatureAlgorithm::Ed25519, "Ed25519")]
    fn test_signature_algorithm_from_oid(
        #[case] oid: ObjectIdentifier,
        #[case] expected: SignatureAlgorithm,
        #[case] name: &str,
    ) {
        let algorithm = SignatureAlgorithm::from_oid(oid).unwrap();
        assert_eq!(algorithm, expected);
        assert_eq!(algorithm.name(), name);
    }

    #[rstest]
    #[case::md5_with_rsa("1.2.840.113549.1.1.4")]
    #[case::sha1_with_rsa("1.2.840.113549.1.1.5")]
    #[case::ecdsa_sha1("1.2.840.10045.4.1")]
    fn test_weak_signature_algorithms_are_unsupported(#[case] oid: &str) {
        let oid = ObjectIdentifier::new_unwrap(oid);
        assert!(matches!(
            SignatureAlgorithm::from_oid(oid),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_key_type_from_spki() {
        assert_eq!(
            KeyType::from_spki_algorithm(ID_EC_PUBLIC_KEY, Some(SECP_384_R_1)),
            KeyType::EcP384
        );
        assert_eq!(
            KeyType::from_spki_algorithm(ID_EC_PUBLIC_KEY, None),
            KeyType::Unsupported
        );
        assert_eq!(
            KeyType::from_spki_algorithm(RSA_ENCRYPTION, None),
            KeyType::Rsa
        );
    }
}

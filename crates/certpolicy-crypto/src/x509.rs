//! X.509 certificate model
//!
//! This module decodes the parts of an X.509 certificate that chain building
//! and policy evaluation need: names, validity window, keys, the signed
//! payload and the key identifiers used to link a certificate to its issuer.

use crate::encoding::{pem_bundle_to_der, pem_to_der, HexDigest};
use crate::error::{Error, Result};
use crate::hash::Sha256Hasher;
use crate::verification::{KeyType, SignatureAlgorithm, VerificationKey};
use chrono::{DateTime, Utc};
use const_oid::ObjectIdentifier;
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::pkix::{AuthorityKeyIdentifier, BasicConstraints, SubjectKeyIdentifier};
use x509_cert::name::Name;

const COMMON_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const ORGANIZATION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

/// An X.509 distinguished name
///
/// Equality is byte equality of the DER encoding, which is how issuer and
/// subject names are matched during chain building.
#[derive(Debug, Clone)]
pub struct DistinguishedName {
    der: Vec<u8>,
    display: String,
    common_names: Vec<String>,
    organizations: Vec<String>,
}

impl DistinguishedName {
    fn from_name(name: &Name) -> Result<Self> {
        let der = name
            .to_der()
            .map_err(|e| Error::MalformedCertificate(format!("failed to encode name: {}", e)))?;

        let mut common_names = Vec::new();
        let mut organizations = Vec::new();
        for rdn in name.0.iter() {
            for atv in rdn.0.iter() {
                // Directory strings carry their text as the raw content bytes
                let Ok(value) = std::str::from_utf8(atv.value.value()) else {
                    continue;
                };
                if atv.oid == COMMON_NAME_OID {
                    common_names.push(value.to_string());
                } else if atv.oid == ORGANIZATION_OID {
                    organizations.push(value.to_string());
                }
            }
        }

        Ok(Self {
            der,
            display: name.to_string(),
            common_names,
            organizations,
        })
    }

    /// DER encoding of the name
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// First common name (CN) attribute, if any
    pub fn common_name(&self) -> Option<&str> {
        self.common_names.first().map(String::as_str)
    }

    /// All common name attributes
    pub fn common_names(&self) -> &[String] {
        &self.common_names
    }

    /// All organization (O) attributes
    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }
}

impl PartialEq for DistinguishedName {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for DistinguishedName {}

impl std::hash::Hash for DistinguishedName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display)
    }
}

/// Stable identifier of a certificate: SHA-256 over subject DER and SPKI DER
///
/// Re-issued copies of the same CA (same name, same key) share an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CertificateId(HexDigest);

impl CertificateId {
    /// Get the hex string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed X.509 certificate
///
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Certificate {
    der: Vec<u8>,
    tbs_der: Vec<u8>,
    serial_number: Vec<u8>,
    issuer: DistinguishedName,
    subject: DistinguishedName,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    public_key: VerificationKey,
    spki_der: Vec<u8>,
    signature_algorithm: ObjectIdentifier,
    signature: Vec<u8>,
    authority_key_id: Option<Vec<u8>>,
    subject_key_id: Option<Vec<u8>>,
    is_ca: bool,
    id: CertificateId,
    fingerprint: HexDigest,
}

impl Certificate {
    /// Parse a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let cert = x509_cert::Certificate::from_der(der).map_err(|e| {
            Error::MalformedCertificate(format!("failed to parse certificate: {}", e))
        })?;
        let tbs = &cert.tbs_certificate;

        let tbs_der = tbs
            .to_der()
            .map_err(|e| Error::MalformedCertificate(format!("failed to encode TBS: {}", e)))?;

        let not_before = unix_time(tbs.validity.not_before.to_unix_duration().as_secs())?;
        let not_after = unix_time(tbs.validity.not_after.to_unix_duration().as_secs())?;

        let spki = &tbs.subject_public_key_info;
        let spki_der = spki
            .to_der()
            .map_err(|e| Error::MalformedCertificate(format!("failed to encode SPKI: {}", e)))?;
        let curve = match &spki.algorithm.parameters {
            Some(params) => ObjectIdentifier::from_bytes(params.value()).ok(),
            None => None,
        };
        let key_type = KeyType::from_spki_algorithm(spki.algorithm.oid, curve);
        if key_type == KeyType::Unsupported {
            tracing::debug!(
                "certificate {} has unsupported key algorithm {}",
                tbs.subject,
                spki.algorithm.oid
            );
        }
        let public_key =
            VerificationKey::new(spki.subject_public_key.raw_bytes().to_vec(), key_type);

        let authority_key_id = tbs
            .get::<AuthorityKeyIdentifier>()
            .map_err(|e| Error::MalformedCertificate(format!("invalid AKI extension: {}", e)))?
            .and_then(|(_critical, aki)| aki.key_identifier)
            .map(|kid| kid.as_bytes().to_vec());
        let subject_key_id = tbs
            .get::<SubjectKeyIdentifier>()
            .map_err(|e| Error::MalformedCertificate(format!("invalid SKI extension: {}", e)))?
            .map(|(_critical, ski)| ski.0.as_bytes().to_vec());
        let is_ca = tbs
            .get::<BasicConstraints>()
            .map_err(|e| {
                Error::MalformedCertificate(format!("invalid basic constraints: {}", e))
            })?
            .map(|(_critical, bc)| bc.ca)
            .unwrap_or(false);

        let subject = DistinguishedName::from_name(&tbs.subject)?;

        let mut id_hasher = Sha256Hasher::new();
        id_hasher.update(subject.as_der());
        id_hasher.update(&spki_der);
        let id = CertificateId(HexDigest::from_bytes(id_hasher.finalize()));

        Ok(Self {
            der: der.to_vec(),
            tbs_der,
            serial_number: tbs.serial_number.as_bytes().to_vec(),
            issuer: DistinguishedName::from_name(&tbs.issuer)?,
            subject,
            not_before,
            not_after,
            public_key,
            spki_der,
            signature_algorithm: cert.signature_algorithm.oid,
            signature: cert.signature.raw_bytes().to_vec(),
            authority_key_id,
            subject_key_id,
            is_ca,
            id,
            fingerprint: HexDigest::of(der),
        })
    }

    /// Parse a single PEM-encoded certificate
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        Self::from_der(&pem_to_der(pem_str)?)
    }

    /// Parse every certificate in a PEM bundle, preserving order
    pub fn all_from_pem(pem_str: &str) -> Result<Vec<Self>> {
        pem_bundle_to_der(pem_str)?
            .iter()
            .map(|der| Self::from_der(der))
            .collect()
    }

    /// Full DER encoding
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// DER of the signed `tbsCertificate` payload
    pub fn tbs_der(&self) -> &[u8] {
        &self.tbs_der
    }

    /// Serial number bytes (big-endian, as encoded)
    pub fn serial_number(&self) -> &[u8] {
        &self.serial_number
    }

    /// Serial number as lowercase hex
    pub fn serial_hex(&self) -> String {
        hex::encode(&self.serial_number)
    }

    /// Issuer name
    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    /// Subject name
    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    /// Start of the validity window
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity window
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Subject public key
    pub fn public_key(&self) -> &VerificationKey {
        &self.public_key
    }

    /// SubjectPublicKeyInfo DER
    pub fn spki_der(&self) -> &[u8] {
        &self.spki_der
    }

    /// Signature algorithm OID from the outer certificate
    pub fn signature_algorithm(&self) -> ObjectIdentifier {
        self.signature_algorithm
    }

    /// Signature bytes
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Authority key identifier, the link to the signing issuer
    pub fn authority_key_id(&self) -> Option<&[u8]> {
        self.authority_key_id.as_deref()
    }

    /// Subject key identifier
    pub fn subject_key_id(&self) -> Option<&[u8]> {
        self.subject_key_id.as_deref()
    }

    /// Whether basic constraints mark this certificate as a CA
    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    /// Whether issuer and subject names are identical
    pub fn is_self_issued(&self) -> bool {
        self.issuer == self.subject
    }

    /// Stable identifier (subject + key)
    pub fn id(&self) -> &CertificateId {
        &self.id
    }

    /// SHA-256 fingerprint of the full DER
    pub fn fingerprint(&self) -> &HexDigest {
        &self.fingerprint
    }

    /// Verify that this certificate's signature was made by `issuer`'s key
    pub fn verify_signed_by(&self, issuer: &Certificate) -> Result<()> {
        let algorithm = SignatureAlgorithm::from_oid(self.signature_algorithm)?;
        issuer
            .public_key
            .verify(algorithm, &self.tbs_der, &self.signature)
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

fn unix_time(secs: u64) -> Result<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| Error::MalformedCertificate(format!("validity time {} out of range", secs)))
}

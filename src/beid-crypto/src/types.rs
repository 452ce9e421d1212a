//! Digest and signature scheme identifiers.

use der::asn1::ObjectIdentifier;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::CryptoError;

/// sha1WithRSAEncryption
pub const OID_SHA1_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
/// sha256WithRSAEncryption
pub const OID_SHA256_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
/// sha384WithRSAEncryption
pub const OID_SHA384_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
/// sha512WithRSAEncryption
pub const OID_SHA512_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");
/// ecdsa-with-SHA1
pub const OID_ECDSA_WITH_SHA1: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.1");
/// ecdsa-with-SHA256
pub const OID_ECDSA_WITH_SHA256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
/// ecdsa-with-SHA384
pub const OID_ECDSA_WITH_SHA384: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");
/// ecdsa-with-SHA512
pub const OID_ECDSA_WITH_SHA512: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");

/// rsaEncryption (SubjectPublicKeyInfo algorithm)
pub const OID_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
/// id-ecPublicKey (SubjectPublicKeyInfo algorithm)
pub const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

const SIGNATURE_ALGORITHMS: [(ObjectIdentifier, SignatureScheme); 8] = [
    (OID_SHA1_WITH_RSA, SignatureScheme::RsaPkcs1v15(DigestAlgorithm::Sha1)),
    (OID_SHA256_WITH_RSA, SignatureScheme::RsaPkcs1v15(DigestAlgorithm::Sha256)),
    (OID_SHA384_WITH_RSA, SignatureScheme::RsaPkcs1v15(DigestAlgorithm::Sha384)),
    (OID_SHA512_WITH_RSA, SignatureScheme::RsaPkcs1v15(DigestAlgorithm::Sha512)),
    (OID_ECDSA_WITH_SHA1, SignatureScheme::Ecdsa(DigestAlgorithm::Sha1)),
    (OID_ECDSA_WITH_SHA256, SignatureScheme::Ecdsa(DigestAlgorithm::Sha256)),
    (OID_ECDSA_WITH_SHA384, SignatureScheme::Ecdsa(DigestAlgorithm::Sha384)),
    (OID_ECDSA_WITH_SHA512, SignatureScheme::Ecdsa(DigestAlgorithm::Sha512)),
];

/// Message digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlgorithm {
    /// SHA-1 (first generation cards)
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-384 (EC cards)
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    /// Output size in bytes.
    #[must_use]
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Infer the algorithm from a digest length.
    ///
    /// Card files embed bare digests without an algorithm identifier, so the
    /// length is the only hint available.
    #[must_use]
    pub const fn from_output_len(len: usize) -> Option<Self> {
        match len {
            20 => Some(Self::Sha1),
            32 => Some(Self::Sha256),
            48 => Some(Self::Sha384),
            64 => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Digest the concatenation of `parts`.
    #[must_use]
    pub fn digest<T: AsRef<[u8]>>(&self, parts: &[T]) -> Vec<u8> {
        fn run<D: Digest, T: AsRef<[u8]>>(parts: &[T]) -> Vec<u8> {
            let mut hasher = D::new();
            for part in parts {
                hasher.update(part.as_ref());
            }
            hasher.finalize().to_vec()
        }

        match self {
            Self::Sha1 => run::<Sha1, T>(parts),
            Self::Sha256 => run::<Sha256, T>(parts),
            Self::Sha384 => run::<Sha384, T>(parts),
            Self::Sha512 => run::<Sha512, T>(parts),
        }
    }

    /// JCA-style name, e.g. `SHA-256`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(CryptoError::unsupported_algorithm(s)),
        }
    }
}

/// Asymmetric signature scheme plus the digest it signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    /// RSASSA-PKCS1-v1_5
    RsaPkcs1v15(DigestAlgorithm),
    /// ECDSA over a NIST prime curve
    Ecdsa(DigestAlgorithm),
}

impl SignatureScheme {
    /// Map an X.509 `signatureAlgorithm` OID to a scheme.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnsupportedAlgorithm`] for anything that is not
    /// an RSA PKCS#1 v1.5 or ECDSA algorithm with a SHA-1/SHA-2 digest.
    pub fn from_signature_algorithm_oid(oid: &ObjectIdentifier) -> Result<Self, CryptoError> {
        SIGNATURE_ALGORITHMS
            .iter()
            .find(|(known, _)| known == oid)
            .map(|(_, scheme)| *scheme)
            .ok_or_else(|| CryptoError::unsupported_algorithm(oid.to_string()))
    }

    /// Digest used by this scheme.
    #[must_use]
    pub const fn digest(&self) -> DigestAlgorithm {
        match self {
            Self::RsaPkcs1v15(d) | Self::Ecdsa(d) => *d,
        }
    }

    /// Same family, different digest.
    #[must_use]
    pub const fn with_digest(&self, digest: DigestAlgorithm) -> Self {
        match self {
            Self::RsaPkcs1v15(_) => Self::RsaPkcs1v15(digest),
            Self::Ecdsa(_) => Self::Ecdsa(digest),
        }
    }

    /// Key family name (`RSA` or `EC`).
    #[must_use]
    pub const fn key_family(&self) -> &'static str {
        match self {
            Self::RsaPkcs1v15(_) => "RSA",
            Self::Ecdsa(_) => "EC",
        }
    }

    /// JCA-style algorithm name, e.g. `SHA256withRSA`.
    #[must_use]
    pub fn jca_name(&self) -> String {
        let digest = self.digest().name().replace('-', "");
        match self {
            Self::RsaPkcs1v15(_) => format!("{digest}withRSA"),
            Self::Ecdsa(_) => format!("{digest}withECDSA"),
        }
    }
}

impl std::fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.jca_name())
    }
}

//! Detached signature verification.
//!
//! The card stores every signature apart from the data it covers. The
//! address signature is *chained*: it covers the address file followed by the
//! identity signature, binding the two files to a single card.
//!
//! ```text
//! identity_sig = Sign_RRN(identity_file)
//! address_sig  = Sign_RRN(address_file || identity_sig)
//! ```
//!
//! Verification never concatenates the parts into a new buffer; they are fed
//! to the digest one after another.

use tracing::debug;

use crate::certificate::Certificate;
use crate::error::CryptoError;
use crate::types::{DigestAlgorithm, SignatureScheme, OID_EC_PUBLIC_KEY, OID_RSA_ENCRYPTION};

#[cfg(feature = "ecdsa")]
use crate::ecdsa::{EcdsaP256Verifier, EcdsaP384Verifier};
#[cfg(feature = "rsa")]
use crate::rsa_pkcs1::RsaPkcs1Verifier;

use der::asn1::ObjectIdentifier;

/// Trait for verifying a signature over an already computed digest.
pub trait SignatureVerifier {
    /// Key family (`RSA` or `EC`).
    fn key_family(&self) -> &'static str;

    /// Verify `signature` over `prehash`, the output of `digest`.
    ///
    /// Returns `Ok(false)` when the signature is well formed but does not
    /// match, and [`CryptoError::InvalidSignature`] when it cannot be decoded.
    fn verify_prehash(
        &self,
        digest: DigestAlgorithm,
        prehash: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError>;
}

/// Public key extracted from a certificate.
#[derive(Debug, Clone)]
pub enum PublicKey {
    /// RSA key
    #[cfg(feature = "rsa")]
    Rsa(RsaPkcs1Verifier),
    /// EC key on P-256
    #[cfg(feature = "ecdsa")]
    P256(EcdsaP256Verifier),
    /// EC key on P-384
    #[cfg(feature = "ecdsa")]
    P384(EcdsaP384Verifier),
}

impl PublicKey {
    /// Decode a DER `SubjectPublicKeyInfo` whose algorithm is `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnsupportedAlgorithm`] for key types or curves
    /// this build cannot verify with.
    pub fn from_spki_der(
        algorithm: &ObjectIdentifier,
        spki_der: &[u8],
    ) -> Result<Self, CryptoError> {
        #[cfg(feature = "rsa")]
        if *algorithm == OID_RSA_ENCRYPTION {
            return RsaPkcs1Verifier::from_public_key_der(spki_der).map(Self::Rsa);
        }

        #[cfg(feature = "ecdsa")]
        if *algorithm == OID_EC_PUBLIC_KEY {
            // The curve is carried in the algorithm parameters; each curve's
            // decoder checks it, so the first one that accepts the key wins.
            if let Ok(key) = EcdsaP256Verifier::from_public_key_der(spki_der) {
                return Ok(Self::P256(key));
            }
            if let Ok(key) = EcdsaP384Verifier::from_public_key_der(spki_der) {
                return Ok(Self::P384(key));
            }
            return Err(CryptoError::unsupported_algorithm("EC curve other than P-256/P-384"));
        }

        let _ = spki_der;
        Err(CryptoError::unsupported_algorithm(algorithm.to_string()))
    }

    /// The verifier for this key.
    #[must_use]
    pub fn verifier(&self) -> &dyn SignatureVerifier {
        match self {
            #[cfg(feature = "rsa")]
            Self::Rsa(v) => v as &dyn SignatureVerifier,
            #[cfg(feature = "ecdsa")]
            Self::P256(v) => v as &dyn SignatureVerifier,
            #[cfg(feature = "ecdsa")]
            Self::P384(v) => v as &dyn SignatureVerifier,
        }
    }

    /// Key family (`RSA` or `EC`).
    #[must_use]
    pub fn key_family(&self) -> &'static str {
        self.verifier().key_family()
    }

    /// Human readable key description, e.g. `RSA-2048` or `EC P-384`.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "rsa")]
            Self::Rsa(v) => format!("RSA-{}", v.bits()),
            #[cfg(feature = "ecdsa")]
            Self::P256(_) => "EC P-256".to_string(),
            #[cfg(feature = "ecdsa")]
            Self::P384(_) => "EC P-384".to_string(),
        }
    }

    /// The scheme this key signs with, using `digest`.
    #[must_use]
    pub fn scheme_with_digest(&self, digest: DigestAlgorithm) -> SignatureScheme {
        match self {
            #[cfg(feature = "rsa")]
            Self::Rsa(_) => SignatureScheme::RsaPkcs1v15(digest),
            #[cfg(feature = "ecdsa")]
            Self::P256(_) | Self::P384(_) => SignatureScheme::Ecdsa(digest),
        }
    }
}

/// Verify a detached signature over `signed` with the certificate's declared scheme.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] if the signature cannot be decoded.
pub fn verify(
    signed: &[u8],
    signature: &[u8],
    certificate: &Certificate,
) -> Result<bool, CryptoError> {
    verify_detached(&[signed], signature, certificate, None)
}

/// Verify a chained signature over `data || prior_signature`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] if the signature cannot be decoded.
pub fn verify_chained(
    data: &[u8],
    prior_signature: &[u8],
    signature: &[u8],
    certificate: &Certificate,
) -> Result<bool, CryptoError> {
    verify_detached(&[data, prior_signature], signature, certificate, None)
}

/// Verify a detached signature over the concatenation of `parts`.
///
/// `digest_override` replaces the digest declared by the certificate, for
/// card editions whose data signatures use a different hash than the
/// certificate itself.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] if the signature cannot be
/// decoded and [`CryptoError::KeyMismatch`] if the scheme does not fit the key.
pub fn verify_detached(
    parts: &[&[u8]],
    signature: &[u8],
    certificate: &Certificate,
    digest_override: Option<DigestAlgorithm>,
) -> Result<bool, CryptoError> {
    let declared = certificate.signature_scheme();
    let scheme = digest_override.map_or(declared, |d| declared.with_digest(d));
    verify_with_scheme(parts, signature, certificate.public_key(), scheme)
}

/// Verify a detached signature with an explicit key and scheme.
///
/// # Errors
///
/// See [`verify_detached`].
pub fn verify_with_scheme(
    parts: &[&[u8]],
    signature: &[u8],
    key: &PublicKey,
    scheme: SignatureScheme,
) -> Result<bool, CryptoError> {
    if key.key_family() != scheme.key_family() {
        return Err(CryptoError::KeyMismatch {
            expected: scheme.key_family(),
            actual: key.key_family(),
        });
    }

    let digest = scheme.digest();
    let prehash = digest.digest(parts);
    let valid = key.verifier().verify_prehash(digest, &prehash, signature)?;

    debug!(
        scheme = %scheme,
        parts = parts.len(),
        signed_len = parts.iter().map(|p| p.len()).sum::<usize>(),
        valid,
        "detached signature checked"
    );

    Ok(valid)
}

//! RSASSA-PKCS1-v1_5 verification.
//!
//! First generation eID cards and the national registry certificate that
//! signs their data files use RSA with SHA-1 or SHA-256.

use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use crate::error::CryptoError;
use crate::types::DigestAlgorithm;
use crate::verifier::SignatureVerifier;

/// RSA PKCS#1 v1.5 verifier bound to a single public key.
#[derive(Debug, Clone)]
pub struct RsaPkcs1Verifier {
    key: RsaPublicKey,
}

impl RsaPkcs1Verifier {
    /// Wrap an existing RSA public key.
    #[must_use]
    pub fn new(key: RsaPublicKey) -> Self {
        Self { key }
    }

    /// Parse a DER `SubjectPublicKeyInfo`.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not an RSA public key.
    pub fn from_public_key_der(spki_der: &[u8]) -> Result<Self, CryptoError> {
        let key = RsaPublicKey::from_public_key_der(spki_der)
            .map_err(|e| CryptoError::invalid_public_key(e.to_string()))?;
        Ok(Self { key })
    }

    /// Modulus size in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }

    /// The wrapped key.
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.key
    }
}

impl SignatureVerifier for RsaPkcs1Verifier {
    fn key_family(&self) -> &'static str {
        "RSA"
    }

    fn verify_prehash(
        &self,
        digest: DigestAlgorithm,
        prehash: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        // A PKCS#1 signature is always exactly one modulus wide.
        if signature.len() != self.key.size() {
            return Err(CryptoError::invalid_signature(format!(
                "RSA signature must be {} bytes, got {}",
                self.key.size(),
                signature.len()
            )));
        }

        let scheme = match digest {
            DigestAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            DigestAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            DigestAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            DigestAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        };

        match self.key.verify(scheme, prehash, signature) {
            Ok(()) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}

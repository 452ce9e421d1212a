//! ECDSA signature verification over NIST P-256 and P-384.
//!
//! Current eID cards sign with ECDSA P-384. Card signatures reach us either
//! ASN.1 DER encoded (as the JCA produces and expects) or as the raw
//! fixed-width `r || s` concatenation returned by the applet. Both are accepted.

use crate::error::CryptoError;
use crate::types::DigestAlgorithm;
use crate::verifier::SignatureVerifier;

macro_rules! ecdsa_verifier {
    ($name:ident, $curve:ident, $label:literal, $field_len:literal) => {
        #[doc = concat!("ECDSA ", $label, " verifier.")]
        #[derive(Debug, Clone)]
        pub struct $name {
            key: $curve::ecdsa::VerifyingKey,
        }

        impl $name {
            /// Wrap an existing verifying key.
            #[must_use]
            pub fn new(key: $curve::ecdsa::VerifyingKey) -> Self {
                Self { key }
            }

            /// Parse a DER `SubjectPublicKeyInfo`.
            ///
            /// # Errors
            ///
            /// Returns error if the bytes are not a key on this curve.
            pub fn from_public_key_der(spki_der: &[u8]) -> Result<Self, CryptoError> {
                use $curve::pkcs8::DecodePublicKey;

                let public_key = $curve::PublicKey::from_public_key_der(spki_der)
                    .map_err(|e| CryptoError::invalid_public_key(e.to_string()))?;
                Ok(Self {
                    key: $curve::ecdsa::VerifyingKey::from(public_key),
                })
            }

            /// Parse a SEC1 encoded point.
            ///
            /// # Errors
            ///
            /// Returns error if the point is not on the curve.
            pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
                let key = $curve::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                    .map_err(|e| CryptoError::invalid_public_key(e.to_string()))?;
                Ok(Self { key })
            }

            /// The wrapped key.
            #[must_use]
            pub fn verifying_key(&self) -> &$curve::ecdsa::VerifyingKey {
                &self.key
            }

            fn parse_signature(signature: &[u8]) -> Result<$curve::ecdsa::Signature, CryptoError> {
                match $curve::ecdsa::Signature::from_der(signature) {
                    Ok(sig) => Ok(sig),
                    Err(_) if signature.len() == 2 * $field_len => {
                        $curve::ecdsa::Signature::from_slice(signature).map_err(|e| {
                            CryptoError::invalid_signature(format!("{} signature: {}", $label, e))
                        })
                    },
                    Err(e) => Err(CryptoError::invalid_signature(format!(
                        "{} signature: {}",
                        $label, e
                    ))),
                }
            }
        }

        impl SignatureVerifier for $name {
            fn key_family(&self) -> &'static str {
                "EC"
            }

            fn verify_prehash(
                &self,
                _digest: DigestAlgorithm,
                prehash: &[u8],
                signature: &[u8],
            ) -> Result<bool, CryptoError> {
                use $curve::ecdsa::signature::hazmat::PrehashVerifier;

                let sig = Self::parse_signature(signature)?;

                // A prehash the curve cannot accept simply does not verify.
                match self.key.verify_prehash(prehash, &sig) {
                    Ok(()) => Ok(true),
                    Err(_) => Ok(false),
                }
            }
        }
    };
}

ecdsa_verifier!(EcdsaP256Verifier, p256, "P-256", 32);
ecdsa_verifier!(EcdsaP384Verifier, p384, "P-384", 48);

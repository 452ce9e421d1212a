//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur while loading certificates or checking signatures.
///
/// A signature that is well formed but does not verify is *not* an error:
/// verifiers report it as `Ok(false)`. Everything here means the input could
/// not even be interpreted.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Certificate bytes are not a structurally valid DER X.509 certificate.
    #[error("Malformed certificate: {reason}")]
    CertificateFormat {
        /// Reason the certificate was rejected.
        reason: String,
    },

    /// Invalid signature encoding or length.
    #[error("Invalid signature encoding: {reason}")]
    InvalidSignature {
        /// Reason the signature is invalid.
        reason: String,
    },

    /// Invalid public key format or parameters.
    #[error("Invalid public key: {reason}")]
    InvalidPublicKey {
        /// Reason the key is invalid.
        reason: String,
    },

    /// Algorithm (signature OID, key type or curve) not supported.
    #[error("Algorithm not supported: {algorithm}")]
    UnsupportedAlgorithm {
        /// The unsupported algorithm, usually as a dotted OID.
        algorithm: String,
    },

    /// The certificate's key family does not match the requested scheme.
    #[error("Key type mismatch: certificate holds a {actual} key, scheme requires {expected}")]
    KeyMismatch {
        /// Key family the scheme needs.
        expected: &'static str,
        /// Key family found in the certificate.
        actual: &'static str,
    },
}

impl CryptoError {
    /// Create a certificate format error.
    #[must_use]
    pub fn certificate_format(reason: impl Into<String>) -> Self {
        Self::CertificateFormat {
            reason: reason.into(),
        }
    }

    /// Create an invalid signature error.
    #[must_use]
    pub fn invalid_signature(reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            reason: reason.into(),
        }
    }

    /// Create an invalid public key error.
    #[must_use]
    pub fn invalid_public_key(reason: impl Into<String>) -> Self {
        Self::InvalidPublicKey {
            reason: reason.into(),
        }
    }

    /// Create an unsupported algorithm error.
    #[must_use]
    pub fn unsupported_algorithm(algorithm: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm {
            algorithm: algorithm.into(),
        }
    }

    /// True if the error is about the signature bytes rather than the
    /// certificate or key.
    #[must_use]
    pub fn is_signature_format(&self) -> bool {
        matches!(self, Self::InvalidSignature { .. })
    }
}

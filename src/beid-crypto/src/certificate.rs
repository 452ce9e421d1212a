//! Issuer certificate loading.
//!
//! Only structural parsing happens here. Validity period, chain of trust and
//! revocation are the caller's business: the certificate handed to us is
//! already trusted.

use std::fmt;
use std::time::SystemTime;

use der::{Decode, Encode};
use tracing::debug;

use crate::error::CryptoError;
use crate::types::SignatureScheme;
use crate::verifier::PublicKey;

/// A parsed X.509 certificate and the public key it carries.
///
/// Immutable after construction and safe to share between threads.
#[derive(Clone)]
pub struct Certificate {
    der: Box<[u8]>,
    inner: x509_cert::Certificate,
    public_key: PublicKey,
    scheme: SignatureScheme,
}

impl Certificate {
    /// Parse a DER encoded certificate.
    ///
    /// The signature scheme family follows the subject key; the digest
    /// follows the certificate's declared signature algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CertificateFormat`] if the DER is malformed
    /// (including trailing bytes), [`CryptoError::InvalidPublicKey`] if the
    /// key cannot be decoded and [`CryptoError::UnsupportedAlgorithm`] for
    /// unknown key or signature algorithms.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let inner = x509_cert::Certificate::from_der(der)
            .map_err(|e| CryptoError::certificate_format(e.to_string()))?;

        let spki = &inner.tbs_certificate.subject_public_key_info;
        let spki_der = spki
            .to_der()
            .map_err(|e| CryptoError::certificate_format(e.to_string()))?;
        let public_key = PublicKey::from_spki_der(&spki.algorithm.oid, &spki_der)?;

        let declared = SignatureScheme::from_signature_algorithm_oid(&inner.signature_algorithm.oid)?;
        let scheme = public_key.scheme_with_digest(declared.digest());

        debug!(
            key = %public_key.description(),
            declared = %declared,
            scheme = %scheme,
            "certificate loaded"
        );

        Ok(Self {
            der: der.to_vec().into_boxed_slice(),
            inner,
            public_key,
            scheme,
        })
    }

    /// The certificate's public key.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Scheme used to verify data signed by this certificate's key.
    #[must_use]
    pub fn signature_scheme(&self) -> SignatureScheme {
        self.scheme
    }

    /// Start of the validity period.
    #[must_use]
    pub fn not_before(&self) -> SystemTime {
        self.inner.tbs_certificate.validity.not_before.to_system_time()
    }

    /// End of the validity period.
    #[must_use]
    pub fn not_after(&self) -> SystemTime {
        self.inner.tbs_certificate.validity.not_after.to_system_time()
    }

    /// True if `at` falls inside the validity period. Informational only;
    /// verification never consults it.
    #[must_use]
    pub fn is_valid_at(&self, at: SystemTime) -> bool {
        self.not_before() <= at && at <= self.not_after()
    }

    /// Subject distinguished name (RFC 4514 string).
    #[must_use]
    pub fn subject(&self) -> String {
        self.inner.tbs_certificate.subject.to_string()
    }

    /// Issuer distinguished name (RFC 4514 string).
    #[must_use]
    pub fn issuer(&self) -> String {
        self.inner.tbs_certificate.issuer.to_string()
    }

    /// Serial number as uppercase hex.
    #[must_use]
    pub fn serial_hex(&self) -> String {
        hex::encode_upper(self.inner.tbs_certificate.serial_number.as_bytes())
    }

    /// The original DER bytes.
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Certificate(subject={}, key={}, scheme={}, len={})",
            self.subject(),
            self.public_key.description(),
            self.scheme,
            self.der.len()
        )
    }
}

/// Parse a DER encoded issuer certificate.
///
/// # Errors
///
/// See [`Certificate::from_der`].
pub fn load_certificate(der: &[u8]) -> Result<Certificate, CryptoError> {
    Certificate::from_der(der)
}

//! Error types for integrity verification.

use beid_crypto::CryptoError;
use serde::Serialize;
use thiserror::Error;

use crate::engine::VerificationState;
use crate::tlv::TlvErrorReason;

/// Errors that can occur while verifying card files.
///
/// The verification entry points of [`IntegrityEngine`](crate::IntegrityEngine)
/// never return the detailed variants directly: every failure is wrapped in
/// [`IntegrityError::Tampered`], which keeps the underlying error as its source.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// TLV buffer is structurally invalid.
    #[error("Malformed TLV at offset {offset}: {reason}")]
    MalformedTlv {
        /// Offset of the record that failed to decode.
        offset: usize,
        /// What was wrong with it.
        reason: TlvErrorReason,
    },

    /// Certificate bytes could not be parsed or carry an unusable key.
    #[error("Malformed certificate: {reason}")]
    CertificateFormat {
        /// Reason the certificate was rejected.
        reason: String,
    },

    /// Signature bytes could not be decoded for the certificate's scheme.
    #[error("Malformed signature: {reason}")]
    SignatureFormat {
        /// Reason the signature was rejected.
        reason: String,
    },

    /// Signature is well formed but does not match the signed data.
    #[error("{record} signature does not verify")]
    SignatureInvalid {
        /// Which file the signature covers.
        record: &'static str,
    },

    /// Photo digest embedded in the identity file does not match the photo.
    #[error("Photo digest mismatch ({algorithm})")]
    DigestMismatch {
        /// Digest algorithm used for the comparison.
        algorithm: String,
    },

    /// A field the record cannot exist without is absent or empty.
    #[error("Missing mandatory {record} field: {field}")]
    MissingMandatoryField {
        /// Record type.
        record: &'static str,
        /// Field name.
        field: &'static str,
    },

    /// A text field is not valid UTF-8.
    #[error("Invalid encoding in {record} field {field}")]
    InvalidFieldEncoding {
        /// Record type.
        record: &'static str,
        /// Field name.
        field: &'static str,
    },

    /// Tamper detected. Returned by every verification entry point.
    #[error("Integrity check failed in state {state}: {source}")]
    Tampered {
        /// State the verification was in when it failed.
        state: VerificationState,
        /// The underlying failure.
        source: Box<IntegrityError>,
    },
}

/// Inspectable category of an [`IntegrityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`IntegrityError::MalformedTlv`].
    MalformedTlv,
    /// See [`IntegrityError::CertificateFormat`].
    CertificateFormat,
    /// See [`IntegrityError::SignatureFormat`].
    SignatureFormat,
    /// See [`IntegrityError::SignatureInvalid`].
    SignatureInvalid,
    /// See [`IntegrityError::DigestMismatch`].
    DigestMismatch,
    /// See [`IntegrityError::MissingMandatoryField`].
    MissingMandatoryField,
    /// See [`IntegrityError::InvalidFieldEncoding`].
    InvalidFieldEncoding,
}

impl IntegrityError {
    pub(crate) fn malformed_tlv(offset: usize, reason: TlvErrorReason) -> Self {
        Self::MalformedTlv { offset, reason }
    }

    pub(crate) fn certificate_format(reason: impl Into<String>) -> Self {
        Self::CertificateFormat {
            reason: reason.into(),
        }
    }

    pub(crate) fn signature_format(reason: impl Into<String>) -> Self {
        Self::SignatureFormat {
            reason: reason.into(),
        }
    }

    /// Check if this error signals tampered card data.
    #[must_use]
    pub fn is_tamper(&self) -> bool {
        matches!(self, Self::Tampered { .. })
    }

    /// The category of the underlying failure, looking through [`Self::Tampered`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Self::MalformedTlv { .. } => ErrorKind::MalformedTlv,
            Self::CertificateFormat { .. } => ErrorKind::CertificateFormat,
            Self::SignatureFormat { .. } => ErrorKind::SignatureFormat,
            Self::SignatureInvalid { .. } => ErrorKind::SignatureInvalid,
            Self::DigestMismatch { .. } => ErrorKind::DigestMismatch,
            Self::MissingMandatoryField { .. } => ErrorKind::MissingMandatoryField,
            Self::InvalidFieldEncoding { .. } => ErrorKind::InvalidFieldEncoding,
            // root_cause never stops on a wrapper
            Self::Tampered { source, .. } => source.kind(),
        }
    }

    /// The innermost error.
    #[must_use]
    pub fn root_cause(&self) -> &IntegrityError {
        let mut current = self;
        while let Self::Tampered { source, .. } = current {
            current = source;
        }
        current
    }

    /// State in which tampering was detected, if this is a tamper error.
    #[must_use]
    pub fn tamper_state(&self) -> Option<VerificationState> {
        match self {
            Self::Tampered { state, .. } => Some(*state),
            _ => None,
        }
    }
}

impl From<CryptoError> for IntegrityError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidSignature { reason } => Self::signature_format(reason),
            other => Self::certificate_format(other.to_string()),
        }
    }
}

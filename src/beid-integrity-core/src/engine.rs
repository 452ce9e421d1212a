//! Integrity verification engine.
//!
//! Every flow runs the same ordered steps:
//! 1. Signature over the *raw, undecoded* bytes
//! 2. TLV decoding
//! 3. Field extraction into the record model
//! 4. (photo flow) Photo digest against the digest embedded in the identity
//!
//! ```text
//! Start ──▶ SignatureChecked ──▶ Decoded ──▶ FieldsExtracted ──▶ (PhotoChecked) ──▶ Verified
//!   │              │                │               │                  │
//!   └──────────────┴────────────────┴───────────────┴──────────────────┴──▶ Tampered
//! ```
//!
//! Nothing is decoded before the signature verifies, and no record leaves the
//! engine unless every step passed. Any failure surfaces as
//! [`IntegrityError::Tampered`], carrying the state it happened in.

use std::fmt;

use beid_crypto::{constant_time_eq, Certificate, DigestAlgorithm};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::address::Address;
use crate::config::IntegrityConfig;
use crate::error::IntegrityError;
use crate::identity::Identity;
use crate::tlv::{self, trim_trailing_zeros};

/// Progress of a single verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    /// Nothing checked yet.
    Start,
    /// Signature verified over the raw bytes.
    SignatureChecked,
    /// Buffer decoded into TLV records.
    Decoded,
    /// Record model built.
    FieldsExtracted,
    /// Photo digest matched.
    PhotoChecked,
    /// All checks passed.
    Verified,
    /// A check failed.
    Tampered,
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::SignatureChecked => "signature_checked",
            Self::Decoded => "decoded",
            Self::FieldsExtracted => "fields_extracted",
            Self::PhotoChecked => "photo_checked",
            Self::Verified => "verified",
            Self::Tampered => "tampered",
        };
        f.write_str(name)
    }
}

/// Walks one flow through [`VerificationState`] and turns failures into
/// tamper errors.
struct Verification {
    flow: &'static str,
    state: VerificationState,
}

impl Verification {
    fn start(flow: &'static str) -> Self {
        debug!(flow, "verification started");
        Self {
            flow,
            state: VerificationState::Start,
        }
    }

    fn advance(&mut self, next: VerificationState) {
        debug!(flow = self.flow, from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    fn check<T>(&mut self, result: Result<T, IntegrityError>) -> Result<T, IntegrityError> {
        result.map_err(|err| self.tamper(err))
    }

    /// Moves to [`VerificationState::Tampered`]; the error keeps the state
    /// the failing step started from.
    fn tamper(&mut self, err: IntegrityError) -> IntegrityError {
        let failed_in = self.state;
        warn!(
            flow = self.flow,
            state = %failed_in,
            kind = ?err.kind(),
            error = %err,
            "tamper detected"
        );
        self.advance(VerificationState::Tampered);
        IntegrityError::Tampered {
            state: failed_in,
            source: Box::new(err),
        }
    }

    fn finish(mut self) {
        self.advance(VerificationState::Verified);
        info!(flow = self.flow, "verification succeeded");
    }
}

/// The integrity verification engine.
///
/// Stateless across calls: an engine only holds its configuration and may be
/// shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct IntegrityEngine {
    config: IntegrityConfig,
}

impl IntegrityEngine {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(IntegrityConfig::default())
    }

    /// Create an engine with a custom configuration.
    #[must_use]
    pub fn with_config(config: IntegrityConfig) -> Self {
        debug!(
            max_tag = config.tlv.max_tag,
            max_length_octets = config.tlv.max_length_octets,
            digest_override = ?config.digest_override,
            strip_address_padding = config.strip_address_padding,
            "IntegrityEngine: configured"
        );
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Parse the DER encoded RRN certificate.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::CertificateFormat`] if the bytes are not a
    /// usable X.509 certificate.
    pub fn load_certificate(&self, der: &[u8]) -> Result<Certificate, IntegrityError> {
        Ok(beid_crypto::load_certificate(der)?)
    }

    /// Verify `signature` over the concatenation of `parts`.
    ///
    /// Returns `Ok(false)` for a well formed signature that does not match.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::SignatureFormat`] if the signature cannot be
    /// decoded for the certificate's scheme.
    pub fn verify_signature(
        &self,
        parts: &[&[u8]],
        signature: &[u8],
        certificate: &Certificate,
    ) -> Result<bool, IntegrityError> {
        Ok(beid_crypto::verify_detached(
            parts,
            signature,
            certificate,
            self.config.digest_override,
        )?)
    }

    /// Verify the identity file signature and decode the identity.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Tampered`] on any failure.
    #[instrument(skip_all, fields(identity_len = identity.len()))]
    pub fn verified_identity(
        &self,
        identity: &[u8],
        identity_signature: &[u8],
        certificate: &Certificate,
    ) -> Result<Identity, IntegrityError> {
        let mut verification = Verification::start("identity");
        let identity = self.identity_steps(
            &mut verification,
            identity,
            identity_signature,
            certificate,
        )?;
        verification.finish();
        Ok(identity)
    }

    /// Verify the identity file signature, decode the identity and check the
    /// photo against the digest it embeds.
    ///
    /// The digest algorithm is chosen from the length of the embedded digest.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Tampered`] on any failure.
    #[instrument(skip_all, fields(identity_len = identity.len(), photo_len = photo.len()))]
    pub fn verified_identity_with_photo(
        &self,
        identity: &[u8],
        identity_signature: &[u8],
        photo: &[u8],
        certificate: &Certificate,
    ) -> Result<Identity, IntegrityError> {
        let mut verification = Verification::start("identity_with_photo");
        let identity = self.identity_steps(
            &mut verification,
            identity,
            identity_signature,
            certificate,
        )?;

        verification.check(check_photo(identity.photo_digest(), photo))?;
        verification.advance(VerificationState::PhotoChecked);

        verification.finish();
        Ok(identity)
    }

    /// Verify the chained address signature and decode the address.
    ///
    /// The address signature covers the address file followed by the identity
    /// signature, so `identity_signature` must be the one from the same card.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Tampered`] on any failure.
    #[instrument(skip_all, fields(address_len = address.len()))]
    pub fn verified_address(
        &self,
        address: &[u8],
        identity_signature: &[u8],
        address_signature: &[u8],
        certificate: &Certificate,
    ) -> Result<Address, IntegrityError> {
        let mut verification = Verification::start("address");

        let address = if self.config.strip_address_padding {
            trim_trailing_zeros(address)
        } else {
            address
        };

        verification.check(self.require_signature(
            "address",
            &[address, identity_signature],
            address_signature,
            certificate,
        ))?;
        verification.advance(VerificationState::SignatureChecked);

        let fields = verification.check(tlv::decode_with(address, &self.config.tlv))?;
        verification.advance(VerificationState::Decoded);

        let address = verification.check(Address::from_fields(&fields))?;
        verification.advance(VerificationState::FieldsExtracted);

        verification.finish();
        Ok(address)
    }

    fn identity_steps(
        &self,
        verification: &mut Verification,
        identity: &[u8],
        identity_signature: &[u8],
        certificate: &Certificate,
    ) -> Result<Identity, IntegrityError> {
        verification.check(self.require_signature(
            "identity",
            &[identity],
            identity_signature,
            certificate,
        ))?;
        verification.advance(VerificationState::SignatureChecked);

        let fields = verification.check(tlv::decode_with(identity, &self.config.tlv))?;
        verification.advance(VerificationState::Decoded);

        let identity = verification.check(Identity::from_fields(&fields))?;
        verification.advance(VerificationState::FieldsExtracted);

        Ok(identity)
    }

    fn require_signature(
        &self,
        record: &'static str,
        parts: &[&[u8]],
        signature: &[u8],
        certificate: &Certificate,
    ) -> Result<(), IntegrityError> {
        if self.verify_signature(parts, signature, certificate)? {
            Ok(())
        } else {
            Err(IntegrityError::SignatureInvalid { record })
        }
    }
}

fn check_photo(embedded: &[u8], photo: &[u8]) -> Result<(), IntegrityError> {
    let Some(algorithm) = DigestAlgorithm::from_output_len(embedded.len()) else {
        return Err(IntegrityError::DigestMismatch {
            algorithm: format!("unknown {}-byte digest", embedded.len()),
        });
    };

    let actual = algorithm.digest(&[photo]);
    if !constant_time_eq(&actual, embedded) {
        return Err(IntegrityError::DigestMismatch {
            algorithm: algorithm.to_string(),
        });
    }

    debug!(algorithm = %algorithm, photo_len = photo.len(), "photo digest matched");
    Ok(())
}

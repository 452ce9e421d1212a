//! Configuration for the integrity engine.

use beid_crypto::DigestAlgorithm;

use crate::tlv::TlvFormat;

/// Configuration for [`IntegrityEngine`](crate::IntegrityEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityConfig {
    /// TLV width limits for identity and address files.
    pub tlv: TlvFormat,
    /// Digest to use for data signatures instead of the one declared by the
    /// certificate.
    pub digest_override: Option<DigestAlgorithm>,
    /// Strip trailing zero padding from the address file before verifying.
    pub strip_address_padding: bool,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            tlv: TlvFormat::default(),
            digest_override: None,
            strip_address_padding: true,
        }
    }
}

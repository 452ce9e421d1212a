//! # beid-integrity-core
//!
//! Integrity verification for data read from a Belgian eID card.
//!
//! The engine consumes raw byte buffers already retrieved from the card and
//! the RRN (national registry) certificate, and returns verified records or a
//! tamper error. It never talks to a card reader or the network.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     IntegrityEngine                        │
//! │                                                            │
//! │  ┌──────────────────┐  ┌──────────────┐  ┌──────────────┐  │
//! │  │ Signature check  │─▶│ TLV decoder  │─▶│ Record model │  │
//! │  │ (beid-crypto)    │  │ (tlv)        │  │ (identity,   │  │
//! │  └──────────────────┘  └──────────────┘  │  address)    │  │
//! │                                          └──────────────┘  │
//! │                                                 │          │
//! │                                                 ▼          │
//! │                                    ┌─────────────────────┐ │
//! │                                    │ Photo digest check  │ │
//! │                                    └─────────────────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//!
//! - **Verify before parse**: signatures are checked over the raw bytes
//! - **Chained trust**: the address signature covers the identity signature
//! - **No partial success**: any failure is a single tamper error

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)] // Allow Type in module::Type
#![allow(clippy::must_use_candidate)] // Not all functions need must_use

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
mod record;
pub mod tlv;

pub use address::{build_address, Address, AddressTag};
pub use config::IntegrityConfig;
pub use engine::{IntegrityEngine, VerificationState};
pub use error::{ErrorKind, IntegrityError};
pub use identity::{build_identity, DocumentType, Gender, Identity, IdentityTag, SpecialStatus};
pub use tlv::{
    decode, decode_with, trim_trailing_zeros, TlvErrorReason, TlvField, TlvFields, TlvFormat,
};

pub use beid_crypto::{Certificate, DigestAlgorithm, SignatureScheme};

//! # beid-crypto
//!
//! Cryptographic primitives for verifying data read from a Belgian eID card.
//!
//! The national registry (RRN) signs the identity file and, separately, the
//! address file. The card keeps those signatures next to the files; this
//! crate checks them against the RRN certificate:
//!
//! - **Certificates**: DER X.509 parsing and public key extraction
//! - **Digests**: SHA-1 (first generation cards) and the SHA-2 family
//! - **Signatures**: RSA PKCS#1 v1.5 or ECDSA P-256/P-384, chosen by the
//!   certificate's declared signature algorithm
//!
//! ## Signature Chaining
//!
//! The address signature covers the identity signature too, so an address
//! file cannot be replayed next to another card's identity:
//!
//! ```text
//! signed_payload = address_file || identity_signature
//! address_signature = Sign_RRN(signed_payload)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod certificate;
mod error;
mod types;
mod verifier;

#[cfg(feature = "ecdsa")]
mod ecdsa;

#[cfg(feature = "rsa")]
mod rsa_pkcs1;

pub use certificate::{load_certificate, Certificate};
pub use error::CryptoError;
pub use types::{DigestAlgorithm, SignatureScheme};
pub use verifier::{
    verify, verify_chained, verify_detached, verify_with_scheme, PublicKey, SignatureVerifier,
};

#[cfg(feature = "ecdsa")]
pub use ecdsa::{EcdsaP256Verifier, EcdsaP384Verifier};

#[cfg(feature = "rsa")]
pub use rsa_pkcs1::RsaPkcs1Verifier;

/// Constant-time byte comparison.
///
/// Compares two byte slices in constant time. Returns `true` if the slices
/// are equal, `false` otherwise.
///
/// Uses the `subtle` crate's `ConstantTimeEq` trait for the comparison.
/// The length check still returns early; digest lengths are not secret.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;

    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

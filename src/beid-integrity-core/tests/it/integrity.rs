//! End-to-end integrity tests over synthetic cards.

use beid_integrity_core::{
    DigestAlgorithm, ErrorKind, Gender, IntegrityConfig, IntegrityEngine, IntegrityError,
    VerificationState,
};
use proptest::prelude::*;

use crate::fixtures::{address_file, encode_tlv, shared_rrn, shared_rsa_rrn, Card, TestRrn};

fn assert_tampered(
    result: Result<impl std::fmt::Debug, IntegrityError>,
    state: VerificationState,
    kind: ErrorKind,
) {
    match result {
        Err(err) => {
            assert!(err.is_tamper(), "expected tamper, got {err:?}");
            assert_eq!(err.tamper_state(), Some(state), "{err}");
            assert_eq!(err.kind(), kind, "{err}");
        },
        Ok(value) => panic!("expected tamper, verified {value:?}"),
    }
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_identity_integrity() {
    let rrn = shared_rrn();
    let card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    let identity = engine
        .verified_identity(&card.identity, &card.identity_signature, &rrn.certificate)
        .unwrap();

    assert_eq!(identity.first_name(), "Alice Geldigekaart");
    assert_eq!(identity.name(), "Specimen");
    assert_eq!(identity.card_number(), "592123456789");
    assert_eq!(identity.national_number(), "71715100070");
    assert_eq!(identity.chip_number(), "534C494E33660029");
    assert_eq!(identity.gender(), Gender::Female);
    assert_eq!(identity.photo_digest().len(), 32);
}

#[test]
fn test_identity_integrity_corruption() {
    let rrn = shared_rrn();
    let mut card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    card.identity[0] = 4;

    assert_tampered(
        engine.verified_identity(&card.identity, &card.identity_signature, &rrn.certificate),
        VerificationState::Start,
        ErrorKind::SignatureInvalid,
    );
}

#[test]
fn test_identity_signed_by_other_issuer() {
    let rrn = shared_rrn();
    let other = TestRrn::p256();
    let card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    assert_tampered(
        engine.verified_identity(&card.identity, &card.identity_signature, &other.certificate),
        VerificationState::Start,
        ErrorKind::SignatureInvalid,
    );
}

#[test]
fn test_garbage_signature_is_tamper() {
    let rrn = shared_rrn();
    let card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    assert_tampered(
        engine.verified_identity(&card.identity, b"not a signature", &rrn.certificate),
        VerificationState::Start,
        ErrorKind::SignatureFormat,
    );
    assert_tampered(
        engine.verified_identity(&card.identity, &[], &rrn.certificate),
        VerificationState::Start,
        ErrorKind::SignatureFormat,
    );
}

#[test]
fn test_signed_malformed_tlv_is_tamper() {
    let rrn = shared_rrn();
    let engine = IntegrityEngine::new();

    // Properly signed, but the last record overruns the buffer.
    let mut identity = encode_tlv(&[(1, b"592123456789")]);
    identity.extend_from_slice(&[0x07, 0x10, b'S']);
    let signature = rrn.sign(&identity);

    assert_tampered(
        engine.verified_identity(&identity, &signature, &rrn.certificate),
        VerificationState::SignatureChecked,
        ErrorKind::MalformedTlv,
    );
}

#[test]
fn test_signed_identity_missing_mandatory_field() {
    let rrn = shared_rrn();
    let engine = IntegrityEngine::new();

    let identity = encode_tlv(&[
        (1, b"592123456789"),
        (6, b"71715100070"),
        (8, b"Alice Geldigekaart"),
        (12, b"01 JAN 1971"),
    ]);
    let signature = rrn.sign(&identity);

    let err = engine
        .verified_identity(&identity, &signature, &rrn.certificate)
        .unwrap_err();
    assert_eq!(err.tamper_state(), Some(VerificationState::Decoded));
    assert!(matches!(
        err.root_cause(),
        IntegrityError::MissingMandatoryField {
            record: "identity",
            field: "name"
        }
    ));
}

#[test]
fn test_p384_card() {
    let rrn = TestRrn::p384();
    let card = Card::issue(&rrn);
    let engine = IntegrityEngine::new();

    let identity = engine
        .verified_identity_with_photo(
            &card.identity,
            &card.identity_signature,
            &card.photo,
            &rrn.certificate,
        )
        .unwrap();
    assert_eq!(identity.first_name(), "Alice Geldigekaart");

    let address = engine
        .verified_address(
            &card.address,
            &card.identity_signature,
            &card.address_signature,
            &rrn.certificate,
        )
        .unwrap();
    assert_eq!(address.zip(), "2000");
}

#[test]
fn test_rsa_card() {
    let rrn = shared_rsa_rrn();
    let card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    let identity = engine
        .verified_identity(&card.identity, &card.identity_signature, &rrn.certificate)
        .unwrap();
    assert_eq!(identity.first_name(), "Alice Geldigekaart");

    let mut corrupted = card.identity_signature.clone();
    corrupted[10] ^= 0x01;
    assert_tampered(
        engine.verified_identity(&card.identity, &corrupted, &rrn.certificate),
        VerificationState::Start,
        ErrorKind::SignatureInvalid,
    );
}

#[test]
fn test_rsa_sha1_card_needs_digest_override() {
    let rrn = shared_rsa_rrn();
    let card = Card::issue(rrn);
    let signature = rrn.sign_rsa(DigestAlgorithm::Sha1, &card.identity);

    let default_engine = IntegrityEngine::new();
    assert_tampered(
        default_engine.verified_identity(&card.identity, &signature, &rrn.certificate),
        VerificationState::Start,
        ErrorKind::SignatureInvalid,
    );

    let sha1_engine = IntegrityEngine::with_config(IntegrityConfig {
        digest_override: Some(DigestAlgorithm::Sha1),
        ..IntegrityConfig::default()
    });
    let identity = sha1_engine
        .verified_identity(&card.identity, &signature, &rrn.certificate)
        .unwrap();
    assert_eq!(identity.first_name(), "Alice Geldigekaart");
}

// ============================================================================
// Photo
// ============================================================================

#[test]
fn test_photo_integrity() {
    let rrn = shared_rrn();
    let card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    let identity = engine
        .verified_identity_with_photo(
            &card.identity,
            &card.identity_signature,
            &card.photo,
            &rrn.certificate,
        )
        .unwrap();

    assert_eq!(identity.first_name(), "Alice Geldigekaart");
}

#[test]
fn test_photo_integrity_corruption() {
    let rrn = shared_rrn();
    let mut card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    card.photo[0] = 0;

    assert_tampered(
        engine.verified_identity_with_photo(
            &card.identity,
            &card.identity_signature,
            &card.photo,
            &rrn.certificate,
        ),
        VerificationState::FieldsExtracted,
        ErrorKind::DigestMismatch,
    );
}

#[test]
fn test_photo_from_other_card() {
    let rrn = shared_rrn();
    let card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    let mut other_photo = card.photo.clone();
    other_photo.push(0x00);

    assert_tampered(
        engine.verified_identity_with_photo(
            &card.identity,
            &card.identity_signature,
            &other_photo,
            &rrn.certificate,
        ),
        VerificationState::FieldsExtracted,
        ErrorKind::DigestMismatch,
    );
}

// ============================================================================
// Address
// ============================================================================

#[test]
fn test_address_integrity() {
    let rrn = shared_rrn();
    let card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    let address = engine
        .verified_address(
            &card.address,
            &card.identity_signature,
            &card.address_signature,
            &rrn.certificate,
        )
        .unwrap();

    assert_eq!(address.zip(), "2000");
    assert_eq!(address.street_and_number(), "Meirplaats 1 bus 1");
    assert_eq!(address.municipality(), "Antwerpen");
}

#[test]
fn test_address_integrity_corruption() {
    let rrn = shared_rrn();
    let mut card = Card::issue(rrn);
    let engine = IntegrityEngine::new();

    card.address[0] = 123;

    assert_tampered(
        engine.verified_address(
            &card.address,
            &card.identity_signature,
            &card.address_signature,
            &rrn.certificate,
        ),
        VerificationState::Start,
        ErrorKind::SignatureInvalid,
    );
}

#[test]
fn test_address_with_other_identity_signature() {
    let rrn = shared_rrn();
    let card = Card::issue(rrn);
    let other_card = Card::issue_for(rrn, "Bob", "9000");
    let engine = IntegrityEngine::new();

    // The other card's identity signature is valid on its own.
    assert!(engine
        .verified_identity(&other_card.identity, &other_card.identity_signature, &rrn.certificate)
        .is_ok());

    assert_tampered(
        engine.verified_address(
            &card.address,
            &other_card.identity_signature,
            &card.address_signature,
            &rrn.certificate,
        ),
        VerificationState::Start,
        ErrorKind::SignatureInvalid,
    );
}

#[test]
fn test_address_padding() {
    let rrn = shared_rrn();
    let card = Card::issue(rrn);

    // Unpadded address verifies too.
    let engine = IntegrityEngine::new();
    assert!(engine
        .verified_address(
            &address_file("2000"),
            &card.identity_signature,
            &card.address_signature,
            &rrn.certificate,
        )
        .is_ok());

    // The card signs the unpadded bytes.
    let strict = IntegrityEngine::with_config(IntegrityConfig {
        strip_address_padding: false,
        ..IntegrityConfig::default()
    });
    assert_tampered(
        strict.verified_address(
            &card.address,
            &card.identity_signature,
            &card.address_signature,
            &rrn.certificate,
        ),
        VerificationState::Start,
        ErrorKind::SignatureInvalid,
    );
}

// ============================================================================
// Certificate
// ============================================================================

#[test]
fn test_load_certificate() {
    let rrn = shared_rrn();
    let engine = IntegrityEngine::new();

    let certificate = engine.load_certificate(&rrn.der).unwrap();
    assert!(certificate.subject().contains("Test RRN"));
    assert_eq!(certificate.public_key().description(), "EC P-256");
}

#[test]
fn test_load_certificate_rejects_garbage() {
    let engine = IntegrityEngine::new();

    let err = engine.load_certificate(b"\x30\x03\x02\x01\x01").unwrap_err();
    assert!(!err.is_tamper());
    assert_eq!(err.kind(), ErrorKind::CertificateFormat);

    let mut der = shared_rrn().der.clone();
    der.truncate(der.len() / 2);
    assert_eq!(
        engine.load_certificate(&der).unwrap_err().kind(),
        ErrorKind::CertificateFormat
    );
}

#[test]
fn test_verify_signature_with_own_key() {
    let rrn = shared_rrn();
    let other = TestRrn::p256();
    let engine = IntegrityEngine::new();

    let signature = rrn.sign(b"payload");
    assert!(engine
        .verify_signature(&[&b"payload"[..]], &signature, &rrn.certificate)
        .unwrap());
    assert!(!engine
        .verify_signature(&[&b"payload"[..]], &signature, &other.certificate)
        .unwrap());
}

// ============================================================================
// Single-byte corruption
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Input {
    Identity,
    IdentitySignature,
    Photo,
    Address,
    AddressSignature,
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::Identity),
        Just(Input::IdentitySignature),
        Just(Input::Photo),
        Just(Input::Address),
        Just(Input::AddressSignature),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 100,
        ..ProptestConfig::default()
    })]

    /// Flipping any single byte of any input never yields a verified record.
    #[test]
    fn single_byte_corruption_is_tamper(
        input in input_strategy(),
        index in any::<prop::sample::Index>(),
        mask in 1u8..=255
    ) {
        let rrn = shared_rrn();
        let mut card = Card::issue(rrn);
        let engine = IntegrityEngine::new();

        let target = match input {
            Input::Identity => &mut card.identity,
            Input::IdentitySignature => &mut card.identity_signature,
            Input::Photo => &mut card.photo,
            Input::Address => &mut card.address,
            Input::AddressSignature => &mut card.address_signature,
        };
        let idx = index.index(target.len());
        target[idx] ^= mask;

        match input {
            Input::Identity | Input::IdentitySignature | Input::Photo => {
                let result = engine.verified_identity_with_photo(
                    &card.identity,
                    &card.identity_signature,
                    &card.photo,
                    &rrn.certificate,
                );
                prop_assert!(matches!(result, Err(ref e) if e.is_tamper()));
            },
            Input::Address | Input::AddressSignature => {},
        }

        match input {
            Input::IdentitySignature | Input::Address | Input::AddressSignature => {
                let result = engine.verified_address(
                    &card.address,
                    &card.identity_signature,
                    &card.address_signature,
                    &rrn.certificate,
                );
                prop_assert!(matches!(result, Err(ref e) if e.is_tamper()));
            },
            Input::Identity | Input::Photo => {},
        }
    }
}

//! Synthetic RRN certificates and card files.
//!
//! Every run mints fresh keys, so nothing here depends on real card data.

#![allow(dead_code)]

use std::sync::OnceLock;

use beid_integrity_core::{Certificate, DigestAlgorithm, IntegrityEngine};
use rcgen::{CertificateParams, DnType, KeyPair};

/// Encode TLV records with the eID length scheme.
pub fn encode_tlv(records: &[(u8, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (tag, value) in records {
        out.push(*tag);
        let mut groups = vec![(value.len() & 0x7F) as u8];
        let mut rest = value.len() >> 7;
        while rest > 0 {
            groups.push(0x80 | (rest & 0x7F) as u8);
            rest >>= 7;
        }
        out.extend(groups.iter().rev());
        out.extend_from_slice(value);
    }
    out
}

enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    Rsa(rsa::RsaPrivateKey),
}

/// A self-signed stand-in for the RRN certificate and its private key.
pub struct TestRrn {
    pub certificate: Certificate,
    pub der: Vec<u8>,
    key: SigningKey,
}

fn self_signed(key_pair: &KeyPair) -> Vec<u8> {
    let mut params = CertificateParams::default();
    params
        .distinguished_name
        .push(DnType::CommonName, "Test RRN");
    params
        .distinguished_name
        .push(DnType::OrganizationName, "Test Registry");
    let cert = params
        .self_signed(key_pair)
        .expect("self-signing should succeed");
    cert.der().to_vec()
}

impl TestRrn {
    fn from_parts(der: Vec<u8>, key: SigningKey) -> Self {
        let certificate = IntegrityEngine::new()
            .load_certificate(&der)
            .expect("test certificate should load");
        Self {
            certificate,
            der,
            key,
        }
    }

    /// ECDSA P-256 issuer; signatures are DER encoded.
    pub fn p256() -> Self {
        use p256::pkcs8::DecodePrivateKey;

        let key_pair = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256)
            .expect("key generation should succeed");
        let key = p256::ecdsa::SigningKey::from_pkcs8_der(&key_pair.serialize_der())
            .expect("rcgen key should be valid PKCS#8");
        Self::from_parts(self_signed(&key_pair), SigningKey::P256(key))
    }

    /// ECDSA P-384 issuer; signatures are raw `r || s`, as the card applet returns them.
    pub fn p384() -> Self {
        use p384::pkcs8::DecodePrivateKey;

        let key_pair = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P384_SHA384)
            .expect("key generation should succeed");
        let key = p384::ecdsa::SigningKey::from_pkcs8_der(&key_pair.serialize_der())
            .expect("rcgen key should be valid PKCS#8");
        Self::from_parts(self_signed(&key_pair), SigningKey::P384(key))
    }

    /// RSA-2048 issuer with a sha256WithRSAEncryption certificate.
    pub fn rsa() -> Self {
        use rsa::pkcs8::{EncodePrivateKey, LineEnding};

        let private_key =
            rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("RSA key generation");
        let pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .expect("PKCS#8 encoding");
        let key_pair = KeyPair::from_pem(&pem).expect("rcgen accepts RSA PKCS#8");
        Self::from_parts(self_signed(&key_pair), SigningKey::Rsa(private_key))
    }

    /// Sign with the digest the certificate declares.
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        use p256::ecdsa::signature::Signer;

        match &self.key {
            SigningKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key.sign(data);
                signature.to_der().as_bytes().to_vec()
            },
            SigningKey::P384(key) => {
                let signature: p384::ecdsa::Signature = key.sign(data);
                signature.to_bytes().to_vec()
            },
            SigningKey::Rsa(_) => self.sign_rsa(DigestAlgorithm::Sha256, data),
        }
    }

    /// RSA PKCS#1 v1.5 signature with an explicit digest.
    pub fn sign_rsa(&self, digest: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
        use rsa::signature::{SignatureEncoding, Signer};

        let SigningKey::Rsa(private_key) = &self.key else {
            panic!("not an RSA issuer");
        };
        match digest {
            DigestAlgorithm::Sha1 => {
                rsa::pkcs1v15::SigningKey::<sha1::Sha1>::new(private_key.clone())
                    .sign(data)
                    .to_vec()
            },
            DigestAlgorithm::Sha256 => {
                rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new(private_key.clone())
                    .sign(data)
                    .to_vec()
            },
            other => panic!("fixture does not sign with {other}"),
        }
    }
}

/// A shared P-256 issuer for property tests.
pub fn shared_rrn() -> &'static TestRrn {
    static RRN: OnceLock<TestRrn> = OnceLock::new();
    RRN.get_or_init(TestRrn::p256)
}

/// A shared RSA issuer; key generation is too slow to repeat.
pub fn shared_rsa_rrn() -> &'static TestRrn {
    static RRN: OnceLock<TestRrn> = OnceLock::new();
    RRN.get_or_init(TestRrn::rsa)
}

/// A fake JPEG; only byte 0 and the digest matter.
pub fn photo() -> Vec<u8> {
    let mut photo = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    photo.extend((0..=255u8).cycle().take(2048));
    photo
}

/// Identity file records for the specimen holder.
pub fn identity_file(first_name: &str, photo: &[u8]) -> Vec<u8> {
    let photo_digest = DigestAlgorithm::Sha256.digest(&[photo]);
    encode_tlv(&[
        (0, &[0x01][..]),
        (1, b"592123456789"),
        (2, &[0x53, 0x4C, 0x49, 0x4E, 0x33, 0x66, 0x00, 0x29]),
        (3, b"15.03.2021"),
        (4, b"15.03.2031"),
        (5, b"Antwerpen"),
        (6, b"71715100070"),
        (7, b"Specimen"),
        (8, first_name.as_bytes()),
        (9, b"A"),
        (10, b"Belg"),
        (11, b"Hamont-Achel"),
        (12, b"01 JAN 1971"),
        (13, b"V"),
        (15, b"1"),
        (16, b"0"),
        (17, &photo_digest[..]),
    ])
}

/// Unpadded address file records.
pub fn address_file(zip: &str) -> Vec<u8> {
    encode_tlv(&[
        (0, &[0x01][..]),
        (1, b"Meirplaats 1 bus 1"),
        (2, zip.as_bytes()),
        (3, b"Antwerpen"),
    ])
}

/// All files as read from one card.
pub struct Card {
    pub identity: Vec<u8>,
    pub identity_signature: Vec<u8>,
    pub photo: Vec<u8>,
    /// Zero padded, as read from the card.
    pub address: Vec<u8>,
    pub address_signature: Vec<u8>,
}

impl Card {
    /// Issue the specimen card.
    pub fn issue(rrn: &TestRrn) -> Self {
        Self::issue_for(rrn, "Alice Geldigekaart", "2000")
    }

    /// Issue a card with the given first name and zip.
    pub fn issue_for(rrn: &TestRrn, first_name: &str, zip: &str) -> Self {
        let photo = photo();
        let identity = identity_file(first_name, &photo);
        let identity_signature = rrn.sign(&identity);

        let address = address_file(zip);
        let mut signed = address.clone();
        signed.extend_from_slice(&identity_signature);
        let address_signature = rrn.sign(&signed);

        let mut padded = address;
        padded.resize(117, 0x00);

        Self {
            identity,
            identity_signature,
            photo,
            address: padded,
            address_signature,
        }
    }
}

//! Property-based tests for the TLV decoder.

use beid_integrity_core::{decode, decode_with, ErrorKind, TlvFormat};
use proptest::prelude::*;

use crate::fixtures::encode_tlv;

/// Strategy for generating binary data of specified size range.
fn binary_data(min: usize, max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), min..=max)
}

/// Records with in-range tags and values long enough to need multi-octet lengths.
fn record_list() -> impl Strategy<Value = Vec<(u8, Vec<u8>)>> {
    prop::collection::vec((0u8..=0x7F, binary_data(0, 300)), 0..8)
}

fn encode(records: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let borrowed: Vec<(u8, &[u8])> = records.iter().map(|(t, v)| (*t, v.as_slice())).collect();
    encode_tlv(&borrowed)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 500,
        ..ProptestConfig::default()
    })]

    /// Decoding arbitrary bytes never panics, and any error is MalformedTlv.
    #[test]
    fn decode_never_panics(data in binary_data(0, 512)) {
        if let Err(err) = decode(&data) {
            prop_assert_eq!(err.kind(), ErrorKind::MalformedTlv);
        }
    }

    /// A successful decode accounts for every input byte.
    #[test]
    fn decode_consumes_exactly(data in binary_data(0, 512)) {
        if let Ok(fields) = decode(&data) {
            let mut expected_offset = 0;
            for field in fields.iter() {
                prop_assert_eq!(field.offset, expected_offset);
                let value_start = field.value.as_ptr() as usize - data.as_ptr() as usize;
                expected_offset = value_start + field.value.len();
            }
            prop_assert_eq!(expected_offset, data.len());
        }
    }

    /// Well-formed records decode to the same tags and values, in order.
    #[test]
    fn well_formed_records_decode(records in record_list()) {
        let buffer = encode(&records);
        let fields = decode(&buffer).unwrap();

        prop_assert_eq!(fields.len(), records.len());
        for (field, (tag, value)) in fields.iter().zip(&records) {
            prop_assert_eq!(field.tag, *tag);
            prop_assert_eq!(field.value, value.as_slice());
        }
    }

    /// A record cut short is always rejected.
    #[test]
    fn truncated_record_rejected(
        records in record_list(),
        value in binary_data(1, 300)
    ) {
        let mut all = records;
        all.push((0x01, value));
        let buffer = encode(&all);

        let result = decode(&buffer[..buffer.len() - 1]);
        prop_assert!(result.is_err());
    }

    /// Trailing bytes after the last record are rejected.
    #[test]
    fn trailing_tag_rejected(records in record_list(), tag in 0u8..=0x7F) {
        let mut buffer = encode(&records);
        buffer.push(tag);

        prop_assert!(decode(&buffer).is_err());
    }

    /// Tags above the configured maximum are rejected wherever they appear.
    #[test]
    fn tag_above_max_rejected(
        records in record_list(),
        tag in 0x1Au8..=0xFF
    ) {
        let format = TlvFormat { max_tag: 0x19, ..TlvFormat::default() };
        let mut all: Vec<(u8, Vec<u8>)> = records
            .into_iter()
            .map(|(t, v)| (t % 0x1A, v))
            .collect();
        all.push((tag, Vec::new()));
        let buffer = encode(&all);

        prop_assert!(decode_with(&buffer, &format).is_err());
    }
}

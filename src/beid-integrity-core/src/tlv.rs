//! TLV decoding for eID card files.
//!
//! Identity and address files are a flat sequence of records:
//!
//! ```text
//! ┌─────┬───────────────────────┬──────────────┐
//! │ tag │ length (1..n octets)  │ value        │
//! └─────┴───────────────────────┴──────────────┘
//! ```
//!
//! The tag is a single byte. Each length octet carries seven bits of the
//! length; bit 8 set means another length octet follows. Decoding is a single
//! linear pass and must consume the buffer exactly.

use std::fmt;
use std::str::Utf8Error;

use serde::Serialize;

use crate::error::IntegrityError;

/// Width limits for the TLV encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TlvFormat {
    /// Highest tag value accepted.
    pub max_tag: u8,
    /// Maximum number of length octets per record.
    pub max_length_octets: usize,
}

impl Default for TlvFormat {
    fn default() -> Self {
        Self {
            max_tag: 0x7F,
            max_length_octets: 4,
        }
    }
}

/// Why a buffer failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TlvErrorReason {
    /// Tag above [`TlvFormat::max_tag`].
    TagOutOfRange {
        /// The offending tag.
        tag: u8,
    },
    /// Length still continues after the permitted number of octets.
    LengthTooLong {
        /// Octets permitted.
        max_octets: usize,
    },
    /// The buffer ends inside a length prefix.
    TruncatedLength,
    /// The declared length does not fit in a `usize`.
    LengthOverflow,
    /// A length prefix runs past the end of the buffer.
    LengthOverrun {
        /// Declared value length.
        length: usize,
        /// Bytes actually left.
        available: usize,
    },
}

impl fmt::Display for TlvErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TagOutOfRange { tag } => write!(f, "tag 0x{tag:02X} out of range"),
            Self::LengthTooLong { max_octets } => {
                write!(f, "length prefix longer than {max_octets} octets")
            },
            Self::TruncatedLength => write!(f, "buffer ends inside length prefix"),
            Self::LengthOverflow => write!(f, "declared length does not fit in usize"),
            Self::LengthOverrun { length, available } => write!(
                f,
                "value length {length} exceeds the {available} remaining bytes"
            ),
        }
    }
}

/// A single decoded record, borrowing its value from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvField<'a> {
    /// Record tag.
    pub tag: u8,
    /// Raw value bytes.
    pub value: &'a [u8],
    /// Offset of the tag byte in the input.
    pub offset: usize,
}

/// Decoded records in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlvFields<'a> {
    fields: Vec<TlvField<'a>>,
}

impl<'a> TlvFields<'a> {
    /// Value of the first record carrying `tag`.
    ///
    /// Cards never repeat a tag; if a buffer does, the first occurrence wins.
    #[must_use]
    pub fn get(&self, tag: u8) -> Option<&'a [u8]> {
        self.fields.iter().find(|f| f.tag == tag).map(|f| f.value)
    }

    /// Value of `tag` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns the UTF-8 error if the value is not valid UTF-8.
    pub fn text(&self, tag: u8) -> Result<Option<&'a str>, Utf8Error> {
        self.get(tag).map(std::str::from_utf8).transpose()
    }

    /// Iterate records in input order.
    pub fn iter(&self) -> impl Iterator<Item = &TlvField<'a>> {
        self.fields.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the buffer held no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a TlvFields<'a> {
    type Item = &'a TlvField<'a>;
    type IntoIter = std::slice::Iter<'a, TlvField<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Decode `buffer` with the default eID format.
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode(buffer: &[u8]) -> Result<TlvFields<'_>, IntegrityError> {
    decode_with(buffer, &TlvFormat::default())
}

/// Decode `buffer` into its records.
///
/// # Errors
///
/// Returns [`IntegrityError::MalformedTlv`] if a tag is out of range, a length
/// prefix is too long or truncated, or a value runs past the end of the
/// buffer. A trailing partial record is reported the same way, so a successful
/// decode always consumed every byte.
pub fn decode_with<'a>(
    buffer: &'a [u8],
    format: &TlvFormat,
) -> Result<TlvFields<'a>, IntegrityError> {
    let mut fields = Vec::new();
    let mut offset = 0;

    while offset < buffer.len() {
        let start = offset;
        let tag = buffer[offset];
        if tag > format.max_tag {
            return Err(IntegrityError::malformed_tlv(
                start,
                TlvErrorReason::TagOutOfRange { tag },
            ));
        }
        offset += 1;

        let mut length: usize = 0;
        let mut octets = 0;
        loop {
            let Some(&byte) = buffer.get(offset) else {
                return Err(IntegrityError::malformed_tlv(
                    start,
                    TlvErrorReason::TruncatedLength,
                ));
            };
            offset += 1;
            octets += 1;
            length = length
                .checked_mul(0x80)
                .map(|l| l | usize::from(byte & 0x7F))
                .ok_or_else(|| {
                    IntegrityError::malformed_tlv(start, TlvErrorReason::LengthOverflow)
                })?;
            if byte & 0x80 == 0 {
                break;
            }
            if octets >= format.max_length_octets {
                return Err(IntegrityError::malformed_tlv(
                    start,
                    TlvErrorReason::LengthTooLong {
                        max_octets: format.max_length_octets,
                    },
                ));
            }
        }

        let available = buffer.len() - offset;
        if length > available {
            return Err(IntegrityError::malformed_tlv(
                start,
                TlvErrorReason::LengthOverrun { length, available },
            ));
        }

        fields.push(TlvField {
            tag,
            value: &buffer[offset..offset + length],
            offset: start,
        });
        offset += length;
    }

    Ok(TlvFields { fields })
}

/// Strip the zero padding card files carry after their last record.
#[must_use]
pub fn trim_trailing_zeros(buffer: &[u8]) -> &[u8] {
    let end = buffer.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &buffer[..end]
}

/// Encode `records` with the eID length scheme. Test fixture builder.
#[cfg(test)]
pub(crate) fn encode(records: &[(u8, &[u8])]) -> Vec<u8> {
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

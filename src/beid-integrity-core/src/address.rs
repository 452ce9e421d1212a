//! Address file record model.

use serde::Serialize;

use crate::error::IntegrityError;
use crate::record::{RecordReader, RecordTag};
use crate::tlv::TlvFields;

const RECORD: &str = "address";

/// Tags of the address file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AddressTag {
    /// File structure version.
    FileStructureVersion = 0,
    /// Street and house number.
    StreetAndNumber = 1,
    /// Postal code.
    Zip = 2,
    /// Municipality.
    Municipality = 3,
}

impl AddressTag {
    /// Look up a tag by its numeric value.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::FileStructureVersion),
            1 => Some(Self::StreetAndNumber),
            2 => Some(Self::Zip),
            3 => Some(Self::Municipality),
            _ => None,
        }
    }

    /// Field name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FileStructureVersion => "file_structure_version",
            Self::StreetAndNumber => "street_and_number",
            Self::Zip => "zip",
            Self::Municipality => "municipality",
        }
    }
}

impl RecordTag for AddressTag {
    fn tag(self) -> u8 {
        self as u8
    }

    fn field_name(self) -> &'static str {
        self.name()
    }
}

/// Verified address of the card holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    street_and_number: String,
    zip: String,
    municipality: String,
}

impl Address {
    /// Build an address from decoded address file records.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::MissingMandatoryField`] if the zip or
    /// municipality is absent or empty, and
    /// [`IntegrityError::InvalidFieldEncoding`] if a text field is not UTF-8.
    pub fn from_fields(fields: &TlvFields<'_>) -> Result<Self, IntegrityError> {
        let r = RecordReader::new(fields, RECORD);

        Ok(Self {
            street_and_number: r.text(AddressTag::StreetAndNumber)?,
            zip: r.mandatory_text(AddressTag::Zip)?,
            municipality: r.mandatory_text(AddressTag::Municipality)?,
        })
    }

    /// Street and house number; may be empty.
    #[must_use]
    pub fn street_and_number(&self) -> &str {
        &self.street_and_number
    }

    /// Postal code.
    #[must_use]
    pub fn zip(&self) -> &str {
        &self.zip
    }

    /// Municipality.
    #[must_use]
    pub fn municipality(&self) -> &str {
        &self.municipality
    }
}

/// Build an address from decoded records. See [`Address::from_fields`].
///
/// # Errors
///
/// See [`Address::from_fields`].
pub fn build_address(fields: &TlvFields<'_>) -> Result<Address, IntegrityError> {
    Address::from_fields(fields)
}

//! Field extraction shared by the identity and address models.

use crate::error::IntegrityError;
use crate::tlv::TlvFields;

/// A tag of a known record layout.
pub(crate) trait RecordTag: Copy {
    /// Numeric tag on the card.
    fn tag(self) -> u8;
    /// Field name used in errors and logs.
    fn field_name(self) -> &'static str;
}

/// Reads typed values for one record type out of decoded fields.
pub(crate) struct RecordReader<'f, 'a> {
    fields: &'f TlvFields<'a>,
    record: &'static str,
}

impl<'f, 'a> RecordReader<'f, 'a> {
    pub(crate) fn new(fields: &'f TlvFields<'a>, record: &'static str) -> Self {
        Self { fields, record }
    }

    /// Raw value, empty when absent.
    pub(crate) fn bytes(&self, tag: impl RecordTag) -> &'a [u8] {
        self.fields.get(tag.tag()).unwrap_or_default()
    }

    /// Text value, empty when absent.
    pub(crate) fn text(&self, tag: impl RecordTag) -> Result<String, IntegrityError> {
        match self.fields.text(tag.tag()) {
            Ok(value) => Ok(value.unwrap_or_default().to_string()),
            Err(_) => Err(IntegrityError::InvalidFieldEncoding {
                record: self.record,
                field: tag.field_name(),
            }),
        }
    }

    /// Text value that must be present and non-empty.
    pub(crate) fn mandatory_text(&self, tag: impl RecordTag) -> Result<String, IntegrityError> {
        let value = self.text(tag)?;
        if value.is_empty() {
            return Err(IntegrityError::MissingMandatoryField {
                record: self.record,
                field: tag.field_name(),
            });
        }
        Ok(value)
    }
}

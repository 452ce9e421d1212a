//! Identity file record model.
//!
//! The identity file holds the card holder's civil data and the digest of the
//! photo file. An [`Identity`] is only handed out by the engine once the RRN
//! signature over the raw file has verified.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::IntegrityError;
use crate::record::{RecordReader, RecordTag};
use crate::tlv::TlvFields;

const RECORD: &str = "identity";

/// Tags of the identity file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum IdentityTag {
    /// File structure version.
    FileStructureVersion = 0,
    /// Card number.
    CardNumber = 1,
    /// Chip number (binary).
    ChipNumber = 2,
    /// Start of card validity, `dd.MM.yyyy`.
    CardValidityBegin = 3,
    /// End of card validity, `dd.MM.yyyy`.
    CardValidityEnd = 4,
    /// Municipality that delivered the card.
    CardDeliveryMunicipality = 5,
    /// National registry number.
    NationalNumber = 6,
    /// Surname.
    Name = 7,
    /// First names.
    FirstName = 8,
    /// Third first name initial.
    MiddleName = 9,
    /// Nationality.
    Nationality = 10,
    /// Place of birth.
    PlaceOfBirth = 11,
    /// Date of birth, localized month abbreviation.
    DateOfBirth = 12,
    /// Gender code.
    Gender = 13,
    /// Noble condition.
    NobleCondition = 14,
    /// Document type code.
    DocumentType = 15,
    /// Special status code.
    SpecialStatus = 16,
    /// Digest of the photo file.
    PhotoDigest = 17,
    /// Duplicate number.
    Duplicate = 18,
    /// Special organisation code.
    SpecialOrganisation = 19,
    /// Member of family flag.
    MemberOfFamily = 20,
    /// Date and country of protection.
    DateAndCountryOfProtection = 21,
    /// Work permit type.
    WorkPermitType = 22,
    /// First employer VAT number.
    EmployerVat1 = 23,
    /// Second employer VAT number.
    EmployerVat2 = 24,
    /// Regional file number.
    RegionalFileNumber = 25,
}

impl IdentityTag {
    /// Every known tag, in tag order.
    pub const ALL: [IdentityTag; 26] = [
        Self::FileStructureVersion,
        Self::CardNumber,
        Self::ChipNumber,
        Self::CardValidityBegin,
        Self::CardValidityEnd,
        Self::CardDeliveryMunicipality,
        Self::NationalNumber,
        Self::Name,
        Self::FirstName,
        Self::MiddleName,
        Self::Nationality,
        Self::PlaceOfBirth,
        Self::DateOfBirth,
        Self::Gender,
        Self::NobleCondition,
        Self::DocumentType,
        Self::SpecialStatus,
        Self::PhotoDigest,
        Self::Duplicate,
        Self::SpecialOrganisation,
        Self::MemberOfFamily,
        Self::DateAndCountryOfProtection,
        Self::WorkPermitType,
        Self::EmployerVat1,
        Self::EmployerVat2,
        Self::RegionalFileNumber,
    ];

    /// Tags without which an identity is rejected.
    pub const MANDATORY: [IdentityTag; 4] = [
        Self::CardNumber,
        Self::NationalNumber,
        Self::Name,
        Self::DateOfBirth,
    ];

    /// Look up a tag by its numeric value.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }

    /// True if the record is mandatory.
    #[must_use]
    pub fn is_mandatory(self) -> bool {
        Self::MANDATORY.contains(&self)
    }

    /// Field name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FileStructureVersion => "file_structure_version",
            Self::CardNumber => "card_number",
            Self::ChipNumber => "chip_number",
            Self::CardValidityBegin => "card_validity_begin",
            Self::CardValidityEnd => "card_validity_end",
            Self::CardDeliveryMunicipality => "card_delivery_municipality",
            Self::NationalNumber => "national_number",
            Self::Name => "name",
            Self::FirstName => "first_name",
            Self::MiddleName => "middle_name",
            Self::Nationality => "nationality",
            Self::PlaceOfBirth => "place_of_birth",
            Self::DateOfBirth => "date_of_birth",
            Self::Gender => "gender",
            Self::NobleCondition => "noble_condition",
            Self::DocumentType => "document_type",
            Self::SpecialStatus => "special_status",
            Self::PhotoDigest => "photo_digest",
            Self::Duplicate => "duplicate",
            Self::SpecialOrganisation => "special_organisation",
            Self::MemberOfFamily => "member_of_family",
            Self::DateAndCountryOfProtection => "date_and_country_of_protection",
            Self::WorkPermitType => "work_permit_type",
            Self::EmployerVat1 => "employer_vat_1",
            Self::EmployerVat2 => "employer_vat_2",
            Self::RegionalFileNumber => "regional_file_number",
        }
    }
}

impl RecordTag for IdentityTag {
    fn tag(self) -> u8 {
        self as u8
    }

    fn field_name(self) -> &'static str {
        self.name()
    }
}

/// Card holder gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// `M`
    Male,
    /// `F`, `V` or `W` depending on the card language.
    Female,
    /// Absent or unrecognized.
    Unknown,
}

impl Gender {
    fn from_code(code: &str) -> Self {
        match code.trim() {
            "M" => Self::Male,
            "F" | "V" | "W" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

/// Kind of identity document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Belgian citizen eID.
    BelgianCitizen,
    /// Kids-ID.
    KidsCard,
    /// Bootstrap card.
    BootstrapCard,
    /// Habilitation card.
    HabilitationCard,
    /// Foreigner card A.
    ForeignerA,
    /// Foreigner card B.
    ForeignerB,
    /// Foreigner card C.
    ForeignerC,
    /// Foreigner card D.
    ForeignerD,
    /// Foreigner card E.
    ForeignerE,
    /// Foreigner card E+.
    ForeignerEPlus,
    /// Foreigner card F.
    ForeignerF,
    /// Foreigner card F+.
    ForeignerFPlus,
    /// European blue card H.
    EuropeanBlueCardH,
    /// Foreigner card I.
    ForeignerI,
    /// Foreigner card J.
    ForeignerJ,
    /// Foreigner card M.
    ForeignerM,
    /// Foreigner card N.
    ForeignerN,
    /// Foreigner card K.
    ForeignerK,
    /// Foreigner card L.
    ForeignerL,
    /// A numeric code without a known meaning.
    Other(u16),
    /// Absent or not numeric.
    Unspecified,
}

impl DocumentType {
    fn from_code(code: &str) -> Self {
        let Ok(code) = code.trim().parse::<u16>() else {
            return Self::Unspecified;
        };
        match code {
            1 => Self::BelgianCitizen,
            6 => Self::KidsCard,
            7 => Self::BootstrapCard,
            8 => Self::HabilitationCard,
            11 => Self::ForeignerA,
            12 => Self::ForeignerB,
            13 => Self::ForeignerC,
            14 => Self::ForeignerD,
            15 => Self::ForeignerE,
            16 => Self::ForeignerEPlus,
            17 => Self::ForeignerF,
            18 => Self::ForeignerFPlus,
            19 => Self::EuropeanBlueCardH,
            20 => Self::ForeignerI,
            21 => Self::ForeignerJ,
            22 => Self::ForeignerM,
            23 => Self::ForeignerN,
            27 => Self::ForeignerK,
            28 => Self::ForeignerL,
            other => Self::Other(other),
        }
    }
}

/// Special status printed on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialStatus {
    /// No special status.
    NoStatus,
    /// White cane (blind).
    WhiteCane,
    /// Extended minority.
    ExtendedMinority,
    /// White cane and extended minority.
    WhiteCaneExtendedMinority,
    /// Yellow cane (partially sighted).
    YellowCane,
    /// Yellow cane and extended minority.
    YellowCaneExtendedMinority,
    /// A numeric code without a known meaning.
    Other(u16),
}

impl SpecialStatus {
    fn from_code(code: &str) -> Self {
        match code.trim().parse::<u16>() {
            Ok(0) | Err(_) => Self::NoStatus,
            Ok(1) => Self::WhiteCane,
            Ok(2) => Self::ExtendedMinority,
            Ok(3) => Self::WhiteCaneExtendedMinority,
            Ok(4) => Self::YellowCane,
            Ok(5) => Self::YellowCaneExtendedMinority,
            Ok(other) => Self::Other(other),
        }
    }
}

/// Verified identity of the card holder.
///
/// Text attributes are empty when the card does not carry them. Dates are kept
/// as printed on the card; the typed accessors parse them on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    file_structure_version: Option<u8>,
    card_number: String,
    chip_number: String,
    card_validity_begin: String,
    card_validity_end: String,
    card_delivery_municipality: String,
    national_number: String,
    name: String,
    first_name: String,
    middle_name: String,
    nationality: String,
    place_of_birth: String,
    date_of_birth: String,
    gender: Gender,
    noble_condition: String,
    document_type: DocumentType,
    special_status: SpecialStatus,
    #[serde(with = "hex::serde")]
    photo_digest: Vec<u8>,
    duplicate: String,
    special_organisation: String,
    member_of_family: bool,
    date_and_country_of_protection: String,
    work_permit_type: String,
    employer_vat_1: String,
    employer_vat_2: String,
    regional_file_number: String,
}

macro_rules! text_accessors {
    ($($(#[$meta:meta])* $field:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $field(&self) -> &str {
                &self.$field
            }
        )*
    };
}

impl Identity {
    /// Build an identity from decoded identity file records.
    ///
    /// Unknown tags are ignored. Optional attributes default to empty.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::MissingMandatoryField`] if the card number,
    /// national number, name or date of birth is absent or empty, and
    /// [`IntegrityError::InvalidFieldEncoding`] if a text field is not UTF-8.
    pub fn from_fields(fields: &TlvFields<'_>) -> Result<Self, IntegrityError> {
        use IdentityTag as T;

        let r = RecordReader::new(fields, RECORD);

        Ok(Self {
            file_structure_version: r.bytes(T::FileStructureVersion).first().copied(),
            card_number: r.mandatory_text(T::CardNumber)?,
            chip_number: hex::encode_upper(r.bytes(T::ChipNumber)),
            card_validity_begin: r.text(T::CardValidityBegin)?,
            card_validity_end: r.text(T::CardValidityEnd)?,
            card_delivery_municipality: r.text(T::CardDeliveryMunicipality)?,
            national_number: r.mandatory_text(T::NationalNumber)?,
            name: r.mandatory_text(T::Name)?,
            first_name: r.text(T::FirstName)?,
            middle_name: r.text(T::MiddleName)?,
            nationality: r.text(T::Nationality)?,
            place_of_birth: r.text(T::PlaceOfBirth)?,
            date_of_birth: r.mandatory_text(T::DateOfBirth)?,
            gender: Gender::from_code(&r.text(T::Gender)?),
            noble_condition: r.text(T::NobleCondition)?,
            document_type: DocumentType::from_code(&r.text(T::DocumentType)?),
            special_status: SpecialStatus::from_code(&r.text(T::SpecialStatus)?),
            photo_digest: r.bytes(T::PhotoDigest).to_vec(),
            duplicate: r.text(T::Duplicate)?,
            special_organisation: r.text(T::SpecialOrganisation)?,
            member_of_family: !r.bytes(T::MemberOfFamily).is_empty(),
            date_and_country_of_protection: r.text(T::DateAndCountryOfProtection)?,
            work_permit_type: r.text(T::WorkPermitType)?,
            employer_vat_1: r.text(T::EmployerVat1)?,
            employer_vat_2: r.text(T::EmployerVat2)?,
            regional_file_number: r.text(T::RegionalFileNumber)?,
        })
    }

    text_accessors!(
        /// Card number.
        card_number,
        /// Chip number as uppercase hex.
        chip_number,
        /// Delivering municipality.
        card_delivery_municipality,
        /// National registry number.
        national_number,
        /// Surname.
        name,
        /// First names.
        first_name,
        /// Third first name initial.
        middle_name,
        /// Nationality.
        nationality,
        /// Place of birth.
        place_of_birth,
        /// Noble condition.
        noble_condition,
        /// Duplicate number.
        duplicate,
        /// Special organisation code.
        special_organisation,
        /// Date and country of protection.
        date_and_country_of_protection,
        /// Work permit type.
        work_permit_type,
        /// First employer VAT number.
        employer_vat_1,
        /// Second employer VAT number.
        employer_vat_2,
        /// Regional file number.
        regional_file_number,
    );

    /// File structure version, if present.
    #[must_use]
    pub fn file_structure_version(&self) -> Option<u8> {
        self.file_structure_version
    }

    /// Card validity start.
    #[must_use]
    pub fn card_validity_begin(&self) -> Option<NaiveDate> {
        parse_card_date(&self.card_validity_begin)
    }

    /// Card validity end.
    #[must_use]
    pub fn card_validity_end(&self) -> Option<NaiveDate> {
        parse_card_date(&self.card_validity_end)
    }

    /// Date of birth. Only the year is known for some holders; the date is
    /// then January 1st of that year.
    #[must_use]
    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        parse_date_of_birth(&self.date_of_birth)
    }

    /// Date of birth as printed on the card.
    #[must_use]
    pub fn date_of_birth_text(&self) -> &str {
        &self.date_of_birth
    }

    /// Gender.
    #[must_use]
    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Document type.
    #[must_use]
    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// Special status.
    #[must_use]
    pub fn special_status(&self) -> SpecialStatus {
        self.special_status
    }

    /// Digest of the photo file; empty if the card carries none.
    #[must_use]
    pub fn photo_digest(&self) -> &[u8] {
        &self.photo_digest
    }

    /// Member of family flag.
    #[must_use]
    pub fn member_of_family(&self) -> bool {
        self.member_of_family
    }
}

/// Build an identity from decoded records. See [`Identity::from_fields`].
///
/// # Errors
///
/// See [`Identity::from_fields`].
pub fn build_identity(fields: &TlvFields<'_>) -> Result<Identity, IntegrityError> {
    Identity::from_fields(fields)
}

fn parse_card_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y").ok()
}

// Month abbreviations as printed in Dutch, French, German and English.
const MONTHS: &[(&str, u32)] = &[
    ("JAN", 1),
    ("JANV", 1),
    ("FEB", 2),
    ("FEV", 2),
    ("FÉV", 2),
    ("MAAR", 3),
    ("MARS", 3),
    ("MÄR", 3),
    ("MAR", 3),
    ("APR", 4),
    ("AVR", 4),
    ("MEI", 5),
    ("MAI", 5),
    ("MAY", 5),
    ("JUN", 6),
    ("JUIN", 6),
    ("JUL", 7),
    ("JUIL", 7),
    ("AUG", 8),
    ("AOUT", 8),
    ("AOÛT", 8),
    ("SEP", 9),
    ("SEPT", 9),
    ("OKT", 10),
    ("OCT", 10),
    ("NOV", 11),
    ("DEC", 12),
    ("DÉC", 12),
    ("DEZ", 12),
];

fn parse_month(token: &str) -> Option<u32> {
    if let Ok(month) = token.parse::<u32>() {
        return Some(month);
    }
    let token = token.to_uppercase();
    MONTHS
        .iter()
        .find(|(abbrev, _)| *abbrev == token)
        .map(|(_, month)| *month)
}

fn parse_date_of_birth(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == '.' || c == '-')
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [day, month, year] => NaiveDate::from_ymd_opt(
            year.parse().ok()?,
            parse_month(month)?,
            day.parse().ok()?,
        ),
        [year] if year.len() == 4 => NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1),
        _ => None,
    }
}

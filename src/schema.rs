//! Result types returned by the extractors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields recovered from a structured provider response.
///
/// Every populated field is trimmed and non-empty; a missing value is `None`
/// (serialized as `null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub name: Option<String>,
    pub id_number: Option<String>,
    pub id_type: Option<String>,
}

impl ExtractionResult {
    /// True when nothing at all was recognized. Callers should surface the raw
    /// provider payload for manual review in that case.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.id_number.is_none() && self.id_type.is_none()
    }

    /// Fill unset fields from `other`; populated fields are kept.
    pub fn or_fill(mut self, other: ExtractionResult) -> Self {
        self.name = self.name.or(other.name);
        self.id_number = self.id_number.or(other.id_number);
        self.id_type = self.id_type.or(other.id_type);
        self
    }
}

/// Document families recognized in free OCR text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "Aadhaar Card")]
    Aadhaar,
    #[serde(rename = "Singapore NRIC Card")]
    SingaporeNric,
    #[serde(rename = "Passport")]
    Passport,
    #[serde(rename = "PAN Card")]
    Pan,
    #[serde(rename = "Voter ID")]
    VoterId,
    #[serde(rename = "Driving Licence")]
    DrivingLicence,
    #[serde(rename = "Nepal Identity Card")]
    NepalIdentity,
    #[serde(rename = "Generic Identity Card")]
    GenericIdentity,
    #[serde(rename = "Unknown Document Type")]
    Unknown,
}

impl DocumentType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Aadhaar => "Aadhaar Card",
            Self::SingaporeNric => "Singapore NRIC Card",
            Self::Passport => "Passport",
            Self::Pan => "PAN Card",
            Self::VoterId => "Voter ID",
            Self::DrivingLicence => "Driving Licence",
            Self::NepalIdentity => "Nepal Identity Card",
            Self::GenericIdentity => "Generic Identity Card",
            Self::Unknown => "Unknown Document Type",
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of parsing raw OCR text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Uppercase, separators stripped.
    pub id_number: Option<String>,
    pub document_type: DocumentType,
    /// Input text, untouched.
    pub raw: String,
}

//! Document classification and ID-number extraction from raw OCR text.
//!
//! Each classification rule pairs a structural ID regex with a contextual
//! keyword where one exists; the first rule that matches decides the type.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::patterns::{self, clean_text};
use crate::schema::{DocumentType, ParsedDocument};

/// One classification rule: the type applies if any of `any_of` matches,
/// and every pattern in `all_of` matches.
struct Signature {
    document_type: DocumentType,
    all_of: Vec<&'static Regex>,
    any_of: Vec<&'static Regex>,
}

impl Signature {
    fn matches(&self, text: &str) -> bool {
        self.all_of.iter().all(|re| re.is_match(text))
            && (self.any_of.is_empty() || self.any_of.iter().any(|re| re.is_match(text)))
    }
}

/// Ordered rules; first match wins.
static SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    vec![
        Signature {
            document_type: DocumentType::Aadhaar,
            all_of: vec![&*patterns::AADHAAR, &*patterns::GOVERNMENT_OF_INDIA],
            any_of: vec![],
        },
        Signature {
            document_type: DocumentType::SingaporeNric,
            all_of: vec![],
            any_of: vec![&*patterns::SG_NRIC, &*patterns::REPUBLIC_OF_SINGAPORE],
        },
        Signature {
            document_type: DocumentType::Passport,
            all_of: vec![],
            any_of: vec![&*patterns::PASSPORT, &*patterns::PASSPORT_KEYWORD],
        },
        Signature {
            document_type: DocumentType::Pan,
            all_of: vec![],
            any_of: vec![&*patterns::PERMANENT_ACCOUNT_NUMBER, &*patterns::PAN],
        },
        Signature {
            document_type: DocumentType::VoterId,
            all_of: vec![],
            any_of: vec![&*patterns::VOTER_ID],
        },
        Signature {
            document_type: DocumentType::DrivingLicence,
            all_of: vec![],
            any_of: vec![&*patterns::DRIVING_LICENCE],
        },
        Signature {
            document_type: DocumentType::NepalIdentity,
            all_of: vec![],
            any_of: vec![&*patterns::NEPAL],
        },
        Signature {
            document_type: DocumentType::GenericIdentity,
            all_of: vec![],
            any_of: vec![&*patterns::IDENTITY_CARD],
        },
    ]
});

/// Classify cleaned OCR text. Falls through to `Unknown`.
pub fn detect_document_type(text: &str) -> DocumentType {
    SIGNATURES
        .iter()
        .find(|sig| sig.matches(text))
        .map(|sig| sig.document_type)
        .unwrap_or(DocumentType::Unknown)
}

/// Pull the most specific ID number out of cleaned OCR text:
/// NRIC, then Aadhaar, then passport, then any generic token.
pub fn extract_id_number(text: &str) -> Option<String> {
    if let Some(caps) = patterns::SG_NRIC.captures(text) {
        return Some(caps[1].to_uppercase());
    }
    if let Some(m) = patterns::AADHAAR.find(text) {
        return Some(m.as_str().chars().filter(|c| !c.is_whitespace()).collect());
    }
    if let Some(caps) = patterns::PASSPORT.captures(text) {
        return Some(caps[1].to_uppercase());
    }
    patterns::GENERIC_ID
        .captures(text)
        .map(|caps| caps[1].to_uppercase())
}

/// Parse raw OCR text into an ID number and document type.
pub fn parse_id_and_type(raw: &str) -> ParsedDocument {
    let text = clean_text(raw);
    let document_type = detect_document_type(&text);
    let id_number = extract_id_number(&text);

    debug!(
        "Free-text parse: type={}, id_found={}, {} chars",
        document_type,
        id_number.is_some(),
        raw.len()
    );

    ParsedDocument {
        id_number,
        document_type,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::normalize_lines;

    #[test]
    fn test_aadhaar() {
        let raw = "GOVERNMENT OF INDIA\nRavi Kumar\nDOB: 01/01/1990\n1234 5678 9012";
        let parsed = parse_id_and_type(raw);
        assert_eq!(parsed.document_type, DocumentType::Aadhaar);
        assert_eq!(parsed.id_number.as_deref(), Some("123456789012"));
        assert_eq!(parsed.raw, raw);
    }

    #[test]
    fn test_aadhaar_digits_without_keyword_is_not_aadhaar() {
        let parsed = parse_id_and_type("Card 1234 5678 9012");
        assert_ne!(parsed.document_type, DocumentType::Aadhaar);
        assert_eq!(parsed.id_number.as_deref(), Some("123456789012"));
    }

    #[test]
    fn test_singapore_nric() {
        let parsed = parse_id_and_type("IDENTITY CARD NO. S1234567D\nTAN AH KOW");
        assert_eq!(parsed.document_type, DocumentType::SingaporeNric);
        assert_eq!(parsed.id_number.as_deref(), Some("S1234567D"));
    }

    #[test]
    fn test_singapore_nric_lowercase_is_uppercased() {
        let parsed = parse_id_and_type("nric t7654321z");
        assert_eq!(parsed.document_type, DocumentType::SingaporeNric);
        assert_eq!(parsed.id_number.as_deref(), Some("T7654321Z"));
    }

    #[test]
    fn test_unknown() {
        let parsed = parse_id_and_type("hello world\nnothing to see here");
        assert_eq!(parsed.document_type, DocumentType::Unknown);
        assert!(parsed.id_number.is_none());
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse_id_and_type("");
        assert_eq!(parsed.document_type, DocumentType::Unknown);
        assert!(parsed.id_number.is_none());
        assert_eq!(parsed.raw, "");
    }

    #[test]
    fn test_passport_rule_precedes_pan_rule() {
        let parsed = parse_id_and_type("Passport\nABCDE1234F");
        assert_eq!(parsed.document_type, DocumentType::Passport);
        assert_eq!(parsed.id_number.as_deref(), Some("ABCDE1234F"));
    }

    #[test]
    fn test_pan_card() {
        let parsed = parse_id_and_type("Permanent Account Number\nABCDE1234F");
        assert_eq!(parsed.document_type, DocumentType::Pan);
        assert_eq!(parsed.id_number.as_deref(), Some("ABCDE1234F"));
    }

    #[test]
    fn test_mrz_lines_dropped_but_still_scanned() {
        let raw = "P<GBRSMITH<<JOHN<<<<<<<<<<\nK1234567<0GBR8001019M3001012<<<<<<<<<<<<<<02";
        assert!(normalize_lines(raw).is_empty());

        let parsed = parse_id_and_type(raw);
        assert_eq!(parsed.document_type, DocumentType::Passport);
        assert_eq!(parsed.id_number.as_deref(), Some("K1234567"));
    }

    #[test]
    fn test_keyword_rules() {
        let cases = [
            ("Election Commission of India", DocumentType::VoterId),
            ("voter id card", DocumentType::VoterId),
            ("DRIVING LICENCE", DocumentType::DrivingLicence),
            ("Driver\u{2019}s License", DocumentType::DrivingLicence),
            ("Government of Nepal", DocumentType::NepalIdentity),
            ("National Identity Card", DocumentType::GenericIdentity),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_id_and_type(text).document_type, expected, "{text}");
        }
    }

    #[test]
    fn test_ocr_pipe_noise_is_cleaned_before_matching() {
        let parsed = parse_id_and_type("REPUBL|C OF SINGAPORE");
        assert_eq!(parsed.document_type, DocumentType::SingaporeNric);
    }

    #[test]
    fn test_id_formats_checked_most_specific_first() {
        let text = "K7654321 1234 5678 9012 S1234567D";
        assert_eq!(extract_id_number(text).as_deref(), Some("S1234567D"));

        let text = "K7654321\n1234 5678 9012";
        assert_eq!(extract_id_number(text).as_deref(), Some("123456789012"));

        let text = "AB12CD34\nK7654321";
        assert_eq!(extract_id_number(text).as_deref(), Some("K7654321"));
    }

    #[test]
    fn test_non_ascii_digits_are_not_id_numbers() {
        let parsed = parse_id_and_type(
            "Government of India\n\u{0967}\u{0968}\u{0969}\u{096A} \u{096B}\u{096C}\u{096D}\u{096E} \u{096F}\u{0966}\u{0967}\u{0968}",
        );
        assert_eq!(parsed.document_type, DocumentType::Unknown);
        assert!(parsed.id_number.is_none());

        let parsed = parse_id_and_type(
            "Identity card\nS\u{0967}\u{0968}\u{0969}\u{096A}\u{096B}\u{096C}\u{096D}D",
        );
        assert_eq!(parsed.document_type, DocumentType::GenericIdentity);
        assert!(parsed.id_number.is_none());
    }

    #[test]
    fn test_generic_token_fallback() {
        let parsed = parse_id_and_type("Member card\nNo: AB12CD34");
        assert_eq!(parsed.document_type, DocumentType::Unknown);
        assert_eq!(parsed.id_number.as_deref(), Some("AB12CD34"));
    }
}

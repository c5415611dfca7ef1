//! Shared ID-format regexes and OCR text normalization.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    // Only called with the literals below; covered by test_all_patterns_compile.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

// ── ID-number formats ───────────────────────────────────────────────────────

/// Singapore NRIC/FIN: S, T, F or G + 7 digits + checksum letter.
pub static SG_NRIC: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\b([STFG][0-9]{7}[A-Z])\b"));

/// Aadhaar: 12 digits, optionally grouped 4-4-4 on one line.
pub static AADHAAR: Lazy<Regex> = Lazy::new(|| compile(r"\b[0-9]{4}[ \t]?[0-9]{4}[ \t]?[0-9]{4}\b"));

/// Passport number: letter (no I, O, Q, U, X, Z) + 7 digits.
pub static PASSPORT: Lazy<Regex> = Lazy::new(|| compile(r"\b([A-PR-WYa-pr-wy][0-9]{7})\b"));

/// PAN: 5 letters, 4 digits, 1 letter.
pub static PAN: Lazy<Regex> = Lazy::new(|| compile(r"\b([A-Z]{5}[0-9]{4}[A-Z])\b"));

/// Catch-all token for OCR text.
pub static GENERIC_ID: Lazy<Regex> = Lazy::new(|| compile(r"\b([A-Z0-9]{6,12})\b"));

// ── Serialized-JSON fallback formats ────────────────────────────────────────

pub static LOOSE_PASSPORT: Lazy<Regex> = Lazy::new(|| compile(r"\b([A-Z]{1,2}[0-9]{6,8})\b"));

pub static LOOSE_TOKEN: Lazy<Regex> = Lazy::new(|| compile(r"\b([A-Z0-9\-]{6,20})\b"));

// ── Document keywords ───────────────────────────────────────────────────────

pub static GOVERNMENT_OF_INDIA: Lazy<Regex> = Lazy::new(|| compile(r"(?i)government\s+of\s+india"));
pub static REPUBLIC_OF_SINGAPORE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)republic\s+of\s+singapore"));
pub static PASSPORT_KEYWORD: Lazy<Regex> = Lazy::new(|| compile(r"(?i)passport"));
pub static PERMANENT_ACCOUNT_NUMBER: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)permanent\s+account\s+number"));
pub static VOTER_ID: Lazy<Regex> = Lazy::new(|| compile(r"(?i)election\s+commission|voter\s+id"));
pub static DRIVING_LICENCE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)driving\s+licence|driver'?s\s+license"));
pub static NEPAL: Lazy<Regex> = Lazy::new(|| compile(r"(?i)nepal"));
pub static IDENTITY_CARD: Lazy<Regex> = Lazy::new(|| compile(r"(?i)identity\s*card"));
pub static PAN_WORD: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\bpan\b"));

// ── Normalization ───────────────────────────────────────────────────────────

static PIPES: Lazy<Regex> = Lazy::new(|| compile(r"\|+"));
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s{2,}"));

/// Clean one OCR line: `|` runs read as `I`, typographic dashes and quotes
/// become ASCII, repeated whitespace collapses.
pub fn clean_line(line: &str) -> String {
    let line = PIPES.replace_all(line, "I");
    let line: String = line
        .chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    MULTI_SPACE.replace_all(&line, " ").trim().to_string()
}

/// Split raw OCR text into cleaned, non-empty lines, dropping MRZ filler
/// lines (anything containing `<`).
pub fn normalize_lines(raw: &str) -> Vec<String> {
    raw.replace('\r', "")
        .split('\n')
        .map(clean_line)
        .filter(|l| !l.is_empty() && !l.contains('<'))
        .collect()
}

/// Whole text with every line cleaned and none dropped. Pattern detection
/// runs on this so MRZ lines still contribute.
pub fn clean_text(raw: &str) -> String {
    raw.replace('\r', "")
        .split('\n')
        .map(clean_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of a JSON scalar if it carries a usable value: non-blank strings
/// (trimmed) and numbers. Everything else counts as absent.
pub fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_patterns_compile() {
        for re in [
            &SG_NRIC,
            &AADHAAR,
            &PASSPORT,
            &PAN,
            &GENERIC_ID,
            &LOOSE_PASSPORT,
            &LOOSE_TOKEN,
            &GOVERNMENT_OF_INDIA,
            &REPUBLIC_OF_SINGAPORE,
            &PASSPORT_KEYWORD,
            &PERMANENT_ACCOUNT_NUMBER,
            &VOTER_ID,
            &DRIVING_LICENCE,
            &NEPAL,
            &IDENTITY_CARD,
            &PAN_WORD,
        ] {
            Lazy::force(re);
        }
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line("  ||NDIA   GOVT  "), "INDIA GOVT");
        assert_eq!(clean_line("DOB \u{2013} 01/01/1990"), "DOB - 01/01/1990");
        assert_eq!(clean_line("\u{201C}A\u{201D} driver\u{2019}s"), "\"A\" driver's");
    }

    #[test]
    fn test_normalize_lines_drops_mrz_and_blank_lines() {
        let raw = "PASSPORT\r\n\r\nP<GBRSMITH<<JOHN<<<\nName  SMITH\n";
        assert_eq!(normalize_lines(raw), vec!["PASSPORT", "Name SMITH"]);
    }

    #[test]
    fn test_clean_text_keeps_mrz_lines() {
        let raw = "PASSPORT\nK1234567<0GBR";
        assert_eq!(clean_text(raw), "PASSPORT\nK1234567<0GBR");
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("  Alice ")), Some("Alice".to_string()));
        assert_eq!(scalar_text(&json!("   ")), None);
        assert_eq!(scalar_text(&json!(12345)), Some("12345".to_string()));
        assert_eq!(scalar_text(&json!(null)), None);
        assert_eq!(scalar_text(&json!({"a": 1})), None);
    }

    #[test]
    fn test_aadhaar_grouping() {
        assert!(AADHAAR.is_match("1234 5678 9012"));
        assert!(AADHAAR.is_match("123456789012"));
        assert!(!AADHAAR.is_match("1234 5678 901"));
        assert!(!AADHAAR.is_match("1990\n1234 5678"));
    }

    #[test]
    fn test_only_ascii_digits_count() {
        assert!(!AADHAAR.is_match("\u{0967}\u{0968}\u{0969}\u{096A} \u{096B}\u{096C}\u{096D}\u{096E} \u{096F}\u{0966}\u{0967}\u{0968}"));
        assert!(!SG_NRIC.is_match("S\u{0661}\u{0662}\u{0663}\u{0664}\u{0665}\u{0666}\u{0667}D"));
        assert!(!LOOSE_PASSPORT.is_match("K\u{0967}\u{0968}\u{0969}\u{096A}\u{096B}\u{096C}\u{096D}"));
        assert!(SG_NRIC.is_match("S1234567D"));
    }

    #[test]
    fn test_passport_excludes_letters() {
        assert!(PASSPORT.is_match("K1234567"));
        assert!(!PASSPORT.is_match("Q1234567"));
        assert!(!PASSPORT.is_match("X1234567"));
    }
}

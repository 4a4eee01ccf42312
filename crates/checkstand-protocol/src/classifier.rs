//! Payload classification for scan frames.
//!
//! A scanner that reads both retail barcodes and identity cards delivers all
//! of them on the same byte stream. Each frame is assigned to exactly one
//! route using a prioritized list of independent predicates:
//!
//! | Priority | Rule | Result |
//! |----------|------|--------|
//! | 1 | all digits, length 8/12/13/14 | [`ClassifiedPayload::RetailBarcode`] |
//! | 2 | header marker, or 2+ field tags in the prefix | [`ClassifiedPayload::IdentityRecord`] |
//! | 3 | single-line license-like code | [`DiscardReason::AmbiguousLicenseLike`] |
//! | 4 | any other non-empty text | [`ClassifiedPayload::Unclassified`] |
//! | 5 | nothing left after cleaning | [`DiscardReason::Empty`] |
//!
//! Ambiguous frames are discarded rather than guessed: forwarding a license
//! number to retail lookup is worse than dropping the scan.
//!
//! # Examples
//!
//! ```
//! use checkstand_protocol::{ClassifiedPayload, DiscardReason, classify_bytes};
//!
//! assert!(matches!(classify_bytes(b"12345670"), ClassifiedPayload::RetailBarcode(_)));
//! assert!(matches!(
//!     classify_bytes(b"D123456789CA01"),
//!     ClassifiedPayload::Discarded(DiscardReason::AmbiguousLicenseLike(_))
//! ));
//! assert!(matches!(classify_bytes(b"ORDER-1234"), ClassifiedPayload::Unclassified(_)));
//! assert_eq!(classify_bytes(b"\r\n"), ClassifiedPayload::Discarded(DiscardReason::Empty));
//! ```

use bytes::Bytes;
use checkstand_core::constants::{
    HEADER_MARKER, IDENTITY_PROBE_TAGS, IDENTITY_PROBE_WINDOW, IDENTITY_TAG_THRESHOLD,
    LICENSE_LIKE_DIGIT_RUN, LICENSE_LIKE_MAX_LENGTH, LICENSE_LIKE_MIN_LENGTH,
    RETAIL_BARCODE_LENGTHS,
};
use checkstand_core::issuers::us_jurisdiction_abbreviations;
use std::fmt;

use crate::decode::decode_payload_text;
use crate::frame::ScanFrame;

/// Result of classifying one scan frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedPayload {
    /// Numeric retail barcode, cleaned of whitespace and line endings.
    RetailBarcode(String),

    /// Any other code; routed like a retail barcode.
    Unclassified(String),

    /// Raw bytes of a structured identity record.
    IdentityRecord(Bytes),

    /// Frame dropped without being forwarded.
    Discarded(DiscardReason),
}

impl ClassifiedPayload {
    /// Code to hand to retail lookup, if this payload is routed there.
    pub fn barcode(&self) -> Option<&str> {
        match self {
            ClassifiedPayload::RetailBarcode(code) | ClassifiedPayload::Unclassified(code) => {
                Some(code)
            }
            _ => None,
        }
    }

    /// Returns `true` if this payload is an identity record.
    pub fn is_identity_record(&self) -> bool {
        matches!(self, ClassifiedPayload::IdentityRecord(_))
    }

    /// Returns `true` if the frame was discarded.
    pub fn is_discarded(&self) -> bool {
        matches!(self, ClassifiedPayload::Discarded(_))
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifiedPayload::RetailBarcode(_) => "retail_barcode",
            ClassifiedPayload::Unclassified(_) => "unclassified",
            ClassifiedPayload::IdentityRecord(_) => "identity_record",
            ClassifiedPayload::Discarded(_) => "discarded",
        }
    }
}

/// Why a frame was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// Nothing left after stripping whitespace and line endings.
    Empty,

    /// Single-line code that looks like a license number.
    AmbiguousLicenseLike(String),
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::Empty => write!(f, "empty payload"),
            DiscardReason::AmbiguousLicenseLike(code) => {
                write!(f, "likely 1D license scan: {code}")
            }
        }
    }
}

/// Classify a scan frame, consuming it.
pub fn classify(frame: ScanFrame) -> ClassifiedPayload {
    let decoded = decode_payload_text(frame.as_bytes());
    classify_decoded(&decoded.text, frame.into_bytes())
}

/// Classify raw scan bytes.
pub fn classify_bytes(bytes: &[u8]) -> ClassifiedPayload {
    let decoded = decode_payload_text(bytes);
    classify_decoded(&decoded.text, Bytes::copy_from_slice(bytes))
}

fn classify_decoded(text: &str, raw: Bytes) -> ClassifiedPayload {
    let cleaned = clean_text(text);

    if is_probable_retail_barcode(&cleaned) {
        return ClassifiedPayload::RetailBarcode(cleaned);
    }

    if is_identity_payload(text) {
        return ClassifiedPayload::IdentityRecord(raw);
    }

    if looks_like_1d_license(&cleaned) {
        return ClassifiedPayload::Discarded(DiscardReason::AmbiguousLicenseLike(cleaned));
    }

    if cleaned.is_empty() {
        return ClassifiedPayload::Discarded(DiscardReason::Empty);
    }

    ClassifiedPayload::Unclassified(cleaned)
}

/// Strip surrounding whitespace and separator controls (FS, GS, RS, US),
/// then every CR / LF.
fn clean_text(text: &str) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect()
}

/// Rule 1: digits only with a retail barcode length.
///
/// # Examples
///
/// ```
/// use checkstand_protocol::is_probable_retail_barcode;
///
/// assert!(is_probable_retail_barcode("012345678905"));
/// assert!(!is_probable_retail_barcode("0123456789"));
/// assert!(!is_probable_retail_barcode("01234567890A"));
/// ```
pub fn is_probable_retail_barcode(cleaned: &str) -> bool {
    RETAIL_BARCODE_LENGTHS.contains(&cleaned.len())
        && cleaned.bytes().all(|b| b.is_ascii_digit())
}

/// Rule 2: header marker or enough field tags in the prefix.
///
/// Only the first [`IDENTITY_PROBE_WINDOW`] characters are inspected, case
/// insensitively.
pub fn is_identity_payload(decoded: &str) -> bool {
    let head: String = decoded
        .chars()
        .take(IDENTITY_PROBE_WINDOW)
        .collect::<String>()
        .to_uppercase();

    if head.contains(HEADER_MARKER) {
        return true;
    }

    let tags = IDENTITY_PROBE_TAGS
        .iter()
        .filter(|tag| head.contains(*tag))
        .count();

    tags >= IDENTITY_TAG_THRESHOLD
}

/// Rule 3: single-line code shaped like a license number.
///
/// All of the following must hold for the trimmed, uppercased text:
/// - 10 to 24 characters, ASCII letters and digits only
/// - at least one letter and one digit
/// - a run of at least 6 consecutive digits
/// - contains a US jurisdiction abbreviation
/// - 3+ digits followed by 2 letters and 2+ more characters, or
///   2 letters followed by 5+ digits
///
/// # Examples
///
/// ```
/// use checkstand_protocol::looks_like_1d_license;
///
/// assert!(looks_like_1d_license("123456789CA01"));
/// assert!(looks_like_1d_license("NY1234567X"));
/// assert!(!looks_like_1d_license("ABCDEFGHIJK"));
/// ```
pub fn looks_like_1d_license(cleaned: &str) -> bool {
    let upper = cleaned.trim().to_ascii_uppercase();
    let bytes = upper.as_bytes();

    if !(LICENSE_LIKE_MIN_LENGTH..=LICENSE_LIKE_MAX_LENGTH).contains(&bytes.len()) {
        return false;
    }

    if !bytes.iter().all(u8::is_ascii_alphanumeric) {
        return false;
    }

    if !bytes.iter().any(u8::is_ascii_alphabetic) || !bytes.iter().any(u8::is_ascii_digit) {
        return false;
    }

    if longest_digit_run(bytes) < LICENSE_LIKE_DIGIT_RUN {
        return false;
    }

    if !us_jurisdiction_abbreviations()
        .iter()
        .any(|abbr| upper.contains(abbr))
    {
        return false;
    }

    has_digits_then_letter_pair(bytes) || has_letter_pair_then_digits(bytes)
}

fn longest_digit_run(bytes: &[u8]) -> usize {
    bytes
        .split(|b| !b.is_ascii_digit())
        .map(<[u8]>::len)
        .max()
        .unwrap_or(0)
}

/// `\d{3,}[A-Z]{2}[A-Z0-9]{2,}` anywhere in the code.
fn has_digits_then_letter_pair(bytes: &[u8]) -> bool {
    (3..bytes.len()).any(|i| {
        i + 4 <= bytes.len()
            && bytes[i - 3..i].iter().all(u8::is_ascii_digit)
            && bytes[i..i + 2].iter().all(u8::is_ascii_uppercase)
    })
}

/// `[A-Z]{2}\d{5,}` anywhere in the code.
fn has_letter_pair_then_digits(bytes: &[u8]) -> bool {
    (0..bytes.len()).any(|i| {
        i + 7 <= bytes.len()
            && bytes[i..i + 2].iter().all(u8::is_ascii_uppercase)
            && bytes[i + 2..i + 7].iter().all(u8::is_ascii_digit)
    })
}

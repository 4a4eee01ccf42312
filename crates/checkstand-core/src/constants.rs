//! Core constants for scan capture and identity record handling.
//!
//! This module centralizes the numeric and textual constants shared by the
//! capture loop, the payload classifier, the identity record parser and the
//! decision engine. Keeping them in one place makes the heuristics auditable:
//! every threshold the pipeline relies on is listed here with its default.
//!
//! # Identity Record Layout
//!
//! Driver's-license-class credentials encode a structured record with a
//! versioned header followed by labeled fields:
//!
//! ```text
//! @<LF><RS><CR>ANSI 636014 09 01 01 DL00410278 DLDAQD1234567<LF>DCSDOE<LF>...
//! ^^^^^^^^^^^^ ^^^^ ^^^^^^ ^^ ^^ ^^ ^^^^^^^^^^ ^^^^^^^^^^^^^^
//! compliance   marker  IIN ver jur n  designator  subfile + elements
//! ```
//!
//! # Usage
//!
//! ```
//! use checkstand_core::constants::*;
//!
//! assert_eq!(HEADER_MARKER, "ANSI ");
//! assert!(RETAIL_BARCODE_LENGTHS.contains(&13));
//! assert_eq!(MINIMUM_AGE, 21);
//! ```

// ============================================================================
// Frame Assembly
// ============================================================================

/// Default idle gap that closes a scan frame (milliseconds).
///
/// The scanner emits each scan as a contiguous burst of bytes with no
/// in-band terminator. A silence of at least this long ends the burst.
pub const DEFAULT_IDLE_THRESHOLD_MS: u64 = 30;

/// Default timeout for a single device read (milliseconds).
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5;

/// Default sleep between idle polls when no bytes arrived (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1;

/// Default backoff after a transient device read error (milliseconds).
pub const DEFAULT_ERROR_BACKOFF_MS: u64 = 50;

/// Default size of the buffer handed to each device read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// Upper bound for a single frame.
///
/// Identity records are a few kilobytes at most. A buffer that grows past
/// this limit is closed as a frame immediately instead of growing without
/// bound on a noisy line.
pub const MAX_FRAME_SIZE: usize = 64 * 1024; // 64 KB

// ============================================================================
// Payload Classification
// ============================================================================

/// Lengths accepted for numeric retail barcodes.
///
/// Covers EAN-8, UPC-A, EAN-13 and GTIN-14.
pub const RETAIL_BARCODE_LENGTHS: [usize; 4] = [8, 12, 13, 14];

/// Number of leading characters inspected when probing for an identity record.
pub const IDENTITY_PROBE_WINDOW: usize = 200;

/// Minimum number of distinct field tags that marks a payload as an identity record.
pub const IDENTITY_TAG_THRESHOLD: usize = 2;

/// Field tags used to recognize identity records without a header.
pub const IDENTITY_PROBE_TAGS: [&str; 9] = [
    "DAQ", "DCS", "DBB", "DBD", "DAU", "DAG", "DAI", "DAJ", "DCG",
];

/// Length bounds for single-line license-like codes that are discarded.
pub const LICENSE_LIKE_MIN_LENGTH: usize = 10;
pub const LICENSE_LIKE_MAX_LENGTH: usize = 24;

/// Minimum run of consecutive digits in a license-like code.
pub const LICENSE_LIKE_DIGIT_RUN: usize = 6;

// ============================================================================
// Identity Record Header
// ============================================================================

/// Literal file-type token that opens an identity record header.
pub const HEADER_MARKER: &str = "ANSI ";

/// Compliance indicator that may precede the header marker.
pub const COMPLIANCE_INDICATOR: char = '@';

/// Number of leading characters searched for the header.
pub const HEADER_SEARCH_WINDOW: usize = 256;

/// Issuer identification number length.
pub const ISSUER_CODE_LENGTH: usize = 6;

/// Inclusive range for the standard and jurisdiction version numbers.
pub const MAX_VERSION_NUMBER: u8 = 99;

/// Length of one entry in the subfile designator table.
///
/// Two-character subfile type, four-digit offset, four-digit length.
pub const SUBFILE_DESIGNATOR_LENGTH: usize = 10;

/// Subfile types that carry the license or ID elements.
pub const SUBFILE_TYPES: [&str; 3] = ["DL", "ID", "EN"];

/// Record separator (RS) control character.
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Group separator (GS) control character.
pub const GROUP_SEPARATOR: char = '\u{1d}';

/// Element code length.
pub const ELEMENT_CODE_LENGTH: usize = 3;

// ============================================================================
// Element Codes
// ============================================================================

/// Customer ID number (license number).
pub const ELEMENT_LICENSE_NUMBER: &str = "DAQ";

/// Customer family name.
pub const ELEMENT_LAST_NAME: &str = "DCS";

/// Customer first name.
pub const ELEMENT_FIRST_NAME: &str = "DAC";

/// Date of birth.
pub const ELEMENT_DATE_OF_BIRTH: &str = "DBB";

/// Document expiration date.
pub const ELEMENT_EXPIRATION_DATE: &str = "DBA";

/// Document issue date.
pub const ELEMENT_ISSUE_DATE: &str = "DBD";

/// Address street line.
pub const ELEMENT_STREET: &str = "DAG";

/// Address city.
pub const ELEMENT_CITY: &str = "DAI";

/// Address jurisdiction code.
pub const ELEMENT_ADDRESS_JURISDICTION: &str = "DAJ";

/// Address postal code.
pub const ELEMENT_POSTAL_CODE: &str = "DAK";

/// Country identification.
pub const ELEMENT_COUNTRY: &str = "DCG";

/// Compliance type.
pub const ELEMENT_COMPLIANCE_TYPE: &str = "DDA";

/// Elements that must be present for a structurally clean record.
pub const MANDATORY_ELEMENTS: [&str; 3] = [
    ELEMENT_LICENSE_NUMBER,
    ELEMENT_LAST_NAME,
    ELEMENT_DATE_OF_BIRTH,
];

/// Mandatory elements re-checked by the decision engine.
pub const DECISION_REQUIRED_ELEMENTS: [&str; 2] = [ELEMENT_LICENSE_NUMBER, ELEMENT_LAST_NAME];

/// Placeholder values issuers write instead of leaving a field empty.
pub const MISSING_VALUE_PLACEHOLDERS: [&str; 3] = ["NONE", "UNAVL", "UNAVL."];

// ============================================================================
// Decision Policy
// ============================================================================

/// Minimum age for approval.
pub const MINIMUM_AGE: u32 = 21;

/// Ages above this are flagged as implausible.
pub const MAX_PLAUSIBLE_AGE: u32 = 120;

/// Postal code digit counts accepted without a flag (ZIP and ZIP+4).
pub const POSTAL_CODE_DIGIT_COUNTS: [usize; 2] = [5, 9];

// ============================================================================
// Data Validation
// ============================================================================

/// Check whether a field value is effectively missing.
///
/// Empty strings and issuer placeholders such as `NONE` count as missing.
///
/// # Examples
///
/// ```
/// use checkstand_core::constants::is_effectively_missing;
///
/// assert!(is_effectively_missing(None));
/// assert!(is_effectively_missing(Some("  ")));
/// assert!(is_effectively_missing(Some("unavl")));
/// assert!(!is_effectively_missing(Some("D1234567")));
/// ```
pub fn is_effectively_missing(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => true,
        Some(v) => {
            let upper = v.to_ascii_uppercase();
            MISSING_VALUE_PLACEHOLDERS.contains(&upper.as_str())
        }
    }
}

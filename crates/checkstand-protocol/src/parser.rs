//! Identity record parser.
//!
//! Converts the payload of a frame classified as an identity record into a
//! [`ParsedIdentityRecord`]. Parsing never fails: every structural problem is
//! appended to the record's error list and the caller decides what to do
//! with a record that is not `ok`.
//!
//! # Record Layout
//!
//! ```text
//! @<LF><RS><CR>ANSI 636014090001DL00410278DLDAQD1234567<LF>DCSDOE<LF>...<CR>
//! │            │    │     │ │ │ └ designator table (type, offset, length)
//! │            │    │     │ │ └── subfile count (optional)
//! │            │    │     │ └──── jurisdiction version
//! │            │    │     └────── standard version
//! │            │    └──────────── issuer code
//! │            └───────────────── header marker
//! └────────────────────────────── compliance indicator (optional)
//! ```
//!
//! The body is a list of element records separated by RS, GS, CR or LF.
//! Issuers use two conventions for element records, and both are accepted:
//!
//! - subfile-prefixed: `DLDAQD1234567` (designator + element code + value)
//! - bare: `DAQD1234567` (element code + value)
//!
//! The first occurrence of an element code wins.
//!
//! # Examples
//!
//! ```
//! use checkstand_protocol::parse_identity_record;
//!
//! let raw = b"@\n\x1e\rANSI 636014090001DL00310046DLDAQD1234567\nDCSDOE\nDBB01151990\r";
//! let record = parse_identity_record(raw);
//!
//! assert!(record.ok());
//! assert_eq!(record.issuer_name(), Some("California"));
//! assert_eq!(record.field("DAQ"), Some("D1234567"));
//! assert_eq!(record.field("DBB"), Some("01151990"));
//! ```
//!
//! ```
//! use checkstand_protocol::parse_identity_record;
//!
//! let record = parse_identity_record(b"DAQD1234567\nDCSDOE");
//! assert!(!record.ok());
//! assert_eq!(record.errors(), ["Malformed or missing header"]);
//! assert!(record.fields().is_empty());
//! ```

use checkstand_core::IssuerCode;
use checkstand_core::IssuerTable;
use checkstand_core::constants::{
    COMPLIANCE_INDICATOR, ELEMENT_CODE_LENGTH, ELEMENT_DATE_OF_BIRTH, GROUP_SEPARATOR,
    HEADER_MARKER, HEADER_SEARCH_WINDOW, ISSUER_CODE_LENGTH, MANDATORY_ELEMENTS,
    MAX_VERSION_NUMBER, RECORD_SEPARATOR, SUBFILE_DESIGNATOR_LENGTH, SUBFILE_TYPES,
    is_effectively_missing,
};
use std::collections::BTreeMap;

use crate::decode::decode_payload_text;
use crate::record::{ParsedIdentityRecord, RecordHeader, SubfileDesignator};

const ERR_MISSING_HEADER: &str = "Malformed or missing header";

/// Characters that separate element records in the body.
const RECORD_DELIMITERS: [char; 4] = [RECORD_SEPARATOR, GROUP_SEPARATOR, '\r', '\n'];

/// Control characters allowed between the compliance indicator and the marker.
const PREFIX_CONTROLS: [char; 3] = ['\n', RECORD_SEPARATOR, '\r'];

const VERSION_DIGITS: usize = 2;
const SUBFILE_COUNT_DIGITS: usize = 2;
const DESIGNATOR_FIELD_DIGITS: usize = 4;

/// Parser for identity records.
///
/// Holds a reference to the issuer table used to resolve the header's issuer
/// code. The parser is stateless otherwise and can be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct IdentityRecordParser {
    issuers: &'static IssuerTable,
}

impl IdentityRecordParser {
    /// Create a parser backed by the standard issuer table.
    pub fn new() -> Self {
        Self::with_issuers(IssuerTable::standard())
    }

    /// Create a parser backed by a specific issuer table.
    pub fn with_issuers(issuers: &'static IssuerTable) -> Self {
        Self { issuers }
    }

    /// Parse raw payload bytes.
    ///
    /// Bytes are decoded with the two-step UTF-8 / Windows-1252 probe before
    /// parsing.
    pub fn parse(&self, bytes: &[u8]) -> ParsedIdentityRecord {
        let decoded = decode_payload_text(bytes);
        self.parse_text(&decoded.text)
    }

    /// Parse already decoded payload text.
    ///
    /// # Error Accumulation
    ///
    /// Errors are appended in this order:
    /// 1. missing header (parsing stops here)
    /// 2. version numbers out of range
    /// 3. `Missing field <code>` for each absent mandatory element
    /// 4. `DBB not 8 digits`
    /// 5. `Unknown issuer IIN <code>`
    pub fn parse_text(&self, text: &str) -> ParsedIdentityRecord {
        let Some(header) = RecordHeader::find(text) else {
            return ParsedIdentityRecord::without_header(vec![ERR_MISSING_HEADER.to_string()]);
        };

        let mut errors = Vec::new();

        if header.standard_version > MAX_VERSION_NUMBER {
            errors.push(format!(
                "Standard version out of range: {}",
                header.standard_version
            ));
        }
        if header.jurisdiction_version > MAX_VERSION_NUMBER {
            errors.push(format!(
                "Jurisdiction version out of range: {}",
                header.jurisdiction_version
            ));
        }

        let body = skip_to_subfile_start(&text[header.end..]);
        let fields = parse_elements(body);

        for code in MANDATORY_ELEMENTS {
            if is_effectively_missing(fields.get(code).map(String::as_str)) {
                errors.push(format!("Missing field {code}"));
            }
        }

        if let Some(dob) = fields
            .get(ELEMENT_DATE_OF_BIRTH)
            .filter(|value| !is_effectively_missing(Some(value.as_str())))
        {
            let digits = dob.chars().filter(char::is_ascii_digit).count();
            if digits != 8 {
                errors.push(format!("{ELEMENT_DATE_OF_BIRTH} not 8 digits"));
            }
        }

        let jurisdiction = self.issuers.lookup(header.issuer_code.as_str());
        if jurisdiction.is_none() {
            errors.push(format!("Unknown issuer IIN {}", header.issuer_code));
        }

        ParsedIdentityRecord::from_parts(header, jurisdiction, fields, errors)
    }
}

impl Default for IdentityRecordParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse raw payload bytes with the standard issuer table.
pub fn parse_identity_record(bytes: &[u8]) -> ParsedIdentityRecord {
    IdentityRecordParser::new().parse(bytes)
}

impl RecordHeader {
    /// Locate the header within the first 256 characters of `text`.
    ///
    /// Every occurrence of the marker inside the window is tried in order;
    /// the first one followed by the issuer code and both version numbers
    /// wins.
    ///
    /// ```
    /// use checkstand_protocol::RecordHeader;
    ///
    /// let header = RecordHeader::find("@\n\x1e\rANSI 6360150801DL...").unwrap();
    /// assert!(header.compliance_prefix);
    /// assert_eq!(header.issuer_code.as_str(), "636015");
    /// assert_eq!(header.standard_version, 8);
    /// assert_eq!(header.jurisdiction_version, 1);
    /// assert_eq!(header.subfile_count, None);
    /// ```
    pub fn find(text: &str) -> Option<RecordHeader> {
        let window_end = text
            .char_indices()
            .nth(HEADER_SEARCH_WINDOW)
            .map_or(text.len(), |(idx, _)| idx);

        text.match_indices(HEADER_MARKER)
            .take_while(|(idx, _)| *idx < window_end)
            .find_map(|(idx, _)| Self::parse_at(text, idx))
    }

    fn parse_at(text: &str, marker_at: usize) -> Option<RecordHeader> {
        let mut pos = marker_at + HEADER_MARKER.len();

        let issuer_code = IssuerCode::new(take_digits(text, &mut pos, ISSUER_CODE_LENGTH)?).ok()?;
        let standard_version = take_digits(text, &mut pos, VERSION_DIGITS)?.parse().ok()?;
        let jurisdiction_version = take_digits(text, &mut pos, VERSION_DIGITS)?.parse().ok()?;
        let subfile_count = take_digits(text, &mut pos, SUBFILE_COUNT_DIGITS)
            .and_then(|digits| digits.parse::<u8>().ok());

        let mut subfiles = Vec::new();
        for _ in 0..subfile_count.unwrap_or(0) {
            let Some(designator) = text
                .get(pos..pos + SUBFILE_DESIGNATOR_LENGTH)
                .and_then(parse_designator)
            else {
                break;
            };
            subfiles.push(designator);
            pos += SUBFILE_DESIGNATOR_LENGTH;
        }

        let before = text[..marker_at].trim_end_matches(PREFIX_CONTROLS);
        let compliance_prefix = before.ends_with(COMPLIANCE_INDICATOR);
        let start = if compliance_prefix {
            before.len() - COMPLIANCE_INDICATOR.len_utf8()
        } else {
            marker_at
        };

        Some(RecordHeader {
            compliance_prefix,
            issuer_code,
            standard_version,
            jurisdiction_version,
            subfile_count,
            subfiles,
            start,
            end: pos,
        })
    }
}

/// Take `n` ASCII digits at `pos`, advancing only on success.
fn take_digits<'a>(text: &'a str, pos: &mut usize, n: usize) -> Option<&'a str> {
    let digits = text.get(*pos..*pos + n)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    *pos += n;
    Some(digits)
}

/// Decode one 10-character designator: type (2) + offset (4) + length (4).
fn parse_designator(entry: &str) -> Option<SubfileDesignator> {
    let subfile_type = entry.get(..2)?;
    if !subfile_type
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return None;
    }

    let mut pos = 2;
    let offset = take_digits(entry, &mut pos, DESIGNATOR_FIELD_DIGITS)?.parse().ok()?;
    let length = take_digits(entry, &mut pos, DESIGNATOR_FIELD_DIGITS)?.parse().ok()?;

    Some(SubfileDesignator {
        subfile_type: subfile_type.to_string(),
        offset,
        length,
    })
}

/// `true` if `bytes` starts with a subfile type followed by an element code.
fn is_subfile_start(bytes: &[u8]) -> bool {
    bytes.len() >= 2 + ELEMENT_CODE_LENGTH
        && SUBFILE_TYPES.iter().any(|t| bytes.starts_with(t.as_bytes()))
        && bytes[2..2 + ELEMENT_CODE_LENGTH]
            .iter()
            .all(u8::is_ascii_uppercase)
}

/// Advance to the first subfile start inside the first body record.
///
/// A body that already opens with an element is left alone, and later
/// records are not searched: values such as `DCSGLENDALE` or `DCSDAVIDSON`
/// contain `ENDAL` and `IDSON` and must not be mistaken for a subfile start.
fn skip_to_subfile_start(body: &str) -> &str {
    let bytes = body.as_bytes();
    if starts_with_element_code(bytes) {
        return body;
    }

    let first_record_end = body.find(RECORD_DELIMITERS).unwrap_or(body.len());

    (0..first_record_end)
        .find(|&i| is_subfile_start(&bytes[i..]))
        .map_or(body, |i| &body[i..])
}

fn starts_with_element_code(bytes: &[u8]) -> bool {
    bytes.len() >= ELEMENT_CODE_LENGTH
        && bytes[..ELEMENT_CODE_LENGTH]
            .iter()
            .all(u8::is_ascii_uppercase)
}

/// Split the body into element records, first occurrence wins.
fn parse_elements(body: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for record in body.split(RECORD_DELIMITERS) {
        let record = record.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        if record.is_empty() {
            continue;
        }

        if let Some((code, value)) = split_element(record) {
            fields
                .entry(code.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    fields
}

fn split_element(record: &str) -> Option<(&str, &str)> {
    let bytes = record.as_bytes();

    if is_subfile_start(bytes) {
        return Some((&record[2..5], record[5..].trim()));
    }

    if starts_with_element_code(bytes) {
        return Some((
            &record[..ELEMENT_CODE_LENGTH],
            record[ELEMENT_CODE_LENGTH..].trim(),
        ));
    }

    None
}

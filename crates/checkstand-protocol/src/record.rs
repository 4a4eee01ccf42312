use checkstand_core::constants::is_effectively_missing;
use checkstand_core::{IssuerCode, Jurisdiction};
use serde::Serialize;
use std::collections::BTreeMap;

/// Entry of the subfile designator table that follows the header.
///
/// Informational only. Issuers disagree on how offsets are counted, so the
/// parser never uses them to slice the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubfileDesignator {
    /// Two-character subfile type (e.g., "DL").
    pub subfile_type: String,

    /// Offset of the subfile as written by the issuer.
    pub offset: u16,

    /// Length of the subfile in bytes.
    pub length: u16,
}

/// Fixed header of an identity record.
///
/// ```text
/// @ LF RS CR  "ANSI "  IIIIII  VV  JJ  [NN  [designator x NN]]
/// └─optional┘  marker  issuer  ver jur  count
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    /// `true` if the `@` compliance indicator precedes the marker.
    pub compliance_prefix: bool,

    /// Six-digit issuer identification number.
    pub issuer_code: IssuerCode,

    /// Standard version number.
    pub standard_version: u8,

    /// Jurisdiction version number.
    pub jurisdiction_version: u8,

    /// Number of subfile entries, when present.
    pub subfile_count: Option<u8>,

    /// Designators decoded from the table after the header.
    pub subfiles: Vec<SubfileDesignator>,

    /// Byte offset in the decoded text where the header starts.
    pub start: usize,

    /// Byte offset in the decoded text just past the header.
    pub end: usize,
}

/// Structured result of parsing an identity record.
///
/// Never mutated after construction. `ok` is `true` iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedIdentityRecord {
    ok: bool,
    errors: Vec<String>,
    issuer_code: Option<IssuerCode>,
    issuer_name: Option<String>,
    country: Option<String>,
    standard_version: Option<u8>,
    jurisdiction_version: Option<u8>,
    subfile_count: Option<u8>,
    subfiles: Vec<SubfileDesignator>,
    fields: BTreeMap<String, String>,
}

impl ParsedIdentityRecord {
    /// Record for a payload whose header could not be located.
    pub(crate) fn without_header(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
            issuer_code: None,
            issuer_name: None,
            country: None,
            standard_version: None,
            jurisdiction_version: None,
            subfile_count: None,
            subfiles: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Assemble a record from a parsed header and body.
    pub(crate) fn from_parts(
        header: RecordHeader,
        jurisdiction: Option<Jurisdiction>,
        fields: BTreeMap<String, String>,
        errors: Vec<String>,
    ) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
            issuer_code: Some(header.issuer_code),
            issuer_name: jurisdiction.map(|j| j.name.to_string()),
            country: jurisdiction.map(|j| j.country.to_string()),
            standard_version: Some(header.standard_version),
            jurisdiction_version: Some(header.jurisdiction_version),
            subfile_count: header.subfile_count,
            subfiles: header.subfiles,
            fields,
        }
    }

    /// Returns `true` if no structural errors were recorded.
    pub fn ok(&self) -> bool {
        self.ok
    }

    /// Structural errors in the order they were found.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn issuer_code(&self) -> Option<&IssuerCode> {
        self.issuer_code.as_ref()
    }

    pub fn issuer_name(&self) -> Option<&str> {
        self.issuer_name.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn standard_version(&self) -> Option<u8> {
        self.standard_version
    }

    pub fn jurisdiction_version(&self) -> Option<u8> {
        self.jurisdiction_version
    }

    pub fn subfile_count(&self) -> Option<u8> {
        self.subfile_count
    }

    pub fn subfiles(&self) -> &[SubfileDesignator] {
        &self.subfiles
    }

    /// All element values keyed by 3-character element code.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Raw value of an element.
    pub fn field(&self, code: &str) -> Option<&str> {
        self.fields.get(code).map(String::as_str)
    }

    /// Trimmed value of an element, or `None` if it is effectively missing.
    ///
    /// Placeholders such as `NONE` or `UNAVL` count as missing.
    pub fn present_field(&self, code: &str) -> Option<&str> {
        let value = self.field(code)?;
        if is_effectively_missing(Some(value)) {
            None
        } else {
            Some(value.trim())
        }
    }

    /// Returns `true` if the issuer resolved in the reference table.
    pub fn issuer_resolved(&self) -> bool {
        self.issuer_name.is_some()
    }
}

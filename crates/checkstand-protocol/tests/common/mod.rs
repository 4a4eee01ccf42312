//! Common test utilities for integration tests.
//!
//! Provides a builder for synthetic identity records so tests can describe a
//! card by its elements instead of hand-writing control characters.
//!
//! ```ignore
//! use crate::common::IdentityRecordBuilder;
//!
//! let raw = IdentityRecordBuilder::new()
//!     .issuer("636015")
//!     .element("DAQ", "12345678")
//!     .build();
//! ```

#![allow(dead_code)]

/// Issuer code for California, resolves in the standard table.
pub const CALIFORNIA_IIN: &str = "636014";

/// Issuer code with no entry in the standard table.
pub const UNMAPPED_IIN: &str = "999999";

/// Builder for synthetic identity record payloads.
#[derive(Debug, Clone)]
pub struct IdentityRecordBuilder {
    issuer: String,
    standard_version: u8,
    jurisdiction_version: u8,
    compliance_prefix: bool,
    subfile_prefixed: bool,
    elements: Vec<(String, String)>,
}

impl IdentityRecordBuilder {
    /// California record with only the header and no elements.
    pub fn new() -> Self {
        Self {
            issuer: CALIFORNIA_IIN.to_string(),
            standard_version: 9,
            jurisdiction_version: 0,
            compliance_prefix: true,
            subfile_prefixed: true,
            elements: Vec::new(),
        }
    }

    /// Record with the three mandatory elements populated.
    pub fn valid() -> Self {
        Self::new()
            .element("DAQ", "D1234567")
            .element("DCS", "DOE")
            .element("DAC", "JANE")
            .element("DBB", "01151990")
            .element("DAJ", "CA")
    }

    pub fn issuer(mut self, code: &str) -> Self {
        self.issuer = code.to_string();
        self
    }

    pub fn versions(mut self, standard: u8, jurisdiction: u8) -> Self {
        self.standard_version = standard;
        self.jurisdiction_version = jurisdiction;
        self
    }

    pub fn without_compliance_prefix(mut self) -> Self {
        self.compliance_prefix = false;
        self
    }

    /// Write elements without the subfile designator prefix.
    pub fn bare_elements(mut self) -> Self {
        self.subfile_prefixed = false;
        self
    }

    /// Add or replace an element.
    pub fn element(mut self, code: &str, value: &str) -> Self {
        self.elements.retain(|(c, _)| c != code);
        self.elements.push((code.to_string(), value.to_string()));
        self
    }

    pub fn without(mut self, code: &str) -> Self {
        self.elements.retain(|(c, _)| c != code);
        self
    }

    /// Build the raw payload bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut text = String::new();
        if self.compliance_prefix {
            text.push_str("@\n\u{1e}\r");
        }
        text.push_str(&format!(
            "ANSI {}{:02}{:02}",
            self.issuer, self.standard_version, self.jurisdiction_version
        ));

        if self.subfile_prefixed {
            let body_len: usize = self
                .elements
                .iter()
                .map(|(c, v)| c.len() + v.len() + 1)
                .sum::<usize>()
                + 2;
            text.push_str(&format!("01DL{:04}{:04}DL", text.len() + 12, body_len));
        }

        let lines: Vec<String> = self
            .elements
            .iter()
            .map(|(code, value)| format!("{code}{value}"))
            .collect();
        text.push_str(&lines.join("\n"));
        text.push('\r');
        text.into_bytes()
    }
}

impl Default for IdentityRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Popup summary text for identity decisions.
//!
//! Pure formatting: the layout is fixed and carries no decision logic.
//!
//! ```text
//! Name: JANE DOE
//! License #: D1234567
//! DOB: 01151990  Age: 36
//! Expires: 01152030
//! Issuer: California (IIN 636014)
//! AAMVA 9, JUR 0
//! DCG: USA  DDA: F
//! Address: 123 MAIN ST, SACRAMENTO, CA, 95814
//!
//! Flags:
//! - Card expired
//! ```
//!
//! The `Flags:` block appears only when there is something to list: every
//! inconsistency, then every structural error not already listed.

use checkstand_core::constants::{
    ELEMENT_ADDRESS_JURISDICTION, ELEMENT_CITY, ELEMENT_COMPLIANCE_TYPE, ELEMENT_COUNTRY,
    ELEMENT_DATE_OF_BIRTH, ELEMENT_EXPIRATION_DATE, ELEMENT_FIRST_NAME, ELEMENT_LAST_NAME,
    ELEMENT_LICENSE_NUMBER, ELEMENT_POSTAL_CODE, ELEMENT_STREET,
};
use checkstand_protocol::ParsedIdentityRecord;
use std::fmt::Display;

use crate::decision::Decision;

const NOT_AVAILABLE: &str = "n/a";
const UNKNOWN_ISSUER: &str = "Unknown";

/// Render the multi-line summary shown to the cashier.
pub fn summarize_for_popup(decision: &Decision) -> String {
    let record = decision.record();

    let name = collapse_whitespace(&format!(
        "{} {}",
        field(record, ELEMENT_FIRST_NAME),
        field(record, ELEMENT_LAST_NAME)
    ));
    let address = collapse_whitespace(
        &[
            ELEMENT_STREET,
            ELEMENT_CITY,
            ELEMENT_ADDRESS_JURISDICTION,
            ELEMENT_POSTAL_CODE,
        ]
        .iter()
        .filter_map(|code| record.field(code))
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", "),
    );

    let mut lines = vec![
        format!("Name: {}", or_na(&name)),
        format!("License #: {}", or_na(field(record, ELEMENT_LICENSE_NUMBER))),
        format!(
            "DOB: {}  Age: {}",
            or_na(field(record, ELEMENT_DATE_OF_BIRTH)),
            display_or_na(decision.age_years())
        ),
        format!("Expires: {}", or_na(field(record, ELEMENT_EXPIRATION_DATE))),
        format!(
            "Issuer: {} (IIN {})",
            record.issuer_name().unwrap_or(UNKNOWN_ISSUER),
            display_or_na(record.issuer_code())
        ),
        format!(
            "AAMVA {}, JUR {}",
            display_or_na(record.standard_version()),
            display_or_na(record.jurisdiction_version())
        ),
        format!(
            "DCG: {}  DDA: {}",
            or_na(field(record, ELEMENT_COUNTRY)),
            or_na(field(record, ELEMENT_COMPLIANCE_TYPE))
        ),
        format!("Address: {}", or_na(&address)),
    ];

    let inconsistencies = decision.inconsistencies();
    let extra_errors = record
        .errors()
        .iter()
        .filter(|error| !inconsistencies.contains(error));

    if !inconsistencies.is_empty() || !record.errors().is_empty() {
        lines.push(String::new());
        lines.push("Flags:".to_string());
        lines.extend(
            inconsistencies
                .iter()
                .chain(extra_errors)
                .map(|flag| format!("- {flag}")),
        );
    }

    lines.join("\n")
}

/// Trimmed field value, empty if absent.
fn field<'a>(record: &'a ParsedIdentityRecord, code: &str) -> &'a str {
    record.field(code).map_or("", str::trim)
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { NOT_AVAILABLE } else { value }
}

fn display_or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionEngine;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn summarize(raw: &str) -> String {
        let decision = DecisionEngine::new().check_bytes(raw.as_bytes(), today());
        summarize_for_popup(&decision)
    }

    #[test]
    fn test_full_record_layout() {
        let raw = "@\n\u{1e}\rANSI 6360140900\nDAQD1234567\nDCSDOE\nDACJANE\n\
                   DBB01151990\nDBA01152030\nDAG123 MAIN ST\nDAISACRAMENTO\nDAJCA\n\
                   DAK95814\nDCGUSA\nDDAF\r";

        let expected = "\
Name: JANE DOE
License #: D1234567
DOB: 01151990  Age: 36
Expires: 01152030
Issuer: California (IIN 636014)
AAMVA 9, JUR 0
DCG: USA  DDA: F
Address: 123 MAIN ST, SACRAMENTO, CA, 95814";

        assert_eq!(summarize(raw), expected);
    }

    #[test]
    fn test_missing_values_render_as_na() {
        let summary = summarize("DAQ123\nDCSDOE");
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines[0], "Name: n/a");
        assert_eq!(lines[2], "DOB: n/a  Age: n/a");
        assert_eq!(lines[4], "Issuer: Unknown (IIN n/a)");
        assert_eq!(lines[5], "AAMVA n/a, JUR n/a");
        assert_eq!(lines[7], "Address: n/a");
    }

    #[test]
    fn test_flags_list_inconsistencies_then_errors() {
        let raw = "ANSI 9999990900\nDAQD1234567\nDCSDOE\nDBB01151990\nDBA01012020\r";
        let summary = summarize(raw);

        let flags: Vec<&str> = summary
            .split("\n\nFlags:\n")
            .nth(1)
            .unwrap()
            .lines()
            .collect();
        assert_eq!(
            flags,
            [
                "- Card expired",
                "- Unknown IIN (not mapped)",
                "- Unknown issuer IIN 999999",
            ]
        );
    }

    #[test]
    fn test_hard_fail_summary_shows_age() {
        let raw = "ANSI 6360140900\nDAQD1234567\nDCSDOE\nDACJOHN\nDBB01012010\r";
        let summary = summarize(raw);

        assert!(summary.contains("Name: JOHN DOE"));
        assert!(summary.contains("Age: 16"));
        assert!(summary.ends_with("Flags:\n- Under 21"));
    }

    #[test]
    fn test_name_whitespace_is_collapsed() {
        let raw = "ANSI 6360140900\nDAQD1\nDCSDE  LA CRUZ\nDACMARIA\nDBB01151990\r";
        assert!(summarize(raw).starts_with("Name: MARIA DE LA CRUZ\n"));
    }
}

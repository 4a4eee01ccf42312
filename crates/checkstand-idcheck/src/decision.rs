//! Identity decision engine.
//!
//! Turns a [`ParsedIdentityRecord`] and the current date into a [`Decision`]
//! with one of four severities.
//!
//! # Evaluation Order
//!
//! ```text
//! DBB ──parse──► age ──< minimum──► HardFail ["Under 21"]   (short-circuit)
//!  │                │
//!  │ unparsable     │ >= minimum
//!  ▼                ▼
//! "DOB unparsable"  secondary checks (accumulate, never return early)
//!                     ├─ implausible age
//!                     ├─ card expired / issue date / expiration order
//!                     ├─ country code
//!                     ├─ state mismatch against the issuer
//!                     ├─ unknown IIN
//!                     ├─ postal code length
//!                     └─ missing DAQ / DCS
//!                          │
//!                          ▼
//!       age known ─┬─ no flags and record ok ──► Approved
//!                  └─ otherwise ────────────────► NeedsReview
//!       age unknown ────────────────────────────► Indeterminate
//! ```
//!
//! The under-age rule is checked before anything else and nothing can mask
//! it. Secondary checks only fire when the fields they look at are present,
//! except for the two safety-relevant mandatory elements.
//!
//! # Examples
//!
//! ```
//! use checkstand_idcheck::{DecisionEngine, Severity};
//! use chrono::NaiveDate;
//!
//! let raw = b"@\n\x1e\rANSI 6360140900\nDAQD1234567\nDCSDOE\nDBB01151990\nDAJCA\r";
//! let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//!
//! let decision = DecisionEngine::new().check_bytes(raw, today);
//! assert_eq!(decision.severity(), Severity::Approved);
//! assert_eq!(decision.age_years(), Some(36));
//! assert!(decision.inconsistencies().is_empty());
//! ```

use checkstand_core::constants::{
    DECISION_REQUIRED_ELEMENTS, ELEMENT_ADDRESS_JURISDICTION, ELEMENT_COUNTRY,
    ELEMENT_DATE_OF_BIRTH, ELEMENT_EXPIRATION_DATE, ELEMENT_ISSUE_DATE, ELEMENT_POSTAL_CODE,
    MAX_PLAUSIBLE_AGE, MINIMUM_AGE, POSTAL_CODE_DIGIT_COUNTS,
};
use checkstand_core::{Error, IssuerTable, Result};
use checkstand_protocol::{IdentityRecordParser, ParsedIdentityRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::dates::{compute_age, parse_card_date};

// ============================================================================
// Inconsistency Messages
// ============================================================================

pub const DOB_UNPARSABLE: &str = "DOB unparsable";
pub const IMPLAUSIBLE_AGE: &str = "DOB produces implausible age";
pub const CARD_EXPIRED: &str = "Card expired";
pub const ISSUE_DATE_IN_FUTURE: &str = "Issue date in the future";
pub const EXPIRATION_BEFORE_ISSUE: &str = "Expiration before issue date";
pub const BAD_COUNTRY_CODE: &str = "DCG not 3-letter country code";
pub const UNKNOWN_IIN: &str = "Unknown IIN (not mapped)";
pub const POSTAL_CODE_UNUSUAL: &str = "Postal code length unusual";

/// Length of an ISO 3166 alpha-3 country code.
const COUNTRY_CODE_LENGTH: usize = 3;

/// Outcome category of an identity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Old enough, every check passed and the record is structurally clean.
    Approved,

    /// Old enough, but a secondary check failed or the record has errors.
    NeedsReview,

    /// Confirmed under the minimum age. The sale must not proceed.
    HardFail,

    /// Age could not be determined. Neither approved nor explicitly flagged.
    Indeterminate,
}

impl Severity {
    /// Returns `true` only for [`Severity::Approved`].
    pub fn is_approved(&self) -> bool {
        matches!(self, Severity::Approved)
    }

    /// Short uppercase label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Approved => "APPROVED",
            Severity::NeedsReview => "NEEDS REVIEW",
            Severity::HardFail => "HARD FAIL",
            Severity::Indeterminate => "INDETERMINATE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Approved => write!(f, "approved"),
            Severity::NeedsReview => write!(f, "needs review"),
            Severity::HardFail => write!(f, "hard fail"),
            Severity::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Age thresholds applied by the engine.
///
/// The minimum age can be raised but never lowered below 21: the engine
/// applies `max(minimum_age, 21)`, and [`validate`](Self::validate) rejects
/// a lower value outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPolicy {
    /// Youngest age that can be approved.
    pub minimum_age: u32,

    /// Ages above this are flagged as implausible.
    pub max_plausible_age: u32,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            minimum_age: MINIMUM_AGE,
            max_plausible_age: MAX_PLAUSIBLE_AGE,
        }
    }
}

impl DecisionPolicy {
    /// Check the thresholds loaded from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `minimum_age` is below 21 or
    /// `max_plausible_age` does not exceed it.
    pub fn validate(&self) -> Result<()> {
        if self.minimum_age < MINIMUM_AGE {
            return Err(Error::Config(format!(
                "minimum_age {} is below the legal minimum of {MINIMUM_AGE}",
                self.minimum_age
            )));
        }
        if self.max_plausible_age <= self.minimum_age {
            return Err(Error::Config(format!(
                "max_plausible_age {} must exceed minimum_age {}",
                self.max_plausible_age, self.minimum_age
            )));
        }
        Ok(())
    }

    /// Minimum age the engine enforces.
    pub fn effective_minimum_age(&self) -> u32 {
        self.minimum_age.max(MINIMUM_AGE)
    }

    fn is_under_age(&self, age: i32) -> bool {
        i64::from(age) < i64::from(self.effective_minimum_age())
    }

    fn is_implausible(&self, age: i32) -> bool {
        i64::from(age) > i64::from(self.max_plausible_age)
    }
}

/// Result of checking an identity record.
///
/// Invariants:
/// - `HardFail` always carries a known age below the minimum and exactly
///   one inconsistency.
/// - `Approved` always carries a known age at or above the minimum, no
///   inconsistencies and a structurally clean record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    severity: Severity,
    age_years: Option<i32>,
    inconsistencies: Vec<String>,
    record: ParsedIdentityRecord,
}

impl Decision {
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Computed age in whole years, if the birth date parsed.
    pub fn age_years(&self) -> Option<i32> {
        self.age_years
    }

    /// Human-readable problems in the order they were found.
    pub fn inconsistencies(&self) -> &[String] {
        &self.inconsistencies
    }

    /// Parsed record the decision was made from.
    pub fn record(&self) -> &ParsedIdentityRecord {
        &self.record
    }

    pub fn into_record(self) -> ParsedIdentityRecord {
        self.record
    }

    pub fn is_approved(&self) -> bool {
        self.severity == Severity::Approved
    }

    /// `true` for [`Severity::NeedsReview`].
    pub fn needs_review(&self) -> bool {
        self.severity == Severity::NeedsReview
    }

    pub fn is_hard_fail(&self) -> bool {
        self.severity == Severity::HardFail
    }
}

/// Evaluates parsed identity records against a [`DecisionPolicy`].
///
/// The engine holds no mutable state; one instance can serve every scan.
#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine {
    policy: DecisionPolicy,
    issuers: &'static IssuerTable,
    parser: IdentityRecordParser,
}

impl DecisionEngine {
    /// Engine with the default policy and the standard issuer table.
    pub fn new() -> Self {
        Self::with_policy(DecisionPolicy::default(), IssuerTable::standard())
    }

    /// Engine with a custom policy and issuer table.
    pub fn with_policy(policy: DecisionPolicy, issuers: &'static IssuerTable) -> Self {
        Self {
            policy,
            issuers,
            parser: IdentityRecordParser::with_issuers(issuers),
        }
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Parse raw payload bytes and evaluate the result.
    pub fn check_bytes(&self, bytes: &[u8], today: NaiveDate) -> Decision {
        self.evaluate(self.parser.parse(bytes), today)
    }

    /// Evaluate a parsed record as of `today`.
    pub fn evaluate(&self, record: ParsedIdentityRecord, today: NaiveDate) -> Decision {
        let mut inconsistencies = Vec::new();

        let age = date_field(&record, ELEMENT_DATE_OF_BIRTH).map(|dob| compute_age(dob, today));
        match age {
            None => inconsistencies.push(DOB_UNPARSABLE.to_string()),
            Some(age) if self.policy.is_under_age(age) => {
                debug!(age, "identity holder under minimum age");
                return Decision {
                    severity: Severity::HardFail,
                    age_years: Some(age),
                    inconsistencies: vec![format!("Under {}", self.policy.effective_minimum_age())],
                    record,
                };
            }
            Some(age) if self.policy.is_implausible(age) => {
                inconsistencies.push(IMPLAUSIBLE_AGE.to_string());
            }
            Some(_) => {}
        }

        self.check_dates(&record, today, &mut inconsistencies);
        self.check_issuer(&record, &mut inconsistencies);
        check_postal_code(&record, &mut inconsistencies);

        for code in DECISION_REQUIRED_ELEMENTS {
            if record.present_field(code).is_none() {
                inconsistencies.push(format!("Missing {code}"));
            }
        }

        let severity = match age {
            Some(_) if inconsistencies.is_empty() && record.ok() => Severity::Approved,
            Some(_) => Severity::NeedsReview,
            None => Severity::Indeterminate,
        };

        debug!(
            %severity,
            age = ?age,
            inconsistencies = inconsistencies.len(),
            record_ok = record.ok(),
            "identity decision"
        );

        Decision {
            severity,
            age_years: age,
            inconsistencies,
            record,
        }
    }

    fn check_dates(
        &self,
        record: &ParsedIdentityRecord,
        today: NaiveDate,
        inconsistencies: &mut Vec<String>,
    ) {
        let expires = date_field(record, ELEMENT_EXPIRATION_DATE);
        let issued = date_field(record, ELEMENT_ISSUE_DATE);

        if expires.is_some_and(|date| date < today) {
            inconsistencies.push(CARD_EXPIRED.to_string());
        }
        if issued.is_some_and(|date| date > today) {
            inconsistencies.push(ISSUE_DATE_IN_FUTURE.to_string());
        }
        if let (Some(expires), Some(issued)) = (expires, issued) {
            if expires < issued {
                inconsistencies.push(EXPIRATION_BEFORE_ISSUE.to_string());
            }
        }
    }

    fn check_issuer(&self, record: &ParsedIdentityRecord, inconsistencies: &mut Vec<String>) {
        if let Some(country) = record.present_field(ELEMENT_COUNTRY) {
            let valid = country.chars().count() == COUNTRY_CODE_LENGTH
                && country.chars().all(|c| c.is_ascii_alphabetic());
            if !valid {
                inconsistencies.push(BAD_COUNTRY_CODE.to_string());
            }
        }

        let Some(code) = record.issuer_code() else {
            return;
        };

        match self.issuers.lookup(code.as_str()) {
            Some(jurisdiction) if jurisdiction.is_us() => {
                let expected = self.issuers.abbreviation_for(jurisdiction.name);
                let actual = record
                    .present_field(ELEMENT_ADDRESS_JURISDICTION)
                    .map(str::to_ascii_uppercase);

                if let (Some(expected), Some(actual)) = (expected, actual) {
                    if expected != actual {
                        inconsistencies
                            .push(format!("State mismatch: IIN={expected}, DAJ={actual}"));
                    }
                }
            }
            Some(_) => {}
            None => inconsistencies.push(UNKNOWN_IIN.to_string()),
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn date_field(record: &ParsedIdentityRecord, code: &str) -> Option<NaiveDate> {
    record
        .present_field(code)
        .and_then(|value| parse_card_date(value).ok())
}

fn check_postal_code(record: &ParsedIdentityRecord, inconsistencies: &mut Vec<String>) {
    let digits = record
        .present_field(ELEMENT_POSTAL_CODE)
        .map_or(0, |value| value.chars().filter(char::is_ascii_digit).count());

    if digits > 0 && !POSTAL_CODE_DIGIT_COUNTS.contains(&digits) {
        inconsistencies.push(POSTAL_CODE_UNUSUAL.to_string());
    }
}

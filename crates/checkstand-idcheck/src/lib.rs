//! Age and validity checks for scanned identity cards.
//!
//! This crate sits on top of the identity record parser and answers one
//! question per scan: may this sale proceed?
//!
//! - [`dates`]: card date parsing with both historical digit orderings
//! - [`decision`]: the [`DecisionEngine`] and its four [`Severity`] levels
//! - [`summary`]: the fixed-layout text shown in the cashier popup
//!
//! # Example
//!
//! ```
//! use checkstand_idcheck::{DecisionEngine, Severity, summarize_for_popup};
//! use chrono::NaiveDate;
//!
//! let raw = b"ANSI 6360140900\nDAQD1234567\nDCSDOE\nDACJOHN\nDBB01012010\r";
//! let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//!
//! let decision = DecisionEngine::new().check_bytes(raw, today);
//! assert_eq!(decision.severity(), Severity::HardFail);
//! assert_eq!(decision.inconsistencies(), ["Under 21"]);
//!
//! let popup = summarize_for_popup(&decision);
//! assert!(popup.starts_with("Name: JOHN DOE"));
//! ```

pub mod dates;
pub mod decision;
pub mod summary;

pub use dates::{compute_age, parse_card_date};
pub use decision::{Decision, DecisionEngine, DecisionPolicy, Severity};
pub use summary::summarize_for_popup;

//! Interfaces to the code that consumes scan results.
//!
//! The pipeline hands exactly two things outward: a recognized barcode for
//! the retail lookup and an identity decision for the display. Both
//! collaborators are called synchronously from whatever context drains the
//! [`OutcomeReceiver`](crate::OutcomeReceiver), typically a UI tick.

use checkstand_idcheck::Decision;
use chrono::NaiveDate;

/// Receives recognized barcodes.
///
/// Codes from retail classification and from unclassified scans arrive
/// through the same call; the lookup does its own fuzzy matching.
pub trait RetailLookup {
    fn lookup_barcode(&mut self, code: &str);
}

/// Shows identity decisions to the cashier.
///
/// Display only: nothing is returned to the pipeline.
pub trait IdentityDisplay {
    /// `summary` is the popup text rendered for `decision`.
    fn show_decision(&mut self, decision: &Decision, summary: &str);
}

/// Source of the current calendar date for age checks.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to a single date.
///
/// Used for replaying captures and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<F> RetailLookup for F
where
    F: FnMut(&str),
{
    fn lookup_barcode(&mut self, code: &str) {
        self(code)
    }
}

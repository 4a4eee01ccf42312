//! Classification branch between retail scans and identity checks.
//!
//! ```text
//!                 ┌─ RetailBarcode / Unclassified ──► ScanOutcome::Barcode
//! ScanFrame ──► classify
//!                 ├─ IdentityRecord ──► parse ──► decide ──► ScanOutcome::Identity
//!                 └─ Discarded ──► log, no outcome
//! ```
//!
//! Routing is synchronous and never fails. Discarded frames produce no
//! outcome; license-like discards are logged at `info` so they can be
//! diagnosed, empty ones only at `trace`.

use checkstand_idcheck::{Decision, DecisionEngine, Severity, summarize_for_popup};
use checkstand_protocol::{ClassifiedPayload, DiscardReason, ScanFrame, classify};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::collaborators::{Clock, SystemClock};

/// Result of routing one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Code for the retail lookup.
    Barcode(String),

    /// Decision for the identity display.
    Identity(Box<Decision>),
}

impl ScanOutcome {
    pub fn barcode(&self) -> Option<&str> {
        match self {
            ScanOutcome::Barcode(code) => Some(code.as_str()),
            ScanOutcome::Identity(_) => None,
        }
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            ScanOutcome::Barcode(_) => None,
            ScanOutcome::Identity(decision) => Some(&**decision),
        }
    }
}

/// Routes closed frames to an outcome.
#[derive(Debug, Clone)]
pub struct ScanRouter<C = SystemClock> {
    engine: DecisionEngine,
    clock: C,
}

impl ScanRouter<SystemClock> {
    /// Router with the default decision engine and the local date.
    pub fn new() -> Self {
        Self::with_clock(DecisionEngine::new(), SystemClock)
    }
}

impl Default for ScanRouter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ScanRouter<C> {
    pub fn with_clock(engine: DecisionEngine, clock: C) -> Self {
        Self { engine, clock }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Classify a frame and produce its outcome, if any.
    pub fn route(&self, frame: ScanFrame) -> Option<ScanOutcome> {
        let frame_id = frame.id();
        let bytes = frame.len();

        match classify(frame) {
            ClassifiedPayload::RetailBarcode(code) | ClassifiedPayload::Unclassified(code) => {
                debug!(%frame_id, %code, "barcode recognized");
                Some(ScanOutcome::Barcode(code))
            }
            ClassifiedPayload::IdentityRecord(raw) => {
                let decision = self.engine.check_bytes(&raw, self.clock.today());
                log_decision(&frame_id, &decision);
                Some(ScanOutcome::Identity(Box::new(decision)))
            }
            ClassifiedPayload::Discarded(reason @ DiscardReason::AmbiguousLicenseLike(_)) => {
                info!(%frame_id, %reason, "discarding scan");
                None
            }
            ClassifiedPayload::Discarded(reason) => {
                trace!(%frame_id, bytes, %reason, "discarding scan");
                None
            }
        }
    }
}

fn log_decision(frame_id: &impl std::fmt::Display, decision: &Decision) {
    let summary = summarize_for_popup(decision);
    let severity = decision.severity();
    let age = decision.age_years();

    match severity {
        Severity::HardFail => {
            warn!(%frame_id, %severity, ?age, %summary, "identity check failed")
        }
        _ => info!(%frame_id, %severity, ?age, %summary, "identity checked"),
    }
}

//! Single-slot, last-write-wins handoff of scan outcomes.
//!
//! The consumer is usually a UI loop that checks for a result on every tick.
//! Results are ephemeral: if a new scan completes before the previous one
//! was taken, the old one is replaced rather than queued.
//!
//! ```text
//! ScanService ──publish──► [ Option<ScanOutcome> ] ──take / recv──► UI tick
//!                           └ replaced if unconsumed
//! ```
//!
//! # Examples
//!
//! ```
//! use checkstand_pipeline::{ScanOutcome, outcome_slot};
//!
//! let (slot, receiver) = outcome_slot();
//! slot.publish(ScanOutcome::Barcode("12345670".into()));
//! slot.publish(ScanOutcome::Barcode("96385074".into()));
//!
//! let outcome = receiver.take().unwrap();
//! assert_eq!(outcome.barcode(), Some("96385074"));
//! assert!(receiver.take().is_none());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::debug;

use crate::collaborators::{IdentityDisplay, RetailLookup};
use crate::router::ScanOutcome;
use checkstand_idcheck::summarize_for_popup;

#[derive(Debug, Default)]
struct Shared {
    outcome: Mutex<Option<ScanOutcome>>,
    notify: Notify,
    closed: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Option<ScanOutcome>> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a connected slot and receiver.
pub fn outcome_slot() -> (OutcomeSlot, OutcomeReceiver) {
    let shared = Arc::new(Shared::default());
    (
        OutcomeSlot {
            shared: Arc::clone(&shared),
        },
        OutcomeReceiver { shared },
    )
}

/// Producer side of the handoff.
///
/// Dropping the slot closes it; the receiver can still take the last
/// outcome.
#[derive(Debug)]
pub struct OutcomeSlot {
    shared: Arc<Shared>,
}

impl OutcomeSlot {
    /// Store an outcome, replacing any unconsumed one.
    ///
    /// Returns the outcome that was replaced.
    pub fn publish(&self, outcome: ScanOutcome) -> Option<ScanOutcome> {
        let replaced = self.shared.lock().replace(outcome);
        if replaced.is_some() {
            debug!("unconsumed scan outcome replaced");
        }
        self.shared.notify.notify_one();
        replaced
    }
}

impl Drop for OutcomeSlot {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }
}

/// Consumer side of the handoff.
#[derive(Debug)]
pub struct OutcomeReceiver {
    shared: Arc<Shared>,
}

impl OutcomeReceiver {
    /// Take the pending outcome without waiting.
    pub fn take(&self) -> Option<ScanOutcome> {
        self.shared.lock().take()
    }

    /// Returns `true` if an outcome is waiting.
    pub fn has_pending(&self) -> bool {
        self.shared.lock().is_some()
    }

    /// Returns `true` once the producer is gone.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Wait for the next outcome.
    ///
    /// Returns `None` once the producer has been dropped and nothing is
    /// pending.
    pub async fn recv(&self) -> Option<ScanOutcome> {
        loop {
            if let Some(outcome) = self.take() {
                return Some(outcome);
            }
            if self.is_closed() {
                return self.take();
            }
            self.shared.notify.notified().await;
        }
    }

    /// Take the pending outcome and hand it to its collaborator.
    ///
    /// Barcodes go to `retail`; decisions go to `display` together with
    /// their popup summary. Returns `false` if nothing was pending.
    pub fn dispatch<R, D>(&self, retail: &mut R, display: &mut D) -> bool
    where
        R: RetailLookup + ?Sized,
        D: IdentityDisplay + ?Sized,
    {
        let Some(outcome) = self.take() else {
            return false;
        };

        match outcome {
            ScanOutcome::Barcode(code) => retail.lookup_barcode(&code),
            ScanOutcome::Identity(decision) => {
                let summary = summarize_for_popup(&decision);
                display.show_decision(&decision, &summary);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkstand_idcheck::{Decision, DecisionEngine, Severity};
    use chrono::NaiveDate;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingDisplay {
        shown: Vec<(Severity, String)>,
    }

    impl IdentityDisplay for RecordingDisplay {
        fn show_decision(&mut self, decision: &Decision, summary: &str) {
            self.shown.push((decision.severity(), summary.to_string()));
        }
    }

    fn decision() -> ScanOutcome {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let raw = b"ANSI 6360140900\nDAQD1234567\nDCSDOE\nDACJOHN\nDBB01012010\r";
        ScanOutcome::Identity(Box::new(DecisionEngine::new().check_bytes(raw, today)))
    }

    #[test]
    fn test_take_consumes() {
        let (slot, receiver) = outcome_slot();
        assert!(receiver.take().is_none());

        assert!(slot.publish(ScanOutcome::Barcode("12345670".into())).is_none());
        assert!(receiver.has_pending());
        assert_eq!(receiver.take().unwrap().barcode(), Some("12345670"));
        assert!(!receiver.has_pending());
    }

    #[test]
    fn test_publish_replaces_unconsumed() {
        let (slot, receiver) = outcome_slot();
        slot.publish(ScanOutcome::Barcode("first".into()));

        let replaced = slot.publish(ScanOutcome::Barcode("second".into()));
        assert_eq!(replaced.unwrap().barcode(), Some("first"));
        assert_eq!(receiver.take().unwrap().barcode(), Some("second"));
    }

    #[test]
    fn test_dispatch_routes_to_collaborators() {
        let (slot, receiver) = outcome_slot();
        let mut codes = Vec::new();
        let mut display = RecordingDisplay::default();

        slot.publish(ScanOutcome::Barcode("4006381333931".into()));
        assert!(receiver.dispatch(&mut |code: &str| codes.push(code.to_string()), &mut display));

        slot.publish(decision());
        assert!(receiver.dispatch(&mut |code: &str| codes.push(code.to_string()), &mut display));

        assert!(!receiver.dispatch(&mut |code: &str| codes.push(code.to_string()), &mut display));

        assert_eq!(codes, ["4006381333931"]);
        assert_eq!(display.shown.len(), 1);
        assert_eq!(display.shown[0].0, Severity::HardFail);
        assert!(display.shown[0].1.starts_with("Name: JOHN DOE"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recv_waits_for_publish() {
        let (slot, receiver) = outcome_slot();

        let producer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            slot.publish(ScanOutcome::Barcode("96385074".into()));
        });

        let outcome = receiver.recv().await.unwrap();
        assert_eq!(outcome.barcode(), Some("96385074"));
        producer.await.unwrap();
    }

    #[tokio::test]
    async fn test_recv_returns_last_outcome_after_close() {
        let (slot, receiver) = outcome_slot();
        slot.publish(ScanOutcome::Barcode("12345670".into()));
        drop(slot);

        assert!(receiver.is_closed());
        assert_eq!(receiver.recv().await.unwrap().barcode(), Some("12345670"));
        assert!(receiver.recv().await.is_none());
    }
}

//! Scan pipeline wiring.
//!
//! Connects the capture loop to the two collaborators that consume scan
//! results:
//!
//! ```text
//! CaptureHandle ──► ScanService ──► ScanRouter ──► OutcomeSlot ──► OutcomeReceiver
//!                                                                      │ dispatch
//!                                                      ┌───────────────┴──────────┐
//!                                                RetailLookup             IdentityDisplay
//! ```
//!
//! Everything here is owned explicitly: build the router, the slot and the
//! service once at startup and hand the receiver to the UI.
//!
//! # Example
//!
//! ```no_run
//! use checkstand_hardware::{CaptureConfig, MockScanner, ScannerManager};
//! use checkstand_pipeline::{ScanRouter, ScanService, outcome_slot};
//!
//! # async fn example() -> checkstand_hardware::Result<()> {
//! let (scanner, _control) = MockScanner::new();
//! let mut manager = ScannerManager::new(CaptureConfig::default());
//! manager.register_scanner(scanner.into());
//!
//! let (slot, receiver) = outcome_slot();
//! let service = ScanService::new(ScanRouter::new(), slot).spawn(manager.start().await?);
//!
//! while let Some(outcome) = receiver.recv().await {
//!     println!("{outcome:?}");
//! }
//! service.shutdown().await
//! # }
//! ```

pub mod collaborators;
pub mod router;
pub mod service;
pub mod slot;

pub use collaborators::{Clock, FixedClock, IdentityDisplay, RetailLookup, SystemClock};
pub use router::{ScanOutcome, ScanRouter};
pub use service::{ScanService, ScanServiceHandle};
pub use slot::{OutcomeReceiver, OutcomeSlot, outcome_slot};

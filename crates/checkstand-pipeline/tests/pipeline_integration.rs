//! End-to-end tests: mock scanner bytes through capture, routing and dispatch.

use checkstand_hardware::{CaptureConfig, MockScanner, MockScannerHandle, ScannerManager};
use checkstand_idcheck::{Decision, DecisionEngine, Severity};
use checkstand_pipeline::{
    FixedClock, IdentityDisplay, OutcomeReceiver, ScanRouter, ScanService, ScanServiceHandle,
    outcome_slot,
};
use chrono::NaiveDate;
use std::time::Duration;

/// Longer than the default idle threshold.
const GAP: Duration = Duration::from_millis(100);

#[derive(Default)]
struct Screen {
    decisions: Vec<(Severity, Vec<String>)>,
    summaries: Vec<String>,
}

impl IdentityDisplay for Screen {
    fn show_decision(&mut self, decision: &Decision, summary: &str) {
        self.decisions
            .push((decision.severity(), decision.inconsistencies().to_vec()));
        self.summaries.push(summary.to_string());
    }
}

struct Harness {
    control: MockScannerHandle,
    receiver: OutcomeReceiver,
    service: ScanServiceHandle,
}

async fn start() -> Harness {
    let (scanner, control) = MockScanner::with_name("Checkout Lane 1");
    let mut manager = ScannerManager::new(CaptureConfig::default());
    manager.register_scanner(scanner.into());
    let capture = manager.start().await.unwrap();

    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let router = ScanRouter::with_clock(DecisionEngine::new(), FixedClock(today));
    let (slot, receiver) = outcome_slot();
    let service = ScanService::new(router, slot).spawn(capture);

    Harness {
        control,
        receiver,
        service,
    }
}

fn identity_record(dob: &str, expires: &str) -> Vec<u8> {
    format!(
        "@\n\u{1e}\rANSI 636015090001DL00310090DLDAQ12345678\nDCSSMITH\nDACJOHN\n\
         DBB{dob}\nDBA{expires}\nDAJTX\nDAK78701\nDCGUSA\r"
    )
    .into_bytes()
}

#[tokio::test(start_paused = true)]
async fn retail_scan_reaches_lookup() {
    let h = start().await;

    h.control.send_burst(b"012345678905\r\n".to_vec()).await.unwrap();
    let outcome = h.receiver.recv().await.unwrap();
    assert_eq!(outcome.barcode(), Some("012345678905"));

    h.service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn identity_scan_split_across_bursts_is_one_decision() {
    let h = start().await;
    let raw = identity_record("07041985", "07042030");

    // Fragments arrive closer together than the idle threshold
    for chunk in raw.chunks(16) {
        h.control.send_burst(chunk.to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let outcome = h.receiver.recv().await.unwrap();
    let decision = outcome.decision().unwrap();
    assert_eq!(decision.severity(), Severity::Approved);
    assert_eq!(decision.age_years(), Some(41));
    assert_eq!(decision.record().issuer_name(), Some("Texas"));

    tokio::time::sleep(GAP).await;
    assert!(!h.receiver.has_pending());

    h.service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dispatch_sends_each_outcome_to_its_collaborator() {
    let h = start().await;
    let mut codes: Vec<String> = Vec::new();
    let mut screen = Screen::default();

    let scans: [&[u8]; 3] = [
        b"4006381333931",
        &identity_record("10192005", "01012030"),
        &identity_record("07041985", "01012020"),
    ];

    for scan in scans {
        h.control.send_burst(scan.to_vec()).await.unwrap();
        tokio::time::sleep(GAP).await;
        assert!(h.receiver.dispatch(&mut |code: &str| codes.push(code.into()), &mut screen));
    }

    assert_eq!(codes, ["4006381333931"]);
    assert_eq!(
        screen.decisions,
        [
            (Severity::HardFail, vec!["Under 21".to_string()]),
            (Severity::NeedsReview, vec!["Card expired".to_string()]),
        ]
    );
    assert!(screen.summaries[1].ends_with("Flags:\n- Card expired"));

    h.service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unconsumed_outcome_is_replaced_by_newer_scan() {
    let h = start().await;

    h.control.send_burst(b"12345670".to_vec()).await.unwrap();
    tokio::time::sleep(GAP).await;
    h.control.send_burst(b"96385074".to_vec()).await.unwrap();
    tokio::time::sleep(GAP).await;

    assert_eq!(h.receiver.take().unwrap().barcode(), Some("96385074"));
    assert!(h.receiver.take().is_none());

    h.service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn license_like_and_empty_scans_are_dropped() {
    let h = start().await;

    h.control.send_burst(b"NY1234567X".to_vec()).await.unwrap();
    tokio::time::sleep(GAP).await;
    h.control.send_burst(b"\r\n".to_vec()).await.unwrap();
    tokio::time::sleep(GAP).await;

    assert!(!h.receiver.has_pending());

    h.service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn read_errors_do_not_stop_the_pipeline() {
    let h = start().await;

    h.control.inject_error("transfer stalled").await.unwrap();
    h.control.send_burst(b"12345670".to_vec()).await.unwrap();

    let outcome = h.receiver.recv().await.unwrap();
    assert_eq!(outcome.barcode(), Some("12345670"));
    assert!(!h.service.is_finished());

    h.service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_releases_scanner_and_drops_partial_scan() {
    let h = start().await;
    assert!(h.control.is_open());

    h.control.send_burst(b"4006381".to_vec()).await.unwrap();
    tokio::task::yield_now().await;
    h.service.shutdown().await.unwrap();

    assert!(!h.control.is_open());
    assert!(h.receiver.recv().await.is_none());
}

//! Turn a capture file into scanner bursts and collect what the pipeline
//! makes of them.
//!
//! In line mode every non-empty line is one scan. Control characters that
//! identity records need can be typed as escapes:
//!
//! | Escape | Byte |
//! |---|---|
//! | `\n` | LF |
//! | `\r` | CR |
//! | `\t` | TAB |
//! | `\xHH` | any byte, e.g. `\x1e` (RS) or `\x1d` (GS) |
//! | `\\` | backslash |

use anyhow::Context;
use checkstand_core::IssuerTable;
use checkstand_hardware::{MockScanner, ScannerManager};
use checkstand_idcheck::DecisionEngine;
use checkstand_pipeline::{FixedClock, ScanOutcome, ScanRouter, ScanService, outcome_slot};
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ReplayConfig;

/// What one replayed scan produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayEntry {
    /// 1-based position in the input.
    pub scan: usize,
    /// `None` when the scan was discarded.
    pub outcome: Option<ScanOutcome>,
}

/// Every non-empty line, unescaped. A trailing CR is stripped first.
pub fn scans_from_lines(input: &[u8]) -> Vec<Vec<u8>> {
    input
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(unescape)
        .collect()
}

/// The whole input as a single scan, untouched.
pub fn whole_input(input: &[u8]) -> Vec<Vec<u8>> {
    if input.is_empty() {
        Vec::new()
    } else {
        vec![input.to_vec()]
    }
}

/// Expand backslash escapes. Unrecognized escapes are kept literally.
pub fn unescape(line: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    let mut i = 0;

    while i < line.len() {
        if line[i] != b'\\' || i + 1 == line.len() {
            out.push(line[i]);
            i += 1;
            continue;
        }

        match line[i + 1] {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'\\' => out.push(b'\\'),
            b'x' => match line.get(i + 2..i + 4).and_then(hex_byte) {
                Some(byte) => {
                    out.push(byte);
                    i += 4;
                    continue;
                }
                None => out.extend_from_slice(b"\\x"),
            },
            other => out.extend_from_slice(&[b'\\', other]),
        }
        i += 2;
    }
    out
}

fn hex_byte(digits: &[u8]) -> Option<u8> {
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    u8::from_str_radix(std::str::from_utf8(digits).ok()?, 16).ok()
}

/// Drives scans through a mock scanner, the capture loop and the scan
/// service.
#[derive(Debug, Clone)]
pub struct Replayer {
    config: ReplayConfig,
    today: NaiveDate,
}

impl Replayer {
    pub fn new(config: ReplayConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    /// Time to wait after a burst for the frame to close and be routed.
    fn settle(&self) -> Duration {
        let capture = &self.config.capture;
        (capture.idle_threshold + capture.read_timeout + capture.poll_interval) * 2
    }

    pub async fn run(&self, scans: Vec<Vec<u8>>) -> anyhow::Result<Vec<ReplayEntry>> {
        let (scanner, control) = MockScanner::with_name("Replay");
        let mut manager = ScannerManager::new(self.config.capture.clone());
        manager.register_scanner(scanner.into());
        let capture = manager.start().await.context("starting capture")?;

        let engine = DecisionEngine::with_policy(self.config.policy, IssuerTable::standard());
        let router = ScanRouter::with_clock(engine, FixedClock(self.today));
        let (slot, receiver) = outcome_slot();
        let service = ScanService::new(router, slot).spawn(capture);

        let settle = self.settle();
        let mut entries = Vec::with_capacity(scans.len());

        for (index, bytes) in scans.into_iter().enumerate() {
            let scan = index + 1;
            debug!(scan, bytes = bytes.len(), "replaying scan");
            control.send_burst(bytes).await.context("sending scan")?;

            tokio::time::sleep(settle).await;
            let outcome = tokio::time::timeout(settle, receiver.recv())
                .await
                .ok()
                .flatten();
            entries.push(ReplayEntry { scan, outcome });
        }

        service.shutdown().await.context("stopping capture")?;
        drop(control);

        info!(scans = entries.len(), "replay finished");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkstand_idcheck::Severity;
    use rstest::rstest;

    #[rstest]
    #[case(br"ANSI\n", b"ANSI\n")]
    #[case(br"a\rb", b"a\rb")]
    #[case(br"\x1e\x1D", b"\x1e\x1d")]
    #[case(br"tab\there", b"tab\there")]
    #[case(br"back\\slash", b"back\\slash")]
    #[case(br"\q", b"\\q")]
    #[case(br"\xZZ", b"\\xZZ")]
    #[case(br"\x4", b"\\x4")]
    #[case(br"\x+1", b"\\x+1")]
    #[case(br"end\", b"end\\")]
    fn test_unescape(#[case] input: &[u8], #[case] expected: &[u8]) {
        assert_eq!(unescape(input), expected);
    }

    #[test]
    fn test_lines_become_scans() {
        let input = b"012345678905\r\n\n@\\n\\x1e\\rANSI 636015\nNY1234567X";
        let scans = scans_from_lines(input);
        assert_eq!(
            scans,
            [
                b"012345678905".to_vec(),
                b"@\n\x1e\rANSI 636015".to_vec(),
                b"NY1234567X".to_vec(),
            ]
        );
    }

    #[test]
    fn test_whole_input_is_one_scan() {
        assert!(whole_input(b"").is_empty());
        assert_eq!(whole_input(b"a\nb\n"), [b"a\nb\n".to_vec()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_through_pipeline() {
        let record = r"@\n\x1e\rANSI 636015090001DL00310090DLDAQ12345678\nDCSSMITH\nDACJOHN\nDBB07041985\nDBA07042030\nDAJTX\nDAK78701\nDCGUSA\r";
        let input = format!("012345678905\n{record}\nNY1234567X\n");
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let entries = Replayer::new(ReplayConfig::default(), today)
            .run(scans_from_lines(input.as_bytes()))
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].outcome.as_ref().unwrap().barcode(), Some("012345678905"));

        let decision = entries[1].outcome.as_ref().unwrap().decision().unwrap();
        assert_eq!(decision.severity(), Severity::Approved);
        assert_eq!(decision.age_years(), Some(41));

        assert_eq!(entries[2].scan, 3);
        assert!(entries[2].outcome.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_from_config_applies() {
        let record = r"@\n\x1e\rANSI 636015090001DL00310090DLDAQ12345678\nDCSSMITH\nDACJOHN\nDBB10192002\nDBA07042030\nDAJTX\nDAK78701\nDCGUSA\r";
        let config = ReplayConfig::from_json(r#"{ "policy": { "minimum_age": 25 } }"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let entries = Replayer::new(config, today)
            .run(scans_from_lines(record.as_bytes()))
            .await
            .unwrap();

        let decision = entries[0].outcome.as_ref().unwrap().decision().unwrap();
        assert_eq!(decision.age_years(), Some(23));
        assert_eq!(decision.severity(), Severity::HardFail);
        assert_eq!(decision.inconsistencies(), ["Under 25"]);
    }
}

//! Scanner capture manager.
//!
//! This module provides the `ScannerManager`, which opens a scanner and runs
//! the idle-gap framing loop on a dedicated background task. Completed frames
//! are delivered through a [`CaptureHandle`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐ read_chunk ┌─────────────────┐  ScanFrame  ┌───────────────┐
//! │ Scanner  │───────────►│  Capture Task   │────────────►│ CaptureHandle │
//! │ (device) │            │  FrameAssembler │   (mpsc)    │ recv/try_recv │
//! └──────────┘            └─────────────────┘             └───────────────┘
//!                                  ▲
//!                                  │ CancellationToken
//!                                  └──────────── shutdown()
//! ```
//!
//! The capture task is the only part of the pipeline that suspends on I/O.
//! Read errors are logged and retried after a backoff; the loop stops only
//! when the handle requests shutdown, at which point any partial burst is
//! dropped and the device is closed.
//!
//! # Examples
//!
//! ```
//! use checkstand_hardware::manager::ScannerManager;
//! use checkstand_hardware::config::CaptureConfig;
//! use checkstand_hardware::mock::MockScanner;
//!
//! #[tokio::main]
//! async fn main() -> checkstand_hardware::Result<()> {
//!     let (scanner, control) = MockScanner::new();
//!
//!     let mut manager = ScannerManager::new(CaptureConfig::default());
//!     manager.register_scanner(scanner.into());
//!     let mut capture = manager.start().await?;
//!
//!     control.send_burst(b"4006381333931".to_vec()).await?;
//!     let frame = capture.recv().await.expect("capture running");
//!     assert_eq!(frame.as_bytes(), b"4006381333931");
//!
//!     capture.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::config::CaptureConfig;
use crate::devices::AnyScannerDevice;
use crate::traits::ScannerDevice;
use crate::{HardwareError, Result};
use checkstand_protocol::{FrameAssembler, ScanFrame};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Handle for receiving frames from a running capture loop.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) cancels
/// the capture task at its next suspension point, but the device is only
/// guaranteed to be closed by an explicit shutdown.
#[derive(Debug)]
pub struct CaptureHandle {
    /// Closed frames from the capture task.
    frame_rx: mpsc::Receiver<ScanFrame>,

    /// Running capture task.
    tasks: JoinSet<Result<()>>,

    /// Stop signal shared with the capture task.
    cancel: CancellationToken,
}

impl CaptureHandle {
    /// Receive the next completed frame.
    ///
    /// Returns `None` once the capture task has stopped and every frame it
    /// produced has been received.
    pub async fn recv(&mut self) -> Option<ScanFrame> {
        self.frame_rx.recv().await
    }

    /// Take a completed frame without waiting.
    ///
    /// Intended for consumers that poll on a periodic tick.
    pub fn try_recv(&mut self) -> Option<ScanFrame> {
        self.frame_rx.try_recv().ok()
    }

    /// Token that stops the capture loop when cancelled.
    ///
    /// Lets other tasks request a stop while this handle is owned elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop capture and release the device.
    ///
    /// The capture loop finishes its current read or sleep, drops any partial
    /// burst and closes the device before this returns.
    ///
    /// # Errors
    ///
    /// Returns the error from closing the device, or `HardwareError::Other`
    /// if the capture task panicked.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel.cancel();
        self.frame_rx.close();

        let mut outcome = Ok(());
        while let Some(result) = self.tasks.join_next().await {
            match classify_task_result(result) {
                TaskTermination::Success | TaskTermination::Cancelled => {}
                TaskTermination::Error(e) => {
                    error!(error = %e, "capture task failed");
                    outcome = Err(e);
                }
                TaskTermination::Panic => {
                    error!("capture task panicked");
                    outcome = Err(HardwareError::other("capture task panicked"));
                }
            }
        }

        outcome
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Task termination classification for shutdown handling.
#[derive(Debug)]
enum TaskTermination {
    /// Task completed successfully.
    Success,
    /// Task returned an error.
    Error(HardwareError),
    /// Task was cancelled.
    Cancelled,
    /// Task panicked.
    Panic,
}

fn classify_task_result(
    result: std::result::Result<Result<()>, tokio::task::JoinError>,
) -> TaskTermination {
    match result {
        Ok(Ok(())) => TaskTermination::Success,
        Ok(Err(e)) => TaskTermination::Error(e),
        Err(e) if e.is_cancelled() => TaskTermination::Cancelled,
        Err(_) => TaskTermination::Panic,
    }
}

/// Owns a scanner until capture starts.
///
/// # Lifecycle
///
/// 1. Create manager with configuration
/// 2. Register the scanner with `register_scanner`
/// 3. Call `start()` to open the device and spawn the capture task
/// 4. Receive frames from the returned [`CaptureHandle`]
/// 5. Call `shutdown()` on the handle to stop and release the device
#[derive(Debug)]
pub struct ScannerManager {
    /// Registered scanner.
    scanner: Option<AnyScannerDevice>,

    /// Configuration.
    config: CaptureConfig,
}

impl ScannerManager {
    /// Create new scanner manager with configuration.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            scanner: None,
            config,
        }
    }

    /// Register the scanner to capture from.
    ///
    /// A later registration replaces an earlier one.
    pub fn register_scanner(&mut self, device: AnyScannerDevice) {
        self.scanner = Some(device);
    }

    /// Returns `true` if a scanner has been registered.
    pub fn has_scanner(&self) -> bool {
        self.scanner.is_some()
    }

    /// Capture configuration.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Open the scanner and start the capture loop.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ConfigurationError` if the configuration is
    /// invalid or no scanner was registered, and the device's error if it
    /// cannot be opened. Nothing after a successful start is reported as an
    /// error.
    pub async fn start(mut self) -> Result<CaptureHandle> {
        self.config.validate()?;

        let mut device = self
            .scanner
            .take()
            .ok_or_else(|| HardwareError::configuration("no scanner registered"))?;

        device.open().await?;

        match device.get_info().await {
            Ok(info) => info!(
                scanner = %info.name,
                model = %info.model,
                kind = device.kind(),
                idle_ms = self.config.idle_threshold.as_millis() as u64,
                "scanner capture started"
            ),
            Err(e) => warn!(error = %e, "scanner info unavailable"),
        }

        let (frame_tx, frame_rx) = mpsc::channel(self.config.frame_channel_capacity);
        let cancel = CancellationToken::new();

        let mut tasks = JoinSet::new();
        tasks.spawn(capture_task(device, self.config, frame_tx, cancel.clone()));

        Ok(CaptureHandle {
            frame_rx,
            tasks,
            cancel,
        })
    }
}

/// Sleep for `duration` unless cancelled first.
///
/// Returns `true` if the token was cancelled.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}

async fn capture_task(
    mut device: AnyScannerDevice,
    config: CaptureConfig,
    frame_tx: mpsc::Sender<ScanFrame>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut assembler =
        FrameAssembler::with_max_frame_size(config.idle_threshold, config.max_frame_size);
    let mut buf = vec![0u8; config.read_chunk_size];

    'capture: loop {
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            read = device.read_chunk(&mut buf, config.read_timeout) => read,
        };
        let now = Instant::now().into_std();

        let received = match read {
            Ok(n) => n,
            Err(e) => {
                warn!(
                    error = %e,
                    backoff_ms = config.error_backoff.as_millis() as u64,
                    "scanner read failed"
                );
                if sleep_or_cancel(config.error_backoff, &cancel).await {
                    break;
                }
                continue;
            }
        };

        if received > 0 {
            trace!(
                bytes = received,
                buffered = assembler.buffered_len(),
                "scanner bytes received"
            );
            assembler.feed(&buf[..received], now);
        }

        while let Some(frame) = assembler.poll(now) {
            debug!(frame_id = %frame.id(), bytes = frame.len(), "scan frame closed");
            let sent = tokio::select! {
                _ = cancel.cancelled() => break 'capture,
                sent = frame_tx.send(frame) => sent,
            };
            if sent.is_err() {
                info!("frame receiver dropped, stopping capture");
                break 'capture;
            }
        }

        if received == 0 && sleep_or_cancel(config.poll_interval, &cancel).await {
            break;
        }
    }

    let dropped = assembler.reset();
    if dropped > 0 {
        debug!(bytes = dropped, "dropping partial frame on shutdown");
    }

    device.close().await?;
    info!("scanner capture stopped");
    Ok(())
}

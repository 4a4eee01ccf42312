//! Scan service: capture handle in, outcomes out.
//!
//! The service owns the consuming end of a [`CaptureHandle`], routes every
//! closed frame and publishes the outcome into an [`OutcomeSlot`]. It is
//! constructed once at startup and owned by whoever runs the device loop.
//!
//! # Shutdown
//!
//! ```text
//! ScanServiceHandle::shutdown()
//!     └─► cancel token ──► capture loop stops, device closed
//!                               └─► frame channel closes ──► run() returns
//! ```
//!
//! Frames already closed before the stop are still routed; the partial
//! burst in the assembler is dropped.

use checkstand_hardware::{CaptureHandle, HardwareError, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::collaborators::Clock;
use crate::router::ScanRouter;
use crate::slot::OutcomeSlot;

/// Routes frames from a capture handle into an outcome slot.
#[derive(Debug)]
pub struct ScanService<C> {
    router: ScanRouter<C>,
    slot: OutcomeSlot,
}

impl<C: Clock + 'static> ScanService<C> {
    pub fn new(router: ScanRouter<C>, slot: OutcomeSlot) -> Self {
        Self { router, slot }
    }

    /// Route frames until capture stops, then release the device.
    ///
    /// Capture stops when the handle's cancellation token is cancelled.
    ///
    /// # Errors
    ///
    /// Returns the error reported while shutting the capture loop down.
    pub async fn run(self, mut capture: CaptureHandle) -> Result<()> {
        let mut routed = 0u64;

        while let Some(frame) = capture.recv().await {
            if let Some(outcome) = self.router.route(frame) {
                self.slot.publish(outcome);
                routed += 1;
            }
        }

        info!(routed, "scan service stopped");
        capture.shutdown().await
    }

    /// Run the service on a background task.
    pub fn spawn(self, capture: CaptureHandle) -> ScanServiceHandle {
        let cancel = capture.cancellation_token();
        let task = tokio::spawn(self.run(capture));
        ScanServiceHandle { cancel, task }
    }
}

/// Handle to a service started with [`ScanService::spawn`].
#[derive(Debug)]
pub struct ScanServiceHandle {
    cancel: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl ScanServiceHandle {
    /// Returns `true` once the service task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop capture and wait for the device to be released.
    ///
    /// # Errors
    ///
    /// Returns the capture shutdown error, or `HardwareError::Other` if the
    /// service task panicked.
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "scan service task failed");
                Err(HardwareError::other(format!("scan service task failed: {e}")))
            }
        }
    }
}

//! Scanner device trait definition.
//!
//! A scanner is modeled as a plain byte source: it does not know where one
//! scan ends and the next begins. Framing is done by the capture loop in
//! [`manager`](crate::manager).
//!
//! The trait uses native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! so concrete devices are dispatched through
//! [`AnyScannerDevice`](crate::devices::AnyScannerDevice) rather than
//! `Box<dyn ScannerDevice>`.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::DeviceInfo;
use std::time::Duration;

/// Combination barcode / ID-card scanner.
///
/// # Lifecycle
///
/// ```text
/// open() ──> read_chunk() ... read_chunk() ──> close()
/// ```
///
/// # Examples
///
/// ```no_run
/// use checkstand_hardware::traits::ScannerDevice;
/// use checkstand_hardware::Result;
/// use std::time::Duration;
///
/// async fn drain<S: ScannerDevice>(scanner: &mut S) -> Result<Vec<u8>> {
///     let mut out = Vec::new();
///     let mut buf = [0u8; 256];
///     loop {
///         let n = scanner.read_chunk(&mut buf, Duration::from_millis(5)).await?;
///         if n == 0 {
///             return Ok(out);
///         }
///         out.extend_from_slice(&buf[..n]);
///     }
/// }
/// ```
pub trait ScannerDevice: Send + Sync {
    /// Acquire the device.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the device cannot be
    /// acquired. This is the only error the capture manager propagates.
    async fn open(&mut self) -> Result<()>;

    /// Read available bytes into `buf`, waiting at most `timeout`.
    ///
    /// Returns the number of bytes written. `Ok(0)` means nothing arrived
    /// before the timeout; it is not end-of-stream.
    ///
    /// # Errors
    ///
    /// Errors are treated as transient by the capture loop.
    async fn read_chunk(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Release the device.
    async fn close(&mut self) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

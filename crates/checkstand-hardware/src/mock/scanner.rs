//! Mock scanner implementation for testing and development.
//!
//! The mock delivers whatever bytes its handle pushes, exactly like a real
//! scanner would: no delimiters, just bursts. Tests control timing by
//! spacing out [`MockScannerHandle::send_burst`] calls.

use crate::{HardwareError, Result, traits::ScannerDevice, types::DeviceInfo, types::Symbology};
use bytes::{Buf, BytesMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Capacity of the handle-to-scanner event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Mock scanner for testing and development.
///
/// # Examples
///
/// ```
/// use checkstand_hardware::mock::MockScanner;
/// use checkstand_hardware::traits::ScannerDevice;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> checkstand_hardware::Result<()> {
///     let (mut scanner, handle) = MockScanner::new();
///     scanner.open().await?;
///
///     handle.send_burst(b"012345678905".to_vec()).await?;
///
///     let mut buf = [0u8; 64];
///     let n = scanner.read_chunk(&mut buf, Duration::from_millis(5)).await?;
///     assert_eq!(&buf[..n], b"012345678905");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockScanner {
    /// Channel receiver for scanner events
    event_rx: mpsc::Receiver<ScannerEvent>,

    /// Bytes of the current burst not yet handed out
    pending: BytesMut,

    /// Device name
    name: String,

    /// State shared with the handle
    shared: Arc<SharedState>,
}

#[derive(Debug, Default)]
struct SharedState {
    open: AtomicBool,
    fail_next_open: AtomicBool,
}

/// Internal event type for the mock scanner.
#[derive(Debug, Clone)]
enum ScannerEvent {
    Burst(Vec<u8>),
    ReadError(String),
}

impl MockScanner {
    /// Create a new mock scanner with the default name.
    ///
    /// Returns a tuple of (MockScanner, MockScannerHandle) where the handle
    /// is used to push scans and inject failures.
    pub fn new() -> (Self, MockScannerHandle) {
        Self::with_name("Mock Scanner")
    }

    /// Create a new mock scanner with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockScannerHandle) {
        let name = name.into();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(SharedState::default());

        let scanner = Self {
            event_rx,
            pending: BytesMut::new(),
            name: name.clone(),
            shared: Arc::clone(&shared),
        };

        let handle = MockScannerHandle {
            event_tx,
            name,
            shared,
        };

        (scanner, handle)
    }

    /// Returns `true` between a successful `open` and `close`.
    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }

    fn drain_pending(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        n
    }
}

impl ScannerDevice for MockScanner {
    async fn open(&mut self) -> Result<()> {
        if self.shared.fail_next_open.swap(false, Ordering::SeqCst) {
            return Err(HardwareError::initialization_failed(format!(
                "{} is not available",
                self.name
            )));
        }

        self.shared.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn read_chunk(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.is_open() {
            return Err(HardwareError::disconnected(self.name.clone()));
        }
        if buf.is_empty() {
            return Err(HardwareError::invalid_data("read buffer is empty"));
        }

        if !self.pending.is_empty() {
            return Ok(self.drain_pending(buf));
        }

        match tokio::time::timeout(timeout, self.event_rx.recv()).await {
            Err(_elapsed) => Ok(0),
            Ok(None) => Err(HardwareError::disconnected(format!(
                "{} control channel closed",
                self.name
            ))),
            Ok(Some(ScannerEvent::Burst(bytes))) => {
                self.pending.extend_from_slice(&bytes);
                Ok(self.drain_pending(buf))
            }
            Ok(Some(ScannerEvent::ReadError(message))) => {
                Err(HardwareError::communication(message))
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.pending.clear();
        self.shared.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "mock")
            .with_serial_number("MOCK-0001")
            .with_symbologies([Symbology::Linear, Symbology::Pdf417, Symbology::QrCode]))
    }
}

/// Handle for controlling a mock scanner.
///
/// Cloning the handle is cheap; all clones drive the same scanner. The
/// scanner reports a disconnect once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct MockScannerHandle {
    /// Channel sender for scanner events
    event_tx: mpsc::Sender<ScannerEvent>,

    /// Device name
    name: String,

    /// State shared with the scanner
    shared: Arc<SharedState>,
}

impl MockScannerHandle {
    /// Deliver one burst of bytes, as if a code had been scanned.
    ///
    /// Bursts sent back to back without a pause are indistinguishable from a
    /// single scan, just like on real hardware.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` if the scanner was dropped.
    pub async fn send_burst(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.send(ScannerEvent::Burst(bytes.into())).await
    }

    /// Make the next read fail with a communication error.
    pub async fn inject_error(&self, message: impl Into<String>) -> Result<()> {
        self.send(ScannerEvent::ReadError(message.into())).await
    }

    /// Make the next `open` call fail.
    pub fn fail_next_open(&self) {
        self.shared.fail_next_open.store(true, Ordering::SeqCst);
    }

    /// Returns `true` while the scanner is open.
    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }

    /// Name of the controlled scanner.
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, event: ScannerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected(self.name.clone()))
    }
}

//! Enum wrapper for scanner device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn ScannerDevice>`
//! is not available. [`AnyScannerDevice`] gives the capture manager a single
//! concrete type to own while still dispatching to any implementation.
//!
//! # Examples
//!
//! ```
//! use checkstand_hardware::devices::AnyScannerDevice;
//! use checkstand_hardware::mock::MockScanner;
//!
//! let (scanner, _handle) = MockScanner::new();
//! let any_scanner = AnyScannerDevice::from(scanner);
//! assert_eq!(any_scanner.kind(), "mock");
//! ```

use crate::mock::MockScanner;
use crate::traits::ScannerDevice;
use crate::{DeviceInfo, Result};
use std::time::Duration;

/// Enum wrapper for scanner device dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyScannerDevice {
    /// Mock scanner for development, testing and capture replay.
    Mock(MockScanner),
}

impl AnyScannerDevice {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mock(_) => "mock",
        }
    }
}

impl From<MockScanner> for AnyScannerDevice {
    fn from(scanner: MockScanner) -> Self {
        Self::Mock(scanner)
    }
}

impl ScannerDevice for AnyScannerDevice {
    async fn open(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.open().await,
        }
    }

    async fn read_chunk(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        match self {
            Self::Mock(device) => device.read_chunk(buf, timeout).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.close().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

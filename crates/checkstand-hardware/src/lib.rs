//! Scanner device abstraction and capture loop for the checkstand pipeline.
//!
//! This crate owns everything that touches a physical (or emulated) scanner:
//! the [`ScannerDevice`] trait, a channel-driven [`MockScanner`], and the
//! [`ScannerManager`] that turns a raw byte stream into closed
//! [`ScanFrame`](checkstand_protocol::ScanFrame)s.
//!
//! # Design Philosophy
//!
//! - **Async-first**: Device I/O uses native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: Concrete devices are wrapped in [`AnyScannerDevice`]
//!   instead of trait objects.
//! - **Thread-safe**: Devices are `Send + Sync` so the capture loop can run on
//!   any Tokio worker.
//! - **Never fatal after start**: Read errors are logged and retried; only
//!   opening the device can fail the caller.
//!
//! # Capturing Frames
//!
//! ```no_run
//! use checkstand_hardware::{CaptureConfig, MockScanner, ScannerManager};
//!
//! # async fn example() -> checkstand_hardware::Result<()> {
//! let (scanner, _control) = MockScanner::new();
//!
//! let mut manager = ScannerManager::new(CaptureConfig::default());
//! manager.register_scanner(scanner.into());
//!
//! let mut capture = manager.start().await?;
//! while let Some(frame) = capture.recv().await {
//!     println!("{frame}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] with the
//! [`HardwareError`] error type.

pub mod config;
pub mod devices;
pub mod error;
pub mod manager;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{CaptureConfig, DEFAULT_FRAME_CHANNEL_CAPACITY};
pub use devices::AnyScannerDevice;
pub use error::{HardwareError, Result};
pub use mock::{MockScanner, MockScannerHandle};
pub use traits::ScannerDevice;
pub use types::{DeviceInfo, Symbology};

// Re-export manager types
pub use manager::{CaptureHandle, ScannerManager};

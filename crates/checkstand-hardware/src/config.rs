//! Capture loop configuration.
//!
//! Durations are written in milliseconds when (de)serialized:
//!
//! ```json
//! { "idle_threshold_ms": 30, "read_timeout_ms": 5, "error_backoff_ms": 50 }
//! ```
//!
//! Missing keys fall back to the defaults in
//! [`checkstand_core::constants`].

use crate::{HardwareError, Result};
use checkstand_core::constants::{
    DEFAULT_ERROR_BACKOFF_MS, DEFAULT_IDLE_THRESHOLD_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_READ_CHUNK_SIZE, DEFAULT_READ_TIMEOUT_MS, MAX_FRAME_SIZE,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default capacity of the closed-frame channel.
pub const DEFAULT_FRAME_CHANNEL_CAPACITY: usize = 32;

/// Configuration for the scanner capture loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Silence that closes a frame.
    #[serde(rename = "idle_threshold_ms", with = "millis")]
    pub idle_threshold: Duration,

    /// Upper bound for a single device read.
    #[serde(rename = "read_timeout_ms", with = "millis")]
    pub read_timeout: Duration,

    /// Sleep after a read that returned no bytes.
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,

    /// Sleep after a failed read.
    #[serde(rename = "error_backoff_ms", with = "millis")]
    pub error_backoff: Duration,

    /// Size of the read buffer.
    pub read_chunk_size: usize,

    /// Frames reaching this size are closed without waiting for silence.
    pub max_frame_size: usize,

    /// Closed frames buffered for the consumer.
    pub frame_channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            idle_threshold: Duration::from_millis(DEFAULT_IDLE_THRESHOLD_MS),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            error_backoff: Duration::from_millis(DEFAULT_ERROR_BACKOFF_MS),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            max_frame_size: MAX_FRAME_SIZE,
            frame_channel_capacity: DEFAULT_FRAME_CHANNEL_CAPACITY,
        }
    }
}

impl CaptureConfig {
    pub fn with_idle_threshold(mut self, idle_threshold: Duration) -> Self {
        self.idle_threshold = idle_threshold;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_error_backoff(mut self, error_backoff: Duration) -> Self {
        self.error_backoff = error_backoff;
        self
    }

    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn with_frame_channel_capacity(mut self, capacity: usize) -> Self {
        self.frame_channel_capacity = capacity;
        self
    }

    /// Check that every duration and size is non-zero.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ConfigurationError` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("idle_threshold", self.idle_threshold),
            ("read_timeout", self.read_timeout),
            ("poll_interval", self.poll_interval),
            ("error_backoff", self.error_backoff),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, d)| d.is_zero()) {
            return Err(HardwareError::configuration(format!(
                "{name} must be greater than zero"
            )));
        }

        let sizes = [
            ("read_chunk_size", self.read_chunk_size),
            ("max_frame_size", self.max_frame_size),
            ("frame_channel_capacity", self.frame_channel_capacity),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, n)| *n == 0) {
            return Err(HardwareError::configuration(format!(
                "{name} must be greater than zero"
            )));
        }

        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

use bytes::Bytes;
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// ScanFrame is one contiguous burst of scanner bytes.
///
/// Frames are produced by the [`FrameAssembler`](crate::FrameAssembler) when
/// an idle gap closes its buffer. A frame is immutable and is handed to the
/// classifier exactly once.
///
/// Each frame carries a random `id` so that log lines emitted at different
/// pipeline stages can be correlated.
///
/// # Basic Usage
/// ```
/// use checkstand_protocol::ScanFrame;
/// use std::time::Instant;
///
/// let frame = ScanFrame::from_bytes(b"012345678905", Instant::now());
/// assert_eq!(frame.len(), 12);
/// assert_eq!(frame.as_bytes(), b"012345678905");
/// ```
#[derive(Debug, Clone)]
pub struct ScanFrame {
    /// Correlation identifier
    id: Uuid,

    /// Raw bytes of the burst
    data: Bytes,

    /// Monotonic instant at which the frame was closed
    closed_at: Instant,
}

impl ScanFrame {
    /// Create a new frame from raw bytes closed at `closed_at`.
    pub fn new(data: Bytes, closed_at: Instant) -> Self {
        ScanFrame {
            id: Uuid::new_v4(),
            data,
            closed_at,
        }
    }

    /// Create a frame from a byte slice.
    pub fn from_bytes(bytes: &[u8], closed_at: Instant) -> Self {
        Self::new(Bytes::copy_from_slice(bytes), closed_at)
    }

    /// Correlation identifier for logging.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the raw bytes of the frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame and return its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Instant at which the idle gap closed the frame.
    pub fn closed_at(&self) -> Instant {
        self.closed_at
    }

    /// Frame size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the frame holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for ScanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {} ({} bytes)", self.id, self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_ids_are_unique() {
        let now = Instant::now();
        let a = ScanFrame::from_bytes(b"1", now);
        let b = ScanFrame::from_bytes(b"1", now);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_frame_into_bytes() {
        let frame = ScanFrame::from_bytes(b"ABC", Instant::now());
        assert!(!frame.is_empty());
        assert_eq!(frame.into_bytes(), Bytes::from_static(b"ABC"));
    }

    #[test]
    fn test_frame_display() {
        let frame = ScanFrame::from_bytes(b"12345", Instant::now());
        let text = frame.to_string();
        assert!(text.starts_with("frame "));
        assert!(text.ends_with("(5 bytes)"));
    }
}

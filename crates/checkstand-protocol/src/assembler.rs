//! Idle-gap frame assembler for scanner byte streams.
//!
//! Barcode and ID-card scanners emit each scan as a burst of bytes with no
//! start or end marker. The only reliable boundary is silence: once the
//! device stops sending for longer than the idle threshold, the burst is
//! complete.
//!
//! The assembler is a pure state machine. It never reads from a device or
//! sleeps; callers feed it bytes together with the instant they arrived and
//! poll it with the current instant. This keeps the framing rule testable
//! with synthetic clocks and lets the capture loop own all I/O.
//!
//! # Framing Rule
//!
//! ```text
//!  bytes   bytes      bytes          bytes  bytes
//!  ├─┤    ├──┤       ├────┤          ├─┤   ├─┤
//! ─┴─┴────┴──┴───────┴────┴──────────┴─┴───┴─┴──────────
//!  │<  gap < idle  >│     │< gap >= idle >│       │<idle>│
//!  └────── one frame ─────┘                └ frame ┘
//! ```
//!
//! # Usage
//!
//! ```
//! use checkstand_protocol::FrameAssembler;
//! use std::time::{Duration, Instant};
//!
//! let mut assembler = FrameAssembler::new(Duration::from_millis(30));
//! let start = Instant::now();
//!
//! assembler.feed(b"0123", start);
//! assembler.feed(b"45678905", start + Duration::from_millis(5));
//!
//! // Still inside the burst
//! assert!(assembler.poll(start + Duration::from_millis(20)).is_none());
//!
//! // Silence long enough closes the frame
//! let frame = assembler.poll(start + Duration::from_millis(40)).unwrap();
//! assert_eq!(frame.as_bytes(), b"012345678905");
//! ```

use bytes::BytesMut;
use checkstand_core::constants::{DEFAULT_IDLE_THRESHOLD_MS, MAX_FRAME_SIZE};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::frame::ScanFrame;

/// Initial buffer capacity for incoming scanner data.
///
/// Retail barcodes are a few bytes; identity records are usually under 1 KB.
const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// State machine states for frame assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Buffer is empty, waiting for the first byte of a burst.
    Idle,

    /// Bytes have arrived and the idle gap has not elapsed yet.
    Accumulating,
}

/// Stateful idle-gap framer.
///
/// # State Machine
///
/// ```text
/// ┌──────┐  feed(non-empty)  ┌──────────────┐
/// │ Idle │──────────────────>│ Accumulating │──┐ feed: extend buffer,
/// └──────┘                   └──────────────┘<─┘ refresh last activity
///    ^                              │
///    │   poll(now) with             │
///    │   now - last >= idle         │
///    └──────────────────────────────┘
///              frame emitted
/// ```
///
/// - No frame is ever emitted while the buffer is empty.
/// - Bytes are never dropped or duplicated across frame boundaries.
/// - A buffer reaching the maximum frame size is closed immediately.
#[derive(Debug)]
pub struct FrameAssembler {
    /// Bytes of the burst in progress.
    buffer: BytesMut,

    /// Instant of the most recent non-empty feed.
    last_activity: Option<Instant>,

    /// Silence that closes a frame.
    idle_threshold: Duration,

    /// Size at which a frame is closed without waiting for silence.
    max_frame_size: usize,

    /// Frames closed by the size limit, waiting for the next poll.
    ready: VecDeque<ScanFrame>,

    /// Current state.
    state: AssemblerState,
}

impl FrameAssembler {
    /// Create an assembler with the given idle threshold.
    pub fn new(idle_threshold: Duration) -> Self {
        Self::with_max_frame_size(idle_threshold, MAX_FRAME_SIZE)
    }

    /// Create an assembler with a custom maximum frame size.
    ///
    /// A `max_frame_size` of zero is treated as one byte.
    pub fn with_max_frame_size(idle_threshold: Duration, max_frame_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            last_activity: None,
            idle_threshold,
            max_frame_size: max_frame_size.max(1),
            ready: VecDeque::new(),
            state: AssemblerState::Idle,
        }
    }

    /// Feed bytes received at instant `now`.
    ///
    /// Empty slices are ignored and do not refresh the activity timestamp.
    pub fn feed(&mut self, bytes: &[u8], now: Instant) {
        if bytes.is_empty() {
            return;
        }

        let mut remaining = bytes;
        while !remaining.is_empty() {
            let room = self.max_frame_size - self.buffer.len();
            let take = room.min(remaining.len());
            self.buffer.extend_from_slice(&remaining[..take]);
            remaining = &remaining[take..];

            if self.buffer.len() >= self.max_frame_size {
                self.close_frame(now);
            }
        }

        if !self.buffer.is_empty() {
            self.state = AssemblerState::Accumulating;
        }
        self.last_activity = Some(now);
    }

    /// Return the next completed frame, if any.
    ///
    /// A frame completes when at least the idle threshold has passed since
    /// the last non-empty feed.
    pub fn poll(&mut self, now: Instant) -> Option<ScanFrame> {
        if let Some(frame) = self.ready.pop_front() {
            return Some(frame);
        }

        if self.state == AssemblerState::Accumulating && self.idle_elapsed(now) {
            self.close_frame(now);
            return self.ready.pop_front();
        }

        None
    }

    /// Time left until the current burst closes.
    ///
    /// Returns `None` while idle, `Some(Duration::ZERO)` when a frame is ready.
    pub fn time_until_close(&self, now: Instant) -> Option<Duration> {
        if !self.ready.is_empty() {
            return Some(Duration::ZERO);
        }

        match (self.state, self.last_activity) {
            (AssemblerState::Accumulating, Some(last)) => Some(
                self.idle_threshold
                    .saturating_sub(now.saturating_duration_since(last)),
            ),
            _ => None,
        }
    }

    /// Discard buffered bytes and queued frames.
    ///
    /// Returns the number of bytes dropped. Used on shutdown, where partial
    /// bursts are never reported.
    pub fn reset(&mut self) -> usize {
        let dropped =
            self.buffer.len() + self.ready.iter().map(ScanFrame::len).sum::<usize>();
        self.buffer.clear();
        self.ready.clear();
        self.last_activity = None;
        self.state = AssemblerState::Idle;
        dropped
    }

    /// Returns current assembler state.
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Number of bytes in the burst in progress.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Configured idle threshold.
    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    fn idle_elapsed(&self, now: Instant) -> bool {
        self.last_activity
            .is_some_and(|last| now.saturating_duration_since(last) >= self.idle_threshold)
    }

    fn close_frame(&mut self, now: Instant) {
        if self.buffer.is_empty() {
            return;
        }

        let data = self.buffer.split().freeze();
        self.ready.push_back(ScanFrame::new(data, now));
        self.state = AssemblerState::Idle;
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_IDLE_THRESHOLD_MS))
    }
}

//! Two-step text decoding for scan payloads.
//!
//! Identity record issuers have historically written their payloads in two
//! incompatible text encodings, and neither carries a byte-order mark. The
//! payload is decoded as UTF-8 first; if the result contains the identity
//! record header marker it is used, otherwise the bytes are decoded again as
//! Windows-1252 and that result wins unconditionally.
//!
//! ```
//! use checkstand_protocol::{TextEncoding, decode_payload_text};
//!
//! let decoded = decode_payload_text(b"@\n\x1e\rANSI 636014090001");
//! assert_eq!(decoded.encoding, TextEncoding::Utf8);
//!
//! let decoded = decode_payload_text(b"CAF\xc9");
//! assert_eq!(decoded.encoding, TextEncoding::Windows1252);
//! assert_eq!(decoded.text, "CAF\u{c9}");
//! ```

use checkstand_core::constants::HEADER_MARKER;
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::fmt;

/// Text encoding selected for a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, selected when the header marker is present.
    Utf8,

    /// Windows-1252 (Latin-1 superset), the fallback.
    Windows1252,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Windows1252 => write!(f, "windows-1252"),
        }
    }
}

/// Decoded payload text with the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

impl DecodedText {
    /// Returns `true` if the text contains the identity record header marker.
    pub fn has_header_marker(&self) -> bool {
        self.text.contains(HEADER_MARKER)
    }
}

/// Decode scan bytes with the UTF-8 / Windows-1252 probe.
///
/// Malformed sequences never fail the decode; they become U+FFFD in the
/// UTF-8 attempt and cannot occur in Windows-1252.
pub fn decode_payload_text(bytes: &[u8]) -> DecodedText {
    let (utf8, _had_errors) = UTF_8.decode_without_bom_handling(bytes);
    if utf8.contains(HEADER_MARKER) {
        return DecodedText {
            text: utf8.into_owned(),
            encoding: TextEncoding::Utf8,
        };
    }

    let (latin, _had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    DecodedText {
        text: latin.into_owned(),
        encoding: TextEncoding::Windows1252,
    }
}

//! Scan payload protocol handling.
//!
//! Turns the raw byte stream of a combination barcode / ID-card scanner into
//! discrete [`ScanFrame`]s, classifies each frame's payload, and parses
//! identity records into a [`ParsedIdentityRecord`].
//!
//! ```
//! use checkstand_protocol::{ClassifiedPayload, classify_bytes};
//!
//! let payload = classify_bytes(b"012345678905\r\n");
//! assert_eq!(payload, ClassifiedPayload::RetailBarcode("012345678905".to_string()));
//! ```

pub mod assembler;
pub mod classifier;
pub mod decode;
pub mod frame;
pub mod parser;
pub mod record;

pub use assembler::{AssemblerState, FrameAssembler};
pub use classifier::{
    ClassifiedPayload, DiscardReason, classify, classify_bytes, is_identity_payload,
    is_probable_retail_barcode, looks_like_1d_license,
};
pub use decode::{DecodedText, TextEncoding, decode_payload_text};
pub use frame::ScanFrame;
pub use parser::{IdentityRecordParser, parse_identity_record};
pub use record::{ParsedIdentityRecord, RecordHeader, SubfileDesignator};

pub mod constants;
pub mod error;
pub mod issuers;
pub mod types;

pub use error::{Error, Result};
pub use issuers::{IssuerTable, Jurisdiction, is_us_jurisdiction_abbreviation};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::{Result, constants::ISSUER_CODE_LENGTH, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Issuer identification number (6 digits).
///
/// Identifies the jurisdiction that issued an identity credential. The code
/// is kept as text because leading zeros are significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssuerCode(String);

impl IssuerCode {
    /// Create a new issuer code with validation.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// Returns `Error::InvalidIssuerCode` if the code is not exactly six ASCII digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use checkstand_core::IssuerCode;
    ///
    /// let code = IssuerCode::new("636014").unwrap();
    /// assert_eq!(code.as_str(), "636014");
    ///
    /// assert!(IssuerCode::new("63601").is_err());
    /// assert!(IssuerCode::new("63601X").is_err());
    /// ```
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();

        if code.len() != ISSUER_CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidIssuerCode(format!(
                "Issuer code must be {ISSUER_CODE_LENGTH} digits, got '{code}'"
            )));
        }

        Ok(IssuerCode(code.to_string()))
    }

    /// Get the issuer code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssuerCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for IssuerCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        IssuerCode::new(s)
    }
}

impl TryFrom<String> for IssuerCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        IssuerCode::new(&value)
    }
}

impl From<IssuerCode> for String {
    fn from(code: IssuerCode) -> Self {
        code.0
    }
}

impl AsRef<str> for IssuerCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identity record errors
    #[error("Invalid issuer code: {0}")]
    InvalidIssuerCode(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the tag codec

use thiserror::Error;

/// Result type alias for decode operations
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding a payment intent
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text could not be parsed as a URL
    #[error("Malformed URL: {0}")]
    MalformedUrl(#[from] url::ParseError),

    /// No customer wallet was present
    #[error("Missing required parameter: wallet")]
    MissingWallet,

    /// The text is not a JSON object
    #[error("Record is not a JSON object: {0}")]
    NotJson(String),

    /// An address failed the `0x` + 40 hex check
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The record type carries no payment data
    #[error("Unsupported record type: {0}")]
    UnsupportedRecord(String),

    /// The record set was empty
    #[error("Tag contains no payment record")]
    NoPaymentRecord,
}

impl DecodeError {
    /// Whether this error only means "this candidate was not JSON".
    pub fn is_not_json(&self) -> bool {
        matches!(self, DecodeError::NotJson(_))
    }
}

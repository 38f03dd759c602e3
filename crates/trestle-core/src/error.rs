//! Codec error types.

use thiserror::Error;

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors decoding an inbound event body.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported body encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("invalid base64 body: {0}")]
    Decode(#[from] base64::DecodeError),
}

//! Adapter error types.

use thiserror::Error;

/// Result type alias for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors surfaced by the invocation entry point.
///
/// `Configuration` is fatal at startup. Everything else fails exactly
/// one invocation; retry policy, if any, belongs to the external
/// invocation layer.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid invocation event: {0}")]
    Event(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] trestle_core::error::CodecError),

    #[error(transparent)]
    Handler(#[from] trestle_handler::error::HandlerError),

    #[error(transparent)]
    Cycle(#[from] trestle_cycle::error::CycleError),
}

//! Cycle bridge error types.

use thiserror::Error;

/// Result type alias for cycle bridge operations.
pub type CycleResult<T> = Result<T, CycleError>;

/// Errors raised while driving a cycle application.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The application violated the message protocol for the current
    /// exchange state. Fails the exchange; nothing is retried.
    #[error("unexpected {kind} message while {state}")]
    UnexpectedMessage {
        state: &'static str,
        kind: &'static str,
    },

    /// The application finished without completing its response.
    #[error("application ended before completing the response")]
    IncompleteExchange,

    /// A bounded bridge queue rejected a message.
    #[error("inbound queue full (capacity {capacity})")]
    QueueOverflow { capacity: usize },

    /// The application returned an error.
    #[error("application error: {0}")]
    App(#[from] anyhow::Error),

    /// The application task panicked or was cancelled.
    #[error("application task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Codec(#[from] trestle_core::error::CodecError),
}

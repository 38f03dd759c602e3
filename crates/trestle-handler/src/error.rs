//! Handler bridge error types.

use thiserror::Error;

/// Result type alias for handler bridge operations.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Failures of the loopback round-trip.
///
/// All of these are fatal for the current invocation and none are
/// retried: no second request is coming, and retrying would double-serve.
/// The listener itself is never restarted.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to bind loopback listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("loopback connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("invalid loopback request: {0}")]
    Request(#[from] http::Error),

    #[error("loopback round-trip failed: {0}")]
    Http(#[from] hyper::Error),

    #[error("accept task failed to serve the request: {0}")]
    Serve(String),
}

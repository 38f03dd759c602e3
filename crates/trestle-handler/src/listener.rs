//! Ephemeral single-request loopback listener.

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use tokio::task::{JoinHandle, spawn_blocking};
use tracing::{debug, info};

use trestle_app::ConnectionHandler;

/// A loopback listener that serves exactly one request per arming.
///
/// Bound once to an ephemeral port and kept for the process lifetime.
/// This is deliberately not a server loop: each invocation arms it to
/// accept a single connection, and the armed task ends once that
/// connection has been fully served by the handler.
pub struct LoopbackListener {
    listener: Arc<TcpListener>,
    handler: Arc<dyn ConnectionHandler>,
    local_addr: SocketAddr,
}

impl LoopbackListener {
    /// Bind to an ephemeral loopback port.
    pub fn bind(handler: Arc<dyn ConnectionHandler>) -> io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "loopback listener bound");
        Ok(Self {
            listener: Arc::new(listener),
            handler,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept exactly one connection and drive the handler over it.
    ///
    /// Must be called before the matching client request is issued — the
    /// armed task and the client call are two ends of the same socket
    /// round-trip. The returned handle completes once the handler has
    /// finished serving. No timeout is applied here; if the handler
    /// hangs, the invocation hangs, and governing that is the outer
    /// invocation layer's job.
    pub fn arm(&self) -> JoinHandle<io::Result<()>> {
        let listener = Arc::clone(&self.listener);
        let handler = Arc::clone(&self.handler);
        spawn_blocking(move || {
            let (stream, peer) = listener.accept()?;
            debug!(%peer, "accepted loopback connection");
            handler.serve(stream)
        })
    }
}

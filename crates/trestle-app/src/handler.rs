//! The blocking connection-handler convention.

use std::io;
use std::net::TcpStream;

/// A connection-oriented request handler.
///
/// Implementations expect to be driven by a listening socket, not by an
/// in-memory request: the bridge accepts one loopback connection per
/// invocation and hands the stream over. The handler must serve exactly
/// one HTTP exchange on it — read one request, write one response — and
/// return once the response has been flushed. Blocking I/O is expected;
/// the bridge runs the handler on a blocking task.
pub trait ConnectionHandler: Send + Sync + 'static {
    fn serve(&self, stream: TcpStream) -> io::Result<()>;
}

//! Connection scope handed to cycle applications.

use bytes::Bytes;

/// Per-request connection description.
///
/// Built once per invocation from the inbound event, passed by reference
/// into the exchange, never mutated after construction.
#[derive(Debug, Clone)]
pub struct ConnectionScope {
    pub method: String,
    /// Decoded request path, without the query component.
    pub path: String,
    /// The path as raw bytes.
    pub raw_path: Bytes,
    /// Query component without the leading `?`; empty when absent.
    pub query_string: Bytes,
    pub scheme: String,
    pub http_version: String,
    /// Server address hint: `(name, port)`.
    pub server: (String, u16),
    /// Client address hint: `(address, port)`; the port is always 0 —
    /// the invocation transport does not carry it.
    pub client: (String, u16),
    /// Header pairs with lowercased names.
    pub headers: Vec<(Bytes, Bytes)>,
}

impl ConnectionScope {
    /// First header value matching `name` (names are stored lowercased).
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        let name = name.as_bytes();
        self.headers
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v.as_ref())
    }
}

/// What a cycle application is being invoked for.
#[derive(Debug, Clone)]
pub enum Scope {
    /// One HTTP request/response exchange.
    Http(ConnectionScope),
    /// The process-wide startup/shutdown lifecycle.
    Lifespan,
}

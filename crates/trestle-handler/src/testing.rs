//! Minimal connection handlers for exercising the bridge.
//!
//! Real deployments get their handler from the module-loading
//! collaborator; these exist so the bridge (and anything composed on top
//! of it) can be driven in tests without one.

use std::io::{self, Read, Write};
use std::net::TcpStream;

use http::StatusCode;

use trestle_app::ConnectionHandler;

/// One parsed loopback request.
pub struct ParsedRequest {
    pub method: String,
    /// Request target exactly as sent, query included.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Read one HTTP/1.1 request off the stream: head until the blank line,
/// then exactly `content-length` body bytes.
pub fn read_request(stream: &mut TcpStream) -> io::Result<ParsedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before request head",
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    let content_length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(ParsedRequest {
        method,
        target,
        headers,
        body,
    })
}

/// Write one HTTP/1.1 response with the given status, extra headers, and
/// body, then close.
pub fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    extra_headers: &[(String, String)],
    body: &[u8],
) -> io::Result<()> {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    let mut head = format!(
        "HTTP/1.1 {status} {reason}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n",
        body.len()
    );
    for (name, value) in extra_headers {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes())?;
    stream.write_all(body)?;
    stream.flush()
}

/// Replies with a canned status and body to every request.
pub struct FixedResponseHandler {
    status: u16,
    content_type: String,
    extra_headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl FixedResponseHandler {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain".to_string(),
            extra_headers: Vec::new(),
            body: body.into().into_bytes(),
        }
    }

    pub fn binary(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: "application/octet-stream".to_string(),
            extra_headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }
}

impl ConnectionHandler for FixedResponseHandler {
    fn serve(&self, mut stream: TcpStream) -> io::Result<()> {
        read_request(&mut stream)?;
        write_response(
            &mut stream,
            self.status,
            &self.content_type,
            &self.extra_headers,
            &self.body,
        )
    }
}

/// Replies with the request method and target, plus the request body when
/// one was sent.
pub struct EchoHandler;

impl ConnectionHandler for EchoHandler {
    fn serve(&self, mut stream: TcpStream) -> io::Result<()> {
        let request = read_request(&mut stream)?;
        let mut reply = format!("{} {}", request.method, request.target);
        if !request.body.is_empty() {
            reply.push(' ');
            reply.push_str(&String::from_utf8_lossy(&request.body));
        }
        write_response(&mut stream, 200, "text/plain", &[], reply.as_bytes())
    }
}

/// Replies with the raw request body bytes as an octet stream.
pub struct ReflectBodyHandler;

impl ConnectionHandler for ReflectBodyHandler {
    fn serve(&self, mut stream: TcpStream) -> io::Result<()> {
        let request = read_request(&mut stream)?;
        write_response(
            &mut stream,
            200,
            "application/octet-stream",
            &[],
            &request.body,
        )
    }
}

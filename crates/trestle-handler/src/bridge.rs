//! The synchronous handler bridge.

use std::sync::Arc;

use bytes::Bytes;
use http::Request;
use http::header::HOST;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::{debug, error};

use trestle_app::ConnectionHandler;
use trestle_core::codec::{encode_outbound_body, normalize_headers};
use trestle_core::event::{InvocationEvent, ResponseEnvelope};

use crate::error::{HandlerError, HandlerResult};
use crate::listener::LoopbackListener;

/// Bridge from the invocation model onto a blocking connection handler.
///
/// Owns the process-lifetime loopback listener. Each invocation arms the
/// listener for one connection, then issues the matching client call —
/// the two run concurrently and rendezvous over a real socket.
pub struct HandlerBridge {
    listener: LoopbackListener,
}

impl HandlerBridge {
    /// Bind the loopback listener for `handler`. Called once at startup;
    /// the listener is never rebound.
    pub fn new(handler: Arc<dyn ConnectionHandler>) -> HandlerResult<Self> {
        let listener = LoopbackListener::bind(handler).map_err(HandlerError::Bind)?;
        Ok(Self { listener })
    }

    /// Serve one invocation through the loopback socket.
    ///
    /// `body` is the already-decoded request body; absent bodies arrive
    /// empty.
    pub async fn invoke(
        &self,
        event: &InvocationEvent,
        body: Bytes,
    ) -> HandlerResult<ResponseEnvelope> {
        // Server side first: the accept task must be running before the
        // client call below, or there is nothing to connect to.
        let served = self.listener.arm();

        let addr = self.listener.local_addr();
        let stream = TcpStream::connect(addr)
            .await
            .map_err(HandlerError::Connect)?;
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!(error = %e, "loopback connection error");
            }
        });

        let mut builder = Request::builder()
            .method(event.method.as_str())
            .uri(event.path.as_str());
        for (name, value) in &event.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if event.header("host").is_none() {
            builder = builder.header(HOST, addr.to_string());
        }
        let request = builder.body(Full::new(body))?;

        debug!(method = %event.method, path = %event.path, "issuing loopback request");
        let response = sender.send_request(request).await?;
        let (parts, incoming) = response.into_parts();
        let data = incoming.collect().await?.to_bytes();

        // The invocation is only done once the server half has fully
        // served the request.
        match served.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(HandlerError::Serve(e.to_string())),
            Err(e) => return Err(HandlerError::Serve(e.to_string())),
        }

        let headers = normalize_headers(parts.headers.iter().map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        }));
        let encoded = encode_outbound_body(&data);
        Ok(ResponseEnvelope {
            status_code: parts.status.as_u16(),
            headers,
            body: Some(encoded.body),
            encoding: encoded.encoding,
        })
    }
}

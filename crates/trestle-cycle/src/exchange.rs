//! Response exchange state machine.

use std::collections::HashMap;

use bytes::BytesMut;
use tracing::debug;

use trestle_app::OutboundMessage;
use trestle_core::codec::{encode_outbound_body, normalize_header_bytes};
use trestle_core::event::ResponseEnvelope;

use crate::error::{CycleError, CycleResult};

/// Progress of one response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Waiting for the response-start message.
    AwaitingStart,
    /// Status and headers recorded; accumulating body fragments.
    AwaitingBody,
    /// Final body fragment received; the envelope is ready.
    Complete,
}

impl ExchangeState {
    fn name(self) -> &'static str {
        match self {
            ExchangeState::AwaitingStart => "awaiting response start",
            ExchangeState::AwaitingBody => "awaiting response body",
            ExchangeState::Complete => "complete",
        }
    }
}

/// One request/response exchange.
///
/// Owned exclusively by a single bridge invocation; never shared across
/// invocations. Outbound messages are fed through [`handle`](Exchange::handle)
/// strictly in arrival order.
#[derive(Debug, Default)]
pub struct Exchange {
    state: ExchangeState,
    status: u16,
    headers: HashMap<String, Vec<String>>,
    body: BytesMut,
}

impl Default for ExchangeState {
    fn default() -> Self {
        ExchangeState::AwaitingStart
    }
}

impl Exchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == ExchangeState::Complete
    }

    /// Feed one outbound message through the state machine.
    ///
    /// Any message kind that is not legal in the current state fails the
    /// exchange — including anything after completion, and lifecycle
    /// messages at any point.
    pub fn handle(&mut self, message: OutboundMessage) -> CycleResult<()> {
        match (self.state, message) {
            (ExchangeState::AwaitingStart, OutboundMessage::ResponseStart { status, headers }) => {
                self.status = status;
                self.headers = normalize_header_bytes(
                    headers.iter().map(|(n, v)| (n.as_ref(), v.as_ref())),
                );
                self.state = ExchangeState::AwaitingBody;
                debug!(status, "response started");
                Ok(())
            }
            (ExchangeState::AwaitingBody, OutboundMessage::ResponseBody { body, more_body }) => {
                self.body.extend_from_slice(&body);
                if !more_body {
                    self.state = ExchangeState::Complete;
                    debug!(bytes = self.body.len(), "response body complete");
                }
                Ok(())
            }
            (state, message) => Err(CycleError::UnexpectedMessage {
                state: state.name(),
                kind: message.kind(),
            }),
        }
    }

    /// Finalize into an envelope. Only legal once complete — a violated
    /// or abandoned exchange never yields a partial envelope.
    pub fn into_envelope(self) -> CycleResult<ResponseEnvelope> {
        if self.state != ExchangeState::Complete {
            return Err(CycleError::IncompleteExchange);
        }
        let body = self.body.freeze();
        let (body, encoding) = if body.is_empty() {
            (None, None)
        } else {
            let encoded = encode_outbound_body(&body);
            (Some(encoded.body), encoded.encoding)
        };
        Ok(ResponseEnvelope {
            status_code: self.status,
            headers: self.headers,
            body,
            encoding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn start(status: u16) -> OutboundMessage {
        OutboundMessage::ResponseStart {
            status,
            headers: vec![(
                Bytes::from_static(b"content-type"),
                Bytes::from_static(b"text/plain"),
            )],
        }
    }

    fn body(data: &'static [u8], more_body: bool) -> OutboundMessage {
        OutboundMessage::ResponseBody {
            body: Bytes::from_static(data),
            more_body,
        }
    }

    #[test]
    fn start_then_final_body_completes() {
        let mut exchange = Exchange::new();
        assert_eq!(exchange.state(), ExchangeState::AwaitingStart);

        exchange.handle(start(200)).unwrap();
        assert_eq!(exchange.state(), ExchangeState::AwaitingBody);

        exchange.handle(body(b"hello", false)).unwrap();
        assert!(exchange.is_complete());

        let envelope = exchange.into_envelope().unwrap();
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body.as_deref(), Some("hello"));
        assert_eq!(envelope.encoding, None);
        assert_eq!(envelope.headers["content-type"], vec!["text/plain"]);
    }

    #[test]
    fn body_fragments_accumulate_in_order() {
        let mut exchange = Exchange::new();
        exchange.handle(start(200)).unwrap();
        exchange.handle(body(b"he", true)).unwrap();
        assert_eq!(exchange.state(), ExchangeState::AwaitingBody);
        exchange.handle(body(b"llo", false)).unwrap();

        let envelope = exchange.into_envelope().unwrap();
        assert_eq!(envelope.body.as_deref(), Some("hello"));
    }

    #[test]
    fn empty_body_yields_no_body_field() {
        let mut exchange = Exchange::new();
        exchange.handle(start(204)).unwrap();
        exchange.handle(body(b"", false)).unwrap();

        let envelope = exchange.into_envelope().unwrap();
        assert_eq!(envelope.status_code, 204);
        assert_eq!(envelope.body, None);
        assert_eq!(envelope.encoding, None);
    }

    #[test]
    fn binary_body_is_base64_tagged() {
        let mut exchange = Exchange::new();
        exchange.handle(start(200)).unwrap();
        exchange
            .handle(OutboundMessage::ResponseBody {
                body: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
                more_body: false,
            })
            .unwrap();

        let envelope = exchange.into_envelope().unwrap();
        assert_eq!(envelope.body.as_deref(), Some("3q2+7w=="));
        assert_eq!(envelope.encoding.as_deref(), Some("base64"));
    }

    #[test]
    fn duplicate_headers_survive_normalization() {
        let mut exchange = Exchange::new();
        exchange
            .handle(OutboundMessage::ResponseStart {
                status: 200,
                headers: vec![
                    (Bytes::from_static(b"set-cookie"), Bytes::from_static(b"a=1")),
                    (Bytes::from_static(b"set-cookie"), Bytes::from_static(b"b=2")),
                ],
            })
            .unwrap();
        exchange.handle(body(b"", false)).unwrap();

        let envelope = exchange.into_envelope().unwrap();
        assert_eq!(envelope.headers["set-cookie"], vec!["a=1", "b=2"]);
    }

    #[test]
    fn body_before_start_is_a_protocol_violation() {
        let mut exchange = Exchange::new();
        let err = exchange.handle(body(b"early", false)).unwrap_err();
        assert!(matches!(
            err,
            CycleError::UnexpectedMessage {
                state: "awaiting response start",
                kind: "response-body",
            }
        ));
        // No partial envelope after a violation.
        assert!(matches!(
            exchange.into_envelope(),
            Err(CycleError::IncompleteExchange)
        ));
    }

    #[test]
    fn second_start_is_a_protocol_violation() {
        let mut exchange = Exchange::new();
        exchange.handle(start(200)).unwrap();
        let err = exchange.handle(start(500)).unwrap_err();
        assert!(matches!(
            err,
            CycleError::UnexpectedMessage {
                kind: "response-start",
                ..
            }
        ));
    }

    #[test]
    fn messages_after_completion_are_rejected() {
        let mut exchange = Exchange::new();
        exchange.handle(start(200)).unwrap();
        exchange.handle(body(b"done", false)).unwrap();
        let err = exchange.handle(body(b"late", false)).unwrap_err();
        assert!(matches!(
            err,
            CycleError::UnexpectedMessage {
                state: "complete",
                ..
            }
        ));
    }

    #[test]
    fn lifecycle_messages_are_never_legal_in_an_exchange() {
        let mut exchange = Exchange::new();
        let err = exchange
            .handle(OutboundMessage::LifespanStartupComplete)
            .unwrap_err();
        assert!(matches!(err, CycleError::UnexpectedMessage { .. }));
    }

    #[test]
    fn incomplete_exchange_never_finalizes() {
        let mut exchange = Exchange::new();
        exchange.handle(start(200)).unwrap();
        exchange.handle(body(b"partial", true)).unwrap();
        assert!(matches!(
            exchange.into_envelope(),
            Err(CycleError::IncompleteExchange)
        ));
    }
}

//! The bidirectional message protocol between a bridge and a cycle
//! application.
//!
//! Delivery is strictly FIFO in both directions: inbound messages arrive
//! over a bounded queue, outbound messages are processed in arrival
//! order by the bridge's exchange state machine.

use bytes::Bytes;
use tokio::sync::mpsc;

/// Messages delivered to the application over its inbound queue.
#[derive(Debug, Clone)]
pub enum InboundMessage {
    /// The request body. Trestle delivers the entire body atomically:
    /// `more_body` is always false on the wire today, but the field is
    /// part of the convention the application is written against.
    Request { body: Bytes, more_body: bool },
    /// The exchange is over; no further inbound messages follow.
    Disconnect,
    /// Opens the lifecycle handshake.
    LifespanStartup,
    /// Per-cycle shutdown synchronization point.
    LifespanShutdown,
}

impl InboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::Request { .. } => "request",
            InboundMessage::Disconnect => "disconnect",
            InboundMessage::LifespanStartup => "lifespan-startup",
            InboundMessage::LifespanShutdown => "lifespan-shutdown",
        }
    }
}

/// Messages the application sends back to its bridge.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    /// Status and headers. Must be the first outbound message of an
    /// exchange.
    ResponseStart {
        status: u16,
        headers: Vec<(Bytes, Bytes)>,
    },
    /// A body fragment; `more_body: false` completes the response.
    ResponseBody { body: Bytes, more_body: bool },
    /// Acknowledges the startup message.
    LifespanStartupComplete,
    /// Acknowledges the shutdown message.
    LifespanShutdownComplete,
}

impl OutboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::ResponseStart { .. } => "response-start",
            OutboundMessage::ResponseBody { .. } => "response-body",
            OutboundMessage::LifespanStartupComplete => "lifespan-startup-complete",
            OutboundMessage::LifespanShutdownComplete => "lifespan-shutdown-complete",
        }
    }
}

/// Bounded-channel endpoints wiring a cycle application to its bridge.
pub type InboundSender = mpsc::Sender<InboundMessage>;
pub type InboundReceiver = mpsc::Receiver<InboundMessage>;
pub type OutboundSender = mpsc::Sender<OutboundMessage>;
pub type OutboundReceiver = mpsc::Receiver<OutboundMessage>;

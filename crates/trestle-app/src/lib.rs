//! trestle-app — the conventions a hosted application is written against.
//!
//! Trestle drives exactly one of two application shapes per process:
//!
//! - a [`ConnectionHandler`]: a blocking, socket-driven request handler.
//!   The bridge accepts one loopback connection per invocation and hands
//!   the stream over; the handler serves a single HTTP exchange on it.
//! - a [`CycleApp`]: a message-driven asynchronous callable. The bridge
//!   invokes it with a connection [`Scope`] and a pair of bounded channel
//!   endpoints, delivers the request as an inbound message, and collects
//!   the response from its outbound messages.
//!
//! Which shape is active is a [`AppCapability`] resolved exactly once at
//! startup, never re-inspected per request.

pub mod capability;
pub mod handler;
pub mod message;
pub mod scope;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use capability::AppCapability;
pub use handler::ConnectionHandler;
pub use message::{
    InboundMessage, InboundReceiver, InboundSender, OutboundMessage, OutboundReceiver,
    OutboundSender,
};
pub use scope::{ConnectionScope, Scope};

/// Future returned by one cycle-application invocation.
pub type AppFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// The asynchronous cycle-application convention: a callable taking the
/// connection scope and the two channel endpoints, returning a future
/// that runs the application body to completion.
pub type CycleApp = Arc<dyn Fn(Scope, InboundReceiver, OutboundSender) -> AppFuture + Send + Sync>;

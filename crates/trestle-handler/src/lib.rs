//! trestle-handler — bridge onto the blocking connection-handler
//! convention.
//!
//! The handler convention expects to be driven by a listening socket,
//! not by a single in-memory request. The bridge keeps that contract
//! intact by running a real socket round-trip inside each invocation:
//!
//! ```text
//! InvocationEvent
//!   │
//!   ├── arm listener (accept-once blocking task runs the handler)
//!   ├── loopback http1 client call to 127.0.0.1:<ephemeral-port>
//!   ├── await armed task (request fully served)
//!   │
//!   ▼
//! ResponseEnvelope
//! ```
//!
//! The listener is bound once and lives for the process; it is never a
//! general-purpose server loop — it serves exactly one request per
//! arming.

pub mod bridge;
pub mod error;
pub mod listener;
pub mod testing;

pub use bridge::HandlerBridge;
pub use error::{HandlerError, HandlerResult};
pub use listener::LoopbackListener;

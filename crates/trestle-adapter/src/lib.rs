//! trestle-adapter — the invocation entry point.
//!
//! Composes the codec and the two bridges into a single surface:
//!
//! ```text
//! JSON event
//!   │
//!   ▼
//! Adapter
//!   ├── parse InvocationEvent, decode the body once
//!   ├── delegate to the bridge selected at startup
//!   │     ├── HandlerBridge  (connection-handler convention)
//!   │     └── CycleBridge    (cycle-application convention)
//!   ▼
//! JSON response envelope
//! ```
//!
//! Bridge selection happens exactly once, when the adapter is built from
//! the detected [`AppCapability`](trestle_app::AppCapability). An
//! application exposing neither convention is a configuration error: the
//! adapter refuses to construct, and the embedding process must refuse
//! to serve rather than guess.

pub mod adapter;
pub mod error;

pub use adapter::{Adapter, Bridge};
pub use error::{AdapterError, AdapterResult};

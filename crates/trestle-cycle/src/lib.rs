//! trestle-cycle — bridge onto the message-driven cycle-application
//! convention.
//!
//! One invocation is one exchange: the bridge delivers the request as a
//! single inbound message, runs the application future to completion,
//! and folds its outbound messages through a small state machine:
//!
//! ```text
//! AwaitingStart ──response-start──▶ AwaitingBody ──final body──▶ Complete
//! ```
//!
//! Independent of any request, the convention also expects a
//! startup/shutdown lifecycle handshake. The lifecycle task is a
//! process-wide singleton created on the first invocation; the shutdown
//! handshake deliberately repeats after every exchange (a per-cycle
//! synchronization point) while the application instance itself is never
//! restarted.

pub mod bridge;
pub mod error;
pub mod exchange;
pub mod lifespan;
pub mod scope;
pub mod testing;

pub use bridge::CycleBridge;
pub use error::{CycleError, CycleResult};
pub use exchange::{Exchange, ExchangeState};
pub use lifespan::{Lifespan, LifecycleState};
pub use scope::build_scope;

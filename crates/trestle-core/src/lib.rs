//! trestle-core — shared types for the Trestle invocation adapter.
//!
//! An invocation delivers exactly one HTTP request as a JSON event and
//! expects exactly one HTTP response back as a JSON envelope. This crate
//! owns both wire shapes and the codec that keeps them JSON-text-safe:
//! headers are grouped into a duplicate-preserving mapping of lists, and
//! bodies travel as plain UTF-8 text when possible, base64 with an
//! explicit encoding tag otherwise.

pub mod codec;
pub mod config;
pub mod error;
pub mod event;

pub use codec::{
    EncodedBody, decode_inbound_body, encode_outbound_body, normalize_header_bytes,
    normalize_headers,
};
pub use config::{AdapterConfig, BridgeSettings};
pub use error::{CodecError, CodecResult};
pub use event::{BODY_ENCODING_BASE64, InvocationEvent, ResponseEnvelope};

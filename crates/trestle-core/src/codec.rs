//! Header and body normalization shared by both bridges.
//!
//! The invocation transport is JSON text. Response bodies that are valid
//! UTF-8 pass through as-is; anything else is base64-encoded with an
//! explicit tag so arbitrary binary payloads survive the transport
//! without corruption.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use bytes::Bytes;

use crate::error::{CodecError, CodecResult};
use crate::event::BODY_ENCODING_BASE64;

/// Group header values by name, preserving duplicate values in their
/// order of arrival.
pub fn normalize_headers<I, N, V>(pairs: I) -> HashMap<String, Vec<String>>
where
    I: IntoIterator<Item = (N, V)>,
    N: Into<String>,
    V: Into<String>,
{
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in pairs {
        grouped.entry(name.into()).or_default().push(value.into());
    }
    grouped
}

/// Byte-pair form of [`normalize_headers`].
///
/// Names and values are interpreted as UTF-8 text. Callers only take this
/// path for header pairs they know to be textual; malformed input is a
/// precondition violation and is converted lossily rather than failing
/// the invocation.
pub fn normalize_header_bytes<'a, I>(pairs: I) -> HashMap<String, Vec<String>>
where
    I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
{
    normalize_headers(pairs.into_iter().map(|(name, value)| {
        (
            String::from_utf8_lossy(name).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        )
    }))
}

/// A response body ready for the JSON envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub body: String,
    /// Set iff the original bytes were not valid UTF-8 text.
    pub encoding: Option<String>,
}

/// Encode outbound body bytes for the envelope: plain text when the bytes
/// are valid UTF-8, tagged base64 otherwise.
pub fn encode_outbound_body(data: &[u8]) -> EncodedBody {
    match std::str::from_utf8(data) {
        Ok(text) => EncodedBody {
            body: text.to_owned(),
            encoding: None,
        },
        Err(_) => EncodedBody {
            body: BASE64_STANDARD.encode(data),
            encoding: Some(BODY_ENCODING_BASE64.to_owned()),
        },
    }
}

/// Decode an inbound event body into raw bytes.
///
/// An absent body is empty. An encoding tag other than base64 fails the
/// invocation with [`CodecError::UnsupportedEncoding`].
pub fn decode_inbound_body(body: Option<&str>, encoding: Option<&str>) -> CodecResult<Bytes> {
    let Some(body) = body else {
        return Ok(Bytes::new());
    };
    match encoding {
        Some(tag) if tag == BODY_ENCODING_BASE64 => {
            Ok(Bytes::from(BASE64_STANDARD.decode(body)?))
        }
        Some(tag) => Err(CodecError::UnsupportedEncoding(tag.to_owned())),
        None => Ok(Bytes::copy_from_slice(body.as_bytes())),
    }
}

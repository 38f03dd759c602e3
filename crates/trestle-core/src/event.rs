//! Invocation wire types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The only body-encoding tag recognised on either side of the wire.
pub const BODY_ENCODING_BASE64: &str = "base64";

/// One inbound unit of work: a single HTTP request delivered as a JSON
/// event by the invocation environment.
///
/// Immutable once parsed; discarded after the response envelope has been
/// produced.
#[derive(Debug, Clone, Deserialize)]
pub struct InvocationEvent {
    pub method: String,
    /// Request path, possibly carrying a query component.
    pub path: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Set when `body` is binary-safe encoded rather than plain text.
    #[serde(default)]
    pub encoding: Option<String>,
}

impl InvocationEvent {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// First header value matching `name`, ASCII-case-insensitively.
    ///
    /// The event map carries at most one value per header name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The outbound unit: status, grouped headers, and a text-or-encoded body.
///
/// When `body` is present but was not valid UTF-8 text, `encoding` names
/// the reversible binary-safe encoding applied to it; decoding and
/// re-encoding must reproduce the original bytes exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    /// Header values grouped by name, duplicates preserved in arrival order.
    pub headers: HashMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl ResponseEnvelope {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_parses_minimal_fields() {
        let event = InvocationEvent::from_json(r#"{"method": "GET", "path": "/"}"#).unwrap();
        assert_eq!(event.method, "GET");
        assert_eq!(event.path, "/");
        assert!(event.headers.is_empty());
        assert!(event.body.is_none());
        assert!(event.encoding.is_none());
    }

    #[test]
    fn event_parses_full_fields() {
        let event = InvocationEvent::from_json(
            r#"{
                "method": "POST",
                "path": "/submit?draft=1",
                "headers": {"Host": "example.com"},
                "body": "3q2+7w==",
                "encoding": "base64"
            }"#,
        )
        .unwrap();
        assert_eq!(event.path, "/submit?draft=1");
        assert_eq!(event.headers.len(), 1);
        assert_eq!(event.body.as_deref(), Some("3q2+7w=="));
        assert_eq!(event.encoding.as_deref(), Some(BODY_ENCODING_BASE64));
    }

    #[test]
    fn event_missing_method_is_an_error() {
        assert!(InvocationEvent::from_json(r#"{"path": "/"}"#).is_err());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let event = InvocationEvent::from_json(
            r#"{"method": "GET", "path": "/", "headers": {"X-Forwarded-Proto": "https"}}"#,
        )
        .unwrap();
        assert_eq!(event.header("x-forwarded-proto"), Some("https"));
        assert_eq!(event.header("X-FORWARDED-PROTO"), Some("https"));
        assert_eq!(event.header("host"), None);
    }

    #[test]
    fn envelope_serializes_status_code_key() {
        let envelope = ResponseEnvelope {
            status_code: 204,
            headers: HashMap::new(),
            body: None,
            encoding: None,
        };
        let json = envelope.to_json().unwrap();
        assert!(json.contains(r#""statusCode":204"#));
        assert!(!json.contains("body"));
        assert!(!json.contains("encoding"));
    }

    #[test]
    fn envelope_round_trips_through_json() {
        let envelope = ResponseEnvelope {
            status_code: 200,
            headers: HashMap::from([("set-cookie".to_string(), vec![
                "a=1".to_string(),
                "b=2".to_string(),
            ])]),
            body: Some("hello".to_string()),
            encoding: None,
        };
        let json = envelope.to_json().unwrap();
        let parsed: ResponseEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);
    }
}

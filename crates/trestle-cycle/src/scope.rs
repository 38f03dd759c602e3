//! Connection-scope construction from the inbound event.

use bytes::Bytes;

use trestle_app::ConnectionScope;
use trestle_core::config::BridgeSettings;
use trestle_core::event::InvocationEvent;

/// Build the per-request scope.
///
/// Client, server, and scheme hints come from forwarding headers when
/// present, falling back to the configured defaults. Header names are
/// lowercased into the scope's byte pairs.
pub fn build_scope(event: &InvocationEvent, settings: &BridgeSettings) -> ConnectionScope {
    let (path, query) = match event.path.split_once('?') {
        Some((path, query)) => (path.to_owned(), Bytes::copy_from_slice(query.as_bytes())),
        None => (event.path.clone(), Bytes::new()),
    };

    let server_name = event
        .header("host")
        .unwrap_or(settings.server_name.as_str())
        .to_owned();
    let server_port = event
        .header("x-forwarded-port")
        .and_then(|p| p.parse().ok())
        .unwrap_or(settings.server_port);
    let scheme = event
        .header("x-forwarded-proto")
        .unwrap_or(settings.scheme.as_str())
        .to_owned();
    let client_addr = event
        .header("x-forwarded-for")
        .or_else(|| event.header("x-real-ip"))
        .unwrap_or_default()
        .to_owned();

    let headers = event
        .headers
        .iter()
        .map(|(name, value)| {
            (
                Bytes::from(name.to_ascii_lowercase()),
                Bytes::copy_from_slice(value.as_bytes()),
            )
        })
        .collect();

    ConnectionScope {
        method: event.method.clone(),
        raw_path: Bytes::copy_from_slice(path.as_bytes()),
        path,
        query_string: query,
        scheme,
        http_version: "1.1".to_owned(),
        server: (server_name, server_port),
        client: (client_addr, 0),
        headers,
    }
}

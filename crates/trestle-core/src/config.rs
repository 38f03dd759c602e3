//! trestle.toml configuration parser.
//!
//! The file shape keeps every field optional; [`BridgeSettings`] is the
//! resolved form with defaults applied, which is what the bridges
//! actually consume.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub bridge: Option<BridgeConfig>,
    pub scope: Option<ScopeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BridgeConfig {
    /// Capacity of the bounded message queues between bridge and application.
    pub queue_capacity: Option<usize>,
}

/// Fallbacks for connection-scope fields when the request carries no
/// forwarding headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScopeConfig {
    pub server_name: Option<String>,
    pub server_port: Option<u16>,
    pub scheme: Option<String>,
}

impl AdapterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AdapterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Resolved settings shared by both bridges.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub queue_capacity: usize,
    /// Server name used in the connection scope when no `host` header is present.
    pub server_name: String,
    /// Server port used when no `x-forwarded-port` header is present.
    pub server_port: u16,
    /// Scheme used when no `x-forwarded-proto` header is present.
    pub scheme: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 8,
            server_name: "invocation".to_string(),
            server_port: 80,
            scheme: "http".to_string(),
        }
    }
}

impl BridgeSettings {
    pub fn from_config(config: &AdapterConfig) -> Self {
        let defaults = Self::default();
        Self {
            queue_capacity: config
                .bridge
                .as_ref()
                .and_then(|b| b.queue_capacity)
                .unwrap_or(defaults.queue_capacity),
            server_name: config
                .scope
                .as_ref()
                .and_then(|s| s.server_name.clone())
                .unwrap_or(defaults.server_name),
            server_port: config
                .scope
                .as_ref()
                .and_then(|s| s.server_port)
                .unwrap_or(defaults.server_port),
            scheme: config
                .scope
                .as_ref()
                .and_then(|s| s.scheme.clone())
                .unwrap_or(defaults.scheme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let config: AdapterConfig = toml::from_str("").unwrap();
        let settings = BridgeSettings::from_config(&config);
        assert_eq!(settings.queue_capacity, 8);
        assert_eq!(settings.server_name, "invocation");
        assert_eq!(settings.server_port, 80);
        assert_eq!(settings.scheme, "http");
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let config: AdapterConfig = toml::from_str(
            r#"
            [bridge]
            queue-capacity = 32

            [scope]
            scheme = "https"
            "#,
        )
        .unwrap();
        let settings = BridgeSettings::from_config(&config);
        assert_eq!(settings.queue_capacity, 32);
        assert_eq!(settings.scheme, "https");
        assert_eq!(settings.server_port, 80);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AdapterConfig {
            bridge: Some(BridgeConfig {
                queue_capacity: Some(4),
            }),
            scope: Some(ScopeConfig {
                server_name: Some("edge".to_string()),
                server_port: Some(443),
                scheme: Some("https".to_string()),
            }),
        };
        let text = config.to_toml_string().unwrap();
        let parsed: AdapterConfig = toml::from_str(&text).unwrap();
        let settings = BridgeSettings::from_config(&parsed);
        assert_eq!(settings.queue_capacity, 4);
        assert_eq!(settings.server_name, "edge");
        assert_eq!(settings.server_port, 443);
    }
}

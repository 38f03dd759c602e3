//! Bridge selection and the per-invocation entry point.

use std::sync::Arc;

use tracing::{debug, info};

use trestle_app::{AppCapability, ConnectionHandler, CycleApp};
use trestle_core::codec::decode_inbound_body;
use trestle_core::config::BridgeSettings;
use trestle_core::event::{InvocationEvent, ResponseEnvelope};
use trestle_cycle::CycleBridge;
use trestle_handler::HandlerBridge;

use crate::error::{AdapterError, AdapterResult};

/// The bridge active for this process. Selected exactly once, at
/// startup, from the detected application capability.
pub enum Bridge {
    Handler(HandlerBridge),
    Cycle(CycleBridge),
}

/// Entry point: turns one invocation event into one response envelope.
///
/// One invocation is processed to completion before the next begins;
/// neither bridge supports overlapping exchanges.
pub struct Adapter {
    bridge: Bridge,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self.bridge {
            Bridge::Handler(_) => "Handler",
            Bridge::Cycle(_) => "Cycle",
        };
        f.debug_struct("Adapter").field("bridge", &variant).finish()
    }
}

impl Adapter {
    /// Build the adapter for an already-detected capability.
    pub fn new(capability: AppCapability, settings: BridgeSettings) -> AdapterResult<Self> {
        let bridge = match capability {
            AppCapability::Handler(handler) => {
                info!("using connection-handler bridge");
                Bridge::Handler(HandlerBridge::new(handler)?)
            }
            AppCapability::Cycle(app) => {
                info!("using cycle-application bridge");
                Bridge::Cycle(CycleBridge::new(app, settings))
            }
        };
        Ok(Self { bridge })
    }

    /// Detect the exposed capability and build the adapter.
    ///
    /// An application exposing neither convention is a configuration
    /// error — fatal at startup, never a per-request failure.
    pub fn detect(
        handler: Option<Arc<dyn ConnectionHandler>>,
        app: Option<CycleApp>,
        settings: BridgeSettings,
    ) -> AdapterResult<Self> {
        let capability = AppCapability::detect(handler, app).ok_or_else(|| {
            AdapterError::Configuration(
                "loaded application exposes neither a connection handler nor a cycle application"
                    .to_owned(),
            )
        })?;
        debug!(capability = capability.name(), "application capability detected");
        Self::new(capability, settings)
    }

    /// Serve one invocation.
    pub async fn invoke(&self, event: &InvocationEvent) -> AdapterResult<ResponseEnvelope> {
        let body = decode_inbound_body(event.body.as_deref(), event.encoding.as_deref())?;
        let envelope = match &self.bridge {
            Bridge::Handler(bridge) => bridge.invoke(event, body).await?,
            Bridge::Cycle(bridge) => bridge.invoke(event, body).await?,
        };
        Ok(envelope)
    }

    /// JSON wire entry: parse the event, invoke, serialize the envelope.
    pub async fn invoke_json(&self, raw: &str) -> AdapterResult<String> {
        let event = InvocationEvent::from_json(raw)?;
        let envelope = self.invoke(&event).await?;
        Ok(envelope.to_json()?)
    }
}

//! The asynchronous cycle bridge.

use bytes::Bytes;
use tokio::sync::{OnceCell, mpsc};
use tracing::{debug, info};

use trestle_app::{CycleApp, InboundMessage, Scope};
use trestle_core::config::BridgeSettings;
use trestle_core::event::{InvocationEvent, ResponseEnvelope};

use crate::error::{CycleError, CycleResult};
use crate::exchange::Exchange;
use crate::lifespan::{Lifespan, LifecycleState};
use crate::scope::build_scope;

/// Bridge from the invocation model onto a message-driven cycle
/// application.
///
/// Holds at most one in-flight exchange by construction. The lifecycle
/// singleton is created lazily on the first invocation and persists for
/// the life of the process.
pub struct CycleBridge {
    app: CycleApp,
    settings: BridgeSettings,
    lifespan: OnceCell<Lifespan>,
}

impl CycleBridge {
    pub fn new(app: CycleApp, mut settings: BridgeSettings) -> Self {
        // A zero-capacity channel cannot hold the request message.
        settings.queue_capacity = settings.queue_capacity.max(1);
        Self {
            app,
            settings,
            lifespan: OnceCell::new(),
        }
    }

    /// Lifecycle state of the application singleton; `None` before the
    /// first invocation has created it.
    pub async fn lifecycle_state(&self) -> Option<LifecycleState> {
        match self.lifespan.get() {
            Some(lifespan) => Some(lifespan.state().await),
            None => None,
        }
    }

    /// Drive one full request/response exchange to completion.
    ///
    /// `body` is the already-decoded request body; it is delivered to
    /// the application atomically as a single inbound message.
    pub async fn invoke(
        &self,
        event: &InvocationEvent,
        body: Bytes,
    ) -> CycleResult<ResponseEnvelope> {
        let scope = build_scope(event, &self.settings);

        let lifespan = self
            .lifespan
            .get_or_init(|| async {
                info!("spawning application lifecycle task");
                Lifespan::spawn(self.app.clone(), self.settings.queue_capacity)
            })
            .await;
        lifespan.wait_startup().await;

        let capacity = self.settings.queue_capacity;
        let (in_tx, in_rx) = mpsc::channel(capacity);
        let (out_tx, mut out_rx) = mpsc::channel(capacity);

        // The entire body is delivered before the application task even
        // starts; chunked request delivery is not part of this bridge.
        in_tx
            .try_send(InboundMessage::Request {
                body,
                more_body: false,
            })
            .map_err(|_| CycleError::QueueOverflow { capacity })?;

        let task = tokio::spawn((self.app)(Scope::Http(scope), in_rx, out_tx));

        let mut exchange = Exchange::new();
        while let Some(message) = out_rx.recv().await {
            let was_complete = exchange.is_complete();
            if let Err(e) = exchange.handle(message) {
                task.abort();
                return Err(e);
            }
            if !was_complete && exchange.is_complete() {
                // The exchange is over from the application's point of
                // view; it may still be draining its inbound queue.
                let _ = in_tx.try_send(InboundMessage::Disconnect);
            }
        }

        // The outbound channel only closes once the application future
        // has finished; surface its failure before touching the envelope.
        task.await??;

        let envelope = exchange.into_envelope()?;
        lifespan.wait_shutdown().await;
        debug!(status = envelope.status_code, "exchange finished");
        Ok(envelope)
    }
}

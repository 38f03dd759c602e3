//! Canned cycle applications for exercising the bridge.
//!
//! Real deployments get their application from the module-loading
//! collaborator; these exist so the bridge (and anything composed on top
//! of it) can be driven in tests without one.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::{Bytes, BytesMut};

use trestle_app::{
    CycleApp, InboundMessage, InboundReceiver, OutboundMessage, OutboundSender, Scope,
};

/// Acknowledge lifecycle messages until the queue closes.
pub async fn lifespan_ack_loop(
    mut rx: InboundReceiver,
    tx: OutboundSender,
) -> anyhow::Result<()> {
    while let Some(message) = rx.recv().await {
        match message {
            InboundMessage::LifespanStartup => {
                tx.send(OutboundMessage::LifespanStartupComplete).await?;
            }
            InboundMessage::LifespanShutdown => {
                tx.send(OutboundMessage::LifespanShutdownComplete).await?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Echo application: replies 200 with the request body, mirroring the
/// request's `content-type` when one was sent.
pub fn echo_app() -> CycleApp {
    instrumented_echo_app(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
}

/// [`echo_app`] with counters recording how many startup and shutdown
/// messages the application actually processed.
pub fn instrumented_echo_app(
    startups: Arc<AtomicUsize>,
    shutdowns: Arc<AtomicUsize>,
) -> CycleApp {
    Arc::new(move |scope, mut rx, tx| {
        let startups = Arc::clone(&startups);
        let shutdowns = Arc::clone(&shutdowns);
        Box::pin(async move {
            match scope {
                Scope::Lifespan => {
                    while let Some(message) = rx.recv().await {
                        match message {
                            InboundMessage::LifespanStartup => {
                                startups.fetch_add(1, Ordering::SeqCst);
                                tx.send(OutboundMessage::LifespanStartupComplete).await?;
                            }
                            InboundMessage::LifespanShutdown => {
                                shutdowns.fetch_add(1, Ordering::SeqCst);
                                tx.send(OutboundMessage::LifespanShutdownComplete).await?;
                            }
                            _ => {}
                        }
                    }
                    Ok(())
                }
                Scope::Http(scope) => {
                    let mut body = BytesMut::new();
                    while let Some(message) = rx.recv().await {
                        match message {
                            InboundMessage::Request {
                                body: chunk,
                                more_body,
                            } => {
                                body.extend_from_slice(&chunk);
                                if !more_body {
                                    break;
                                }
                            }
                            _ => break,
                        }
                    }
                    let content_type = scope
                        .header("content-type")
                        .map(Bytes::copy_from_slice)
                        .unwrap_or_else(|| Bytes::from_static(b"application/octet-stream"));
                    tx.send(OutboundMessage::ResponseStart {
                        status: 200,
                        headers: vec![(Bytes::from_static(b"content-type"), content_type)],
                    })
                    .await?;
                    tx.send(OutboundMessage::ResponseBody {
                        body: body.freeze(),
                        more_body: false,
                    })
                    .await?;
                    Ok(())
                }
            }
        })
    })
}

/// Protocol violator: sends a body fragment before any response start.
pub fn early_body_app() -> CycleApp {
    Arc::new(|scope, rx, tx| {
        Box::pin(async move {
            match scope {
                Scope::Lifespan => lifespan_ack_loop(rx, tx).await,
                Scope::Http(_) => {
                    tx.send(OutboundMessage::ResponseBody {
                        body: Bytes::from_static(b"too early"),
                        more_body: false,
                    })
                    .await?;
                    Ok(())
                }
            }
        })
    })
}

/// Application whose future fails immediately, whatever the scope.
pub fn failing_lifespan_app() -> CycleApp {
    Arc::new(|_scope, _rx, _tx| Box::pin(async { Err(anyhow::anyhow!("application exploded")) }))
}

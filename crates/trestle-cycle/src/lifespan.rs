//! Application lifecycle handshake.
//!
//! The cycle convention expects a startup/shutdown protocol independent
//! of any single request. The lifecycle task is a process-wide
//! singleton: spawned on the first invocation, never restarted, torn
//! down only by process exit. The shutdown handshake runs after every
//! exchange as a synchronization point — the application instance keeps
//! running in between.

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use trestle_app::{CycleApp, InboundMessage, InboundSender, OutboundMessage, Scope};

/// Lifecycle progress of the application singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NotStarted,
    Starting,
    Ready,
    ShuttingDown,
    /// The lifecycle task has ended. Requests are still served — the
    /// application instance is never restarted between invocations.
    Stopped,
}

/// The running lifecycle task plus its handshake signals.
///
/// The completion signals are sticky: once set they stay set, so a
/// repeated handshake returns immediately instead of waiting on an
/// acknowledgement the application will never send twice.
pub struct Lifespan {
    state: Mutex<LifecycleState>,
    queue: InboundSender,
    startup: watch::Receiver<bool>,
    shutdown: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl Lifespan {
    /// Spawn the lifecycle task for `app`.
    ///
    /// The task owns its own bounded inbound queue and runs the
    /// application with the lifespan scope. Outbound acknowledgements
    /// are folded into the completion signals; when the task ends — for
    /// any reason — both signals are set, so a failed startup degrades
    /// to best-effort serving instead of wedging the invocation.
    pub fn spawn(app: CycleApp, queue_capacity: usize) -> Self {
        let (in_tx, in_rx) = mpsc::channel(queue_capacity);
        let (out_tx, mut out_rx) = mpsc::channel(queue_capacity);
        let (startup_tx, startup_rx) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let run = app(Scope::Lifespan, in_rx, out_tx);
            let signals = async {
                while let Some(message) = out_rx.recv().await {
                    match message {
                        OutboundMessage::LifespanStartupComplete => {
                            debug!("application signalled startup complete");
                            startup_tx.send_replace(true);
                        }
                        OutboundMessage::LifespanShutdownComplete => {
                            debug!("application signalled shutdown complete");
                            shutdown_tx.send_replace(true);
                        }
                        other => {
                            warn!(kind = other.kind(), "unexpected lifecycle message");
                        }
                    }
                }
            };
            let (result, ()) = tokio::join!(run, signals);
            if let Err(e) = result {
                warn!(error = %e, "lifecycle task ended with error");
            } else {
                debug!("lifecycle task ended");
            }
            // Release any pending waiters whatever happened above.
            startup_tx.send_replace(true);
            shutdown_tx.send_replace(true);
        });

        Self {
            state: Mutex::new(LifecycleState::NotStarted),
            queue: in_tx,
            startup: startup_rx,
            shutdown: shutdown_rx,
            task,
        }
    }

    /// Run the startup handshake once.
    ///
    /// Only the very first call performs the handshake; every later call
    /// returns immediately — application startup logic is never re-run.
    pub async fn wait_startup(&self) {
        {
            let mut state = self.state.lock().await;
            if *state != LifecycleState::NotStarted {
                return;
            }
            *state = LifecycleState::Starting;
        }
        if self.queue.send(InboundMessage::LifespanStartup).await.is_err() {
            warn!("lifecycle queue closed before the startup message");
        }
        let mut startup = self.startup.clone();
        let _ = startup.wait_for(|done| *done).await;
        *self.state.lock().await = LifecycleState::Ready;
        info!("application startup complete");
    }

    /// Run the shutdown handshake for this invocation.
    ///
    /// The application is not restarted afterwards; this is a per-cycle
    /// synchronization point, so the state settles back to `Ready` while
    /// the task is alive, or `Stopped` once it has ended.
    pub async fn wait_shutdown(&self) {
        {
            let mut state = self.state.lock().await;
            if *state != LifecycleState::Ready {
                return;
            }
            *state = LifecycleState::ShuttingDown;
        }
        if self.queue.send(InboundMessage::LifespanShutdown).await.is_err() {
            debug!("lifecycle queue closed before the shutdown message");
        }
        let mut shutdown = self.shutdown.clone();
        let _ = shutdown.wait_for(|done| *done).await;
        let mut state = self.state.lock().await;
        *state = if self.task.is_finished() {
            LifecycleState::Stopped
        } else {
            LifecycleState::Ready
        };
        debug!(state = ?*state, "shutdown handshake complete");
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> LifecycleState {
        *self.state.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{failing_lifespan_app, instrumented_echo_app};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn startup_handshake_reaches_ready() {
        let startups = Arc::new(AtomicUsize::new(0));
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let lifespan = Lifespan::spawn(
            instrumented_echo_app(Arc::clone(&startups), Arc::clone(&shutdowns)),
            8,
        );

        assert_eq!(lifespan.state().await, LifecycleState::NotStarted);
        lifespan.wait_startup().await;
        assert_eq!(lifespan.state().await, LifecycleState::Ready);
        assert_eq!(startups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn startup_logic_runs_at_most_once() {
        let startups = Arc::new(AtomicUsize::new(0));
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let lifespan = Lifespan::spawn(
            instrumented_echo_app(Arc::clone(&startups), Arc::clone(&shutdowns)),
            8,
        );

        lifespan.wait_startup().await;
        lifespan.wait_startup().await;
        lifespan.wait_startup().await;
        assert_eq!(startups.load(Ordering::SeqCst), 1);
        assert_eq!(lifespan.state().await, LifecycleState::Ready);
    }

    #[tokio::test]
    async fn shutdown_handshake_settles_back_to_ready() {
        let startups = Arc::new(AtomicUsize::new(0));
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let lifespan = Lifespan::spawn(
            instrumented_echo_app(Arc::clone(&startups), Arc::clone(&shutdowns)),
            8,
        );

        lifespan.wait_startup().await;
        lifespan.wait_shutdown().await;
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
        // The application loop keeps running: state idles in Ready.
        assert_eq!(lifespan.state().await, LifecycleState::Ready);

        // A second cycle repeats the handshake without restarting anything.
        lifespan.wait_shutdown().await;
        assert_eq!(lifespan.state().await, LifecycleState::Ready);
        assert_eq!(startups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_before_startup_is_a_no_op() {
        let startups = Arc::new(AtomicUsize::new(0));
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let lifespan = Lifespan::spawn(
            instrumented_echo_app(Arc::clone(&startups), Arc::clone(&shutdowns)),
            8,
        );

        lifespan.wait_shutdown().await;
        assert_eq!(lifespan.state().await, LifecycleState::NotStarted);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_lifecycle_task_still_declares_ready() {
        let lifespan = Lifespan::spawn(failing_lifespan_app(), 8);
        // The task dies without ever acknowledging; the sticky signals
        // release the waiter and serving continues best-effort.
        lifespan.wait_startup().await;
        assert_eq!(lifespan.state().await, LifecycleState::Ready);
    }
}

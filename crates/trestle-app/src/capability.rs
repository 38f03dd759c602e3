//! Capability detection for loaded applications.

use std::fmt;
use std::sync::Arc;

use crate::CycleApp;
use crate::handler::ConnectionHandler;

/// Which convention the loaded application exposes.
///
/// Resolved exactly once, at startup, from whatever the module-loading
/// collaborator surfaced — never re-inspected during request handling.
#[derive(Clone)]
pub enum AppCapability {
    /// A connection-oriented handler served over a loopback socket.
    Handler(Arc<dyn ConnectionHandler>),
    /// A bidirectional message-driven application callable.
    Cycle(CycleApp),
}

impl AppCapability {
    /// Pick the active convention. The connection handler wins when the
    /// application exposes both. `None` means neither is present — a
    /// configuration error the entry point must refuse to serve on.
    pub fn detect(
        handler: Option<Arc<dyn ConnectionHandler>>,
        app: Option<CycleApp>,
    ) -> Option<Self> {
        if let Some(handler) = handler {
            return Some(AppCapability::Handler(handler));
        }
        app.map(AppCapability::Cycle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppCapability::Handler(_) => "connection-handler",
            AppCapability::Cycle(_) => "cycle-app",
        }
    }
}

impl fmt::Debug for AppCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::net::TcpStream;

    struct NoopHandler;

    impl ConnectionHandler for NoopHandler {
        fn serve(&self, _stream: TcpStream) -> io::Result<()> {
            Ok(())
        }
    }

    fn noop_app() -> CycleApp {
        Arc::new(|_scope, _rx, _tx| Box::pin(async { Ok(()) }))
    }

    #[test]
    fn neither_capability_detects_none() {
        assert!(AppCapability::detect(None, None).is_none());
    }

    #[test]
    fn handler_alone_detects_handler() {
        let capability = AppCapability::detect(Some(Arc::new(NoopHandler)), None).unwrap();
        assert!(matches!(capability, AppCapability::Handler(_)));
    }

    #[test]
    fn cycle_alone_detects_cycle() {
        let capability = AppCapability::detect(None, Some(noop_app())).unwrap();
        assert!(matches!(capability, AppCapability::Cycle(_)));
    }

    #[test]
    fn handler_wins_when_both_present() {
        let capability =
            AppCapability::detect(Some(Arc::new(NoopHandler)), Some(noop_app())).unwrap();
        assert!(matches!(capability, AppCapability::Handler(_)));
        assert_eq!(capability.name(), "connection-handler");
    }
}

use crate::server::ServerHandle;
use std::net::SocketAddr;
use tracing::{debug, info};

/// Lifecycle of an application context.
///
/// The earlier states of the assembly (`Unconfigured`, `Configuring`) live
/// inside the builder; a context only ever exists as `Active` and ends as
/// `Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// All configuration applied; server (if any) accepting connections
    Active,
    /// Resources released; the context is inert
    Closed,
}

/// The materialized, runnable result of applying all configuration.
///
/// Owns the server transport created during `run()`. The single teardown
/// operation is [`close()`](Self::close): it blocks until the server
/// coroutine has exited, is idempotent by contract, and may be called from
/// a different thread than the one that called `run()`. Dropping an open
/// context closes it.
pub struct AppContext {
    server: Option<ServerHandle>,
    addr: Option<SocketAddr>,
    state: Lifecycle,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("state", &self.state)
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Context without a server (no web module was enabled).
    pub(crate) fn idle() -> Self {
        Self {
            server: None,
            addr: None,
            state: Lifecycle::Active,
        }
    }

    /// Context owning a started server.
    pub(crate) fn active(server: ServerHandle) -> Self {
        Self {
            addr: Some(server.addr()),
            server: Some(server),
            state: Lifecycle::Active,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Address the server listens on, if a server was configured.
    ///
    /// Remains available after `close()` for diagnostics.
    #[must_use]
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Release all resources acquired during `run()`.
    ///
    /// Blocks until the owned server has shut down. Calling it again is a
    /// no-op.
    pub fn close(&mut self) {
        if self.state == Lifecycle::Closed {
            debug!("Application context already closed");
            return;
        }
        if let Some(server) = self.server.take() {
            server.stop();
        }
        self.state = Lifecycle::Closed;
        info!("Application context closed");
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.close();
    }
}

use super::context::AppContext;
use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::module::{Configurator, Module, ModuleId};
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use crate::server::{AppService, HttpServer};
use crate::telemetry::{self, LoggingBuilder};
use crate::views::ViewEngine;
use crate::web::WebServerBuilder;
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use tracing::{debug, info};

/// Start assembling an application with the default module registry
/// (web server and logging installed).
#[must_use]
pub fn application() -> AppBuilder {
    AppBuilder::new()
}

/// Top-level application builder.
///
/// Owns the module registry and the ordered list of deferred configuration
/// closures. Consumed by [`run()`](Self::run); because every method takes
/// the builder by value, registering configuration while `run()` executes is
/// impossible by construction.
#[derive(Debug)]
pub struct AppBuilder {
    installed: Vec<ModuleId>,
    pending: Vec<Configurator>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    /// Builder with the built-in modules installed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            installed: vec![ModuleId::WebServer, ModuleId::Logging],
            pending: Vec::new(),
        }
    }

    /// Builder with an empty module registry.
    ///
    /// Useful for embedders that want to whitelist modules explicitly via
    /// [`install`](Self::install).
    #[must_use]
    pub fn bare() -> Self {
        Self {
            installed: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Install a module into the registry so `enable()` can resolve it.
    #[must_use]
    pub fn install(mut self, module: ModuleId) -> Self {
        if !self.installed.contains(&module) {
            self.installed.push(module);
        }
        self
    }

    /// Modules currently installed in the registry.
    #[must_use]
    pub fn modules(&self) -> &[ModuleId] {
        &self.installed
    }

    /// Register a configuration closure against `module`'s sub-builder.
    ///
    /// The closure does not execute now; it is appended to the ordered list
    /// that `run()` replays. Fails with [`Error::UnknownModule`] (before the
    /// closure could ever run) when the descriptor is not installed.
    pub fn enable<M, F>(mut self, _module: M, configure: F) -> Result<Self, Error>
    where
        M: Module,
        F: FnOnce(&mut M::Builder) -> anyhow::Result<()> + Send + 'static,
    {
        if !self.installed.contains(&M::ID) {
            return Err(Error::UnknownModule { module: M::ID });
        }
        self.pending.push(M::defer(configure));
        Ok(self)
    }

    /// Apply all registered configuration and start the application.
    ///
    /// Closures run sequentially on the calling thread, in registration
    /// order. The first failure aborts the remaining closures and returns
    /// [`Error::Configuration`]; no context is created. On success the
    /// returned context is active: every closure has been applied and, if
    /// the web module was enabled, the server is accepting connections.
    pub fn run(self) -> Result<AppContext, Error> {
        let runtime = RuntimeConfig::from_env();
        may::config().set_stack_size(runtime.stack_size);

        let mut web = WebServerBuilder::default();
        let mut logging = LoggingBuilder::default();
        let mut web_enabled = false;
        let mut logging_enabled = false;

        debug!(closures = self.pending.len(), "Applying configuration");
        for configurator in self.pending {
            let module = configurator.module();
            let applied = match configurator {
                Configurator::WebServer(configure) => {
                    web_enabled = true;
                    configure(&mut web)
                }
                Configurator::Logging(configure) => {
                    logging_enabled = true;
                    configure(&mut logging)
                }
            };
            applied.map_err(|source| Error::Configuration { module, source })?;
        }

        if logging_enabled {
            telemetry::init(&logging);
        }

        if !web_enabled {
            info!("Application context active (no server configured)");
            return Ok(AppContext::idle());
        }

        let parts = web.finish()?;
        let views = match parts.views {
            Some(views_builder) => Some(Arc::new(ViewEngine::build(views_builder)?)),
            None => None,
        };

        let router = Arc::new(Router::new(parts.routes.clone()));
        let mut dispatcher = Dispatcher::new(runtime.stack_size);
        for route in &parts.routes {
            // SAFETY: the may runtime was configured above, before any
            // coroutine exists, and the dispatch coroutine answers every
            // envelope through its reply channel.
            unsafe {
                dispatcher.register_handler(&route.handler_name, Arc::clone(&route.handler));
            }
        }

        let service = AppService {
            router,
            dispatcher: Arc::new(dispatcher),
            views,
        };

        let addr = resolve_addr(&parts.addr)?;
        let handle = HttpServer(service).start(addr).map_err(Error::Server)?;
        if let Err(err) = handle.wait_ready() {
            // no partially active context may escape a failed run()
            handle.stop();
            return Err(Error::Server(err));
        }
        info!(addr = %addr, "Application context active");
        Ok(AppContext::active(handle))
    }
}

/// Resolve the configured listen address; port `0` is exchanged for a
/// concrete free port so the context can report where it listens.
fn resolve_addr(addr: &str) -> Result<SocketAddr, Error> {
    let addr = addr
        .to_socket_addrs()
        .map_err(Error::Server)?
        .next()
        .ok_or_else(|| {
            Error::Server(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid listen address",
            ))
        })?;
    if addr.port() != 0 {
        return Ok(addr);
    }
    let listener = TcpListener::bind(addr).map_err(Error::Server)?;
    let resolved = listener.local_addr().map_err(Error::Server)?;
    drop(listener);
    Ok(resolved)
}

//! Module descriptors and deferred configuration commands.
//!
//! A module is a pluggable configuration domain: the web server, logging.
//! Each descriptor is a zero-sized marker type that ties a [`ModuleId`] (the
//! registry key) to the scoped sub-builder its configuration closures
//! receive. Closures registered through `enable()` are not run immediately;
//! they are boxed into a [`Configurator`] command and replayed in
//! registration order by `run()`.
//!
//! Dispatch is a closed set of tagged variants, one per module, so every
//! closure is applied to a strongly typed sub-builder without any downcasts.

use crate::telemetry::LoggingBuilder;
use crate::web::WebServerBuilder;
use std::fmt;

/// Identifier for a pluggable configuration domain.
///
/// Used as the key of the builder's module registry and carried in errors so
/// a failing closure can be attributed to its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleId {
    /// HTTP transport, routing, and view rendering
    WebServer,
    /// Structured logging subscriber
    Logging,
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::WebServer => write!(f, "web server"),
            ModuleId::Logging => write!(f, "logging"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::WebServer {}
    impl Sealed for super::Logging {}
}

/// A module descriptor: resolves to a scoped sub-builder type.
///
/// Implemented by the marker types [`WebServer`] and [`Logging`]. The trait
/// is sealed; the set of configurable domains is fixed at compile time, which
/// is what lets `run()` replay closures without reflection.
pub trait Module: sealed::Sealed + Copy {
    /// Scoped builder handed to this module's configuration closures
    type Builder;

    /// Registry key for this descriptor
    const ID: ModuleId;

    #[doc(hidden)]
    fn defer<F>(configure: F) -> Configurator
    where
        F: FnOnce(&mut Self::Builder) -> anyhow::Result<()> + Send + 'static;
}

/// Descriptor for the web server module: bind address, imported routers,
/// view rendering, route conflict policy.
#[derive(Debug, Clone, Copy)]
pub struct WebServer;

/// Descriptor for the logging module: `tracing` subscriber filter and format.
#[derive(Debug, Clone, Copy)]
pub struct Logging;

impl Module for WebServer {
    type Builder = WebServerBuilder;
    const ID: ModuleId = ModuleId::WebServer;

    fn defer<F>(configure: F) -> Configurator
    where
        F: FnOnce(&mut Self::Builder) -> anyhow::Result<()> + Send + 'static,
    {
        Configurator::WebServer(Box::new(configure))
    }
}

impl Module for Logging {
    type Builder = LoggingBuilder;
    const ID: ModuleId = ModuleId::Logging;

    fn defer<F>(configure: F) -> Configurator
    where
        F: FnOnce(&mut Self::Builder) -> anyhow::Result<()> + Send + 'static,
    {
        Configurator::Logging(Box::new(configure))
    }
}

/// A deferred configuration closure, tagged by the module it targets.
///
/// Owned by the application builder until `run()` consumes it exactly once.
pub enum Configurator {
    WebServer(Box<dyn FnOnce(&mut WebServerBuilder) -> anyhow::Result<()> + Send>),
    Logging(Box<dyn FnOnce(&mut LoggingBuilder) -> anyhow::Result<()> + Send>),
}

impl Configurator {
    /// Module this command targets, for ordering diagnostics and errors.
    pub(crate) fn module(&self) -> ModuleId {
        match self {
            Configurator::WebServer(_) => ModuleId::WebServer,
            Configurator::Logging(_) => ModuleId::Logging,
        }
    }
}

impl fmt::Debug for Configurator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Configurator").field(&self.module()).finish()
    }
}

//! # wireup
//!
//! **wireup** is a declarative application-assembly DSL for coroutine HTTP
//! services built on the `may` runtime. A fluent builder composes
//! independently developed configuration modules — the web server (transport,
//! routing, view rendering) and logging — into a single runnable application
//! context with a deterministic shutdown.
//!
//! ## Overview
//!
//! Configuration is deferred: `enable(module, closure)` registers a closure
//! against the module's scoped sub-builder without executing anything.
//! `run()` replays every closure exactly once, in registration order,
//! materializes the configured pieces, starts the server, and returns an
//! [`AppContext`](app::AppContext). The context's only teardown operation is
//! `close()`, which blocks until resources are released and is a no-op the
//! second time.
//!
//! ## Architecture
//!
//! - **[`app`]** - top-level builder, deferred-closure replay, context lifecycle
//! - **[`module`]** - module descriptors and the configuration registry
//! - **[`web`]** - web server sub-builder: bind address, router imports, views
//! - **[`router`]** - route-table DSL and regex path matching
//! - **[`dispatcher`]** - coroutine-based handler dispatch with panic recovery
//! - **[`server`]** - HTTP glue over `may_minihttp`: parsing, writing, lifecycle
//! - **[`views`]** - template rendering wired into the response pipeline
//! - **[`telemetry`]** - logging sub-builder over `tracing`
//! - **[`runtime_config`]** - environment-based coroutine stack sizing
//!
//! ## Quick Start
//!
//! ```no_run
//! use wireup::{application, WebServer};
//! use wireup::router::RouterBuilder;
//! use wireup::dispatcher::HandlerResponse;
//! use serde_json::json;
//!
//! let router = RouterBuilder::new()
//!     .get("/view", |_req| {
//!         HandlerResponse::render("template", json!({ "name": "world" }))
//!     })
//!     .build();
//!
//! let app = application()
//!     .enable(WebServer, move |web| {
//!         web.bind("127.0.0.1:8080").import_router(router);
//!         web.views().template("template", "Hello {{ name }}!");
//!         Ok(())
//!     })
//!     .expect("web server module is installed");
//!
//! let mut context = app.run().expect("configuration is valid");
//! // ... serve traffic ...
//! context.close();
//! ```
//!
//! ## Error Handling
//!
//! Assembly failures are values of [`Error`]: an unknown module descriptor
//! fails `enable()` before its closure could run; the first failing closure
//! fails `run()` and aborts the rest, so no partially configured context is
//! ever reachable. Request-time failures (template rendering, handler
//! panics) are scoped to the request that caused them and answered with a
//! non-2xx response.
//!
//! ## Runtime Considerations
//!
//! wireup uses the `may` coroutine runtime, not tokio or async-std:
//!
//! - Handlers run in coroutines; stack size is configurable via the
//!   `WIREUP_STACK_SIZE` environment variable
//! - The configuration phase is single-threaded on the calling thread;
//!   request concurrency belongs to the server library
//! - Blocking operations inside handlers should use `may`'s facilities

pub mod app;
pub mod dispatcher;
mod error;
pub mod ids;
pub mod module;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod telemetry;
pub mod views;
pub mod web;

pub use app::{application, AppBuilder, AppContext, Lifecycle};
pub use error::Error;
pub use module::{Logging, Module, ModuleId, WebServer};
pub use router::{RouteTable, RouterBuilder};
pub use web::RouteConflict;

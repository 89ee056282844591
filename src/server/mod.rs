//! HTTP server glue on top of `may_minihttp`: request parsing, response
//! writing, the assembled [`AppService`], and the [`ServerHandle`] used by
//! the application context for readiness and shutdown.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParsedRequest};
pub use service::AppService;

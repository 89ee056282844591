//! Web server module: the scoped sub-builder behind the
//! [`WebServer`](crate::module::WebServer) descriptor.

mod builder;

pub use builder::{RouteConflict, WebServerBuilder};

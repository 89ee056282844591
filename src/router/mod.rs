//! Route tables and path matching.
//!
//! Routing is split into two halves:
//!
//! - [`RouterBuilder`] / [`RouteTable`]: the externally constructed table of
//!   `(method, path pattern) → handler` bindings. Tables are built anywhere,
//!   passed to the web module with `import_router`, and forwarded to the
//!   server unmodified (duplicate handling is governed by the web module's
//!   explicit conflict policy).
//! - [`Router`]: the matcher assembled at `run()` time. Path patterns like
//!   `/pets/{id}` compile into regexes that match a request path and capture
//!   its parameters.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wireup::router::RouterBuilder;
//! use wireup::dispatcher::HandlerResponse;
//!
//! let table = RouterBuilder::new()
//!     .get("/pets/{id}", |req| {
//!         let id = req.get_path_param("id").unwrap_or("?").to_string();
//!         HandlerResponse::ok_json(serde_json::json!({ "id": id }))
//!     })
//!     .build();
//! ```

mod core;

pub use self::core::{
    ParamVec, Route, RouteMatch, RouteTable, Router, RouterBuilder, MAX_INLINE_PARAMS,
};

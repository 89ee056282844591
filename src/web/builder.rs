use crate::error::Error;
use crate::router::{Route, RouteTable};
use crate::views::ViewsBuilder;
use std::collections::HashMap;
use tracing::debug;

use http::Method;

/// What to do when two imported route tables bind the same
/// `(method, path pattern)`.
///
/// The default is [`Reject`](RouteConflict::Reject): a silently shadowed
/// route is invisible at configuration time, so duplicates fail `run()`
/// unless overriding was asked for explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteConflict {
    /// Fail `run()` on the first duplicate binding
    #[default]
    Reject,
    /// Later imports win; the earlier binding is replaced in place
    Replace,
    /// Earlier imports win; later duplicates are dropped
    KeepFirst,
}

/// Scoped sub-builder for the web server module.
///
/// Handed to configuration closures registered with
/// `enable(WebServer, ...)`. Accumulates the listen address, imported route
/// tables, the view sub-builder, and the route conflict policy; `run()`
/// materializes all of it into a running server.
pub struct WebServerBuilder {
    addr: String,
    tables: Vec<RouteTable>,
    views: Option<ViewsBuilder>,
    on_conflict: RouteConflict,
}

impl Default for WebServerBuilder {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            tables: Vec::new(),
            views: None,
            on_conflict: RouteConflict::default(),
        }
    }
}

impl WebServerBuilder {
    /// Listen address (default `127.0.0.1:8080`).
    ///
    /// Port `0` asks for a free port; the resolved address is available on
    /// the context as `addr()` after `run()`.
    pub fn bind(&mut self, addr: impl Into<String>) -> &mut Self {
        self.addr = addr.into();
        self
    }

    /// Import a route table.
    ///
    /// Tables accumulate in import order; duplicates across imports are
    /// handled per [`on_conflict`](Self::on_conflict).
    pub fn import_router(&mut self, table: RouteTable) -> &mut Self {
        self.tables.push(table);
        self
    }

    /// Enable view rendering and return its sub-builder.
    ///
    /// Calling this at all wires the view engine into the response
    /// pipeline; templates are registered on the returned builder.
    pub fn views(&mut self) -> &mut ViewsBuilder {
        self.views.get_or_insert_with(ViewsBuilder::default)
    }

    /// Set the duplicate-route policy.
    pub fn on_conflict(&mut self, policy: RouteConflict) -> &mut Self {
        self.on_conflict = policy;
        self
    }

    /// Merge the imported tables into one route list per the conflict
    /// policy and hand everything to assembly.
    pub(crate) fn finish(self) -> Result<WebServerParts, Error> {
        let mut routes: Vec<Route> = Vec::new();
        let mut index: HashMap<(Method, String), usize> = HashMap::new();

        for table in self.tables {
            for route in table.routes {
                let key = (route.method.clone(), route.path_pattern.clone());
                match index.get(&key) {
                    None => {
                        index.insert(key, routes.len());
                        routes.push(route);
                    }
                    Some(&slot) => match self.on_conflict {
                        RouteConflict::Reject => {
                            return Err(Error::RouteConflict {
                                method: route.method,
                                path: route.path_pattern,
                            });
                        }
                        RouteConflict::Replace => {
                            debug!(
                                method = %route.method,
                                path = %route.path_pattern,
                                "Duplicate route replaces earlier import"
                            );
                            routes[slot] = route;
                        }
                        RouteConflict::KeepFirst => {
                            debug!(
                                method = %route.method,
                                path = %route.path_pattern,
                                "Duplicate route dropped, earlier import kept"
                            );
                        }
                    },
                }
            }
        }

        Ok(WebServerParts {
            addr: self.addr,
            routes,
            views: self.views,
        })
    }
}

/// Everything assembly needs from a finished web sub-builder.
pub(crate) struct WebServerParts {
    pub(crate) addr: String,
    pub(crate) routes: Vec<Route>,
    pub(crate) views: Option<ViewsBuilder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::HandlerResponse;
    use crate::router::RouterBuilder;
    use serde_json::json;

    fn table(path: &str, marker: &'static str) -> RouteTable {
        RouterBuilder::new()
            .get(path, move |_req| HandlerResponse::ok_json(json!({ "from": marker })))
            .build()
    }

    #[test]
    fn test_imports_accumulate_in_order() {
        let mut web = WebServerBuilder::default();
        web.import_router(table("/a", "one"))
            .import_router(table("/b", "two"));
        let parts = web.finish().unwrap();
        let patterns: Vec<&str> = parts.routes.iter().map(|r| r.path_pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/a", "/b"]);
    }

    #[test]
    fn test_duplicate_route_rejected_by_default() {
        let mut web = WebServerBuilder::default();
        web.import_router(table("/a", "one"))
            .import_router(table("/a", "two"));
        assert!(matches!(
            web.finish(),
            Err(Error::RouteConflict { .. })
        ));
    }

    #[test]
    fn test_replace_policy_keeps_later_import() {
        let mut web = WebServerBuilder::default();
        web.on_conflict(RouteConflict::Replace)
            .import_router(table("/a", "one"))
            .import_router(table("/a", "two"));
        let parts = web.finish().unwrap();
        assert_eq!(parts.routes.len(), 1);
    }
}

use crate::dispatcher::{HandlerFn, HandlerRequest, HandlerResponse};
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of path/query parameters before heap allocation.
/// Most REST paths have well under 8 parameters.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the request hot path.
///
/// Parameter names come from the route table built at assembly time, so they
/// are shared `Arc<str>`s; values are per-request strings from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One `(method, path pattern) → handler` binding.
///
/// The handler name is derived from the binding (`"GET /view"`) and keys the
/// dispatcher's handler registry.
#[derive(Clone)]
pub struct Route {
    /// HTTP method this route answers
    pub method: Method,
    /// Path pattern with `{param}` placeholders (e.g. `/pets/{id}`)
    pub path_pattern: String,
    /// Dispatcher key for this route's handler
    pub handler_name: String,
    pub(crate) handler: HandlerFn,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path_pattern", &self.path_pattern)
            .field("handler_name", &self.handler_name)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for a [`RouteTable`].
#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<Route>,
}

impl RouterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `method` + `pattern`.
    #[must_use]
    pub fn route<F>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        let handler_name = format!("{method} {pattern}");
        self.routes.push(Route {
            method,
            path_pattern: pattern.to_string(),
            handler_name,
            handler: Arc::new(handler),
        });
        self
    }

    /// Bind `handler` to `GET pattern`.
    #[must_use]
    pub fn get<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    /// Bind `handler` to `POST pattern`.
    #[must_use]
    pub fn post<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    /// Bind `handler` to `PUT pattern`.
    #[must_use]
    pub fn put<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, handler)
    }

    /// Bind `handler` to `DELETE pattern`.
    #[must_use]
    pub fn delete<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Finish the table.
    #[must_use]
    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
        }
    }
}

/// An ordered table of route bindings, ready to be imported into the web
/// module. Multiple tables may be imported; they accumulate in import order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    pub(crate) routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route (shared, routes are matched concurrently)
    pub route: Arc<Route>,
    /// Path parameters extracted from the URL (`{id}` → `("id", "123")`)
    pub path_params: ParamVec,
    /// Query string parameters (populated by the server)
    pub query_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name (last write wins for duplicate names).
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

struct CompiledRoute {
    method: Method,
    regex: Regex,
    param_names: Vec<Arc<str>>,
    route: Arc<Route>,
}

/// Matcher over the merged route table.
///
/// Patterns compile once at assembly time; matching is a scan over compiled
/// regexes, first match wins in table order.
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// Compile `routes` into a matcher.
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        let routes: Vec<CompiledRoute> = routes
            .into_iter()
            .map(|route| {
                let (regex, param_names) = Self::path_to_regex(&route.path_pattern);
                CompiledRoute {
                    method: route.method.clone(),
                    regex,
                    param_names,
                    route: Arc::new(route),
                }
            })
            .collect();

        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|c| format!("{} {}", c.method, c.route.path_pattern))
            .collect();
        info!(
            routes_count = routes.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Self { routes }
    }

    /// Match an HTTP request to a route.
    ///
    /// Returns `None` when nothing matches (a 404 at the server layer).
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        for compiled in &self.routes {
            if compiled.method != method {
                continue;
            }
            if let Some(captures) = compiled.regex.captures(path) {
                let mut path_params = ParamVec::new();
                for (idx, name) in compiled.param_names.iter().enumerate() {
                    if let Some(value) = captures.get(idx + 1) {
                        path_params.push((Arc::clone(name), value.as_str().to_string()));
                    }
                }
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %compiled.route.handler_name,
                    path_params = ?path_params,
                    "Route matched"
                );
                return Some(RouteMatch {
                    route: Arc::clone(&compiled.route),
                    path_params,
                    query_params: ParamVec::new(),
                });
            }
        }

        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Convert a path pattern to a regex and its ordered parameter names.
    ///
    /// `/users/{id}` becomes `^/users/([^/]+)$` with parameters `["id"]`.
    /// Literal segments are escaped so patterns containing regex
    /// metacharacters match verbatim.
    pub(crate) fn path_to_regex(path: &str) -> (Regex, Vec<Arc<str>>) {
        if path == "/" {
            return (
                Regex::new(r"^/$").expect("Failed to compile path regex"),
                Vec::new(),
            );
        }

        let mut pattern = String::with_capacity(path.len() + 5);
        pattern.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') {
                let param_name = segment.trim_start_matches('{').trim_end_matches('}');
                pattern.push_str("/([^/]+)");
                param_names.push(Arc::from(param_name));
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        let regex = Regex::new(&pattern).expect("Failed to compile path regex");

        (regex, param_names)
    }
}

use crate::ids::RequestId;
use crate::router::{ParamVec, RouteMatch};
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Maximum inline headers/cookies before heap allocation.
/// Most requests carry well under 16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header/cookie storage for the request hot path.
///
/// Header names use `Arc<str>`: they repeat across requests and cloning an
/// `Arc` is an atomic increment rather than a copy. Values stay `String`,
/// they are per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A route handler: pure request in, response out.
///
/// Panics inside the handler are caught by the dispatch coroutine and
/// converted into 500 responses.
pub type HandlerFn = Arc<dyn Fn(HandlerRequest) -> HandlerResponse + Send + Sync>;

/// Request data passed to a handler.
///
/// All request information has been extracted up front: path and query
/// parameters, headers, cookies, and the JSON body if one was sent.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request id for log correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, ...)
    pub method: Method,
    /// Matched path pattern
    pub path: String,
    /// Path parameters extracted from the URL
    pub path_params: ParamVec,
    /// Query string parameters
    pub query_params: ParamVec,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Get a path parameter by name.
    ///
    /// Last write wins: with duplicate names at different path depths
    /// (`/org/{id}/user/{id}`) the deepest occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name (last write wins for duplicates).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Body of a handler response.
///
/// `View` is a deferred render: the handler names a template and a model,
/// and the server resolves it through the configured view engine before the
/// response is written. Handlers never touch the templating engine directly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseBody {
    /// No body
    Empty,
    /// Plain text (or pre-rendered markup)
    Text(String),
    /// JSON document
    Json(Value),
    /// Template to render with the given model
    View {
        /// Template name as registered with the view engine
        name: String,
        /// Variables exposed to the template
        model: Value,
    },
}

/// Response data sent back from a handler.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, ...)
    pub status: u16,
    /// Response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body
    pub body: ResponseBody,
}

impl HandlerResponse {
    /// Create a response with the given status, headers, and body.
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// 200 response with a JSON body.
    #[must_use]
    pub fn ok_json(body: Value) -> Self {
        Self::json(200, body)
    }

    /// JSON response with an explicit status.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, HeaderVec::new(), ResponseBody::Json(body))
    }

    /// Plain-text response with an explicit status.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, HeaderVec::new(), ResponseBody::Text(body.into()))
    }

    /// 200 response that renders `name` with `model` through the view engine.
    #[must_use]
    pub fn render(name: impl Into<String>, model: Value) -> Self {
        Self::new(
            200,
            HeaderVec::new(),
            ResponseBody::View {
                name: name.into(),
                model,
            },
        )
    }

    /// JSON error response `{"error": message}`.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Request plus the channel its response travels back on.
struct Envelope {
    request: HandlerRequest,
    reply_tx: mpsc::Sender<HandlerResponse>,
}

/// Dispatcher that routes matched requests to handler coroutines.
///
/// Maintains a registry of handler names to channel senders. Handlers are
/// spawned once, at assembly time; per-request cost is one channel round
/// trip.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: HashMap<String, mpsc::Sender<Envelope>>,
    stack_size: usize,
}

impl Dispatcher {
    /// Create an empty dispatcher whose handler coroutines use
    /// `stack_size`-byte stacks.
    #[must_use]
    pub fn new(stack_size: usize) -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            stack_size,
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Spawn a coroutine for `handler` and register it under `name`.
    ///
    /// Registering the same name again replaces the previous handler; the
    /// old sender is dropped, which closes its channel and lets the old
    /// coroutine exit.
    ///
    /// # Safety
    ///
    /// Spawning is unsafe in the `may` runtime. The caller must ensure the
    /// runtime is configured (stack size set) before the first registration
    /// and that the handler does not hold thread-local state across yields.
    pub unsafe fn register_handler(&mut self, name: &str, handler: HandlerFn) {
        let (tx, rx) = mpsc::channel::<Envelope>();
        let name = name.to_string();
        let coroutine_name = name.clone();

        // SAFETY: spawn is unsafe in the may runtime; the runtime is
        // configured before assembly spawns any handler, the closure is
        // Send + 'static, and failures are reported through the reply
        // channel rather than unwinding across the coroutine boundary.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .stack_size(self.stack_size)
                .spawn(move || {
                    debug!(handler_name = %coroutine_name, "Handler coroutine start");
                    for Envelope { request, reply_tx } in rx.iter() {
                        let request_id = request.request_id;
                        let start = Instant::now();
                        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            handler(request)
                        })) {
                            Ok(response) => {
                                debug!(
                                    request_id = %request_id,
                                    handler_name = %coroutine_name,
                                    status = response.status,
                                    execution_time_ms = start.elapsed().as_millis() as u64,
                                    "Handler execution complete"
                                );
                                let _ = reply_tx.send(response);
                            }
                            Err(panic) => {
                                let panic_message = format!("{panic:?}");
                                error!(
                                    request_id = %request_id,
                                    handler_name = %coroutine_name,
                                    panic_message = %panic_message,
                                    "Handler panicked"
                                );
                                let _ = reply_tx
                                    .send(HandlerResponse::error(500, "Handler panicked"));
                            }
                        }
                    }
                })
        };

        if let Err(e) = spawn_result {
            error!(handler_name = %name, error = %e, "Failed to spawn handler coroutine");
            return;
        }

        if self.handlers.insert(name.clone(), tx).is_some() {
            info!(handler_name = %name, "Replaced existing handler");
        }
    }

    /// Dispatch a matched request to its handler and wait for the response.
    ///
    /// Returns `None` when no handler is registered under the matched name
    /// (the service turns that into a 500). A reply channel that closes
    /// without an answer yields a 503 instead of hanging the connection.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        body: Option<Value>,
        headers: HeaderVec,
        cookies: HeaderVec,
    ) -> Option<HandlerResponse> {
        let RouteMatch {
            route,
            path_params,
            query_params,
        } = route_match;

        let tx = match self.handlers.get(route.handler_name.as_str()) {
            Some(tx) => tx,
            None => {
                error!(
                    handler_name = %route.handler_name,
                    available_handlers = self.handlers.len(),
                    "Handler not found"
                );
                return None;
            }
        };

        let request_id = RequestId::new();
        let request = HandlerRequest {
            request_id,
            method: route.method.clone(),
            path: route.path_pattern.clone(),
            path_params,
            query_params,
            headers,
            cookies,
            body,
        };

        info!(
            request_id = %request_id,
            handler_name = %route.handler_name,
            method = %request.method,
            path = %request.path,
            "Request dispatched to handler"
        );

        let (reply_tx, reply_rx) = mpsc::channel();
        let start = Instant::now();
        if tx.send(Envelope { request, reply_tx }).is_err() {
            error!(
                request_id = %request_id,
                handler_name = %route.handler_name,
                "Failed to send request to handler"
            );
            return None;
        }

        match reply_rx.recv() {
            Ok(response) => {
                info!(
                    request_id = %request_id,
                    handler_name = %route.handler_name,
                    latency_ms = start.elapsed().as_millis() as u64,
                    status = response.status,
                    "Handler response received"
                );
                Some(response)
            }
            Err(e) => {
                error!(
                    request_id = %request_id,
                    handler_name = %route.handler_name,
                    error = %e,
                    "Handler channel closed without a response"
                );
                Some(HandlerResponse::error(503, "Handler is not responding"))
            }
        }
    }
}

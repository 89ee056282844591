//! Coroutine-based request handler dispatch.
//!
//! Each route handler runs in its own `may` coroutine, fed by an mpsc
//! channel. The dispatcher looks a handler up by name, sends the request
//! together with a one-shot reply channel, and blocks on the reply. Handler
//! panics are caught per request and converted into 500 responses so one
//! failing handler cannot take the server down.

mod core;

pub use self::core::{
    Dispatcher, HandlerFn, HandlerRequest, HandlerResponse, HeaderVec, ResponseBody,
    MAX_INLINE_HEADERS,
};

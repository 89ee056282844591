//! View rendering: wiring a mustache-style template engine into the
//! response pipeline.
//!
//! Handlers never render anything themselves; they return a
//! [`ResponseBody::View`](crate::dispatcher::ResponseBody) naming a template
//! and a model, and the server resolves it through the [`ViewEngine`]
//! assembled at `run()` time. Template syntax and rendering belong entirely
//! to `minijinja`; this module only stores template sources and invokes the
//! engine.
//!
//! Rendering failures are request-scoped: the affected request gets a 500,
//! the server keeps serving.

mod engine;

pub use engine::{RenderError, ViewEngine, ViewsBuilder};

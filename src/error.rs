use crate::module::ModuleId;
use http::Method;
use std::fmt;
use std::io;

/// Assembly-time error
///
/// Everything that can go wrong between `application()` and an active
/// [`AppContext`](crate::app::AppContext). Request-time failures (rendering,
/// handler panics) never surface here; they are scoped to the request that
/// triggered them.
#[derive(Debug)]
pub enum Error {
    /// `enable()` referenced a module that is not installed in the builder's
    /// registry. No configuration closure has executed.
    UnknownModule {
        /// The descriptor that could not be resolved
        module: ModuleId,
    },
    /// A configuration closure failed during `run()`.
    ///
    /// Wraps the first failure; closures registered after it were not
    /// executed and no application context was created.
    Configuration {
        /// Module whose closure failed
        module: ModuleId,
        /// The original failure
        source: anyhow::Error,
    },
    /// Two imported route tables bind the same method and path pattern while
    /// the conflict policy is `Reject`.
    RouteConflict {
        /// HTTP method of the duplicate binding
        method: Method,
        /// Path pattern of the duplicate binding
        path: String,
    },
    /// An inline view template failed to parse when the view engine was
    /// assembled.
    Template {
        /// Template name as registered on the view sub-builder
        name: String,
        /// Parse failure reported by the templating engine
        source: minijinja::Error,
    },
    /// The server transport could not be started (bad address, port in use,
    /// readiness timeout).
    Server(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownModule { module } => {
                write!(
                    f,
                    "unknown module: no {module} module is installed in this builder"
                )
            }
            Error::Configuration { module, source } => {
                write!(f, "configuration of the {module} module failed: {source}")
            }
            Error::RouteConflict { method, path } => {
                write!(
                    f,
                    "route conflict: {method} {path} is bound more than once \
                     (set an explicit conflict policy to merge imports)"
                )
            }
            Error::Template { name, source } => {
                write!(f, "view template '{name}' failed to parse: {source}")
            }
            Error::Server(err) => write!(f, "server failed to start: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Configuration { source, .. } => Some(source.as_ref()),
            Error::Template { source, .. } => Some(source),
            Error::Server(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Server(err)
    }
}

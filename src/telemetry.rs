//! Logging module: `tracing` subscriber configuration.
//!
//! Enabled through the [`Logging`](crate::module::Logging) descriptor:
//!
//! ```rust,ignore
//! let app = application().enable(Logging, |log| {
//!     log.filter("info,wireup=debug").json();
//!     Ok(())
//! })?;
//! ```
//!
//! `RUST_LOG` always wins over the configured default filter, so operators
//! can raise verbosity without a rebuild.

use tracing_subscriber::EnvFilter;

/// Scoped sub-builder for the logging module.
///
/// Accumulates subscriber settings; the subscriber itself is installed by
/// `run()`, before the server starts.
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    filter: Option<String>,
    json: bool,
}

impl LoggingBuilder {
    /// Default filter directives used when `RUST_LOG` is unset
    /// (e.g. `"info"` or `"warn,wireup=debug"`).
    pub fn filter(&mut self, directives: impl Into<String>) -> &mut Self {
        self.filter = Some(directives.into());
        self
    }

    /// Emit JSON-formatted log lines instead of the human-readable format.
    pub fn json(&mut self) -> &mut Self {
        self.json = true;
        self
    }
}

/// Install the global `tracing` subscriber described by `builder`.
///
/// A subscriber can only be installed once per process; later attempts (the
/// second context in a test binary) keep the existing subscriber.
pub(crate) fn init(builder: &LoggingBuilder) {
    let default_directives = builder.filter.as_deref().unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    // try_init fails when a subscriber from an earlier run() or the host
    // application is already active; keep it and log through it.
    if builder.json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .try_init()
            .ok();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init()
            .ok();
    }
}

//! Environment-based runtime configuration.
//!
//! ## `WIREUP_STACK_SIZE`
//!
//! Stack size for handler coroutines, in bytes. Accepts decimal (`32768`) or
//! hexadecimal (`0x8000`) values. Default: `0x8000` (32 KB).
//!
//! Total memory is roughly `stack_size × concurrent requests`, so tune this
//! down for many tiny handlers and up for deep call chains. Too small a
//! stack panics the coroutine; too large wastes virtual memory.

use std::env;

/// Runtime configuration loaded from environment variables.
///
/// Loaded once at the start of `run()`, before any coroutine is spawned.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes (default: 32 KB / 0x8000)
    pub stack_size: usize,
}

const DEFAULT_STACK_SIZE: usize = 0x8000;

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let stack_size = match env::var("WIREUP_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(DEFAULT_STACK_SIZE)
                } else {
                    val.parse().unwrap_or(DEFAULT_STACK_SIZE)
                }
            }
            Err(_) => DEFAULT_STACK_SIZE,
        };
        RuntimeConfig { stack_size }
    }
}

//! Standard debug handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tine_core::{DebugHandler, Value};

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

/// Logs debug messages through `tracing`, tagged with a per-instance
/// request ID so one request's output can be picked out of a shared log.
#[derive(Debug)]
pub struct Log {
    request: String,
}

impl Default for Log {
    fn default() -> Self {
        Self::new()
    }
}

impl Log {
    /// Creates the handler with a fresh request ID.
    pub fn new() -> Self {
        Self {
            request: format!("{:08x}", NEXT_REQUEST.fetch_add(1, Ordering::Relaxed)),
        }
    }
}

impl DebugHandler for Log {
    fn log(&self, message: &str) {
        tracing::debug!(target: "tine::debug", request = %self.request, "{message}");
    }
}

/// Prints debug messages straight to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct Display {
    html: bool,
    verbose: bool,
}

impl Display {
    /// Creates the handler. With `html` the delimiter is a `<br />` tag;
    /// with `verbose` each line carries a timestamp.
    pub fn new(html: bool, verbose: bool) -> Self {
        Self { html, verbose }
    }

    /// Creates the handler from config params
    /// (`{"html": bool, "verbose": bool}`).
    pub fn from_params(params: &Value) -> Self {
        Self {
            html: params.get("html").and_then(Value::as_bool).unwrap_or(false),
            verbose: params
                .get("verbose")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

impl DebugHandler for Display {
    fn log(&self, message: &str) {
        let output = if self.verbose {
            let stamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            format!("[{}.{:04}] {message}", stamp.as_secs(), stamp.subsec_millis())
        } else {
            message.to_string()
        };

        let delimiter = if self.html { "<br />\n" } else { "\n" };
        print!("{output}{delimiter}");
    }
}

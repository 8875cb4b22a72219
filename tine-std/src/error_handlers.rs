//! Standard error handlers.

use tine_core::{ErrorHandler, Severity, Value};

/// Logs reported errors through `tracing` at a level matching their
/// severity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log {
    verbose: bool,
}

impl Log {
    /// Creates the handler. With `verbose` the logged messages carry
    /// file names and line numbers.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Creates the handler from config params (`{"verbose": bool}`).
    pub fn from_params(params: &Value) -> Self {
        Self {
            verbose: params
                .get("verbose")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

impl ErrorHandler for Log {
    fn handle(&self, severity: Severity, message: &str, file: &str, line: u32) {
        let rendered = if self.verbose {
            format!("{severity}: {message} in {file} on line {line}")
        } else {
            message.to_string()
        };

        match severity {
            Severity::Notice => tracing::info!(target: "tine::errors", "{rendered}"),
            Severity::Warning => tracing::warn!(target: "tine::errors", "{rendered}"),
            Severity::Error => tracing::error!(target: "tine::errors", "{rendered}"),
        }
    }
}

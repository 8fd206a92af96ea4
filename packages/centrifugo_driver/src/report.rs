//! Where swallowed broker failures go.

use serde_json::Value;
use tracing::error;

/// Receives failures the driver recovers from. Must not fail or panic.
pub trait ErrorReporter: Send + Sync {
    /// `context` carries at least `method`, plus the input needed to diagnose it.
    fn error(&self, message: &str, context: &Value);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn error(&self, message: &str, context: &Value) {
        let method = context
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        error!(method, context = %context, "{message}");
    }
}

//! Failure reporting for boundary invocations
//!
//! The foreign caller only ever sees a status code. The full error goes to a
//! [`Diagnostics`] collaborator chosen when the adapter is built.

use crate::error::AdapterError;

/// Receiver of invocation failures
pub trait Diagnostics: Send + Sync {
    /// Called once for every invocation that does not return `Status::Success`
    fn report(&self, error: &AdapterError);
}

/// Forwards reports to `tracing` at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, error: &AdapterError) {
        tracing::error!(
            status = %error.status(),
            method = error.method().unwrap_or("-"),
            error = %error,
            "Invocation failed"
        );
    }
}

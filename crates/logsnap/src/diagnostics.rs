//! Sink for the pipeline's own failure reports.

/// Receives a description of every failure the pipeline recovers from.
/// Implementations must not panic; the return value is never consulted.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Default sink: forwards reports as `tracing` warnings under the `logsnap`
/// target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::warn!(target: "logsnap", "{message}");
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

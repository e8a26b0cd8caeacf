//! # Local Call Stub
//!
//! The colocated path: no codec, no transport, no metrics. The only thing
//! a local call adds over a direct invocation is the same child span a
//! remote call would produce, so call-graph traces look uniform regardless
//! of placement.

use std::future::Future;

use tracing::Instrument;

use crate::error::CallError;
use crate::trace;

/// Runs a colocated implementation future under an "internal" child span.
///
/// The implementation's result and error pass through unmodified — no
/// fault trapping, since no serialization boundary is crossed. An
/// application error is still recorded on the span before it returns.
pub async fn call<T, Fut>(component: &str, method: &str, fut: Fut) -> Result<T, CallError>
where
    Fut: Future<Output = Result<T, CallError>>,
{
    let span = trace::call_span(component, method, "internal");
    let out = fut.instrument(span.clone()).await;
    if let Err(err) = &out {
        trace::record_failure(&span, err);
    }
    out
}

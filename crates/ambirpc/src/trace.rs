//! Child spans for component calls.
//!
//! Stubs open a child span only when the caller already carries one, so a
//! call graph traced from an entry point stays connected while untraced
//! traffic costs nothing. Local and remote invocations record the same
//! span shape, distinguished only by the `role` field.

use tracing::field;
use tracing::Span;

/// Starts a child span for one method call, or a disabled span when the
/// caller carries no trace context.
pub(crate) fn call_span(component: &str, method: &str, role: &'static str) -> Span {
    if Span::current().is_none() {
        return Span::none();
    }
    tracing::info_span!(
        "component.call",
        component = component,
        method = method,
        role = role,
        error = field::Empty,
    )
}

/// Marks the span failed with the failure's display form.
pub(crate) fn record_failure(span: &Span, err: &dyn std::fmt::Display) {
    span.record("error", field::display(err));
}

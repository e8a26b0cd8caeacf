//! # Client Call Stub
//!
//! The caller-side path of a remote invocation: encode the arguments into
//! an exactly-sized buffer, hand the payload to the transport under the
//! method's wire ordinal, decode the reply, and keep the books — call and
//! error counters, request/reply byte sizes, latency, and a child span —
//! identical on every exit path.
//!
//! Faults raised by the codec or the transport never escape raw: they are
//! joined with the [`crate::RemoteCallError`] sentinel and returned as
//! [`CallError::System`], so a caller's state is never corrupted by a
//! failed call.

use std::sync::Arc;
use std::time::Instant;

use ambipack::Decoder;
use ambipack::Encoder;
use ambipack::Marshal;
use ambipack::Unmarshal;
use tracing::Instrument;
use tracing::Span;

use crate::error::AppError;
use crate::error::CallError;
use crate::metrics::method_metrics;
use crate::metrics::MethodLabels;
use crate::metrics::MethodMetrics;
use crate::trace;
use crate::transport::Transport;

struct MethodState {
    name: &'static str,
    metrics: Arc<MethodMetrics>,
}

/// The shared machinery behind a component's generated client stub.
///
/// Holds the transport handle and one metrics set per method, resolved once
/// at construction from the (caller, component, method) labels.
pub struct ClientStub {
    component: &'static str,
    methods: Vec<MethodState>,
    transport: Arc<dyn Transport>,
}

impl ClientStub {
    /// Builds the stub for `component` as seen from `caller`.
    ///
    /// `methods` is the component's declaration-ordered method table; the
    /// index of a name is its wire ordinal.
    pub fn new(
        component: &'static str,
        methods: &'static [&'static str],
        transport: Arc<dyn Transport>,
        caller: &str,
    ) -> Self {
        let methods = methods
            .iter()
            .map(|name| MethodState {
                name,
                metrics: method_metrics(MethodLabels {
                    caller: caller.to_string(),
                    component: component.to_string(),
                    method: name.to_string(),
                }),
            })
            .collect();
        Self { component, methods, transport }
    }

    /// The component this stub calls.
    pub fn component(&self) -> &'static str {
        self.component
    }

    /// Executes one method call.
    ///
    /// `args` is the argument tuple in declared order; the reply decodes as
    /// `R` followed by the optional application-error slot. The routing key
    /// is forwarded to the transport untouched.
    pub async fn call<A, R>(&self, ordinal: usize, args: &A, routing: u64) -> Result<R, CallError>
    where
        A: Marshal,
        R: Unmarshal,
    {
        let method = &self.methods[ordinal];
        let metrics = &method.metrics;
        metrics.calls.add(1);
        let span = trace::call_span(self.component, method.name, "client");
        // Latency is recorded when the guard drops, which also covers a
        // caller cancelling the call mid-flight.
        let _latency = LatencyGuard { metrics, start: Instant::now() };

        let mut enc = Encoder::with_capacity(args.size());
        args.marshal(&mut enc);
        let payload = enc.into_bytes();
        metrics.request_bytes.put(payload.len() as u64);

        let run = self
            .transport
            .run(ordinal as u32, &payload, routing)
            .instrument(span.clone());
        let reply = match run.await {
            Ok(reply) => reply,
            // The transport itself failed: no payload to decode.
            Err(cause) => return Err(fail(metrics, &span, CallError::system(cause))),
        };
        metrics.reply_bytes.put(reply.len() as u64);

        let mut dec = Decoder::new(&reply);
        let ret = match R::unmarshal(&mut dec) {
            Ok(ret) => ret,
            Err(cause) => return Err(fail(metrics, &span, CallError::system(cause))),
        };
        let app = match Option::<AppError>::unmarshal(&mut dec) {
            Ok(app) => app,
            Err(cause) => return Err(fail(metrics, &span, CallError::system(cause))),
        };
        if let Some(err) = app {
            // The callee's own failure passes through unwrapped.
            return Err(fail(metrics, &span, CallError::App(err)));
        }
        Ok(ret)
    }
}

fn fail(metrics: &MethodMetrics, span: &Span, err: CallError) -> CallError {
    metrics.errors.add(1);
    trace::record_failure(span, &err);
    err
}

struct LatencyGuard<'a> {
    metrics: &'a MethodMetrics,
    start: Instant,
}

impl Drop for LatencyGuard<'_> {
    fn drop(&mut self) {
        self.metrics.latency_us.put(self.start.elapsed().as_micros() as u64);
    }
}

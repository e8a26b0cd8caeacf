//! # Server Dispatch
//!
//! The callee-side adapter: resolve a method name to its handler, decode
//! the argument tuple, invoke the implementation, and encode the reply —
//! the result sequence followed by the optional application-error slot
//! (absence means success).
//!
//! Only faults inside the codec steps are trapped here and returned as
//! [`DispatchError::Codec`]. A panic in implementation code is the
//! application's problem; it unwinds to the transport boundary, where the
//! process isolation layer is expected to turn it into a failed call.

use std::fmt;
use std::future::Future;

use ambipack::Decoder;
use ambipack::Encoder;
use ambipack::Marshal;
use ambipack::Unmarshal;

use crate::error::CallError;

/// Failures the dispatch layer itself can produce.
#[derive(Debug)]
pub enum DispatchError {
    /// No handler is registered under this method name.
    UnknownMethod(String),
    /// Argument decoding failed inside the handler.
    Codec(ambipack::Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMethod(name) => write!(f, "unknown method: {}", name),
            Self::Codec(err) => write!(f, "codec fault in handler: {}", err),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<ambipack::Error> for DispatchError {
    fn from(err: ambipack::Error) -> Self {
        Self::Codec(err)
    }
}

/// The callee-side surface of one component: a payload-level handler per
/// method name.
#[async_trait::async_trait]
pub trait Server: Send + Sync + 'static {
    /// Dispatches one call to the named method.
    ///
    /// Returns [`DispatchError::UnknownMethod`] when no handler exists
    /// under `method` — the caller-visible form of an absent handler.
    async fn handle(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, DispatchError>;
}

/// Runs one decoded call through an implementation method and encodes its
/// reply.
///
/// On an application error the result slot carries `R::default()` — the
/// reply layout is identical in both outcomes, and the client discards the
/// placeholder when it sees the error slot occupied.
pub async fn unary<A, R, F, Fut>(payload: &[u8], invoke: F) -> Result<Vec<u8>, DispatchError>
where
    A: Unmarshal,
    R: Marshal + Default,
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = Result<R, CallError>>,
{
    let mut dec = Decoder::new(payload);
    let args = A::unmarshal(&mut dec)?;

    let (ret, app) = match invoke(args).await {
        Ok(ret) => (ret, None),
        Err(err) => (R::default(), Some(err.into_wire())),
    };

    let mut enc = Encoder::with_capacity(ret.size() + app.size());
    ret.marshal(&mut enc);
    app.marshal(&mut enc);
    Ok(enc.into_bytes())
}

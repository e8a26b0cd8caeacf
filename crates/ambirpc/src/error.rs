//! # Failure Taxonomy
//!
//! Three kinds of failure reach a caller, and they must stay
//! distinguishable after crossing the wire:
//!
//! - **Application errors** ([`AppError`]): returned by the callee's own
//!   logic. They travel in the reply payload and are never wrapped.
//! - **Call-layer faults** ([`CallError::System`]): the codec or the
//!   transport failed. The underlying cause is joined with the
//!   [`RemoteCallError`] sentinel so callers can test "did the call layer
//!   fail" without naming the cause's type.
//! - Implementation panics are not this layer's concern; the process
//!   isolation boundary converts them into transport faults.

use std::fmt;

use ambipack::Decoder;
use ambipack::Encoder;
use ambipack::Marshal;
use ambipack::Unmarshal;

/// A type-erased error cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Well-known sentinel marking a failure of the call layer itself, as
/// opposed to a failure of the callee's logic.
///
/// Test for it with [`JoinedError::is`]: `err.is::<RemoteCallError>()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteCallError;

impl fmt::Display for RemoteCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote component call failed")
    }
}

impl std::error::Error for RemoteCallError {}

/// The combination of two error causes.
///
/// The primary cause carries the semantic identity: [`JoinedError::is`] and
/// [`JoinedError::downcast_primary`] consult only the primary cause's
/// chain. The secondary cause is context, reachable only through
/// [`std::error::Error::source`]. This asymmetry lets a caller test for a
/// well-known sentinel while still walking to the true underlying cause.
#[derive(Debug)]
pub struct JoinedError {
    primary: BoxError,
    secondary: BoxError,
}

impl JoinedError {
    /// Joins two causes. Never mutated after creation.
    pub fn join(primary: impl Into<BoxError>, secondary: impl Into<BoxError>) -> Self {
        Self { primary: primary.into(), secondary: secondary.into() }
    }

    /// True if the primary cause's chain contains a `T`.
    ///
    /// The secondary cause does not participate.
    pub fn is<T: std::error::Error + 'static>(&self) -> bool {
        self.downcast_primary::<T>().is_some()
    }

    /// Finds a `T` in the primary cause's chain.
    ///
    /// The secondary cause does not participate.
    pub fn downcast_primary<T: std::error::Error + 'static>(&self) -> Option<&T> {
        let mut cur: Option<&(dyn std::error::Error + 'static)> = Some(&*self.primary);
        while let Some(err) = cur {
            if let Some(found) = err.downcast_ref::<T>() {
                return Some(found);
            }
            cur = err.source();
        }
        None
    }

    /// The primary cause.
    pub fn primary(&self) -> &(dyn std::error::Error + 'static) {
        &*self.primary
    }

    /// The secondary cause.
    pub fn secondary(&self) -> &(dyn std::error::Error + 'static) {
        &*self.secondary
    }
}

impl fmt::Display for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.primary, self.secondary)
    }
}

impl std::error::Error for JoinedError {
    /// Unwrapping exposes the secondary cause only.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.secondary)
    }
}

/// An application-level failure as it travels on the wire.
///
/// Only the display string of the callee's error survives encoding, so two
/// hops away the identity of the original error type is gone — but one hop
/// away the caller sees exactly the message the callee produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    message: String,
}

impl AppError {
    /// Creates an application error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// The callee-produced message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

impl Marshal for AppError {
    fn marshal(&self, enc: &mut Encoder) {
        self.message.marshal(enc);
    }

    fn size(&self) -> usize {
        self.message.size()
    }
}

impl Unmarshal for AppError {
    fn unmarshal(dec: &mut Decoder<'_>) -> ambipack::Result<Self> {
        Ok(Self { message: String::unmarshal(dec)? })
    }
}

/// The outcome taxonomy at a stub boundary.
///
/// Every component method returns `Result<T, CallError>`. Callers match on
/// the variant to distinguish "the callee said no" from "the call never
/// happened cleanly".
#[derive(Debug)]
pub enum CallError {
    /// The callee's own failure, exactly as it returned it.
    App(AppError),
    /// The call layer failed: encoding, transport, or decoding. The
    /// primary cause is always [`RemoteCallError`].
    System(JoinedError),
}

impl CallError {
    /// Shorthand for returning an application error from an implementation.
    pub fn app(message: impl Into<String>) -> Self {
        CallError::App(AppError::new(message))
    }

    /// Wraps a call-layer cause with the [`RemoteCallError`] sentinel.
    pub fn system(cause: impl Into<BoxError>) -> Self {
        CallError::System(JoinedError::join(RemoteCallError, cause))
    }

    /// True if this failure originated in the call layer rather than the
    /// callee.
    pub fn is_system(&self) -> bool {
        matches!(self, CallError::System(_))
    }

    /// The form of this failure that survives the reply encoding.
    pub(crate) fn into_wire(self) -> AppError {
        match self {
            CallError::App(err) => err,
            CallError::System(err) => AppError::new(err.to_string()),
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::App(err) => write!(f, "{}", err),
            CallError::System(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::App(_) => None,
            CallError::System(err) => Some(err),
        }
    }
}

//! # Transport Abstraction
//!
//! A minimal, async interface for carrying one component call to a remote
//! process and bringing its reply back.
//!
//! ## Philosophy
//!
//! - **Byte-Oriented**: The transport knows nothing about argument types or
//!   application errors. It moves opaque buffers.
//! - **One Call, One Round-Trip**: The fundamental interaction is "send the
//!   payload for method N, await the reply bytes". Connection management,
//!   retries, and reconnection live behind this trait, not above it.

use std::fmt;

/// Errors that occur at the network/transport layer.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// The peer is unreachable or the connection was dropped.
    ConnectionLost(String),
    /// The operation timed out before a reply was received.
    Timeout,
    /// The remote peer rejected the payload size.
    PayloadTooLarge,
    /// Generic I/O error or internal transport failure.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionLost(msg) => write!(f, "connection lost: {}", msg),
            Self::Timeout => write!(f, "request timed out"),
            Self::PayloadTooLarge => write!(f, "payload too large for transport"),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

pub type Result<T> = std::result::Result<T, TransportError>;

/// A mechanism to execute one remote method call.
///
/// This trait is designed to be object-safe (`Arc<dyn Transport>`).
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends the encoded argument payload for the method with the given
    /// ordinal and waits for the encoded reply.
    ///
    /// # Invariants
    /// - Must return `Ok(bytes)` with the raw reply payload on success.
    /// - Must return `Err` if the call could not be completed.
    /// - Must not interpret `payload`; it is opaque to the transport.
    /// - `routing` is an advisory affinity hint for sharding-aware
    ///   transports; implementations are free to ignore it.
    async fn run(&self, method: u32, payload: &[u8], routing: u64) -> Result<Vec<u8>>;
}

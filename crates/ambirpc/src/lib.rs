//! # Ambirpc
//!
//! The component call layer: one declared method surface, two call paths.
//!
//! A component is an async trait whose methods return
//! `Result<T, CallError>`. The runtime hands callers either a local stub
//! (direct invocation) or a client stub (encode, transport round-trip,
//! decode), and both paths produce the same observable behavior: the same
//! results, the same application errors, and the same child spans in a
//! call-graph trace.
//!
//! ## Architecture
//!
//! - [`transport`]: the consumed collaborator contract — opaque bytes in,
//!   opaque bytes out.
//! - [`error`]: the failure taxonomy. Application errors pass through
//!   unmodified; call-layer faults are joined with the
//!   [`RemoteCallError`] sentinel so callers can test for them without
//!   knowing the underlying cause.
//! - [`client`] / [`local`] / [`server`]: the three stub kinds.
//! - [`metrics`]: per-(caller, component, method) counters and histograms,
//!   updated lock-free from concurrent calls.
//! - [`registry`]: the process-wide component table the placement layer
//!   reads.
//!
//! The `#[component]` attribute (feature `derive`, on by default) generates
//! the stub types and registration for a trait mechanically.

pub mod client;
pub mod envelope;
pub mod error;
pub mod local;
pub mod metrics;
pub mod registry;
pub mod server;
mod trace;
pub mod transport;


pub use error::AppError;
pub use error::BoxError;
pub use error::CallError;
pub use error::JoinedError;
pub use error::RemoteCallError;

#[cfg(feature = "derive")]
pub use ambirpc_macros::component;

// Generated stubs expand `#[async_trait]` through this path so downstream
// crates do not need their own async-trait dependency.
#[doc(hidden)]
pub use async_trait;

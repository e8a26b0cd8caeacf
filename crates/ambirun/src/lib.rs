//! # Ambirun
//!
//! The placement-facing runtime over the `ambirpc` call layer.
//!
//! A process builds a [`ambirpc::registry::Registry`] at startup, wraps it
//! in a [`Node`], and deploys each component one of three ways:
//!
//! - **local**: instantiate in-process behind the colocated stub,
//! - **client**: connect the remote-calling stub to a supplied transport,
//! - **loopback**: instantiate in-process but route every call through the
//!   full encode → dispatch → decode path over [`Loopback`], so colocated
//!   tests exercise exactly the bytes a remote deployment would.
//!
//! Callers then fetch handles typed to the component's method surface and
//! never learn which path they got.

pub mod loopback;
pub mod node;

pub use loopback::Loopback;
pub use node::Node;
pub use node::NodeError;

//! # Loopback Transport
//!
//! An in-process transport that hands each call straight to a server-side
//! dispatch adapter. Caller and callee are colocated, but the call still
//! crosses the serialization boundary byte for byte, which is what makes
//! placement-transparency testable.

use std::sync::Arc;

use ambirpc::server::Server;
use ambirpc::transport::Transport;
use ambirpc::transport::TransportError;

/// Connects a client stub to a server stub without a network.
pub struct Loopback {
    methods: &'static [&'static str],
    server: Arc<dyn Server>,
}

impl Loopback {
    /// Builds the transport over a component's dispatch adapter.
    ///
    /// `methods` is the registration's declaration-ordered method table,
    /// used to translate wire ordinals back into method names.
    pub fn new(methods: &'static [&'static str], server: Arc<dyn Server>) -> Self {
        Self { methods, server }
    }
}

#[async_trait::async_trait]
impl Transport for Loopback {
    async fn run(&self, method: u32, payload: &[u8], _routing: u64) -> ambirpc::transport::Result<Vec<u8>> {
        // An ordinal outside the table means caller and callee disagree on
        // the method surface; all this layer can do is fail the call.
        let Some(name) = self.methods.get(method as usize) else {
            return Err(TransportError::Io(format!("unknown method ordinal {}", method)));
        };
        self.server
            .handle(name, payload)
            .await
            .map_err(|err| TransportError::Io(err.to_string()))
    }
}

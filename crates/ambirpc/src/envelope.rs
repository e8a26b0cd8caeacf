//! # Call Envelope
//!
//! The wire-transient framing of one call as it crosses the transport
//! boundary: method ordinal, routing key, argument payload, in that order.
//!
//! In-process transports pass these three fields as plain arguments; stream
//! transports serialize the envelope to put a call on a byte pipe. Either
//! way the envelope lives for exactly one call and is never persisted.

use ambipack::Decoder;
use ambipack::Encoder;

/// One call on the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEnvelope {
    /// Stable per-component method ordinal; used on the wire instead of the
    /// method name.
    pub method: u32,
    /// Advisory affinity hint for sharding-aware transports. Not
    /// interpreted by the call layer.
    pub routing: u64,
    /// Encoded argument sequence per the method's declared types.
    pub payload: Vec<u8>,
}

impl CallEnvelope {
    /// Serializes the envelope in field order.
    pub fn encode(&self) -> Vec<u8> {
        let mut enc = Encoder::with_capacity(4 + 8 + 4 + self.payload.len());
        enc.u32(self.method);
        enc.u64(self.routing);
        enc.blob(&self.payload);
        enc.into_bytes()
    }

    /// Deserializes an envelope, mirroring [`CallEnvelope::encode`].
    pub fn decode(bytes: &[u8]) -> ambipack::Result<Self> {
        let mut dec = Decoder::new(bytes);
        Ok(Self {
            method: dec.u32()?,
            routing: dec.u64()?,
            payload: dec.blob()?.to_vec(),
        })
    }
}

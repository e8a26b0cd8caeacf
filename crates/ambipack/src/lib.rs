//! # Ambipack
//!
//! A small, positional binary serialization library for component call
//! payloads.
//!
//! ## Philosophy
//!
//! - **Positional**: No tags on the wire. Caller and callee agree on the
//!   exact type sequence of every payload, so values are written and read
//!   back in declaration order.
//! - **Bounded**: Decoders are zero-copy, bounds-checked views. Running past
//!   the end of the buffer is an error, never a default value.
//! - **Exact-size**: Every value knows its encoded length up front, so a
//!   payload buffer is allocated once.
//!
//! ## Format
//!
//! - **Scalars**: fixed width, little-endian. Booleans are one byte.
//! - **Text / blobs**: `[Len: u32][Data: Len]`.
//! - **Sequences**: `[Len: i32][Elem * Len]`, where `Len == -1` marks the
//!   absent sequence, distinct from a present-but-empty one.
//! - **Optional scalars**: `[Present: 1b][Data?]`.

mod decode;
mod encode;
mod marshal;

#[cfg(test)]
mod tests;

pub use decode::Decoder;
pub use encode::Encoder;
pub use marshal::Blob;
pub use marshal::Marshal;
pub use marshal::Unmarshal;

#[cfg(feature = "derive")]
pub use ambipack_derive::Marshal;
#[cfg(feature = "derive")]
pub use ambipack_derive::Unmarshal;

/// Decoding failures.
///
/// Encoding is infallible; every fault in this codec is observed while
/// reading bytes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer exhausted while reading.
    UnexpectedEnd,
    /// A sequence length prefix that cannot be honored.
    InvalidLength(i32),
    /// Text data is not valid UTF-8.
    InvalidUtf8,
    /// Byte is not a valid boolean or presence flag.
    InvalidBool(u8),
    /// An externally-marshaled value rejected its embedded bytes.
    InvalidBlob(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnexpectedEnd => write!(f, "buffer exhausted while decoding"),
            Error::InvalidLength(n) => write!(f, "invalid sequence length prefix: {}", n),
            Error::InvalidUtf8 => write!(f, "text is not valid UTF-8"),
            Error::InvalidBool(b) => write!(f, "invalid boolean byte: {:#04x}", b),
            Error::InvalidBlob(msg) => write!(f, "invalid embedded blob: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Specialized `Result` for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

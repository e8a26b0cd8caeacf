//! The marshaling capability: types that serialize themselves.
//!
//! Every type carried in a call payload either maps onto one of the impls
//! here or derives [`Marshal`]/[`Unmarshal`], writing exactly its own fields
//! in declaration order and delegating recursively to nested types.

use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::Decoder;
use crate::Encoder;
use crate::Error;
use crate::Result;

/// Serializes a value into an [`Encoder`].
///
/// `marshal_opt`/`size_opt` control how `Option<Self>` appears on the wire:
/// scalars use a one-byte presence flag, while sequences override them to
/// reuse the `-1` absent-length sentinel.
pub trait Marshal {
    /// Writes this value's encoding.
    fn marshal(&self, enc: &mut Encoder);

    /// Exact byte length of this value's encoding.
    fn size(&self) -> usize;

    /// Writes the encoding of an optional value.
    fn marshal_opt(opt: Option<&Self>, enc: &mut Encoder)
    where
        Self: Sized,
    {
        match opt {
            None => enc.bool(false),
            Some(v) => {
                enc.bool(true);
                v.marshal(enc);
            }
        }
    }

    /// Exact byte length of an optional value's encoding.
    fn size_opt(opt: Option<&Self>) -> usize
    where
        Self: Sized,
    {
        match opt {
            None => 1,
            Some(v) => 1 + v.size(),
        }
    }
}

/// Reconstructs a value from a [`Decoder`].
pub trait Unmarshal: Sized {
    /// Reads this value's encoding.
    fn unmarshal(dec: &mut Decoder<'_>) -> Result<Self>;

    /// Reads the encoding of an optional value.
    fn unmarshal_opt(dec: &mut Decoder<'_>) -> Result<Option<Self>> {
        if dec.bool()? {
            Ok(Some(Self::unmarshal(dec)?))
        } else {
            Ok(None)
        }
    }
}

macro_rules! impl_fixed {
    ($($ty:ty => $method:ident, $width:expr;)*) => {$(
        impl Marshal for $ty {
            fn marshal(&self, enc: &mut Encoder) {
                enc.$method(*self);
            }

            fn size(&self) -> usize {
                $width
            }
        }

        impl Unmarshal for $ty {
            fn unmarshal(dec: &mut Decoder<'_>) -> Result<Self> {
                dec.$method()
            }
        }
    )*};
}

impl_fixed! {
    bool => bool, 1;
    u8 => u8, 1;
    i8 => i8, 1;
    u16 => u16, 2;
    i16 => i16, 2;
    u32 => u32, 4;
    i32 => i32, 4;
    u64 => u64, 8;
    i64 => i64, 8;
    f32 => f32, 4;
    f64 => f64, 8;
}

impl Marshal for String {
    fn marshal(&self, enc: &mut Encoder) {
        enc.str(self);
    }

    fn size(&self) -> usize {
        4 + self.len()
    }
}

impl Unmarshal for String {
    fn unmarshal(dec: &mut Decoder<'_>) -> Result<Self> {
        Ok(dec.str()?.to_owned())
    }
}

impl Marshal for () {
    fn marshal(&self, _enc: &mut Encoder) {}

    fn size(&self) -> usize {
        0
    }
}

impl Unmarshal for () {
    fn unmarshal(_dec: &mut Decoder<'_>) -> Result<Self> {
        Ok(())
    }
}

fn unmarshal_elems<T: Unmarshal>(dec: &mut Decoder<'_>, n: usize) -> Result<Vec<T>> {
    // Cap the preallocation by the bytes actually left; a corrupt length
    // prefix must not drive an allocation before element decoding fails.
    let mut out = Vec::with_capacity(n.min(dec.remaining()));
    for _ in 0..n {
        out.push(T::unmarshal(dec)?);
    }
    Ok(out)
}

impl<T: Marshal> Marshal for Vec<T> {
    fn marshal(&self, enc: &mut Encoder) {
        enc.seq_len(Some(self.len()));
        for v in self {
            v.marshal(enc);
        }
    }

    fn size(&self) -> usize {
        4 + self.iter().map(Marshal::size).sum::<usize>()
    }

    fn marshal_opt(opt: Option<&Self>, enc: &mut Encoder) {
        match opt {
            None => enc.seq_len(None),
            Some(v) => v.marshal(enc),
        }
    }

    fn size_opt(opt: Option<&Self>) -> usize {
        match opt {
            None => 4,
            Some(v) => v.size(),
        }
    }
}

impl<T: Unmarshal> Unmarshal for Vec<T> {
    fn unmarshal(dec: &mut Decoder<'_>) -> Result<Self> {
        match dec.seq_len()? {
            // The absent sentinel has no representation in a plain sequence.
            None => Err(Error::InvalidLength(-1)),
            Some(n) => unmarshal_elems(dec, n),
        }
    }

    fn unmarshal_opt(dec: &mut Decoder<'_>) -> Result<Option<Self>> {
        match dec.seq_len()? {
            None => Ok(None),
            Some(n) => Ok(Some(unmarshal_elems(dec, n)?)),
        }
    }
}

impl<T: Marshal> Marshal for Option<T> {
    fn marshal(&self, enc: &mut Encoder) {
        T::marshal_opt(self.as_ref(), enc);
    }

    fn size(&self) -> usize {
        T::size_opt(self.as_ref())
    }
}

impl<T: Unmarshal> Unmarshal for Option<T> {
    fn unmarshal(dec: &mut Decoder<'_>) -> Result<Self> {
        T::unmarshal_opt(dec)
    }
}

macro_rules! impl_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Marshal),+> Marshal for ($($name,)+) {
            fn marshal(&self, enc: &mut Encoder) {
                $( self.$idx.marshal(enc); )+
            }

            fn size(&self) -> usize {
                0 $( + self.$idx.size() )+
            }
        }

        impl<$($name: Unmarshal),+> Unmarshal for ($($name,)+) {
            fn unmarshal(dec: &mut Decoder<'_>) -> Result<Self> {
                Ok(( $( $name::unmarshal(dec)?, )+ ))
            }
        }
    };
}

impl_tuple!(A: 0);
impl_tuple!(A: 0, B: 1);
impl_tuple!(A: 0, B: 1, C: 2);
impl_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

/// Capability for values that marshal themselves through an opaque byte
/// blob, e.g. timestamps.
///
/// The codec embeds the produced bytes as a length-prefixed blob and adds no
/// framing of its own beyond that prefix.
pub trait Blob: Sized {
    /// Produces the value's self-defined byte representation.
    fn to_blob(&self) -> Vec<u8>;

    /// Reconstructs the value, validating the representation.
    fn from_blob(bytes: &[u8]) -> Result<Self>;
}

/// Implements [`Marshal`]/[`Unmarshal`] for a type in terms of its [`Blob`]
/// capability.
#[macro_export]
macro_rules! marshal_via_blob {
    ($ty:ty) => {
        impl $crate::Marshal for $ty {
            fn marshal(&self, enc: &mut $crate::Encoder) {
                enc.blob(&$crate::Blob::to_blob(self));
            }

            fn size(&self) -> usize {
                4 + $crate::Blob::to_blob(self).len()
            }
        }

        impl $crate::Unmarshal for $ty {
            fn unmarshal(dec: &mut $crate::Decoder<'_>) -> $crate::Result<Self> {
                <$ty as $crate::Blob>::from_blob(dec.blob()?)
            }
        }
    };
}

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Timestamps travel as 12 bytes: `i64` whole seconds plus `u32` nanoseconds
/// relative to the Unix epoch, with nanoseconds always in `[0, 1e9)` so each
/// instant has exactly one representation.
impl Blob for SystemTime {
    fn to_blob(&self) -> Vec<u8> {
        let (secs, nanos) = match self.duration_since(UNIX_EPOCH) {
            Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
            Err(e) => {
                let d = e.duration();
                if d.subsec_nanos() == 0 {
                    (-(d.as_secs() as i64), 0)
                } else {
                    (-(d.as_secs() as i64) - 1, NANOS_PER_SEC - d.subsec_nanos())
                }
            }
        };
        let mut out = Vec::with_capacity(12);
        out.extend_from_slice(&secs.to_le_bytes());
        out.extend_from_slice(&nanos.to_le_bytes());
        out
    }

    fn from_blob(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 12 {
            return Err(Error::InvalidBlob("timestamp blob must be 12 bytes"));
        }
        let secs = i64::from_le_bytes(bytes[0..8].try_into().unwrap());
        let nanos = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        if nanos >= NANOS_PER_SEC {
            return Err(Error::InvalidBlob("timestamp nanoseconds out of range"));
        }
        let time = if secs >= 0 {
            UNIX_EPOCH.checked_add(Duration::new(secs as u64, nanos))
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_secs(secs.unsigned_abs()))
                .and_then(|t| t.checked_add(Duration::from_nanos(nanos as u64)))
        };
        time.ok_or(Error::InvalidBlob("timestamp out of range"))
    }
}

marshal_via_blob!(SystemTime);

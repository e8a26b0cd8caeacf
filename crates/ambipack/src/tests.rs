use crate::*;

use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
//  SCALAR TESTS (Happy Path)
// ============================================================================

#[test]
fn test_bool_roundtrip() -> Result<()> {
    let mut enc = Encoder::new();
    enc.bool(true);
    enc.bool(false);

    let bytes = enc.into_bytes();
    let mut dec = Decoder::new(&bytes);

    assert_eq!(dec.bool()?, true);
    assert_eq!(dec.bool()?, false);
    assert_eq!(dec.remaining(), 0);
    Ok(())
}

#[test]
fn test_integer_roundtrip() -> Result<()> {
    let mut enc = Encoder::new();
    enc.u8(255);
    enc.i8(-128);
    enc.u16(u16::MAX);
    enc.i16(i16::MIN);
    enc.u32(u32::MAX);
    enc.i32(i32::MIN);
    enc.u64(u64::MAX);
    enc.i64(i64::MIN);

    let bytes = enc.into_bytes();
    assert_eq!(bytes.len(), 1 + 1 + 2 + 2 + 4 + 4 + 8 + 8);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.u8()?, 255);
    assert_eq!(dec.i8()?, -128);
    assert_eq!(dec.u16()?, u16::MAX);
    assert_eq!(dec.i16()?, i16::MIN);
    assert_eq!(dec.u32()?, u32::MAX);
    assert_eq!(dec.i32()?, i32::MIN);
    assert_eq!(dec.u64()?, u64::MAX);
    assert_eq!(dec.i64()?, i64::MIN);
    Ok(())
}

#[test]
fn test_float_roundtrip() -> Result<()> {
    let mut enc = Encoder::new();
    enc.f32(std::f32::consts::PI);
    enc.f64(std::f64::consts::E);
    enc.f64(f64::NEG_INFINITY);

    let bytes = enc.into_bytes();
    let mut dec = Decoder::new(&bytes);

    assert_eq!(dec.f32()?, std::f32::consts::PI);
    assert_eq!(dec.f64()?, std::f64::consts::E);
    assert_eq!(dec.f64()?, f64::NEG_INFINITY);
    Ok(())
}

#[test]
fn test_str_roundtrip() -> Result<()> {
    let mut enc = Encoder::new();
    enc.str("hello");
    enc.str("");
    enc.str("héllo wörld");

    let bytes = enc.into_bytes();
    let mut dec = Decoder::new(&bytes);

    assert_eq!(dec.str()?, "hello");
    assert_eq!(dec.str()?, "");
    assert_eq!(dec.str()?, "héllo wörld");
    Ok(())
}

#[test]
fn test_blob_roundtrip() -> Result<()> {
    let mut enc = Encoder::new();
    enc.blob(&[1, 2, 3]);
    enc.blob(&[]);

    let bytes = enc.into_bytes();
    let mut dec = Decoder::new(&bytes);

    assert_eq!(dec.blob()?, &[1, 2, 3]);
    assert_eq!(dec.blob()?, &[] as &[u8]);
    Ok(())
}

// ============================================================================
//  WIRE LAYOUT
// ============================================================================

struct Note {
    id: u64,
    text: String,
}

impl Marshal for Note {
    fn marshal(&self, enc: &mut Encoder) {
        self.id.marshal(enc);
        self.text.marshal(enc);
    }

    fn size(&self) -> usize {
        self.id.size() + self.text.size()
    }
}

impl Unmarshal for Note {
    fn unmarshal(dec: &mut Decoder<'_>) -> Result<Self> {
        Ok(Self {
            id: Unmarshal::unmarshal(dec)?,
            text: Unmarshal::unmarshal(dec)?,
        })
    }
}

#[test]
fn test_record_wire_layout() -> Result<()> {
    let note = Note { id: 7, text: "hello".into() };
    assert_eq!(note.size(), 8 + 4 + 5);

    let mut enc = Encoder::with_capacity(note.size());
    note.marshal(&mut enc);
    let bytes = enc.into_bytes();

    // 8-byte id (LE), 4-byte length prefix, then the raw text bytes.
    assert_eq!(bytes.len(), 17);
    assert_eq!(&bytes[0..8], &[7, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(&bytes[8..12], &[5, 0, 0, 0]);
    assert_eq!(&bytes[12..], b"hello");

    let mut dec = Decoder::new(&bytes);
    let back = Note::unmarshal(&mut dec)?;
    assert_eq!(back.id, 7);
    assert_eq!(back.text, "hello");
    assert_eq!(dec.remaining(), 0);
    Ok(())
}

#[test]
fn test_str_layout_is_byte_count() {
    // Multibyte text: the prefix counts bytes, not characters.
    let mut enc = Encoder::new();
    enc.str("é");
    let bytes = enc.into_bytes();
    assert_eq!(&bytes[0..4], &[2, 0, 0, 0]);
    assert_eq!(bytes.len(), 6);
}

// ============================================================================
//  SEQUENCES AND OPTIONALS
// ============================================================================

#[test]
fn test_seq_roundtrip() -> Result<()> {
    let v: Vec<u64> = vec![1, 2, 3];
    let mut enc = Encoder::new();
    v.marshal(&mut enc);

    let bytes = enc.into_bytes();
    assert_eq!(bytes.len(), 4 + 3 * 8);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(Vec::<u64>::unmarshal(&mut dec)?, v);
    Ok(())
}

#[test]
fn test_absent_seq_differs_from_empty_on_the_wire() -> Result<()> {
    let absent: Option<Vec<u64>> = None;
    let empty: Option<Vec<u64>> = Some(Vec::new());

    let mut enc = Encoder::new();
    absent.marshal(&mut enc);
    let absent_bytes = enc.into_bytes();

    let mut enc = Encoder::new();
    empty.marshal(&mut enc);
    let empty_bytes = enc.into_bytes();

    assert_eq!(absent_bytes, (-1i32).to_le_bytes());
    assert_eq!(empty_bytes, 0i32.to_le_bytes());
    assert_ne!(absent_bytes, empty_bytes);

    let mut dec = Decoder::new(&absent_bytes);
    assert_eq!(Option::<Vec<u64>>::unmarshal(&mut dec)?, None);

    let mut dec = Decoder::new(&empty_bytes);
    assert_eq!(Option::<Vec<u64>>::unmarshal(&mut dec)?, Some(Vec::new()));
    Ok(())
}

#[test]
fn test_absent_sentinel_rejected_by_plain_seq() {
    let absent: Option<Vec<u64>> = None;
    let mut enc = Encoder::new();
    absent.marshal(&mut enc);
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(Vec::<u64>::unmarshal(&mut dec), Err(Error::InvalidLength(-1)));
}

#[test]
fn test_optional_scalar_presence_flag() -> Result<()> {
    let present: Option<u64> = Some(42);
    let absent: Option<u64> = None;

    let mut enc = Encoder::new();
    present.marshal(&mut enc);
    absent.marshal(&mut enc);

    let bytes = enc.into_bytes();
    assert_eq!(bytes.len(), (1 + 8) + 1);
    assert_eq!(bytes[0], 1);
    assert_eq!(bytes[9], 0);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(Option::<u64>::unmarshal(&mut dec)?, Some(42));
    assert_eq!(Option::<u64>::unmarshal(&mut dec)?, None);
    Ok(())
}

#[test]
fn test_seq_of_records_roundtrip() -> Result<()> {
    let notes = vec![
        Note { id: 1, text: "a".into() },
        Note { id: 2, text: "bb".into() },
    ];
    let mut enc = Encoder::with_capacity(notes.size());
    notes.marshal(&mut enc);
    let bytes = enc.into_bytes();
    assert_eq!(bytes.len(), notes.size());

    let mut dec = Decoder::new(&bytes);
    let back = Vec::<Note>::unmarshal(&mut dec)?;
    assert_eq!(back.len(), 2);
    assert_eq!(back[0].id, 1);
    assert_eq!(back[0].text, "a");
    assert_eq!(back[1].id, 2);
    assert_eq!(back[1].text, "bb");
    Ok(())
}

#[test]
fn test_tuple_roundtrip() -> Result<()> {
    let args = (7u64, "hi".to_string(), Some(true));
    let mut enc = Encoder::with_capacity(args.size());
    args.marshal(&mut enc);
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    let back = <(u64, String, Option<bool>)>::unmarshal(&mut dec)?;
    assert_eq!(back, args);
    assert_eq!(dec.remaining(), 0);
    Ok(())
}

// ============================================================================
//  SIZE PRECOMPUTATION
// ============================================================================

fn assert_size_exact<T: Marshal>(v: &T) {
    let mut enc = Encoder::new();
    v.marshal(&mut enc);
    assert_eq!(v.size(), enc.len());
}

#[test]
fn test_size_matches_encoding() {
    assert_size_exact(&true);
    assert_size_exact(&7u64);
    assert_size_exact(&-1i32);
    assert_size_exact(&std::f64::consts::PI);
    assert_size_exact(&"hello".to_string());
    assert_size_exact(&vec![1u8, 2, 3]);
    assert_size_exact(&Vec::<String>::new());
    assert_size_exact(&Some(9u64));
    assert_size_exact(&Option::<u64>::None);
    assert_size_exact(&Option::<Vec<u64>>::None);
    assert_size_exact(&Some(vec!["x".to_string()]));
    assert_size_exact(&SystemTime::now());
    assert_size_exact(&Note { id: 3, text: "abc".into() });
    assert_size_exact(&(1u64, "s".to_string(), vec![Some(2u32), None]));
}

// ============================================================================
//  EXTERNALLY-MARSHALED VALUES
// ============================================================================

#[test]
fn test_system_time_roundtrip() -> Result<()> {
    let times = [
        UNIX_EPOCH,
        UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789),
        UNIX_EPOCH - Duration::new(86_400, 0),
        UNIX_EPOCH - Duration::new(1, 999_999_999),
    ];
    for t in times {
        let mut enc = Encoder::new();
        t.marshal(&mut enc);
        let bytes = enc.into_bytes();
        assert_eq!(bytes.len(), 4 + 12);

        let mut dec = Decoder::new(&bytes);
        assert_eq!(SystemTime::unmarshal(&mut dec)?, t);
    }
    Ok(())
}

#[test]
fn test_system_time_rejects_malformed_blob() {
    // Wrong embedded length.
    let mut enc = Encoder::new();
    enc.blob(&[0u8; 5]);
    let bytes = enc.into_bytes();
    let mut dec = Decoder::new(&bytes);
    assert!(matches!(SystemTime::unmarshal(&mut dec), Err(Error::InvalidBlob(_))));

    // Nanoseconds out of range.
    let mut blob = Vec::new();
    blob.extend_from_slice(&0i64.to_le_bytes());
    blob.extend_from_slice(&2_000_000_000u32.to_le_bytes());
    let mut enc = Encoder::new();
    enc.blob(&blob);
    let bytes = enc.into_bytes();
    let mut dec = Decoder::new(&bytes);
    assert!(matches!(SystemTime::unmarshal(&mut dec), Err(Error::InvalidBlob(_))));
}

// ============================================================================
//  DECODE FAULTS
// ============================================================================

#[test]
fn test_truncated_buffer_is_a_fault() {
    let mut enc = Encoder::new();
    enc.u64(7);
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes[..5]);
    assert_eq!(dec.u64(), Err(Error::UnexpectedEnd));
}

#[test]
fn test_truncated_str_is_a_fault() {
    // Length prefix promises more bytes than the buffer holds.
    let mut dec = Decoder::new(&[10, 0, 0, 0, b'h', b'i']);
    assert_eq!(dec.str(), Err(Error::UnexpectedEnd));
}

#[test]
fn test_invalid_bool_is_a_fault() {
    let mut dec = Decoder::new(&[2]);
    assert_eq!(dec.bool(), Err(Error::InvalidBool(2)));
}

#[test]
fn test_invalid_utf8_is_a_fault() {
    let mut dec = Decoder::new(&[2, 0, 0, 0, 0xff, 0xfe]);
    assert_eq!(dec.str(), Err(Error::InvalidUtf8));
}

#[test]
fn test_negative_length_is_a_fault() {
    let bytes = (-7i32).to_le_bytes();
    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.seq_len(), Err(Error::InvalidLength(-7)));
}

#[test]
fn test_huge_length_prefix_does_not_allocate() {
    // A corrupt prefix claiming i32::MAX elements over a 4-byte body must
    // fail on the first element read, not on allocation.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&i32::MAX.to_le_bytes());
    let mut dec = Decoder::new(&bytes);
    assert_eq!(Vec::<u64>::unmarshal(&mut dec), Err(Error::UnexpectedEnd));
}

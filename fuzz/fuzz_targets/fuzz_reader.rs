//! Fuzz testing for the streaming reader.
//!
//! Drives a bare (schema-less) reader with an arbitrary sequence of typed
//! calls over arbitrary bytes to ensure truncated and malformed input
//! surfaces as errors, never as panics or out-of-bounds access.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use rowbin::{CodecOptions, RowBinaryReader};

#[derive(Debug, Arbitrary, Clone, Copy)]
enum Call {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Bool,
    String,
    FixedString(u8),
    Date,
    Date32,
    DateTime,
    DateTime64(u8),
    Time,
    Time64(u8),
    Uuid,
    Ipv4,
    Ipv6,
    ArrayLen,
    NullTag,
    RawBytes(u8),
    Skip(u8),
    IsComplete,
}

#[derive(Debug, Arbitrary)]
struct Input {
    calls: Vec<Call>,
    bytes: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let options = CodecOptions::default().buffer_size(512);
    let Ok(mut reader) = RowBinaryReader::with_options(Cursor::new(input.bytes), options) else {
        return;
    };

    for call in input.calls.iter().take(64) {
        let result = match *call {
            Call::U8 => reader.read_u8().map(|_| ()),
            Call::I8 => reader.read_i8().map(|_| ()),
            Call::U16 => reader.read_u16().map(|_| ()),
            Call::I16 => reader.read_i16().map(|_| ()),
            Call::U32 => reader.read_u32().map(|_| ()),
            Call::I32 => reader.read_i32().map(|_| ()),
            Call::U64 => reader.read_u64().map(|_| ()),
            Call::I64 => reader.read_i64().map(|_| ()),
            Call::F32 => reader.read_f32().map(|_| ()),
            Call::F64 => reader.read_f64().map(|_| ()),
            Call::Bool => reader.read_bool().map(|_| ()),
            Call::String => reader.read_string_bytes().map(|_| ()),
            Call::FixedString(len) => reader.read_fixed_string(len as usize).map(|_| ()),
            Call::Date => reader.read_date().map(|_| ()),
            Call::Date32 => reader.read_date32().map(|_| ()),
            Call::DateTime => reader.read_datetime().map(|_| ()),
            Call::DateTime64(p) => reader.read_datetime64(p).map(|_| ()),
            Call::Time => reader.read_time().map(|_| ()),
            Call::Time64(p) => reader.read_time64(p).map(|_| ()),
            Call::Uuid => reader.read_uuid().map(|_| ()),
            Call::Ipv4 => reader.read_ipv4().map(|_| ()),
            Call::Ipv6 => reader.read_ipv6().map(|_| ()),
            Call::ArrayLen => reader.read_array_len().map(|_| ()),
            Call::NullTag => reader.read_null_tag().map(|_| ()),
            Call::RawBytes(len) => reader.read_raw_bytes(len as usize).map(|_| ()),
            Call::Skip(len) => reader.skip_bytes(len as usize),
            Call::IsComplete => reader.is_complete().map(|_| ()),
        };
        // Errors terminate the stream interaction, as they would for a real
        // caller; the target only asserts freedom from panics.
        if result.is_err() {
            break;
        }
    }
});

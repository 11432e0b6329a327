//! # Streaming Row Writer
//!
//! Forward-only encoder producing the bare RowBinary format. The caller
//! issues typed primitive calls in column order; encoded bytes stage in one
//! fixed-size slab and reach the stream only at flush boundaries.
//!
//! ## Buffering Discipline
//!
//! Mirror image of the reader:
//!
//! - [`flush`](RowBinaryWriter::flush) measures the batch written since the
//!   previous flush. When the slab can hold another batch of that size it
//!   returns without I/O; otherwise the staged bytes go to the stream in one
//!   write.
//! - A primitive that would overflow the slab drains it to the stream first
//!   (the blocking cold path).
//!
//! Flushing cadence belongs to the caller; primitives never push bytes to
//! the stream while the slab has room.
//!
//! ## Disposal
//!
//! [`finish`](RowBinaryWriter::finish) performs the terminal flush and
//! propagates errors; calling it again is a no-op. Dropping an unfinished
//! writer flushes best-effort, the way `std::io::BufWriter` does.
//!
//! ## Shape Validation
//!
//! Bare RowBinary carries no header, so validation is opt-in: hand the
//! column schema to [`with_columns`](RowBinaryWriter::with_columns) and
//! debug builds will check every typed call against it.

use std::io::Write;
use std::net::{Ipv4Addr, Ipv6Addr};

use eyre::{ensure, Result};
use zerocopy::byteorder::little_endian::{F32, F64, I16, I32, I64, U16, U32, U64};
use zerocopy::{Immutable, IntoBytes};

use crate::config::{
    DATE32_MAX_DAYS, DATE32_MIN_DAYS, DATETIME64_MAX_TICKS, DATETIME64_MIN_TICKS, MAX_LENGTH,
    MAX_PRECISION, MAX_VARINT_LEN, TIME64_MAX_TICKS, TIME64_MIN_TICKS, TIME_MAX_SECONDS,
    TIME_MIN_SECONDS,
};
use crate::encoding::temporal;
use crate::encoding::uuid::uuid_swizzle;
use crate::encoding::varint::encode_varint;
use crate::memory::CodecBuffer;
use crate::options::CodecOptions;
use crate::types::{Column, TypeKind};
#[cfg(debug_assertions)]
use crate::validator::ShapeValidator;

/// Streaming encoder over a writable byte stream.
///
/// Single-threaded: one writer owns its buffer and cursors exclusively.
pub struct RowBinaryWriter<W: Write> {
    stream: W,
    buffer: CodecBuffer,
    /// Write cursor within the slab.
    position: usize,
    /// Cursor at the start of the batch begun by the last flush.
    batch_start: usize,
    finished: bool,
    #[cfg(debug_assertions)]
    validator: Option<ShapeValidator>,
}

impl<W: Write> RowBinaryWriter<W> {
    /// Creates a writer with default options: a 1 MiB slab from the shared
    /// pool.
    pub fn new(stream: W) -> Result<Self> {
        Self::with_options(stream, CodecOptions::default())
    }

    pub fn with_options(stream: W, options: CodecOptions) -> Result<Self> {
        Ok(Self {
            stream,
            buffer: options.acquire()?,
            position: 0,
            batch_start: 0,
            finished: false,
            #[cfg(debug_assertions)]
            validator: None,
        })
    }

    /// Arms debug-build shape validation against `columns`. Release builds
    /// keep no validation state.
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        #[cfg(debug_assertions)]
        {
            self.validator = Some(ShapeValidator::new(columns));
        }
        #[cfg(not(debug_assertions))]
        let _ = columns;
        self
    }

    /// Batches physical I/O: a no-op while the slab can absorb another
    /// batch the size of the last one, a single stream write otherwise.
    /// Call between rows.
    pub fn flush(&mut self) -> Result<()> {
        let batch = self.position - self.batch_start;
        if self.buffer.len() - self.position >= batch {
            self.batch_start = self.position;
            return Ok(());
        }
        self.drain()
    }

    /// Terminal flush. Propagates errors; repeated calls are a no-op.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.drain()?;
        self.stream.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Writes all staged bytes to the stream and rewinds the slab.
    fn drain(&mut self) -> Result<()> {
        if self.position > 0 {
            self.stream.write_all(&self.buffer[..self.position])?;
            self.position = 0;
        }
        self.batch_start = 0;
        Ok(())
    }

    /// Makes room for `needed` bytes, draining the slab when necessary.
    fn reserve(&mut self, needed: usize) -> Result<()> {
        if self.buffer.len() - self.position >= needed {
            return Ok(());
        }
        ensure!(
            needed <= self.buffer.len(),
            "value of {} bytes exceeds the {} byte codec buffer",
            needed,
            self.buffer.len()
        );
        self.drain()
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }

    fn put_le<T: IntoBytes + Immutable>(&mut self, value: T) -> Result<()> {
        self.put(value.as_bytes())
    }

    #[inline]
    fn check(&mut self, kind: TypeKind, arg: Option<u32>, variable_length: Option<u64>) {
        #[cfg(debug_assertions)]
        if let Some(validator) = self.validator.as_mut() {
            validator.observe(kind, arg, variable_length);
        }
        #[cfg(not(debug_assertions))]
        let _ = (kind, arg, variable_length);
    }

    fn put_varint(&mut self, value: u64) -> Result<()> {
        self.reserve(MAX_VARINT_LEN)?;
        let written = encode_varint(value, &mut self.buffer[self.position..]);
        self.position += written;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.check(TypeKind::UInt8, None, None);
        self.put(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.check(TypeKind::Int8, None, None);
        self.put(&[value as u8])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.check(TypeKind::UInt16, None, None);
        self.put_le(U16::new(value))
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.check(TypeKind::Int16, None, None);
        self.put_le(I16::new(value))
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.check(TypeKind::UInt32, None, None);
        self.put_le(U32::new(value))
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.check(TypeKind::Int32, None, None);
        self.put_le(I32::new(value))
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.check(TypeKind::UInt64, None, None);
        self.put_le(U64::new(value))
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.check(TypeKind::Int64, None, None);
        self.put_le(I64::new(value))
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.check(TypeKind::Float32, None, None);
        self.put_le(F32::new(value))
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.check(TypeKind::Float64, None, None);
        self.put_le(F64::new(value))
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.check(TypeKind::Bool, None, None);
        self.put(&[u8::from(value)])
    }

    /// Length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_string_bytes(value.as_bytes())
    }

    /// Length-prefixed raw bytes, for callers encoding a non-UTF-8 text
    /// encoding themselves.
    pub fn write_string_bytes(&mut self, value: &[u8]) -> Result<()> {
        ensure!(
            value.len() as u64 <= MAX_LENGTH,
            "string of {} bytes exceeds the wire length limit",
            value.len()
        );
        self.check(TypeKind::String, None, Some(value.len() as u64));
        self.put_varint(value.len() as u64)?;
        self.put(value)
    }

    /// Exactly `len` bytes: the payload, zero-padded to the declared width.
    pub fn write_fixed_string(&mut self, value: &[u8], len: usize) -> Result<()> {
        ensure!(
            value.len() <= len,
            "fixed string payload of {} bytes exceeds declared width {}",
            value.len(),
            len
        );
        self.check(TypeKind::FixedString, Some(len as u32), None);
        self.reserve(len)?;
        self.buffer[self.position..self.position + value.len()].copy_from_slice(value);
        self.buffer[self.position + value.len()..self.position + len].fill(0);
        self.position += len;
        Ok(())
    }

    /// Days since 1970-01-01. The u16 domain is exactly the valid range
    /// (through 2149-06-06).
    pub fn write_date(&mut self, days: u16) -> Result<()> {
        self.check(TypeKind::Date, None, None);
        self.put_le(U16::new(days))
    }

    /// Signed days since 1970-01-01, 1900-01-01 through 2299-12-31.
    pub fn write_date32(&mut self, days: i32) -> Result<()> {
        debug_assert!(
            (DATE32_MIN_DAYS..=DATE32_MAX_DAYS).contains(&days),
            "Date32 value {days} outside 1900-01-01..=2299-12-31"
        );
        self.check(TypeKind::Date32, None, None);
        self.put_le(I32::new(days))
    }

    /// Seconds since the epoch, UTC. The u32 domain is exactly the valid
    /// range (through 2106-02-07 06:28:15).
    pub fn write_datetime(&mut self, seconds: u32) -> Result<()> {
        self.check(TypeKind::DateTime, None, None);
        self.put_le(U32::new(seconds))
    }

    /// 100 ns ticks since the epoch, rescaled to `precision` on the wire.
    /// Precisions 0..=6 truncate sub-unit ticks.
    pub fn write_datetime64(&mut self, ticks: i64, precision: u8) -> Result<()> {
        ensure!(
            precision <= MAX_PRECISION,
            "unsupported DateTime64 precision {}: must be 0..={}",
            precision,
            MAX_PRECISION
        );
        debug_assert!(
            (DATETIME64_MIN_TICKS..=DATETIME64_MAX_TICKS).contains(&ticks),
            "DateTime64 value {ticks} outside 1900-01-01..=2299-12-31"
        );
        self.check(TypeKind::DateTime64, Some(precision.into()), None);
        let raw = temporal::wire_from_ticks(ticks, precision)?;
        self.put_le(I64::new(raw))
    }

    /// Signed whole seconds within plus or minus 999:59:59.
    pub fn write_time(&mut self, seconds: i32) -> Result<()> {
        debug_assert!(
            (TIME_MIN_SECONDS..=TIME_MAX_SECONDS).contains(&seconds),
            "Time value {seconds} outside -999:59:59..=999:59:59"
        );
        self.check(TypeKind::Time, None, None);
        self.put_le(I32::new(seconds))
    }

    /// 100 ns ticks within plus or minus 999:59:59.9999999, rescaled to
    /// `precision` on the wire.
    pub fn write_time64(&mut self, ticks: i64, precision: u8) -> Result<()> {
        ensure!(
            precision <= MAX_PRECISION,
            "unsupported Time64 precision {}: must be 0..={}",
            precision,
            MAX_PRECISION
        );
        debug_assert!(
            (TIME64_MIN_TICKS..=TIME64_MAX_TICKS).contains(&ticks),
            "Time64 value {ticks} outside -999:59:59.9999999..=999:59:59.9999999"
        );
        self.check(TypeKind::Time64, Some(precision.into()), None);
        let raw = temporal::wire_from_ticks(ticks, precision)?;
        self.put_le(I64::new(raw))
    }

    /// A UUID given in canonical (textual big-endian) byte order; the wire
    /// permutation is applied here.
    pub fn write_uuid(&mut self, uuid: [u8; 16]) -> Result<()> {
        self.check(TypeKind::Uuid, None, None);
        self.put(&uuid_swizzle(uuid))
    }

    /// An IPv4 address, stored as a little-endian u32 (octets reversed
    /// relative to dotted form).
    pub fn write_ipv4(&mut self, addr: Ipv4Addr) -> Result<()> {
        self.check(TypeKind::Ipv4, None, None);
        self.put_le(U32::new(u32::from(addr)))
    }

    /// An IPv6 address, network byte order.
    pub fn write_ipv6(&mut self, addr: Ipv6Addr) -> Result<()> {
        self.check(TypeKind::Ipv6, None, None);
        self.put(&addr.octets())
    }

    /// Length prefix of the element sequence that must follow: exactly
    /// `len` element encodings, recursively.
    pub fn write_array_len(&mut self, len: usize) -> Result<()> {
        ensure!(
            len as u64 <= MAX_LENGTH,
            "array of {len} elements exceeds the wire length limit"
        );
        self.check(TypeKind::Array, None, Some(len as u64));
        self.put_varint(len as u64)
    }

    /// Nullable tag: `true` emits the absent marker and no payload may
    /// follow; `false` obliges the caller to write the payload next.
    pub fn write_null(&mut self, is_null: bool) -> Result<()> {
        self.check(TypeKind::Nullable, None, Some(u64::from(is_null)));
        self.put(&[u8::from(is_null)])
    }

    /// Pre-encoded wire bytes, copied through unchanged. No shape check.
    pub fn write_raw_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        #[cfg(debug_assertions)]
        if let Some(validator) = self.validator.as_mut() {
            validator.observe_raw();
        }
        self.put(bytes)
    }
}

impl<W: Write> Drop for RowBinaryWriter<W> {
    fn drop(&mut self) {
        // Errors cannot surface from drop; callers who need them call
        // finish() first.
        if !self.finished && self.position > 0 {
            let _ = self.stream.write_all(&self.buffer[..self.position]);
            let _ = self.stream.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(sink: &mut Vec<u8>) -> RowBinaryWriter<&mut Vec<u8>> {
        RowBinaryWriter::new(sink).unwrap()
    }

    #[test]
    fn integers_encode_little_endian() {
        let mut sink = Vec::new();
        let mut w = writer(&mut sink);
        w.write_u16(3).unwrap();
        w.write_i32(-2).unwrap();
        w.write_u64(0x0102030405060708).unwrap();
        w.finish().unwrap();
        drop(w);
        assert_eq!(
            sink,
            [
                0x03, 0x00, // u16
                0xFE, 0xFF, 0xFF, 0xFF, // i32
                0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // u64
            ]
        );
    }

    #[test]
    fn string_carries_varint_prefix() {
        let mut sink = Vec::new();
        let mut w = writer(&mut sink);
        w.write_string("test_a").unwrap();
        w.finish().unwrap();
        drop(w);
        assert_eq!(sink, [0x06, 0x74, 0x65, 0x73, 0x74, 0x5F, 0x61]);
    }

    #[test]
    fn long_string_prefix_spans_two_bytes() {
        let mut sink = Vec::new();
        let mut w = writer(&mut sink);
        w.write_string(&"a".repeat(300)).unwrap();
        w.finish().unwrap();
        drop(w);
        assert_eq!(&sink[..2], &[0xAC, 0x02]);
        assert_eq!(sink.len(), 302);
    }

    #[test]
    fn fixed_string_zero_pads() {
        let mut sink = Vec::new();
        let mut w = writer(&mut sink);
        w.write_fixed_string(b"US", 4).unwrap();
        w.finish().unwrap();
        drop(w);
        assert_eq!(sink, [b'U', b'S', 0, 0]);
    }

    #[test]
    fn fixed_string_rejects_overlong_payload() {
        let mut sink = Vec::new();
        let mut w = writer(&mut sink);
        assert!(w.write_fixed_string(b"ABCDE", 4).is_err());
    }

    #[test]
    fn ipv4_reverses_octets() {
        let mut sink = Vec::new();
        let mut w = writer(&mut sink);
        w.write_ipv4(Ipv4Addr::new(116, 106, 34, 242)).unwrap();
        w.finish().unwrap();
        drop(w);
        assert_eq!(sink, [0xF2, 0x22, 0x6A, 0x74]);
    }

    #[test]
    fn nullable_encodings_match_the_tag_contract() {
        let mut sink = Vec::new();
        let mut w = writer(&mut sink);
        w.write_null(true).unwrap();
        w.write_null(false).unwrap();
        w.write_i8(127).unwrap();
        w.finish().unwrap();
        drop(w);
        assert_eq!(sink, [0x01, 0x00, 0x7F]);
    }

    #[test]
    fn flush_is_adaptive() {
        let mut sink = Vec::new();
        let options = CodecOptions::default().buffer_size(16);
        let mut w = RowBinaryWriter::with_options(&mut sink, options).unwrap();

        w.write_u32(1).unwrap();
        w.flush().unwrap(); // 4-byte batch, 12 free: no I/O
        assert_eq!(w.position, 4);
        assert_eq!(w.batch_start, 4);

        w.write_u64(2).unwrap();
        w.write_u32(3).unwrap();
        w.flush().unwrap(); // 12-byte batch, 0 free: drains
        assert_eq!(w.position, 0);
        w.finish().unwrap();
        drop(w);
        assert_eq!(sink.len(), 16);
    }

    #[test]
    fn primitives_never_split_across_a_drain() {
        let mut sink = Vec::new();
        let options = CodecOptions::default().buffer_size(8);
        let mut w = RowBinaryWriter::with_options(&mut sink, options).unwrap();

        w.write_u32(0xAABBCCDD).unwrap();
        w.write_u64(0x1122334455667788).unwrap(); // overflows: drains first
        w.finish().unwrap();
        drop(w);
        assert_eq!(sink[..4], [0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(sink[4..], [0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn oversized_value_is_rejected() {
        let mut sink = Vec::new();
        let options = CodecOptions::default().buffer_size(8);
        let mut w = RowBinaryWriter::with_options(&mut sink, options).unwrap();
        assert!(w.write_string(&"x".repeat(64)).is_err());
    }

    #[test]
    fn finish_twice_is_a_no_op() {
        let mut sink = Vec::new();
        let mut w = writer(&mut sink);
        w.write_u8(1).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
        drop(w);
        assert_eq!(sink, [0x01]);
    }

    #[test]
    fn drop_flushes_residual_bytes() {
        let mut sink = Vec::new();
        {
            let mut w = RowBinaryWriter::new(&mut sink).unwrap();
            w.write_u8(0x2A).unwrap();
        }
        assert_eq!(sink, [0x2A]);
    }

    #[test]
    fn out_of_range_time_is_a_debug_contract_violation() {
        let result = std::panic::catch_unwind(|| {
            let mut sink = Vec::new();
            let mut w = RowBinaryWriter::new(&mut sink).unwrap();
            let _ = w.write_time(4_000_000);
            w.finish().unwrap();
        });
        if cfg!(debug_assertions) {
            assert!(result.is_err());
        } else {
            assert!(result.is_ok());
        }
    }
}

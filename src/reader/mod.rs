//! # Streaming Row Reader
//!
//! Forward-only decoder for the RowBinary wire formats. The caller supplies
//! a byte stream and drives the reader with typed primitive calls in column
//! order; all physical I/O funnels through one fixed-size slab.
//!
//! ## Buffering Discipline
//!
//! Two thresholds keep I/O off the hot path:
//!
//! - [`is_complete`](RowBinaryReader::is_complete) measures the previous
//!   row's size. When at least that many bytes are already buffered, the
//!   probe answers without touching the stream; otherwise it refills toward
//!   one row's worth and reports end-of-stream when the source is dry.
//! - Typed primitives that find too few buffered bytes perform a blocking
//!   refill of exactly the missing count, compacting the unread tail to the
//!   front of the slab when needed.
//!
//! For fixed-width row shapes no physical read happens inside the row loop;
//! for variable-width rows the previous row's size amortizes the check.
//!
//! ## Shape Validation
//!
//! In debug builds, a reader on the self-describing variant checks every
//! typed call against the column header (see [`crate::validator`]). Release
//! builds compile the checks and their state out entirely.
//!
//! ## Usage
//!
//! ```ignore
//! let mut reader = RowBinaryReader::new(stream)?;
//! reader.read_header()?;
//! while !reader.is_complete()? {
//!     let id = reader.read_u64()?;
//!     let name = reader.read_string()?;
//! }
//! ```

use std::error;
use std::fmt;
use std::io::Read;
use std::mem::size_of;
use std::net::{Ipv4Addr, Ipv6Addr};

use eyre::{bail, ensure, eyre, Result, WrapErr};
use zerocopy::byteorder::little_endian::{F32, F64, I16, I32, I64, U16, U32, U64};
use zerocopy::FromBytes;

use crate::config::{MAX_LENGTH, MAX_PRECISION, MAX_VARINT_LEN};
use crate::encoding::temporal;
use crate::encoding::uuid::uuid_swizzle;
use crate::memory::CodecBuffer;
use crate::options::CodecOptions;
use crate::types::{Column, TypeKind};
#[cfg(debug_assertions)]
use crate::validator::ShapeValidator;

mod header;

/// The stream ended in the middle of a value.
///
/// Carries how many bytes the primitive needed, how many the stream still
/// had, and (when the reader knows its schema) the column being decoded.
#[derive(Debug)]
pub struct StreamExhausted {
    pub required: usize,
    pub obtained: usize,
    pub column: Option<String>,
}

impl fmt::Display for StreamExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stream ended mid-value: needed {} bytes, got {}",
            self.required, self.obtained
        )?;
        if let Some(column) = &self.column {
            write!(f, " while decoding column '{column}'")?;
        }
        Ok(())
    }
}

impl error::Error for StreamExhausted {}

/// Streaming decoder over a readable byte stream.
///
/// Single-threaded: one reader owns its buffer, cursors, and validator
/// state exclusively. Run one reader per stream to parallelize.
pub struct RowBinaryReader<R> {
    stream: R,
    buffer: CodecBuffer,
    /// Count of valid bytes in the slab.
    available: usize,
    /// Read cursor within the valid region.
    position: usize,
    /// Cursor at the start of the most recent row.
    row_start: usize,
    columns: Option<Vec<Column>>,
    #[cfg(debug_assertions)]
    validator: Option<ShapeValidator>,
}

impl<R: Read> RowBinaryReader<R> {
    /// Creates a reader with default options: a 1 MiB slab from the shared
    /// pool.
    pub fn new(stream: R) -> Result<Self> {
        Self::with_options(stream, CodecOptions::default())
    }

    pub fn with_options(stream: R, options: CodecOptions) -> Result<Self> {
        Ok(Self {
            stream,
            buffer: options.acquire()?,
            available: 0,
            position: 0,
            row_start: 0,
            columns: None,
            #[cfg(debug_assertions)]
            validator: None,
        })
    }

    /// The columns parsed from the header, when
    /// [`read_header`](Self::read_header) has run.
    pub fn columns(&self) -> Option<&[Column]> {
        self.columns.as_deref()
    }

    /// Probes whether the stream holds another row, refilling the buffer
    /// when the previous row's worth of bytes is not already staged.
    ///
    /// Returns `true` once the stream is exhausted at a row boundary. Call
    /// between rows; this is where physical reads are meant to happen.
    pub fn is_complete(&mut self) -> Result<bool> {
        let last_row_size = self.position - self.row_start;
        self.row_start = self.position;

        if self.position < self.available && self.available - self.position >= last_row_size {
            return Ok(false);
        }

        loop {
            if self.available == self.buffer.len() {
                if self.position == 0 {
                    // Slab full of unread bytes; the next row is simply
                    // bigger than the last.
                    return Ok(false);
                }
                self.compact();
            }
            let read = self.stream.read(&mut self.buffer[self.available..])?;
            if read == 0 {
                return Ok(self.position == self.available);
            }
            self.available += read;
            if self.available - self.position >= last_row_size {
                return Ok(false);
            }
        }
    }

    /// Slides the unread tail to the front of the slab.
    fn compact(&mut self) {
        let shift = self.position;
        if shift == 0 {
            return;
        }
        self.buffer.copy_within(self.position..self.available, 0);
        self.available -= shift;
        self.position = 0;
        self.row_start = self.row_start.saturating_sub(shift);
    }

    /// Blocking refill until `needed` bytes sit between the cursor and the
    /// end of the valid region.
    fn fill_exact(&mut self, needed: usize) -> Result<()> {
        if self.available - self.position >= needed {
            return Ok(());
        }
        ensure!(
            needed <= self.buffer.len(),
            "value of {} bytes exceeds the {} byte codec buffer",
            needed,
            self.buffer.len()
        );
        if self.buffer.len() - self.position < needed {
            self.compact();
        }
        while self.available - self.position < needed {
            let read = self.stream.read(&mut self.buffer[self.available..])?;
            if read == 0 {
                return Err(self.exhausted(needed, self.available - self.position));
            }
            self.available += read;
        }
        Ok(())
    }

    fn exhausted(&self, required: usize, obtained: usize) -> eyre::Report {
        #[cfg(debug_assertions)]
        let column = self
            .validator
            .as_ref()
            .and_then(|v| v.current())
            .map(str::to_string);
        #[cfg(not(debug_assertions))]
        let column = None;
        eyre::Report::new(StreamExhausted {
            required,
            obtained,
            column,
        })
    }

    /// Consumes and returns exactly `len` buffered bytes.
    fn take(&mut self, len: usize) -> Result<&[u8]> {
        self.fill_exact(len)?;
        let start = self.position;
        self.position += len;
        Ok(&self.buffer[start..start + len])
    }

    fn read_le<T: FromBytes>(&mut self) -> Result<T> {
        let bytes = self.take(size_of::<T>())?;
        T::read_from_bytes(bytes).map_err(|_| eyre!("fixed-width decode size mismatch"))
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

    /// Reads a LEB128 length prefix, bounded to 2^31-1.
    fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            self.fill_exact(1)?;
            let byte = self.buffer[self.position];
            self.position += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            ensure!(
                (shift as usize) < MAX_VARINT_LEN * 7,
                "varint length exceeds 2^31-1"
            );
        }
        ensure!(value <= MAX_LENGTH, "varint length exceeds 2^31-1");
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(TypeKind::UInt8, None, None);
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.check(TypeKind::Int8, None, None);
        let bytes = self.take(1)?;
        Ok(bytes[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(TypeKind::UInt16, None, None);
        Ok(self.read_le::<U16>()?.get())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.check(TypeKind::Int16, None, None);
        Ok(self.read_le::<I16>()?.get())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(TypeKind::UInt32, None, None);
        Ok(self.read_le::<U32>()?.get())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.check(TypeKind::Int32, None, None);
        Ok(self.read_le::<I32>()?.get())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.check(TypeKind::UInt64, None, None);
        Ok(self.read_le::<U64>()?.get())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.check(TypeKind::Int64, None, None);
        Ok(self.read_le::<I64>()?.get())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.check(TypeKind::Float32, None, None);
        Ok(self.read_le::<F32>()?.get())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.check(TypeKind::Float64, None, None);
        Ok(self.read_le::<F64>()?.get())
    }

    /// Strict one-byte boolean: anything other than 0 or 1 is rejected.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.check(TypeKind::Bool, None, None);
        let bytes = self.take(1)?;
        match bytes[0] {
            0 => Ok(false),
            1 => Ok(true),
            byte => bail!("invalid Bool byte {byte:#04x}: must be 0 or 1"),
        }
    }

    /// Length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_string_bytes()?;
        String::from_utf8(bytes).wrap_err("string value is not valid UTF-8")
    }

    /// Length-prefixed raw bytes, for callers decoding a non-UTF-8 text
    /// encoding themselves.
    pub fn read_string_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_varint()?;
        self.check(TypeKind::String, None, Some(len));
        Ok(self.take(len as usize)?.to_vec())
    }

    /// Exactly `len` bytes of ASCII text, zero padding included.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        self.check(TypeKind::FixedString, Some(len as u32), None);
        let bytes = self.take(len)?;
        ensure!(
            bytes.is_ascii(),
            "fixed string is not ASCII; use read_raw_bytes for binary payloads"
        );
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Days since 1970-01-01, unsigned.
    pub fn read_date(&mut self) -> Result<u16> {
        self.check(TypeKind::Date, None, None);
        Ok(self.read_le::<U16>()?.get())
    }

    /// Days since 1970-01-01, signed; dates before the epoch are negative.
    pub fn read_date32(&mut self) -> Result<i32> {
        self.check(TypeKind::Date32, None, None);
        Ok(self.read_le::<I32>()?.get())
    }

    /// Seconds since the epoch, UTC.
    pub fn read_datetime(&mut self) -> Result<u32> {
        self.check(TypeKind::DateTime, None, None);
        Ok(self.read_le::<U32>()?.get())
    }

    /// A `DateTime64(precision)` value, normalized to 100 ns ticks since the
    /// epoch. Precisions 8 and 9 are finer than the tick unit and decode
    /// lossily.
    pub fn read_datetime64(&mut self, precision: u8) -> Result<i64> {
        ensure!(
            precision <= MAX_PRECISION,
            "unsupported DateTime64 precision {}: must be 0..={}",
            precision,
            MAX_PRECISION
        );
        self.check(TypeKind::DateTime64, Some(precision.into()), None);
        let raw = self.read_le::<I64>()?.get();
        temporal::ticks_from_wire(raw, precision)
    }

    /// Signed seconds; negative readings are valid clock values.
    pub fn read_time(&mut self) -> Result<i32> {
        self.check(TypeKind::Time, None, None);
        Ok(self.read_le::<I32>()?.get())
    }

    /// A `Time64(precision)` value, normalized to 100 ns ticks. Precisions
    /// 8 and 9 decode lossily.
    pub fn read_time64(&mut self, precision: u8) -> Result<i64> {
        ensure!(
            precision <= MAX_PRECISION,
            "unsupported Time64 precision {}: must be 0..={}",
            precision,
            MAX_PRECISION
        );
        self.check(TypeKind::Time64, Some(precision.into()), None);
        let raw = self.read_le::<I64>()?.get();
        temporal::ticks_from_wire(raw, precision)
    }

    /// A UUID in canonical (textual big-endian) byte order; the wire
    /// permutation is undone here.
    pub fn read_uuid(&mut self) -> Result<[u8; 16]> {
        self.check(TypeKind::Uuid, None, None);
        let bytes = self.take(16)?;
        let mut wire = [0u8; 16];
        wire.copy_from_slice(bytes);
        Ok(uuid_swizzle(wire))
    }

    /// An IPv4 address, stored on the wire as a little-endian u32 (octets
    /// reversed relative to dotted form).
    pub fn read_ipv4(&mut self) -> Result<Ipv4Addr> {
        self.check(TypeKind::Ipv4, None, None);
        let bits = self.read_le::<U32>()?.get();
        Ok(Ipv4Addr::from(bits))
    }

    /// An IPv6 address, network byte order.
    pub fn read_ipv6(&mut self) -> Result<Ipv6Addr> {
        self.check(TypeKind::Ipv6, None, None);
        let bytes = self.take(16)?;
        let mut octets = [0u8; 16];
        octets.copy_from_slice(bytes);
        Ok(Ipv6Addr::from(octets))
    }

    /// Length of the immediately following element sequence.
    pub fn read_array_len(&mut self) -> Result<usize> {
        let len = self.read_varint()?;
        self.check(TypeKind::Array, None, Some(len));
        Ok(len as usize)
    }

    /// Nullable tag: `true` means the value is absent and no payload
    /// follows; `false` obliges the caller to read the payload next.
    pub fn read_null_tag(&mut self) -> Result<bool> {
        let bytes = self.take(1)?;
        let tag = bytes[0];
        ensure!(tag <= 1, "invalid null tag {tag:#04x}: must be 0 or 1");
        self.check(TypeKind::Nullable, None, Some(tag.into()));
        Ok(tag == 1)
    }

    /// Borrowed view of the next `len` wire bytes, valid until the next
    /// call on this reader. No decoding, no shape check.
    pub fn read_raw_bytes(&mut self, len: usize) -> Result<&[u8]> {
        #[cfg(debug_assertions)]
        if let Some(validator) = self.validator.as_mut() {
            validator.observe_raw();
        }
        self.take(len)
    }

    /// Discards `len` wire bytes. Unlike [`read_raw_bytes`](Self::read_raw_bytes)
    /// the span may exceed the buffer size.
    pub fn skip_bytes(&mut self, len: usize) -> Result<()> {
        #[cfg(debug_assertions)]
        if let Some(validator) = self.validator.as_mut() {
            validator.observe_raw();
        }
        let mut remaining = len;
        while remaining > 0 {
            let chunk = remaining.min(self.buffer.len());
            self.fill_exact(chunk)?;
            self.position += chunk;
            remaining -= chunk;
        }
        Ok(())
    }
}

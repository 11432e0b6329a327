//! # Codec Configuration Constants
//!
//! This module centralizes the numeric constants that govern the codec,
//! grouping interdependent values together and documenting their
//! relationships. Constants that depend on each other are co-located to
//! prevent mismatch bugs.
//!
//! ## Dependency Graph
//!
//! ```text
//! DEFAULT_BUFFER_SIZE (1 MiB)
//!       │
//!       └─> Must be >= the largest single row a stream carries. Typed
//!           primitives refill/flush through the buffer; a value wider than
//!           the buffer cannot be staged and is rejected.
//!
//! MAX_LENGTH (i32::MAX)
//!       │
//!       ├─> MAX_VARINT_LEN (5): ceil(31 / 7) bytes of LEB128 payload
//!       │
//!       └─> String and array length prefixes are bounded by this value;
//!           the varint decoder rejects anything larger.
//!
//! TIME_MAX_SECONDS (999:59:59)
//!       │
//!       └─> TIME64_MAX_TICKS (same bound expressed in 100 ns ticks)
//! ```
//!
//! ## Critical Invariants
//!
//! 1. `MAX_VARINT_LEN == 5`: a 31-bit length needs at most five 7-bit groups
//! 2. `TIME64_MAX_TICKS == (TIME_MAX_SECONDS + 1) * TICKS_PER_SECOND - 1`
//! 3. `DATETIME64_MAX_TICKS` is the last representable tick of 2299-12-31
//!
//! ## Usage
//!
//! Import constants from this module rather than defining them locally:
//!
//! ```ignore
//! use rowbin::config::{DEFAULT_BUFFER_SIZE, MAX_HEADER_COLUMNS};
//! ```

/// Default size of a pooled codec buffer.
///
/// Large enough that fixed-width row shapes amortize thousands of rows per
/// physical read or write.
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Sanity bound on the column count carried by a
/// `RowBinaryWithNamesAndTypes` header. Checked as a diagnostic assertion.
pub const MAX_HEADER_COLUMNS: u64 = 1000;

/// Upper bound for string and array length prefixes on the wire.
pub const MAX_LENGTH: u64 = i32::MAX as u64;

/// Maximum encoded size of a length varint: ceil(31 / 7) groups.
pub const MAX_VARINT_LEN: usize = 5;

/// Canonical sub-second resolution: one tick is 100 nanoseconds.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Highest supported `DateTime64` / `Time64` precision.
pub const MAX_PRECISION: u8 = 9;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// `Date32` lower bound: 1900-01-01 as days since the epoch.
pub const DATE32_MIN_DAYS: i32 = -25_567;

/// `Date32` upper bound: 2299-12-31 as days since the epoch.
pub const DATE32_MAX_DAYS: i32 = 120_529;

/// `DateTime64` bounds in ticks: 1900-01-01 00:00:00.0000000 through
/// 2299-12-31 23:59:59.9999999.
pub const DATETIME64_MIN_TICKS: i64 = DATE32_MIN_DAYS as i64 * SECONDS_PER_DAY * TICKS_PER_SECOND;
pub const DATETIME64_MAX_TICKS: i64 =
    (DATE32_MAX_DAYS as i64 + 1) * SECONDS_PER_DAY * TICKS_PER_SECOND - 1;

/// `Time` bound: plus or minus 999:59:59, in whole seconds.
///
/// Server documentation has floated wider ranges for later versions; the
/// bound lives here (not inline in the writer) so a revision touches one
/// constant.
pub const TIME_MAX_SECONDS: i32 = 999 * 3600 + 59 * 60 + 59;
pub const TIME_MIN_SECONDS: i32 = -TIME_MAX_SECONDS;

/// `Time64` bound: the last tick strictly below 1000 hours.
pub const TIME64_MAX_TICKS: i64 = (TIME_MAX_SECONDS as i64 + 1) * TICKS_PER_SECOND - 1;
pub const TIME64_MIN_TICKS: i64 = -TIME64_MAX_TICKS;

const _: () = assert!(MAX_VARINT_LEN == (31 + 6) / 7);
const _: () = assert!(TIME64_MAX_TICKS == 35_999_999_999_999);
const _: () = assert!(DATETIME64_MIN_TICKS == -22_089_888_000_000_000);

//! # Wire Value Encodings
//!
//! Pure, stateless helpers shared by the reader and the writer:
//!
//! - `varint`: unsigned LEB128 length prefixes
//! - `temporal`: civil-date and tick arithmetic for the date/time kinds
//! - `uuid`: the UUID wire permutation and canonical text form
//!
//! Fixed-width integers and floats travel little-endian and are handled
//! inline by the codec state machines; everything with a non-trivial layout
//! lives here so both directions share one definition.

pub mod temporal;
pub mod uuid;
pub mod varint;

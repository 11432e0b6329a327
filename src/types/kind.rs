//! # Wire Type Kinds
//!
//! This module defines `TypeKind`, the enumeration of the 25 wire-visible
//! type kinds, together with their canonical spellings and fixed wire widths.
//!
//! ## Kind Categories
//!
//! | Category | Kinds | Wire |
//! |----------|-------|------|
//! | **Integer** | UInt8..UInt64, Int8..Int64 | 1/2/4/8 bytes LE |
//! | **Float** | Float32, Float64 | IEEE-754 LE |
//! | **Boolean** | Bool | 1 byte, strict 0/1 |
//! | **Text** | String, FixedString(N) | varint + bytes / N bytes |
//! | **Temporal** | Date, Date32, DateTime, DateTime64(P), Time, Time64(P) | 2-8 bytes |
//! | **Identity** | UUID | 16 bytes, permuted |
//! | **Network** | IPv4, IPv6 | 4 bytes LE / 16 bytes |
//! | **Compound** | Nullable(T), Array(T), Tuple(f T, ...) | tag / varint / flattened |
//!
//! ## Name Lookup
//!
//! The nineteen simple kinds (everything a bare identifier can denote) are
//! matched through a compile-time perfect hash map, so resolving a type name
//! never allocates. `FixedString`, `DateTime64`, `Time64`, `Nullable`,
//! `Array`, and `Tuple` carry parenthesized arguments and are handled
//! structurally by the parser.

use phf::phf_map;

/// One of the 25 wire-visible type kinds.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    UInt8 = 0,
    Int8 = 1,
    UInt16 = 2,
    Int16 = 3,
    UInt32 = 4,
    Int32 = 5,
    UInt64 = 6,
    Int64 = 7,
    Float32 = 8,
    Float64 = 9,
    Bool = 10,
    String = 11,
    FixedString = 12,
    Date = 13,
    Date32 = 14,
    DateTime = 15,
    DateTime64 = 16,
    Time = 17,
    Time64 = 18,
    Uuid = 19,
    Ipv4 = 20,
    Ipv6 = 21,
    Nullable = 22,
    Array = 23,
    Tuple = 24,
}

/// Perfect-hash lookup from a bare type identifier to its kind.
///
/// Only the simple (argument-free) kinds appear here; parameterized and
/// compound kinds are dispatched by the parser.
static SIMPLE_KINDS: phf::Map<&'static str, TypeKind> = phf_map! {
    "UInt8" => TypeKind::UInt8,
    "Int8" => TypeKind::Int8,
    "UInt16" => TypeKind::UInt16,
    "Int16" => TypeKind::Int16,
    "UInt32" => TypeKind::UInt32,
    "Int32" => TypeKind::Int32,
    "UInt64" => TypeKind::UInt64,
    "Int64" => TypeKind::Int64,
    "Float32" => TypeKind::Float32,
    "Float64" => TypeKind::Float64,
    "Bool" => TypeKind::Bool,
    "String" => TypeKind::String,
    "Date" => TypeKind::Date,
    "Date32" => TypeKind::Date32,
    "DateTime" => TypeKind::DateTime,
    "Time" => TypeKind::Time,
    "UUID" => TypeKind::Uuid,
    "IPv4" => TypeKind::Ipv4,
    "IPv6" => TypeKind::Ipv6,
};

impl TypeKind {
    /// Resolves a bare identifier to a simple kind, if it names one.
    pub fn simple(name: &str) -> Option<TypeKind> {
        SIMPLE_KINDS.get(name).copied()
    }

    /// Canonical spelling, as the type grammar produces and accepts it.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::UInt8 => "UInt8",
            TypeKind::Int8 => "Int8",
            TypeKind::UInt16 => "UInt16",
            TypeKind::Int16 => "Int16",
            TypeKind::UInt32 => "UInt32",
            TypeKind::Int32 => "Int32",
            TypeKind::UInt64 => "UInt64",
            TypeKind::Int64 => "Int64",
            TypeKind::Float32 => "Float32",
            TypeKind::Float64 => "Float64",
            TypeKind::Bool => "Bool",
            TypeKind::String => "String",
            TypeKind::FixedString => "FixedString",
            TypeKind::Date => "Date",
            TypeKind::Date32 => "Date32",
            TypeKind::DateTime => "DateTime",
            TypeKind::DateTime64 => "DateTime64",
            TypeKind::Time => "Time",
            TypeKind::Time64 => "Time64",
            TypeKind::Uuid => "UUID",
            TypeKind::Ipv4 => "IPv4",
            TypeKind::Ipv6 => "IPv6",
            TypeKind::Nullable => "Nullable",
            TypeKind::Array => "Array",
            TypeKind::Tuple => "Tuple",
        }
    }

    /// Returns the fixed wire width in bytes, or None for kinds whose
    /// encoding is length-prefixed, tagged, or flattened.
    pub fn fixed_wire_width(&self) -> Option<usize> {
        match self {
            TypeKind::UInt8 | TypeKind::Int8 | TypeKind::Bool => Some(1),
            TypeKind::UInt16 | TypeKind::Int16 | TypeKind::Date => Some(2),
            TypeKind::UInt32
            | TypeKind::Int32
            | TypeKind::Float32
            | TypeKind::Date32
            | TypeKind::DateTime
            | TypeKind::Time
            | TypeKind::Ipv4 => Some(4),
            TypeKind::UInt64
            | TypeKind::Int64
            | TypeKind::Float64
            | TypeKind::DateTime64
            | TypeKind::Time64 => Some(8),
            TypeKind::Uuid | TypeKind::Ipv6 => Some(16),
            TypeKind::String
            | TypeKind::FixedString
            | TypeKind::Nullable
            | TypeKind::Array
            | TypeKind::Tuple => None,
        }
    }

    /// Returns true for the compound kinds that nest other types.
    pub fn is_compound(&self) -> bool {
        matches!(self, TypeKind::Nullable | TypeKind::Array | TypeKind::Tuple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_lookup_covers_nineteen_kinds() {
        assert_eq!(SIMPLE_KINDS.len(), 19);
        assert_eq!(TypeKind::simple("UInt8"), Some(TypeKind::UInt8));
        assert_eq!(TypeKind::simple("UUID"), Some(TypeKind::Uuid));
        assert_eq!(TypeKind::simple("IPv6"), Some(TypeKind::Ipv6));
    }

    #[test]
    fn simple_lookup_rejects_parameterized_kinds() {
        assert_eq!(TypeKind::simple("FixedString"), None);
        assert_eq!(TypeKind::simple("DateTime64"), None);
        assert_eq!(TypeKind::simple("Time64"), None);
        assert_eq!(TypeKind::simple("Nullable"), None);
        assert_eq!(TypeKind::simple("Array"), None);
        assert_eq!(TypeKind::simple("Tuple"), None);
    }

    #[test]
    fn simple_lookup_rejects_unsupported_names() {
        assert_eq!(TypeKind::simple("JSON"), None);
        assert_eq!(TypeKind::simple("Variant"), None);
        assert_eq!(TypeKind::simple("Map"), None);
        assert_eq!(TypeKind::simple("BFloat16"), None);
        assert_eq!(TypeKind::simple("uint8"), None);
    }

    #[test]
    fn wire_widths_match_the_format() {
        assert_eq!(TypeKind::UInt8.fixed_wire_width(), Some(1));
        assert_eq!(TypeKind::Date.fixed_wire_width(), Some(2));
        assert_eq!(TypeKind::DateTime.fixed_wire_width(), Some(4));
        assert_eq!(TypeKind::DateTime64.fixed_wire_width(), Some(8));
        assert_eq!(TypeKind::Uuid.fixed_wire_width(), Some(16));
        assert_eq!(TypeKind::String.fixed_wire_width(), None);
        assert_eq!(TypeKind::Tuple.fixed_wire_width(), None);
    }
}

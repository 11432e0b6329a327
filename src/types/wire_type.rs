//! # Wire Type Trees
//!
//! A `WireType` is the parsed form of a type string: a kind plus its nested
//! children, an optional integer argument (`FixedString` length or temporal
//! precision), and an optional field name when the type sits inside a tuple.
//!
//! Trees own their children outright, so they are acyclic by construction.
//! Diagnostics that need to name a position inside a tree carry the column
//! path forward instead of walking parent links.
//!
//! Scalar kinds construct without touching the heap (an empty `Vec` does not
//! allocate), which keeps type construction off the hot path's allocator.
//!
//! Equality is structural and includes tuple field names; `Display` prints
//! the canonical spelling, which the parser accepts back to an equal tree.

use std::fmt;

use crate::types::TypeKind;

/// Default precision for `DateTime64` and `Time64` written without one.
pub const DEFAULT_TEMPORAL_PRECISION: u32 = 3;

/// A parsed wire type: one node of the type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireType {
    pub kind: TypeKind,
    /// Child types: empty for scalars, one for `Nullable`/`Array`, one or
    /// more for `Tuple`.
    pub nested: Vec<WireType>,
    /// `FixedString(N)` length or `DateTime64(P)`/`Time64(P)` precision.
    pub arg: Option<u32>,
    /// Field name, meaningful only as a tuple element.
    pub field_name: Option<String>,
}

impl WireType {
    pub fn scalar(kind: TypeKind) -> Self {
        Self {
            kind,
            nested: Vec::new(),
            arg: None,
            field_name: None,
        }
    }

    pub fn fixed_string(len: u32) -> Self {
        Self {
            kind: TypeKind::FixedString,
            nested: Vec::new(),
            arg: Some(len),
            field_name: None,
        }
    }

    pub fn datetime64(precision: u32) -> Self {
        Self {
            kind: TypeKind::DateTime64,
            nested: Vec::new(),
            arg: Some(precision),
            field_name: None,
        }
    }

    pub fn time64(precision: u32) -> Self {
        Self {
            kind: TypeKind::Time64,
            nested: Vec::new(),
            arg: Some(precision),
            field_name: None,
        }
    }

    pub fn nullable(inner: WireType) -> Self {
        Self {
            kind: TypeKind::Nullable,
            nested: vec![inner],
            arg: None,
            field_name: None,
        }
    }

    pub fn array(element: WireType) -> Self {
        Self {
            kind: TypeKind::Array,
            nested: vec![element],
            arg: None,
            field_name: None,
        }
    }

    /// Builds a tuple type. Every element carries a field name.
    pub fn tuple(fields: Vec<(String, WireType)>) -> Self {
        let nested = fields
            .into_iter()
            .map(|(name, mut ty)| {
                ty.field_name = Some(name);
                ty
            })
            .collect();
        Self {
            kind: TypeKind::Tuple,
            nested,
            arg: None,
            field_name: None,
        }
    }

    /// The sole child of a `Nullable` or `Array` type.
    pub fn inner(&self) -> Option<&WireType> {
        match self.kind {
            TypeKind::Nullable | TypeKind::Array => self.nested.first(),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::FixedString => write!(f, "FixedString({})", self.arg.unwrap_or(0)),
            TypeKind::DateTime64 => write!(
                f,
                "DateTime64({})",
                self.arg.unwrap_or(DEFAULT_TEMPORAL_PRECISION)
            ),
            TypeKind::Time64 => write!(
                f,
                "Time64({})",
                self.arg.unwrap_or(DEFAULT_TEMPORAL_PRECISION)
            ),
            TypeKind::Nullable | TypeKind::Array => {
                write!(f, "{}(", self.kind.name())?;
                if let Some(inner) = self.nested.first() {
                    write!(f, "{inner}")?;
                }
                write!(f, ")")
            }
            TypeKind::Tuple => {
                write!(f, "Tuple(")?;
                for (i, field) in self.nested.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let Some(name) = &field.field_name {
                        write!(f, "{name} ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")
            }
            _ => f.write_str(self.kind.name()),
        }
    }
}

/// A named column of the self-describing wire variant. Order is significant
/// and matches the order of typed reads within a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: WireType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: WireType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_display_uses_canonical_name() {
        assert_eq!(WireType::scalar(TypeKind::UInt64).to_string(), "UInt64");
        assert_eq!(WireType::scalar(TypeKind::Uuid).to_string(), "UUID");
        assert_eq!(WireType::scalar(TypeKind::Ipv4).to_string(), "IPv4");
    }

    #[test]
    fn parameterized_display_includes_argument() {
        assert_eq!(WireType::fixed_string(16).to_string(), "FixedString(16)");
        assert_eq!(WireType::datetime64(5).to_string(), "DateTime64(5)");
        assert_eq!(WireType::time64(0).to_string(), "Time64(0)");
    }

    #[test]
    fn compound_display_nests() {
        let ty = WireType::array(WireType::nullable(WireType::scalar(TypeKind::String)));
        assert_eq!(ty.to_string(), "Array(Nullable(String))");
    }

    #[test]
    fn tuple_display_names_fields() {
        let ty = WireType::tuple(vec![
            ("id".to_string(), WireType::scalar(TypeKind::UInt32)),
            (
                "tag".to_string(),
                WireType::nullable(WireType::scalar(TypeKind::String)),
            ),
        ]);
        assert_eq!(ty.to_string(), "Tuple(id UInt32, tag Nullable(String))");
    }

    #[test]
    fn equality_is_structural() {
        let a = WireType::array(WireType::scalar(TypeKind::Int8));
        let b = WireType::array(WireType::scalar(TypeKind::Int8));
        assert_eq!(a, b);

        let c = WireType::array(WireType::scalar(TypeKind::UInt8));
        assert_ne!(a, c);
    }

    #[test]
    fn tuple_field_names_participate_in_equality() {
        let a = WireType::tuple(vec![("x".to_string(), WireType::scalar(TypeKind::Int8))]);
        let b = WireType::tuple(vec![("y".to_string(), WireType::scalar(TypeKind::Int8))]);
        assert_ne!(a, b);
    }
}

//! # Row Shape Validator
//!
//! Debug-build observer that tracks the expected type of the next typed
//! primitive call and asserts callers stay in sync with the column schema.
//!
//! ## Algorithm
//!
//! The validator keeps a stack of expected `(path, type)` pairs. When a row
//! begins (stack empty), all columns are pushed in reverse so the first
//! column sits on top. Each typed read or write pops the top and compares
//! kinds:
//!
//! - `Tuple` entries are transparent: their fields are flattened onto the
//!   stack, because tuple fields travel as consecutive top-level values.
//! - `Array(T)` expects an array-length call carrying N, then pushes N
//!   copies of T.
//! - `Nullable(T)` expects a null-tag call; a zero tag (value present)
//!   pushes T.
//! - Variable-length string calls carry their observed byte length so a
//!   `FixedString(N)` column can accept a `String` call of exactly N bytes.
//! - `UInt32` calls are accepted for `IPv4` columns, and `Int64` calls for
//!   `DateTime64`/`Time64` columns (lossless manual handling).
//! - Raw-byte reads pop without comparing.
//!
//! A mismatch panics with the offending column path. The module is compiled
//! only under `debug_assertions`; release builds carry neither the checks
//! nor the stack.

use smallvec::SmallVec;

use crate::types::{Column, TypeKind, WireType};

/// Expected shape of the calls remaining in the current row.
pub(crate) struct ShapeValidator {
    columns: Vec<Column>,
    stack: SmallVec<[Expected; 16]>,
    /// Path of the most recently popped entry, for error context.
    current: Option<String>,
}

struct Expected {
    path: String,
    ty: WireType,
}

impl ShapeValidator {
    pub(crate) fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            stack: SmallVec::new(),
            current: None,
        }
    }

    /// The column path of the value being decoded or encoded right now.
    pub(crate) fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn begin_row(&mut self) {
        for column in self.columns.iter().rev() {
            self.stack.push(Expected {
                path: column.name.clone(),
                ty: column.ty.clone(),
            });
        }
    }

    /// Pops the next expected entry, flattening tuples on the way down.
    fn pop_expected(&mut self) -> Expected {
        if self.stack.is_empty() {
            self.begin_row();
        }
        loop {
            let Some(top) = self.stack.pop() else {
                panic!("typed call but the row schema is exhausted");
            };
            if top.ty.kind != TypeKind::Tuple {
                self.current = Some(top.path.clone());
                return top;
            }
            for field in top.ty.nested.iter().rev() {
                let name = field.field_name.as_deref().unwrap_or("_");
                self.stack.push(Expected {
                    path: format!("{}.{}", top.path, name),
                    ty: field.clone(),
                });
            }
        }
    }

    /// Records a typed primitive call. `arg` carries a fixed-string length
    /// or temporal precision; `variable_length` carries an observed string
    /// length, an array length, or a null tag.
    pub(crate) fn observe(&mut self, kind: TypeKind, arg: Option<u32>, variable_length: Option<u64>) {
        let expected = self.pop_expected();

        match expected.ty.kind {
            TypeKind::Array => {
                if kind != TypeKind::Array {
                    self.mismatch(&expected, kind);
                }
                let len = variable_length.unwrap_or(0);
                let element = match expected.ty.inner() {
                    Some(element) => element.clone(),
                    None => panic!("column '{}': array type has no element", expected.path),
                };
                for i in (0..len).rev() {
                    self.stack.push(Expected {
                        path: format!("{}[{}]", expected.path, i),
                        ty: element.clone(),
                    });
                }
            }
            TypeKind::Nullable => {
                if kind != TypeKind::Nullable {
                    self.mismatch(&expected, kind);
                }
                if variable_length == Some(0) {
                    let inner = match expected.ty.inner() {
                        Some(inner) => inner.clone(),
                        None => panic!("column '{}': nullable type has no inner", expected.path),
                    };
                    self.stack.push(Expected {
                        path: expected.path.clone(),
                        ty: inner,
                    });
                }
            }
            _ => {
                if !Self::kind_matches(&expected.ty, kind, arg, variable_length) {
                    self.mismatch(&expected, kind);
                }
            }
        }
    }

    /// Raw-byte escape hatch: consumes the next expected value without
    /// comparing kinds.
    pub(crate) fn observe_raw(&mut self) {
        let _ = self.pop_expected();
    }

    fn kind_matches(
        expected: &WireType,
        kind: TypeKind,
        arg: Option<u32>,
        variable_length: Option<u64>,
    ) -> bool {
        if expected.kind == kind {
            return match kind {
                TypeKind::FixedString | TypeKind::DateTime64 | TypeKind::Time64 => {
                    arg == expected.arg
                }
                _ => true,
            };
        }
        match expected.kind {
            // Documented substitutions for manual handling.
            TypeKind::Ipv4 => kind == TypeKind::UInt32,
            TypeKind::DateTime64 | TypeKind::Time64 => kind == TypeKind::Int64,
            // A length-prefixed string call satisfies a fixed string of the
            // same observed width.
            TypeKind::FixedString => {
                kind == TypeKind::String
                    && variable_length.is_some()
                    && variable_length == expected.arg.map(u64::from)
            }
            _ => false,
        }
    }

    fn mismatch(&self, expected: &Expected, kind: TypeKind) -> ! {
        panic!(
            "column '{}' expects {}, but the caller issued a {} call",
            expected.path,
            expected.ty,
            kind.name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_wire_type;

    fn validator(schema: &[(&str, &str)]) -> ShapeValidator {
        let columns = schema
            .iter()
            .map(|(name, ty)| Column::new(*name, parse_wire_type(ty).unwrap()))
            .collect();
        ShapeValidator::new(columns)
    }

    #[test]
    fn matching_reads_pass() {
        let mut v = validator(&[("id", "UInt64"), ("name", "String")]);
        v.observe(TypeKind::UInt64, None, None);
        v.observe(TypeKind::String, None, Some(5));
        // Next row starts over.
        v.observe(TypeKind::UInt64, None, None);
        v.observe(TypeKind::String, None, Some(0));
    }

    #[test]
    #[should_panic(expected = "expects UInt64")]
    fn wrong_kind_panics() {
        let mut v = validator(&[("id", "UInt64")]);
        v.observe(TypeKind::UInt32, None, None);
    }

    #[test]
    #[should_panic(expected = "row schema is exhausted")]
    fn empty_schema_panics_on_first_call() {
        let mut v = ShapeValidator::new(Vec::new());
        v.observe(TypeKind::UInt8, None, None);
    }

    #[test]
    fn tuples_flatten_to_consecutive_calls() {
        let mut v = validator(&[("t", "Tuple(a UInt8, b Tuple(c UInt8, d String))")]);
        v.observe(TypeKind::UInt8, None, None);
        v.observe(TypeKind::UInt8, None, None);
        v.observe(TypeKind::String, None, Some(7));
    }

    #[test]
    #[should_panic(expected = "t.b.d")]
    fn tuple_mismatch_names_the_field_path() {
        let mut v = validator(&[("t", "Tuple(a UInt8, b Tuple(c UInt8, d String))")]);
        v.observe(TypeKind::UInt8, None, None);
        v.observe(TypeKind::UInt8, None, None);
        v.observe(TypeKind::UInt64, None, None);
    }

    #[test]
    fn array_length_expands_elements() {
        let mut v = validator(&[("arr", "Array(UInt16)"), ("tail", "Bool")]);
        v.observe(TypeKind::Array, None, Some(3));
        v.observe(TypeKind::UInt16, None, None);
        v.observe(TypeKind::UInt16, None, None);
        v.observe(TypeKind::UInt16, None, None);
        v.observe(TypeKind::Bool, None, None);
    }

    #[test]
    #[should_panic(expected = "arr[0]")]
    fn extra_array_element_read_panics() {
        let mut v = validator(&[("arr", "Array(UInt16)"), ("tail", "Bool")]);
        v.observe(TypeKind::Array, None, Some(1));
        v.observe(TypeKind::UInt16, None, None);
        // One element was promised; this call lands on 'tail'.
        v.observe(TypeKind::UInt16, None, None);
    }

    #[test]
    fn nullable_pushes_inner_only_when_present() {
        let mut v = validator(&[("a", "Nullable(Int8)"), ("b", "Nullable(Int8)")]);
        v.observe(TypeKind::Nullable, None, Some(1)); // null: no payload
        v.observe(TypeKind::Nullable, None, Some(0)); // present
        v.observe(TypeKind::Int8, None, None);
    }

    #[test]
    fn documented_substitutions_are_accepted() {
        let mut v = validator(&[("ip", "IPv4"), ("ts", "DateTime64(3)"), ("el", "Time64(3)")]);
        v.observe(TypeKind::UInt32, None, None);
        v.observe(TypeKind::Int64, None, None);
        v.observe(TypeKind::Int64, None, None);
    }

    #[test]
    fn string_call_matches_fixed_string_of_same_width() {
        let mut v = validator(&[("code", "FixedString(2)")]);
        v.observe(TypeKind::String, None, Some(2));
    }

    #[test]
    #[should_panic(expected = "code")]
    fn string_call_of_wrong_width_panics_on_fixed_string() {
        let mut v = validator(&[("code", "FixedString(2)")]);
        v.observe(TypeKind::String, None, Some(3));
    }

    #[test]
    #[should_panic(expected = "ts")]
    fn precision_mismatch_panics() {
        let mut v = validator(&[("ts", "DateTime64(3)")]);
        v.observe(TypeKind::DateTime64, Some(6), None);
    }

    #[test]
    fn raw_reads_consume_without_checking() {
        let mut v = validator(&[("blob", "UInt64"), ("tail", "Bool")]);
        v.observe_raw();
        v.observe(TypeKind::Bool, None, None);
    }

    #[test]
    fn current_tracks_the_popped_column() {
        let mut v = validator(&[("id", "UInt64"), ("name", "String")]);
        assert_eq!(v.current(), None);
        v.observe(TypeKind::UInt64, None, None);
        assert_eq!(v.current(), Some("id"));
        v.observe(TypeKind::String, None, Some(1));
        assert_eq!(v.current(), Some("name"));
    }
}

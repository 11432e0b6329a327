//! # Type Grammar Parser
//!
//! Single-pass recursive-descent parser from a textual type declaration
//! (e.g. `Array(Tuple(a Nullable(String), b UInt64))`) to a [`WireType`]
//! tree.
//!
//! ## Grammar
//!
//! ```text
//! type   = simple
//!        / "FixedString" "(" int ")"
//!        / "DateTime64" [ "(" int [ "," any ] ")" ]
//!        / "Time64"     [ "(" int [ "," any ] ")" ]
//!        / "Nullable" "(" type ")"
//!        / "Array" "(" type ")"
//!        / "Tuple" "(" field *( "," field ) ")"
//! field  = ws name ws type
//! simple = UInt8 | Int8 | ... | UUID | IPv4 | IPv6 | Bool
//! ```
//!
//! Whitespace is permitted inside tuple field declarations only. The parser
//! consumes the entire input; trailing characters are an error.
//!
//! ## Semantics
//!
//! - `DateTime64` / `Time64` default to precision 3 when the parenthesized
//!   form is absent; arguments after the first integer (a timezone, usually)
//!   are tolerated and ignored.
//! - Tuple fields must be named; an anonymous tuple element is a parse error.
//! - Unknown type names fail with a parse error naming the identifier.
//!
//! ## Error Handling
//!
//! All failures return `eyre::Result` with the byte position and the
//! offending text:
//!
//! ```text
//! "unknown type name 'BFloat16' at position 0"
//! "expected ')' at position 10 in 'Array(Int8'"
//! ```

use eyre::{bail, ensure, Result};

use crate::types::{TypeKind, WireType, DEFAULT_TEMPORAL_PRECISION};

/// Parses a complete type declaration. The whole input must be consumed.
pub fn parse_wire_type(input: &str) -> Result<WireType> {
    let mut parser = TypeParser::new(input);
    let ty = parser.parse_type()?;
    ensure!(
        parser.at_end(),
        "trailing characters at position {} in '{}'",
        parser.pos,
        input
    );
    Ok(ty)
}

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            _ => bail!(
                "expected '{}' at position {} in '{}'",
                byte as char,
                self.pos,
                self.input
            ),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    /// Reads the leading identifier, terminated by `(`, `)`, `,`, space, or
    /// end of input.
    fn identifier(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        ensure!(
            self.pos > start,
            "expected a type name at position {} in '{}'",
            start,
            self.input
        );
        Ok(&self.input[start..self.pos])
    }

    fn integer(&mut self) -> Result<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        ensure!(
            self.pos > start,
            "expected an integer at position {} in '{}'",
            start,
            self.input
        );
        let digits = &self.input[start..self.pos];
        match digits.parse::<u32>() {
            Ok(value) => Ok(value),
            Err(_) => bail!("integer '{}' out of range in '{}'", digits, self.input),
        }
    }

    fn parse_type(&mut self) -> Result<WireType> {
        let name = self.identifier()?;

        if let Some(kind) = TypeKind::simple(name) {
            return Ok(WireType::scalar(kind));
        }

        match name {
            "FixedString" => {
                self.expect(b'(')?;
                let len = self.integer()?;
                ensure!(len > 0, "FixedString length must be positive");
                self.expect(b')')?;
                Ok(WireType::fixed_string(len))
            }
            "DateTime64" => {
                let precision = self.optional_precision()?;
                Ok(WireType::datetime64(precision))
            }
            "Time64" => {
                let precision = self.optional_precision()?;
                Ok(WireType::time64(precision))
            }
            "Nullable" => {
                self.expect(b'(')?;
                let inner = self.parse_type()?;
                self.expect(b')')?;
                Ok(WireType::nullable(inner))
            }
            "Array" => {
                self.expect(b'(')?;
                let element = self.parse_type()?;
                self.expect(b')')?;
                Ok(WireType::array(element))
            }
            "Tuple" => self.parse_tuple(),
            _ => bail!(
                "unknown type name '{}' at position {}",
                name,
                self.pos - name.len()
            ),
        }
    }

    /// Parses the optional `(P[, junk])` suffix of `DateTime64` / `Time64`.
    /// Everything between the precision and the closing parenthesis is
    /// ignored (the server emits timezone names there).
    fn optional_precision(&mut self) -> Result<u32> {
        if self.peek() != Some(b'(') {
            return Ok(DEFAULT_TEMPORAL_PRECISION);
        }
        self.pos += 1;
        let precision = self.integer()?;
        if self.peek() == Some(b',') {
            while let Some(b) = self.peek() {
                if b == b')' {
                    break;
                }
                self.pos += 1;
            }
        }
        self.expect(b')')?;
        Ok(precision)
    }

    fn parse_tuple(&mut self) -> Result<WireType> {
        self.expect(b'(')?;
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_field()?);
            match self.bump() {
                Some(b',') => continue,
                Some(b')') => break,
                _ => bail!(
                    "expected ',' or ')' at position {} in '{}'",
                    self.pos.saturating_sub(1),
                    self.input
                ),
            }
        }
        Ok(WireType::tuple(fields))
    }

    /// `field = ws name ws type`. The name is mandatory: a lone type here is
    /// an anonymous tuple element, which the grammar rejects.
    fn parse_field(&mut self) -> Result<(String, WireType)> {
        self.skip_whitespace();
        let name = self.identifier()?;
        ensure!(
            self.peek() == Some(b' '),
            "tuple field at position {} needs a name and a type in '{}'",
            self.pos,
            self.input
        );
        self.skip_whitespace();
        let ty = self.parse_type()?;
        Ok((name.to_string(), ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> WireType {
        parse_wire_type(s).unwrap()
    }

    #[test]
    fn parses_simple_kinds() {
        assert_eq!(parse("UInt8"), WireType::scalar(TypeKind::UInt8));
        assert_eq!(parse("Float64"), WireType::scalar(TypeKind::Float64));
        assert_eq!(parse("UUID"), WireType::scalar(TypeKind::Uuid));
        assert_eq!(parse("IPv6"), WireType::scalar(TypeKind::Ipv6));
        assert_eq!(parse("Bool"), WireType::scalar(TypeKind::Bool));
    }

    #[test]
    fn parses_fixed_string() {
        assert_eq!(parse("FixedString(2)"), WireType::fixed_string(2));
        assert_eq!(parse("FixedString(255)"), WireType::fixed_string(255));
    }

    #[test]
    fn fixed_string_requires_positive_length() {
        assert!(parse_wire_type("FixedString(0)").is_err());
        assert!(parse_wire_type("FixedString()").is_err());
        assert!(parse_wire_type("FixedString").is_err());
    }

    #[test]
    fn temporal_precision_defaults_to_three() {
        assert_eq!(parse("DateTime64"), WireType::datetime64(3));
        assert_eq!(parse("Time64"), WireType::time64(3));
    }

    #[test]
    fn temporal_precision_is_explicit_when_given() {
        assert_eq!(parse("DateTime64(7)"), WireType::datetime64(7));
        assert_eq!(parse("Time64(0)"), WireType::time64(0));
    }

    #[test]
    fn temporal_trailing_arguments_are_ignored() {
        assert_eq!(parse("DateTime64(5, 'UTC')"), WireType::datetime64(5));
        assert_eq!(
            parse("DateTime64(3, 'Europe/London')"),
            WireType::datetime64(3)
        );
    }

    #[test]
    fn parses_nested_compounds() {
        let ty = parse("Array(Tuple(a Nullable(String), b UInt64))");
        assert_eq!(
            ty,
            WireType::array(WireType::tuple(vec![
                (
                    "a".to_string(),
                    WireType::nullable(WireType::scalar(TypeKind::String))
                ),
                ("b".to_string(), WireType::scalar(TypeKind::UInt64)),
            ]))
        );
    }

    #[test]
    fn rejects_unknown_and_malformed_declarations() {
        let rejected = [
            "JSON",
            "Variant",
            "Map",
            "BFloat16",
            "Array",
            "Array()",
            "Array(Int8",
            "Array(Int8, String)",
            "Nullable",
            "Nullable()",
            "Nullable(Bool",
            "Nullable(String, UInt32)",
            "Tuple",
            "Tuple()",
            "Tuple(DateTime)",
            "Tuple(field Date",
            "Tuple(field Date,)",
            "Tuple(field UInt16(String))",
        ];
        for input in rejected {
            assert!(
                parse_wire_type(input).is_err(),
                "'{input}' SHOULD fail to parse"
            );
        }
    }

    #[test]
    fn rejects_trailing_characters() {
        assert!(parse_wire_type("UInt8 ").is_err());
        assert!(parse_wire_type("UInt8)").is_err());
        assert!(parse_wire_type("Array(Int8))").is_err());
    }

    #[test]
    fn display_round_trips_through_the_parser() {
        let inputs = [
            "UInt8",
            "String",
            "FixedString(16)",
            "DateTime64(5)",
            "Time64(0)",
            "Nullable(IPv4)",
            "Array(Array(Nullable(UInt16)))",
            "Tuple(a UInt8, b Tuple(c String, d Date32))",
        ];
        for input in inputs {
            let parsed = parse(input);
            let printed = parsed.to_string();
            assert_eq!(parse(&printed), parsed, "round-trip of '{input}'");
        }
    }

    #[test]
    fn default_precision_round_trips_explicitly() {
        let parsed = parse("DateTime64");
        assert_eq!(parsed.to_string(), "DateTime64(3)");
        assert_eq!(parse("DateTime64(3)"), parsed);
    }
}

//! # Column Header Decoding
//!
//! The self-describing variant prepends a schema header to the row payload:
//! a varint column count, that many varint-length UTF-8 column names, then
//! that many varint-length type declarations.
//!
//! Reading the header arms the debug-build shape validator with the parsed
//! columns; release builds keep only the column vector for the caller.

use std::io::Read;

use eyre::{ensure, Result, WrapErr};

use crate::config::MAX_HEADER_COLUMNS;
use crate::types::{parse_wire_type, Column};
#[cfg(debug_assertions)]
use crate::validator::ShapeValidator;

use super::RowBinaryReader;

impl<R: Read> RowBinaryReader<R> {
    /// Reads the `WithNamesAndTypes` header. Call once, before any row is
    /// decoded.
    ///
    /// Every type declaration must parse; a schema containing a kind this
    /// codec does not support fails here, before any payload byte is
    /// consumed.
    pub fn read_header(&mut self) -> Result<&[Column]> {
        ensure!(self.columns.is_none(), "column header already read");

        // Speculative top-up: one read so a small header decodes without
        // further I/O.
        if self.available < self.buffer.len() {
            let read = self.stream.read(&mut self.buffer[self.available..])?;
            self.available += read;
        }

        let count = self.read_varint().wrap_err("reading column count")?;
        debug_assert!(
            (1..=MAX_HEADER_COLUMNS).contains(&count),
            "implausible column count {count}"
        );

        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            names.push(self.read_string().wrap_err("reading column name")?);
        }

        let mut columns = Vec::with_capacity(count as usize);
        for name in names {
            let declaration = self
                .read_string()
                .wrap_err_with(|| format!("reading type of column '{name}'"))?;
            let ty = parse_wire_type(&declaration)
                .wrap_err_with(|| format!("column '{name}' has type '{declaration}'"))?;
            columns.push(Column::new(name, ty));
        }

        // Header bytes are not row bytes; the first row starts here.
        self.row_start = self.position;

        #[cfg(debug_assertions)]
        {
            self.validator = Some(ShapeValidator::new(columns.clone()));
        }
        self.columns = Some(columns);
        Ok(self.columns.as_deref().unwrap_or(&[]))
    }
}

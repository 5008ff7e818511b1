//! Marker vocabulary of the `.hdb` format and a cursor that walks it.
//!
//! The file is a sequence of named regions, each opened and closed by a
//! literal marker:
//!
//! ```text
//! database := "Database: " NAME "," "Tables: [" table* "], end-tables" meta
//! table    := "Table-Name: " NAME "," "Columns: [" column* "], end-columns" meta "end_table"
//! column   := "Column-Name: " NAME "," "Type: " TYPE "," "Length: " INT "," "values [" VALUES "], end-values"
//! meta     := ("Author: " TEXT ",")? ("Version: " FLOAT)?
//! ```
//!
//! Markers are never escaped. Anything between markers that the grammar does
//! not name (indentation, newlines) is skipped.

use crate::error::{Error, Result, Stage};
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::multispace0;
use nom::sequence::{preceded, terminated};
use nom::IResult;
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Marker {
    Database,
    Comma,
    TablesOpen,
    TablesClose,
    TableName,
    ColumnsOpen,
    ColumnsClose,
    EndTable,
    ColumnName,
    Type,
    Length,
    ValuesOpen,
    ValuesClose,
    Author,
    Version,
}

impl Marker {
    pub const ALL: [Marker; 15] = [
        Marker::Database,
        Marker::Comma,
        Marker::TablesOpen,
        Marker::TablesClose,
        Marker::TableName,
        Marker::ColumnsOpen,
        Marker::ColumnsClose,
        Marker::EndTable,
        Marker::ColumnName,
        Marker::Type,
        Marker::Length,
        Marker::ValuesOpen,
        Marker::ValuesClose,
        Marker::Author,
        Marker::Version,
    ];

    /// First marker occurring in `text`. Such text cannot be stored as a name
    /// or value because markers are never escaped.
    pub fn reserved_in(text: &str) -> Option<Marker> {
        Marker::ALL
            .iter()
            .copied()
            .find(|m| text.contains(m.as_str()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Database => "Database: ",
            Marker::Comma => ",",
            Marker::TablesOpen => "Tables: [",
            Marker::TablesClose => "], end-tables",
            Marker::TableName => "Table-Name: ",
            Marker::ColumnsOpen => "Columns: [",
            Marker::ColumnsClose => "], end-columns",
            Marker::EndTable => "end_table",
            Marker::ColumnName => "Column-Name: ",
            Marker::Type => "Type: ",
            Marker::Length => "Length: ",
            Marker::ValuesOpen => "values [",
            Marker::ValuesClose => "], end-values",
            Marker::Author => "Author: ",
            Marker::Version => "Version: ",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text before the first occurrence of `marker`, consuming the marker.
fn until_marker<'a>(s: &'a str, marker: &'static str) -> IResult<&'a str, &'a str> {
    terminated(take_until(marker), tag(marker))(s)
}

/// `marker` after optional whitespace, and nothing else.
fn at_marker<'a>(s: &'a str, marker: &'static str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(marker))(s)
}

/// Left-to-right scan over marker-delimited text. Every step either consumes
/// input or fails with the marker it was looking for.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    rest: &'a str,
    stage: Stage,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str, stage: Stage) -> Self {
        Cursor { rest: input, stage }
    }

    pub fn rest(&self) -> &'a str {
        self.rest
    }

    /// Whether `marker` occurs anywhere in the unconsumed text.
    pub fn has(&self, marker: Marker) -> bool {
        self.rest.contains(marker.as_str())
    }

    pub fn skip_past(&mut self, marker: Marker) -> Result<()> {
        self.take_until(marker).map(|_| ())
    }

    /// Requires `marker` to be the next thing after whitespace.
    pub fn expect(&mut self, marker: Marker) -> Result<()> {
        match at_marker(self.rest, marker.as_str()) {
            Ok((rest, _)) => {
                self.rest = rest;
                Ok(())
            }
            Err(_) => Err(Error::missing(self.stage, marker)),
        }
    }

    /// Only whitespace is left.
    pub fn is_exhausted(&self) -> bool {
        self.rest.trim().is_empty()
    }

    /// Trimmed text up to the next `marker`; the marker itself is consumed.
    pub fn take_until(&mut self, marker: Marker) -> Result<&'a str> {
        match until_marker(self.rest, marker.as_str()) {
            Ok((rest, taken)) => {
                self.rest = rest;
                Ok(taken.trim())
            }
            Err(_) => Err(Error::missing(self.stage, marker)),
        }
    }

    /// Expects `open` next and returns a cursor over everything up to the next
    /// `close`. Both markers are consumed.
    pub fn region(&mut self, open: Marker, close: Marker, stage: Stage) -> Result<Cursor<'a>> {
        self.expect(open)?;
        match until_marker(self.rest, close.as_str()) {
            Ok((rest, inner)) => {
                self.rest = rest;
                Ok(Cursor::new(inner, stage))
            }
            Err(_) => Err(Error::missing(self.stage, close)),
        }
    }

    /// Consumes and returns all remaining text, trimmed.
    pub fn take_rest(&mut self) -> &'a str {
        let taken = self.rest;
        self.rest = "";
        taken.trim()
    }
}

use crate::error::{Error, Result};
use crate::lexer::Marker;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_VERSION: f64 = 1.0;

/// Placeholder written into sibling columns when a row is inserted.
pub const NULL: &str = "NULL";

/// Declared column type. Informational only: values are stored as opaque strings.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ColumnType {
    String,
    Int,
    Float,
    Bool,
    Date,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "str",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "str" | "string" => Ok(ColumnType::String),
            "int" => Ok(ColumnType::Int),
            "float" => Ok(ColumnType::Float),
            "bool" => Ok(ColumnType::Bool),
            "date" => Ok(ColumnType::Date),
            _ => Err(Error::InvalidArgument(format!("unknown column type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    /// Display/storage width hint; not enforced.
    pub length: usize,
    pub values: Vec<String>,
}

impl Column {
    /// A `default_value` seeds the column with exactly that one entry and
    /// takes precedence over `values`.
    pub fn new(
        name: &str,
        column_type: ColumnType,
        length: usize,
        values: Vec<String>,
        default_value: Option<String>,
    ) -> Result<Column> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("column name is empty".to_owned()));
        }
        check_storable("column name", name)?;
        let values = match default_value {
            Some(v) => vec![v],
            None => values,
        };
        for value in &values {
            check_storable("value", value)?;
        }
        Ok(Column {
            name: name.to_owned(),
            column_type,
            length,
            values,
        })
    }

    /// Inserts at `position`, or appends when the position is absent,
    /// negative or past the end.
    pub fn insert_value(&mut self, value: impl ToString, position: Option<isize>) {
        let value = value.to_string();
        match position {
            Some(p) if p >= 0 && (p as usize) <= self.values.len() => {
                self.values.insert(p as usize, value)
            }
            _ => self.values.push(value),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub author: String,
    pub version: f64,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: &str, author: Option<&str>) -> Result<Table> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("table name is empty".to_owned()));
        }
        check_storable("table name", name)?;
        if let Some(author) = author {
            check_storable("author", author)?;
        }
        Ok(Table {
            name: name.to_owned(),
            author: author_or_default(author),
            version: DEFAULT_VERSION,
            columns: vec![],
        })
    }

    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    /// Appends a column, padding with `NULL` at the end of whichever side is
    /// shorter so the table stays row-aligned.
    pub fn add_column(&mut self, mut column: Column) -> Result<()> {
        if self.column(&column.name).is_some() {
            return Err(Error::InvalidArgument(format!(
                "duplicate column `{}` in table `{}`",
                column.name, self.name
            )));
        }
        let rows = self.row_count().max(column.len());
        for existing in self.columns.iter_mut().chain(std::iter::once(&mut column)) {
            existing.values.resize(rows, NULL.to_owned());
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Prepends `value` to `column_name` and `NULL` to every other column.
    /// Blank values are stored as `NULL` and others are trimmed, matching what
    /// the file keeps. Nothing is touched when the column does not exist or the
    /// value holds a comma or marker.
    pub fn insert_row(&mut self, column_name: &str, value: &str) -> Result<()> {
        let value = match value.trim() {
            "" => NULL,
            v => v,
        };
        check_storable("value", value)?;
        let target = self
            .columns
            .iter()
            .position(|c| c.name == column_name)
            .ok_or_else(|| Error::ColumnNotFound(column_name.to_owned()))?;

        for (i, column) in self.columns.iter_mut().enumerate() {
            let cell = if i == target { value } else { NULL };
            column.insert_value(cell, Some(0));
        }
        Ok(())
    }

    /// First column whose length differs from the first column's, if any.
    pub(crate) fn misaligned(&self) -> Option<(&Column, usize)> {
        let expected = self.columns.first()?.len();
        self.columns
            .iter()
            .find(|c| c.len() != expected)
            .map(|c| (c, expected))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub name: String,
    pub author: String,
    pub version: f64,
    pub tables: Vec<Table>,
}

impl Database {
    pub fn new(name: &str, author: Option<&str>) -> Result<Database> {
        check_database_name(name)?;
        if let Some(author) = author {
            check_storable("author", author)?;
        }
        Ok(Database {
            name: name.to_owned(),
            author: author_or_default(author),
            version: DEFAULT_VERSION,
            tables: vec![],
        })
    }

    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.table(&table.name).is_some() {
            return Err(Error::InvalidArgument(format!(
                "duplicate table `{}` in database `{}`",
                table.name, self.name
            )));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::TableNotFound(name.to_owned()))
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Row Mutator entry point for a table addressed by name.
    pub fn insert_row(&mut self, table_name: &str, column_name: &str, value: &str) -> Result<()> {
        self.table_mut(table_name)?.insert_row(column_name, value)
    }
}

/// Names and values are written unescaped, so they may not contain a comma
/// or any other marker.
fn check_storable(what: &str, text: &str) -> Result<()> {
    match Marker::reserved_in(text) {
        Some(marker) => Err(Error::InvalidArgument(format!(
            "{} `{}` contains reserved text `{}`",
            what,
            text,
            marker.as_str().trim()
        ))),
        None => Ok(()),
    }
}

/// A database name doubles as a file name inside the store directory.
pub fn check_database_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument("database name is empty".to_owned()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(Error::InvalidArgument(format!(
            "database name `{}` may not contain path separators or `..`",
            name
        )));
    }
    check_storable("database name", name)
}

fn author_or_default(author: Option<&str>) -> String {
    match author {
        Some(a) if !a.trim().is_empty() => a.trim().to_owned(),
        _ => DEFAULT_AUTHOR.to_owned(),
    }
}

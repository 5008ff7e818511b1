use crate::database::{Column, Database, Table};
use crate::lexer::Marker;
use std::fmt;

const INDENT: &str = "    ";

// Each block is both the human-readable view of a unit and its on-disk form.

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_column(f, self, 0)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_table(f, self, 0)
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}{}{}", Marker::Database, self.name, Marker::Comma)?;
        writeln!(f, "{}{}", INDENT, Marker::TablesOpen)?;
        for table in &self.tables {
            write_table(f, table, 2)?;
        }
        writeln!(f, "{}{}", INDENT, Marker::TablesClose)?;
        write_meta(f, &self.author, self.version, 0)
    }
}

pub fn encode(db: &Database) -> String {
    db.to_string()
}

fn write_column(f: &mut fmt::Formatter<'_>, column: &Column, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    writeln!(
        f,
        "{pad}{}{}{comma} {}{}{comma} {}{}{comma} {}",
        Marker::ColumnName,
        column.name,
        Marker::Type,
        column.column_type,
        Marker::Length,
        column.length,
        Marker::ValuesOpen,
        pad = pad,
        comma = Marker::Comma,
    )?;
    writeln!(f, "{}{}{}", pad, INDENT, column.values.join(", "))?;
    writeln!(f, "{}{}", pad, Marker::ValuesClose)
}

fn write_table(f: &mut fmt::Formatter<'_>, table: &Table, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    writeln!(f, "{}{}{}{}", pad, Marker::TableName, table.name, Marker::Comma)?;
    writeln!(f, "{}{}", pad, Marker::ColumnsOpen)?;
    for column in &table.columns {
        write_column(f, column, depth + 1)?;
    }
    writeln!(f, "{}{}", pad, Marker::ColumnsClose)?;
    write_meta(f, &table.author, table.version, depth)?;
    writeln!(f, "{}{}", pad, Marker::EndTable)
}

fn write_meta(f: &mut fmt::Formatter<'_>, author: &str, version: f64, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    writeln!(f, "{}{}{}{}", pad, Marker::Author, author, Marker::Comma)?;
    // Debug keeps the fractional part: 1.0 rather than 1.
    writeln!(f, "{}{}{:?}", pad, Marker::Version, version)
}

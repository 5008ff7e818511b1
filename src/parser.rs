use crate::database::{Column, ColumnType, Database, Table};
use crate::error::{Error, Result, Stage};
use crate::lexer::{Cursor, Marker};

/// Outcome of decoding a whole file.
#[derive(Debug)]
pub enum Decoded {
    Complete(Database),
    /// Tables before the failing one were recovered; `error` says why the
    /// scan stopped.
    Partial { database: Database, error: Error },
}

impl Decoded {
    pub fn database(&self) -> &Database {
        match self {
            Decoded::Complete(db) => db,
            Decoded::Partial { database, .. } => database,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Decoded::Complete(_))
    }

    /// Rejects partial results.
    pub fn into_complete(self) -> Result<Database> {
        match self {
            Decoded::Complete(db) => Ok(db),
            Decoded::Partial { error, .. } => Err(error),
        }
    }
}

/// Decodes a database. Fails outright when the database header or the
/// tables region cannot be found; a table that fails to decode ends the scan
/// with [`Decoded::Partial`].
pub fn decode(s: &str) -> Result<Decoded> {
    let mut cursor = Cursor::new(s, Stage::Database);
    cursor.expect(Marker::Database)?;
    let name = cursor.take_until(Marker::Comma)?;
    let mut tables = cursor.region(Marker::TablesOpen, Marker::TablesClose, Stage::Table)?;
    let (author, version) = parse_meta(cursor, Stage::Database)?;

    let mut db = Database::new(name, author)?;
    if let Some(version) = version {
        db.version = version;
    }

    while !tables.is_exhausted() {
        let table = match parse_table(&mut tables) {
            Ok(table) => table,
            Err(error) => return Ok(Decoded::Partial { database: db, error }),
        };
        if let Some((column, expected)) = table.misaligned() {
            let error = Error::Misaligned {
                table: table.name.clone(),
                column: column.name.clone(),
                expected,
                found: column.len(),
            };
            return Ok(Decoded::Partial { database: db, error });
        }
        if let Err(error) = db.add_table(table) {
            return Ok(Decoded::Partial { database: db, error });
        }
    }

    Ok(Decoded::Complete(db))
}

/// Fails with `missing(stage, close)` when `region` holds a marker that can
/// only appear after its close, i.e. the close was dropped and the region ran
/// into the next unit.
fn check_closed(region: &Cursor, overrun: &[Marker], stage: Stage, close: Marker) -> Result<()> {
    if overrun.iter().any(|m| region.has(*m)) {
        return Err(Error::missing(stage, close));
    }
    Ok(())
}

fn parse_table(cursor: &mut Cursor) -> Result<Table> {
    cursor.expect(Marker::TableName)?;
    let name = cursor.take_until(Marker::Comma)?;
    let mut columns = cursor.region(Marker::ColumnsOpen, Marker::ColumnsClose, Stage::Column)?;
    check_closed(
        &columns,
        &[Marker::TableName, Marker::ColumnsOpen, Marker::EndTable, Marker::Author, Marker::Version],
        Stage::Table,
        Marker::ColumnsClose,
    )?;

    // Metadata runs up to `end_table`; without one this is the last table.
    let trailer = if cursor.has(Marker::EndTable) {
        cursor.take_until(Marker::EndTable)?
    } else {
        cursor.take_rest()
    };
    if trailer.contains(Marker::TableName.as_str()) {
        return Err(Error::missing(Stage::Table, Marker::EndTable));
    }
    let (author, version) = parse_meta(Cursor::new(trailer, Stage::Table), Stage::Table)?;

    let mut table = Table::new(name, author)?;
    if let Some(version) = version {
        table.version = version;
    }
    while !columns.is_exhausted() {
        table.columns.push(parse_column(&mut columns)?);
    }
    // add_column would pad; decoded tables are checked for alignment instead.
    if let Some(dup) = duplicate_column(&table) {
        return Err(Error::InvalidArgument(format!(
            "duplicate column `{}` in table `{}`",
            dup, table.name
        )));
    }
    Ok(table)
}

fn parse_column(cursor: &mut Cursor) -> Result<Column> {
    cursor.expect(Marker::ColumnName)?;
    let name = cursor.take_until(Marker::Comma)?;
    cursor.expect(Marker::Type)?;
    let column_type = cursor.take_until(Marker::Comma)?;
    let column_type = column_type
        .parse::<ColumnType>()
        .map_err(|_| Error::bad_field(Stage::Column, Marker::Type, column_type))?;
    cursor.expect(Marker::Length)?;
    let length = cursor.take_until(Marker::Comma)?;
    let length = length
        .parse::<usize>()
        .map_err(|_| Error::bad_field(Stage::Column, Marker::Length, length))?;
    let values = cursor.region(Marker::ValuesOpen, Marker::ValuesClose, Stage::Column)?;
    check_closed(
        &values,
        &[Marker::ColumnName, Marker::Type, Marker::Length, Marker::ValuesOpen],
        Stage::Column,
        Marker::ValuesClose,
    )?;

    let values = values
        .rest()
        .split(Marker::Comma.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect();
    Column::new(name, column_type, length, values, None)
}

/// Optional `Author: x,` and `Version: n` trailing a table or the database.
fn parse_meta(mut cursor: Cursor, stage: Stage) -> Result<(Option<&str>, Option<f64>)> {
    let mut author = None;
    let mut version = None;
    if cursor.has(Marker::Author) {
        cursor.skip_past(Marker::Author)?;
        author = Some(cursor.take_until(Marker::Comma)?);
    }
    if cursor.has(Marker::Version) {
        cursor.skip_past(Marker::Version)?;
        let text = cursor.take_rest();
        let parsed = text
            .parse::<f64>()
            .map_err(|_| Error::bad_field(stage, Marker::Version, text))?;
        version = Some(parsed);
    }
    Ok((author, version))
}

fn duplicate_column(table: &Table) -> Option<&str> {
    table
        .columns
        .iter()
        .enumerate()
        .find(|(i, c)| table.columns[..*i].iter().any(|prev| prev.name == c.name))
        .map(|(_, c)| c.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    fn sample() -> Database {
        let mut db = Database::new("shop", Some("Hugo")).unwrap();
        db.version = 2.5;

        let mut stock = Table::new("stock", Some("Ann")).unwrap();
        stock.version = 1.1;
        stock
            .add_column(Column::new("qty", ColumnType::Int, 10, strings(&["5", "1", "2"]), None).unwrap())
            .unwrap();
        stock
            .add_column(
                Column::new("name", ColumnType::String, 20, strings(&["NULL", "a b", "c"]), None)
                    .unwrap(),
            )
            .unwrap();
        db.add_table(stock).unwrap();

        let mut staff = Table::new("staff", None).unwrap();
        staff
            .add_column(Column::new("hired", ColumnType::Date, 10, vec![], None).unwrap())
            .unwrap();
        staff
            .add_column(Column::new("active", ColumnType::Bool, 5, vec![], None).unwrap())
            .unwrap();
        db.add_table(staff).unwrap();
        db
    }

    #[test]
    fn test_round_trip() {
        let db = sample();
        let decoded = decode(&encode(&db)).unwrap();
        assert!(decoded.is_complete());
        assert_eq!(decoded.into_complete().unwrap(), db);
    }

    #[test]
    fn test_table_order_is_file_order() {
        let decoded = decode(&encode(&sample())).unwrap();
        assert_eq!(decoded.database().table_names(), vec!["stock", "staff"]);
    }

    #[test]
    fn test_missing_end_tables() {
        let text = encode(&sample()).replace("], end-tables", "");
        let err = decode(&text).unwrap_err();
        assert_eq!(err.marker(), Some(Marker::TablesClose));
        assert!(err.to_string().contains("], end-tables"));
    }

    #[test]
    fn test_missing_database_header() {
        let err = decode("Tables: [ ], end-tables").unwrap_err();
        assert_eq!(err.marker(), Some(Marker::Database));
    }

    #[test]
    fn test_empty_database() {
        let decoded = decode("Database: empty,\n    Tables: [\n    ], end-tables\n").unwrap();
        let db = decoded.into_complete().unwrap();
        assert_eq!(db.name, "empty");
        assert!(db.tables.is_empty());
        assert_eq!(db.author, "Anonymous");
        assert_eq!(db.version, 1.0);
    }

    #[test]
    fn test_partial_on_broken_second_table() {
        let text = encode(&sample());
        let second = text.rfind("], end-columns").unwrap();
        let mut broken = text.clone();
        broken.replace_range(second..second + "], end-columns".len(), "");

        match decode(&broken).unwrap() {
            Decoded::Partial { database, error } => {
                assert_eq!(database.table_names(), vec!["stock"]);
                assert_eq!(error.marker(), Some(Marker::ColumnsClose));
            }
            Decoded::Complete(_) => panic!("expected partial decode"),
        }
    }

    #[test]
    fn test_bad_length() {
        let text = encode(&sample()).replace("Length: 10", "Length: ten");
        match decode(&text).unwrap() {
            Decoded::Partial { database, error } => {
                assert!(database.tables.is_empty());
                assert!(matches!(
                    error,
                    Error::MalformedFile { marker: Marker::Length, found: Some(ref f), .. } if f == "ten"
                ));
            }
            Decoded::Complete(_) => panic!("expected partial decode"),
        }
    }

    #[test]
    fn test_misaligned_columns_are_reported() {
        let text = "Database: d,\n Tables: [\n Table-Name: t,\n Columns: [\n\
                    Column-Name: a, Type: int, Length: 3, values [ 1, 2 ], end-values\n\
                    Column-Name: b, Type: int, Length: 3, values [ 1 ], end-values\n\
                    ], end-columns\n end_table\n ], end-tables\n";
        match decode(text).unwrap() {
            Decoded::Partial { database, error } => {
                assert!(database.tables.is_empty());
                assert!(matches!(error, Error::Misaligned { ref column, found: 1, expected: 2, .. } if column == "b"));
            }
            Decoded::Complete(_) => panic!("expected partial decode"),
        }
    }

    #[test]
    fn test_metadata_is_optional() {
        let text = "Database: d,\n Tables: [\n Table-Name: t,\n Columns: [\n\
                    Column-Name: a, Type: STRING, Length: 3, values [ x ], end-values\n\
                    ], end-columns\n ], end-tables\n";
        let db = decode(text).unwrap().into_complete().unwrap();
        let table = db.table("t").unwrap();
        assert_eq!(table.author, "Anonymous");
        assert_eq!(table.column("a").unwrap().column_type, ColumnType::String);
        assert_eq!(table.column("a").unwrap().values, strings(&["x"]));
    }

    #[test]
    fn test_empty_value_tokens_are_dropped() {
        let text = "Database: d,\n Tables: [\n Table-Name: t,\n Columns: [\n\
                    Column-Name: a, Type: int, Length: 3, values [ 1, , 2, ], end-values\n\
                    ], end-columns\n end_table\n ], end-tables\n";
        let db = decode(text).unwrap().into_complete().unwrap();
        assert_eq!(db.tables[0].columns[0].values, strings(&["1", "2"]));
    }

    #[test]
    fn test_bad_database_version() {
        let text = encode(&sample()).replace("Version: 2.5", "Version: two");
        let err = decode(&text).unwrap_err();
        assert!(matches!(err, Error::MalformedFile { stage: Stage::Database, marker: Marker::Version, .. }));
    }

    fn drop_first(text: &str, marker: Marker) -> String {
        let at = text.find(marker.as_str()).unwrap();
        format!("{}{}", &text[..at], &text[at + marker.as_str().len()..])
    }

    #[test]
    fn test_first_table_missing_end_columns() {
        let text = drop_first(&encode(&sample()), Marker::ColumnsClose);
        match decode(&text).unwrap() {
            Decoded::Partial { database, error } => {
                assert!(database.tables.is_empty());
                assert!(matches!(
                    error,
                    Error::MalformedFile { stage: Stage::Table, marker: Marker::ColumnsClose, .. }
                ));
            }
            Decoded::Complete(db) => panic!("expected partial decode, got {:?}", db),
        }
    }

    #[test]
    fn test_first_column_missing_end_values() {
        let text = drop_first(&encode(&sample()), Marker::ValuesClose);
        match decode(&text).unwrap() {
            Decoded::Partial { database, error } => {
                assert!(database.tables.is_empty());
                assert!(matches!(
                    error,
                    Error::MalformedFile { stage: Stage::Column, marker: Marker::ValuesClose, .. }
                ));
            }
            Decoded::Complete(db) => panic!("expected partial decode, got {:?}", db),
        }
    }

    #[test]
    fn test_text_between_columns_is_rejected() {
        let text = "Database: d,\n Tables: [\n Table-Name: t,\n Columns: [\n\
                    Column-Name: a, Type: int, Length: 3, values [ 1 ], end-values\n\
                    stray Column-Name: b, Type: int, Length: 3, values [ 2 ], end-values\n\
                    ], end-columns\n end_table\n ], end-tables\n";
        match decode(text).unwrap() {
            Decoded::Partial { error, .. } => assert_eq!(error.marker(), Some(Marker::ColumnName)),
            Decoded::Complete(db) => panic!("expected partial decode, got {:?}", db),
        }
    }
}

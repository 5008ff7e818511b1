//! Interactive prompts that collect database, table and column definitions.
//!
//! Typing `exit` at a table or column name prompt ends that loop. End of
//! input is treated the same way.

use crate::database::{Column, ColumnType, Database, Table, NULL};
use crate::error::{Error, Result};
use crate::style::Palette;
use std::io::{BufRead, Write};

const EXIT: &str = "exit";
const DEFAULT_LENGTH: usize = 100;

pub struct Wizard<R, W> {
    input: R,
    output: W,
    palette: Palette,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(input: R, output: W, palette: Palette) -> Self {
        Wizard {
            input,
            output,
            palette,
        }
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line).map_err(Error::Prompt)
    }

    /// `None` on end of input.
    fn ask(&mut self, field: &str, subject: &str) -> Result<Option<String>> {
        let article = if subject == "database" { "the" } else { "a" };
        write!(
            self.output,
            "Enter the {} of {} {}: ",
            self.palette.ok(field),
            article,
            self.palette.subject(subject)
        )
        .and_then(|_| self.output.flush())
        .map_err(Error::Prompt)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(Error::Prompt)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    /// Like `ask`, but `exit` also yields `None`.
    fn ask_name(&mut self, subject: &str) -> Result<Option<String>> {
        Ok(self
            .ask("name", subject)?
            .filter(|name| !name.eq_ignore_ascii_case(EXIT)))
    }

    pub fn database(&mut self) -> Result<Database> {
        let banner = self.palette.ok("Welcome to the database maker!");
        self.say(&banner)?;
        let hint = self
            .palette
            .info("Type 'exit' at a table or column name prompt to finish it.");
        self.say(&hint)?;

        let name = self.ask("name", "database")?.unwrap_or_default();
        let author = self.ask("author", "database")?;
        let mut db = Database::new(&name, author.as_deref())?;
        self.add_tables(&mut db)?;
        Ok(db)
    }

    /// Prompts for tables until `exit` and appends them to `db`. Returns how
    /// many were added.
    pub fn add_tables(&mut self, db: &mut Database) -> Result<usize> {
        let mut added = 0;
        while let Some(name) = self.ask_name("table")? {
            if db.table(&name).is_some() {
                let msg = self.palette.fail(&format!("Table `{}` already exists!", name));
                self.say(&msg)?;
                continue;
            }
            let author = self.ask("author", "table")?;
            let mut table = match Table::new(&name, author.as_deref()) {
                Ok(table) => table,
                Err(e) => {
                    let msg = self.palette.fail(&e.to_string());
                    self.say(&msg)?;
                    continue;
                }
            };
            self.add_columns(&mut table)?;
            db.add_table(table)?;
            added += 1;
        }
        Ok(added)
    }

    fn add_columns(&mut self, table: &mut Table) -> Result<()> {
        while let Some(name) = self.ask_name("column")? {
            let column_type = match self.column_type()? {
                Some(t) => t,
                None => break,
            };
            let length = match self.length()? {
                Some(l) => l,
                None => break,
            };
            let default_value = self
                .ask("default value", "column")?
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| NULL.to_owned());

            let added = Column::new(&name, column_type, length, vec![], Some(default_value))
                .and_then(|column| table.add_column(column));
            if let Err(e) = added {
                let msg = self.palette.fail(&e.to_string());
                self.say(&msg)?;
            }
        }
        Ok(())
    }

    fn column_type(&mut self) -> Result<Option<ColumnType>> {
        loop {
            let token = match self.ask("type", "column")? {
                Some(token) => token,
                None => return Ok(None),
            };
            match token.parse::<ColumnType>() {
                Ok(t) => return Ok(Some(t)),
                Err(_) => {
                    let msg = self.palette.fail("Invalid type! Use str, int, float, bool or date.");
                    self.say(&msg)?;
                }
            }
        }
    }

    /// Empty input takes the default length.
    fn length(&mut self) -> Result<Option<usize>> {
        loop {
            let text = match self.ask("length", "column")? {
                Some(text) => text,
                None => return Ok(None),
            };
            if text.is_empty() {
                return Ok(Some(DEFAULT_LENGTH));
            }
            match text.parse::<usize>() {
                Ok(length) => return Ok(Some(length)),
                Err(_) => {
                    let msg = self.palette.fail("Invalid length! Enter a whole number.");
                    self.say(&msg)?;
                }
            }
        }
    }
}

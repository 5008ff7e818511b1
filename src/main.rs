use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use hdb::store::{hide_file, Store};
use hdb::style::Palette;
use hdb::wizard::Wizard;
use hdb::{render_table, Database, Decoded, Error};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hdb",
    version,
    about = "Human-readable databases stored as plain .hdb text files",
    after_help = r#"EXAMPLES
  $ hdb create-database
  $ hdb create-table shop
  $ hdb insert shop stock qty 5
  $ hdb show shop stock
  $ hdb list

NOTES
  - Type 'exit' at a table or column name prompt to finish it
  - Log verbosity follows RUST_LOG (default: warn)"#
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "HDB_DIR",
        default_value = ".",
        help = "Directory holding the .hdb files",
        value_hint = ValueHint::DirPath
    )]
    dir: PathBuf,
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto, help = "Colorize output")]
    color: ColorMode,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn palette(self) -> Palette {
        Palette::new(match self {
            ColorMode::Auto => io::stdout().is_terminal(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        })
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Create a new database interactively")]
    CreateDatabase,
    #[command(about = "Add tables to an existing database interactively")]
    CreateTable {
        #[arg(help = "Database name")]
        database: String,
    },
    #[command(about = "Show a database's metadata and tables")]
    Select {
        #[arg(help = "Database name")]
        database: String,
    },
    #[command(about = "Print a table as a grid")]
    Show {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
    },
    #[command(about = "Insert a value as a new first row; other columns get NULL")]
    Insert {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
        #[arg(help = "Column name")]
        column: String,
        #[arg(help = "Value to insert")]
        value: String,
    },
    #[command(about = "Delete a database file")]
    Delete {
        #[arg(help = "Database name")]
        database: String,
    },
    #[command(about = "List database files in the directory")]
    List,
    #[command(about = "List tables of a database in file order")]
    Tables {
        #[arg(help = "Database name")]
        database: String,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let palette = cli.color.palette();
    let store = Store::new(&cli.dir);
    debug!(dir = %store.dir().display(), "using database directory");

    if let Err(err) = run(cli.command, &store, palette) {
        eprintln!("{}", palette.fail(&format!("error: {}", err)));
        std::process::exit(1);
    }
}

/// Loads for reading. A partial decode still yields the recovered tables;
/// the error is handed back so the command can report it after printing.
fn read(store: &Store, name: &str) -> Result<(Database, Option<Error>), Error> {
    Ok(match store.load(name)? {
        Decoded::Complete(db) => (db, None),
        Decoded::Partial { database, error } => (database, Some(error)),
    })
}

fn finish(partial: Option<Error>) -> Result<(), Error> {
    match partial {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn run(command: Command, store: &Store, palette: Palette) -> Result<(), Error> {
    match command {
        Command::CreateDatabase => {
            let stdin = io::stdin();
            let db = Wizard::new(stdin.lock(), io::stdout(), palette).database()?;
            let path = store.create(&db)?;
            if let Err(err) = hide_file(&path) {
                warn!(path = %path.display(), %err, "could not hide database file");
            }
            println!("{}", palette.ok(&format!("Created {}", path.display())));
            println!("{}", db);
            Ok(())
        }
        Command::CreateTable { database } => {
            let stdin = io::stdin();
            let mut wizard = Wizard::new(stdin.lock(), io::stdout(), palette);
            let mut added = 0;
            store.update(&database, |db| {
                added = wizard.add_tables(db)?;
                Ok(())
            })?;
            println!("{}", palette.ok(&format!("Added {} table(s) to {}", added, database)));
            Ok(())
        }
        Command::Select { database } => {
            let (db, partial) = read(store, &database)?;
            println!("{} {}", palette.header("Database:"), db.name);
            println!("{} {}", palette.header("Author:"), db.author);
            println!("{} {:?}", palette.header("Version:"), db.version);
            println!("{}", palette.header("Tables:"));
            for table in &db.tables {
                println!(
                    "  {} ({} columns, {} rows)",
                    palette.subject(&table.name),
                    table.columns.len(),
                    table.row_count()
                );
            }
            finish(partial)
        }
        Command::Show { database, table } => {
            let (db, partial) = read(store, &database)?;
            match db.table(&table) {
                Some(t) => print!("{}", render_table(t)),
                None => return Err(partial.unwrap_or(Error::TableNotFound(table))),
            }
            finish(partial)
        }
        Command::Insert {
            database,
            table,
            column,
            value,
        } => {
            store.update(&database, |db| db.insert_row(&table, &column, &value))?;
            println!(
                "{}",
                palette.ok(&format!("Inserted `{}` into {}.{}", value, table, column))
            );
            Ok(())
        }
        Command::Delete { database } => {
            let path = store.delete(&database)?;
            println!("{}", palette.ok(&format!("Deleted {}", path.display())));
            Ok(())
        }
        Command::List => {
            for name in store.list()? {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Tables { database } => {
            let (db, partial) = read(store, &database)?;
            for name in db.table_names() {
                println!("{}", name);
            }
            finish(partial)
        }
    }
}

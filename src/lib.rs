//! A human-readable tabular store: one marker-delimited text file per
//! database, holding named tables of string-valued columns.

pub mod database;
pub mod encoder;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod store;
pub mod style;
pub mod wizard;

pub use database::{Column, ColumnType, Database, Table};
pub use encoder::encode;
pub use error::{Error, Result, Stage};
pub use parser::{decode, Decoded};
pub use render::render_table;
pub use store::Store;

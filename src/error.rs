use crate::lexer::Marker;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Structural unit the decoder was working on when it failed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Stage {
    Database,
    Table,
    Column,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Database => write!(f, "database"),
            Stage::Table => write!(f, "table"),
            Stage::Column => write!(f, "column"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `found` is set when the marker was present but the text after it could not be read.
    #[error("malformed file: {}", describe_malformed(.stage, .marker, .found))]
    MalformedFile {
        stage: Stage,
        marker: Marker,
        found: Option<String>,
    },

    #[error("malformed file: column `{column}` of table `{table}` has {found} values, expected {expected}")]
    Misaligned {
        table: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("database file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("database file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("prompt failed: {0}")]
    Prompt(#[source] io::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn missing(stage: Stage, marker: Marker) -> Self {
        Error::MalformedFile {
            stage,
            marker,
            found: None,
        }
    }

    pub(crate) fn bad_field(stage: Stage, marker: Marker, found: &str) -> Self {
        Error::MalformedFile {
            stage,
            marker,
            found: Some(found.to_owned()),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Marker the decoder expected, if this is a decode failure.
    pub fn marker(&self) -> Option<Marker> {
        match self {
            Error::MalformedFile { marker, .. } => Some(*marker),
            _ => None,
        }
    }
}

fn describe_malformed(stage: &Stage, marker: &Marker, found: &Option<String>) -> String {
    match found {
        None => format!("expected `{}` while reading {}", marker.as_str().trim(), stage),
        Some(text) => format!(
            "unreadable value `{}` after `{}` while reading {}",
            text,
            marker.as_str().trim(),
            stage
        ),
    }
}

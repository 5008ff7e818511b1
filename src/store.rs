//! One `.hdb` file per database inside a directory.
//!
//! Writes go to a temporary file in the same directory and are renamed over
//! the target, so a reader never sees a half-written database. Read-modify-write
//! sequences hold an exclusive lock on a sidecar `.<file>.lock` for their whole
//! duration.

use crate::database::{check_database_name, Database};
use crate::encoder::encode;
use crate::error::{Error, Result};
use crate::parser::{decode, Decoded};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const EXTENSION: &str = "hdb";

/// `my shop` -> `my_shop.hdb`
pub fn file_name(db_name: &str) -> String {
    format!("{}.{}", db_name.replace(' ', "_"), EXTENSION)
}

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

struct FileLock {
    file: File,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Store {
        Store { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a database file. Names that would leave the directory are
    /// rejected.
    pub fn path_for(&self, db_name: &str) -> Result<PathBuf> {
        check_database_name(db_name)?;
        Ok(self.dir.join(file_name(db_name)))
    }

    fn lock_path(&self, db_name: &str) -> Result<PathBuf> {
        check_database_name(db_name)?;
        Ok(self.dir.join(format!(".{}.lock", file_name(db_name))))
    }

    fn lock(&self, db_name: &str) -> Result<FileLock> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let path = self.lock_path(db_name)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        file.lock_exclusive().map_err(|e| Error::io(&path, e))?;
        debug!(path = %path.display(), "lock acquired");
        Ok(FileLock { file })
    }

    /// Reads and decodes a database by name. A partial decode is returned as
    /// such; callers that rewrite the file should insist on
    /// [`Decoded::into_complete`].
    pub fn load(&self, db_name: &str) -> Result<Decoded> {
        load_path(&self.path_for(db_name)?)
    }

    /// Writes `db` under its own name, replacing any existing file.
    pub fn save(&self, db: &Database) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let path = self.path_for(&db.name)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        tmp.write_all(encode(db).as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| Error::io(&path, e.error))?;

        debug!(path = %path.display(), tables = db.tables.len(), "database saved");
        Ok(path)
    }

    /// Saves a new database; refuses to overwrite an existing file.
    pub fn create(&self, db: &Database) -> Result<PathBuf> {
        let _lock = self.lock(&db.name)?;
        let path = self.path_for(&db.name)?;
        if path.exists() {
            return Err(Error::AlreadyExists(path));
        }
        let path = self.save(db)?;
        info!(path = %path.display(), "database created");
        Ok(path)
    }

    /// Loads, mutates and saves a database while holding its lock. The file
    /// is left untouched if decoding is partial or `f` fails.
    pub fn update<F>(&self, db_name: &str, f: F) -> Result<Database>
    where
        F: FnOnce(&mut Database) -> Result<()>,
    {
        let _lock = self.lock(db_name)?;
        let mut db = self.load(db_name)?.into_complete()?;
        f(&mut db)?;
        self.save(&db)?;
        Ok(db)
    }

    /// Removes the database file. The lock file stays so that every process
    /// keeps locking the same inode.
    pub fn delete(&self, db_name: &str) -> Result<PathBuf> {
        let path = self.path_for(db_name)?;
        let _lock = self.lock(db_name)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.clone()),
            _ => Error::io(&path, e),
        })?;
        info!(path = %path.display(), "database deleted");
        Ok(path)
    }

    /// File names of all databases in the directory, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(Error::io(&self.dir, e)),
        };
        let mut names = vec![];
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.dir, e))?.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == EXTENSION) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

pub fn load_path(path: &Path) -> Result<Decoded> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(path.to_owned()),
        _ => Error::io(path, e),
    })?;
    let decoded = decode(&text)?;
    match &decoded {
        Decoded::Complete(db) => {
            debug!(path = %path.display(), tables = db.tables.len(), "database loaded")
        }
        Decoded::Partial { database, error } => warn!(
            path = %path.display(),
            tables = database.tables.len(),
            %error,
            "database only partially decoded"
        ),
    }
    Ok(decoded)
}

/// Marks a database file hidden where the platform has such an attribute.
/// Callers treat failure as non-fatal.
pub fn hide_file(path: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        let status = std::process::Command::new("attrib")
            .arg("+h")
            .arg(path)
            .status()?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("attrib exited with {}", status),
            ));
        }
    }
    #[cfg(not(windows))]
    debug!(path = %path.display(), "no hidden attribute on this platform");
    Ok(())
}

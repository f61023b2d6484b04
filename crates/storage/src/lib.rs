//! Sqlite-backed catalog.

use std::io;
use std::path::Path;

use anyhow::Context as _;
use doty_core::{Book, CatalogError, CatalogStore};
use rusqlite::{Connection, ErrorCode, OptionalExtension as _};
use tracing::debug;

#[derive(Debug)]
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("open sqlite db at {}", path.as_ref().display()))?;
        let catalog = Self { conn };
        catalog.migrate().context("bootstrap catalog schema")?;
        Ok(catalog)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        let catalog = Self { conn };
        catalog.migrate().context("bootstrap catalog schema")?;
        Ok(catalog)
    }

    /// Deletes the catalog file. No backup is taken.
    pub fn reset(path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed catalog file");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
        }
    }

    fn migrate(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                path TEXT PRIMARY KEY NOT NULL,
                current_page INTEGER NOT NULL DEFAULT 1 CHECK (current_page >= 1)
            );
            "#,
        )
    }
}

impl CatalogStore for Catalog {
    fn add(&self, path: &str) -> Result<(), CatalogError> {
        match self
            .conn
            .execute("INSERT INTO books (path) VALUES (?)", [path])
        {
            Ok(_) => {
                debug!(path, "registered book");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(CatalogError::Duplicate {
                    path: path.to_string(),
                })
            }
            Err(err) => Err(CatalogError::backend(err)),
        }
    }

    fn remove(&self, path: &str) -> Result<(), CatalogError> {
        let removed = self
            .conn
            .execute("DELETE FROM books WHERE path = ?", [path])
            .map_err(CatalogError::backend)?;
        if removed == 0 {
            return Err(CatalogError::NotFound {
                path: path.to_string(),
            });
        }
        debug!(path, "removed book");
        Ok(())
    }

    fn list_paths(&self) -> Result<Vec<String>, CatalogError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM books ORDER BY rowid")
            .map_err(CatalogError::backend)?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(CatalogError::backend)?;
        rows.collect::<Result<Vec<String>, _>>()
            .map_err(CatalogError::backend)
    }

    fn list_books(&self) -> Result<Vec<Book>, CatalogError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, current_page FROM books ORDER BY rowid")
            .map_err(CatalogError::backend)?;
        let rows = stmt
            .query_map([], |row| {
                let current_page: i64 = row.get(1)?;
                Ok(Book {
                    path: row.get(0)?,
                    current_page: to_page(current_page),
                })
            })
            .map_err(CatalogError::backend)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(CatalogError::backend)
    }

    fn page(&self, path: &str) -> Result<u32, CatalogError> {
        let page: Option<i64> = self
            .conn
            .query_row(
                "SELECT current_page FROM books WHERE path = ?",
                [path],
                |row| row.get(0),
            )
            .optional()
            .map_err(CatalogError::backend)?;
        page.map(to_page).ok_or_else(|| CatalogError::NotFound {
            path: path.to_string(),
        })
    }

    fn set_page(&self, path: &str, page: u32) -> Result<(), CatalogError> {
        let updated = self
            .conn
            .execute(
                "UPDATE books SET current_page = ? WHERE path = ?",
                (i64::from(page), path),
            )
            .map_err(CatalogError::backend)?;
        if updated == 0 {
            return Err(CatalogError::NotFound {
                path: path.to_string(),
            });
        }
        debug!(path, page, "stored reading position");
        Ok(())
    }
}

fn to_page(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(1).max(1)
}

//! Application orchestration layer for doty.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use doty_core::{Book, CatalogStore, Selector, Viewer};
use thiserror::Error;
use tracing::{debug, info};

pub const OPEN_PROMPT: &str = "Search a book: ";
pub const REMOVE_PROMPT: &str = "Remove a book: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workflow {
    Open,
    Add(PathBuf),
    Remove,
    List,
}

/// What a workflow did, for the caller to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Added { path: String },
    Removed { path: String },
    PageUpdated { path: String, page: u32 },
    PageUnchanged { path: String },
    Listed(Vec<Book>),
    Cancelled,
    EmptyCatalog,
}

impl Report {
    /// Informational outcomes go to stderr rather than stdout.
    pub fn is_informational(&self) -> bool {
        matches!(self, Report::Cancelled | Report::EmptyCatalog)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Added { path } => write!(f, "Successfully added {path} to the catalog."),
            Report::Removed { path } => {
                write!(f, "Successfully removed {path} from the catalog.")
            }
            Report::PageUpdated { page, .. } => write!(f, "Updated current page to {page}."),
            Report::PageUnchanged { .. } => Ok(()),
            Report::Listed(books) => {
                for (i, book) in books.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{:>5}  {}", book.current_page, book.path)?;
                }
                Ok(())
            }
            Report::Cancelled => f.write_str("the action was cancelled."),
            Report::EmptyCatalog => {
                f.write_str("the catalog is empty (hint: register a book with `doty add <file>`).")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("couldn't resolve '{}'", .path.display())]
    Unresolvable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is not a regular file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("'{}' is not valid UTF-8", .path.display())]
    NonUtf8 { path: PathBuf },

    #[error("'{}' contains a line break", .path.display())]
    LineBreak { path: PathBuf },
}

/// Composes the catalog with the selector and viewer bridges.
#[derive(Debug)]
pub struct Library<C, S, V> {
    catalog: C,
    selector: S,
    viewer: V,
}

impl<C: CatalogStore, S: Selector, V: Viewer> Library<C, S, V> {
    pub fn new(catalog: C, selector: S, viewer: V) -> Self {
        Self {
            catalog,
            selector,
            viewer,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn run(&self, workflow: Workflow) -> anyhow::Result<Report> {
        debug!(?workflow, "running workflow");
        match workflow {
            Workflow::Open => self.open(),
            Workflow::Add(file) => self.register(&file),
            Workflow::Remove => self.remove(),
            Workflow::List => self.list(),
        }
    }

    pub fn register(&self, file: &Path) -> anyhow::Result<Report> {
        let path = resolve_book_path(file)?;
        self.catalog.add(&path)?;
        info!(%path, "registered book");
        Ok(Report::Added { path })
    }

    pub fn remove(&self) -> anyhow::Result<Report> {
        let path = match self.pick(REMOVE_PROMPT)? {
            Pick::Chosen(path) => path,
            Pick::Cancelled => return Ok(Report::Cancelled),
            Pick::Empty => return Ok(Report::EmptyCatalog),
        };
        self.catalog.remove(&path)?;
        info!(%path, "removed book");
        Ok(Report::Removed { path })
    }

    pub fn open(&self) -> anyhow::Result<Report> {
        let path = match self.pick(OPEN_PROMPT)? {
            Pick::Chosen(path) => path,
            Pick::Cancelled => return Ok(Report::Cancelled),
            Pick::Empty => return Ok(Report::EmptyCatalog),
        };
        let start_page = self.catalog.page(&path)?;
        let Some(page) = self.viewer.open_and_track(&path, start_page)? else {
            debug!(%path, start_page, "no page announced; keeping stored page");
            return Ok(Report::PageUnchanged { path });
        };
        self.catalog
            .set_page(&path, page)
            .with_context(|| format!("store page {page} for {path}"))?;
        info!(%path, page, "updated reading position");
        Ok(Report::PageUpdated { path, page })
    }

    pub fn list(&self) -> anyhow::Result<Report> {
        Ok(Report::Listed(self.catalog.list_books()?))
    }

    /// Offers the catalog to the selector. The chosen index is resolved against the same
    /// listing that was shown.
    fn pick(&self, prompt: &str) -> anyhow::Result<Pick> {
        let mut paths = self.catalog.list_paths()?;
        if paths.is_empty() {
            return Ok(Pick::Empty);
        }
        let Some(index) = self.selector.select(prompt, &paths)? else {
            return Ok(Pick::Cancelled);
        };
        anyhow::ensure!(index < paths.len(), "selector index {index} out of range");
        Ok(Pick::Chosen(paths.swap_remove(index)))
    }
}

enum Pick {
    Chosen(String),
    Cancelled,
    Empty,
}

fn resolve_book_path(file: &Path) -> Result<String, RegisterError> {
    let resolved = std::fs::canonicalize(file).map_err(|source| RegisterError::Unresolvable {
        path: file.to_path_buf(),
        source,
    })?;
    if !resolved.is_file() {
        return Err(RegisterError::NotAFile { path: resolved });
    }
    let Some(path) = resolved.to_str() else {
        return Err(RegisterError::NonUtf8 { path: resolved });
    };
    // The picker shows one book per line.
    if path.contains(['\n', '\r']) {
        return Err(RegisterError::LineBreak { path: resolved });
    }
    Ok(path.to_string())
}

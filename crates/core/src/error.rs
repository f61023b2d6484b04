use std::io;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("couldn't add '{path}' to the catalog (hint: maybe it's already in there)")]
    Duplicate { path: String },

    #[error("'{path}' is not in the catalog")]
    NotFound { path: String },

    #[error("catalog store failure")]
    Backend(#[source] BoxError),
}

impl CatalogError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }
}

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("couldn't launch selector `{program}` (hint: is it installed and on PATH?)")]
    Unavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("selector returned an unreadable choice: {raw:?}")]
    UnreadableChoice { raw: String },

    #[error("selector returned item {ordinal}, but only {len} were offered")]
    OutOfRange { ordinal: usize, len: usize },

    #[error("selector scratch file i/o")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("couldn't launch viewer `{program}` (hint: is it installed and on PATH?)")]
    Unavailable {
        program: String,
        #[source]
        source: io::Error,
    },
}

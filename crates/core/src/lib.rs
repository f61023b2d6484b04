//! Core domain types for doty.

use serde::{Deserialize, Serialize};

mod error;

pub use error::{CatalogError, SelectorError, ViewerError};

/// Page announcement emitted by zathura when running with `-l debug`.
pub const DEFAULT_PAGE_PATTERN: &str = r"debug: .+: Emitting signal for page (?P<page>\d+)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub path: String,
    pub current_page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub selector: SelectorSettings,
    pub viewer: ViewerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    pub program: String,
    pub args: Vec<String>,
    /// Flag that precedes the prompt text. `None` drops the prompt entirely.
    pub prompt_flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub program: String,
    pub debug_args: Vec<String>,
    pub page_flag: String,
    pub page_pattern: String,
    pub diagnostic_stream: DiagnosticStream,
}

/// Output stream of the viewer that carries its page announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStream {
    Stderr,
    Stdout,
}

impl DiagnosticStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticStream::Stderr => "stderr",
            DiagnosticStream::Stdout => "stdout",
        }
    }
}

impl std::fmt::Display for DiagnosticStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagnosticStream {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stderr" => Ok(DiagnosticStream::Stderr),
            "stdout" => Ok(DiagnosticStream::Stdout),
            _ => Err("unknown diagnostic stream"),
        }
    }
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            program: "fzf".to_string(),
            args: Vec::new(),
            prompt_flag: Some("--prompt".to_string()),
        }
    }
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            program: "zathura".to_string(),
            debug_args: vec!["-l".to_string(), "debug".to_string()],
            page_flag: "--page".to_string(),
            page_pattern: DEFAULT_PAGE_PATTERN.to_string(),
            diagnostic_stream: DiagnosticStream::Stderr,
        }
    }
}

impl Settings {
    pub fn normalize(&mut self) {
        let defaults = Settings::default();

        self.selector.program = self.selector.program.trim().to_string();
        if self.selector.program.is_empty() {
            self.selector.program = defaults.selector.program;
        }
        self.selector.prompt_flag = self
            .selector
            .prompt_flag
            .take()
            .map(|flag| flag.trim().to_string())
            .filter(|flag| !flag.is_empty());

        self.viewer.program = self.viewer.program.trim().to_string();
        if self.viewer.program.is_empty() {
            self.viewer.program = defaults.viewer.program;
        }
        self.viewer.page_flag = self.viewer.page_flag.trim().to_string();
        if self.viewer.page_flag.is_empty() {
            self.viewer.page_flag = defaults.viewer.page_flag;
        }
        if self.viewer.page_pattern.trim().is_empty() {
            self.viewer.page_pattern = defaults.viewer.page_pattern;
        }
    }
}

/// Durable mapping from book path to reading position.
pub trait CatalogStore {
    fn add(&self, path: &str) -> Result<(), CatalogError>;
    fn remove(&self, path: &str) -> Result<(), CatalogError>;
    /// Every registered path, in a stable order.
    fn list_paths(&self) -> Result<Vec<String>, CatalogError>;
    /// Every record, in the same order as [`CatalogStore::list_paths`].
    fn list_books(&self) -> Result<Vec<Book>, CatalogError>;
    fn page(&self, path: &str) -> Result<u32, CatalogError>;
    fn set_page(&self, path: &str, page: u32) -> Result<(), CatalogError>;
}

/// Interactive pick over an ordered list of labels.
pub trait Selector {
    /// Returns the zero-based index of the chosen item, or `None` if the user aborted.
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>, SelectorError>;
}

/// Launches a document and reports the page the reader ended on.
pub trait Viewer {
    fn open_and_track(&self, path: &str, start_page: u32) -> Result<Option<u32>, ViewerError>;
}

/// Extracts the final page from a viewer's diagnostic text.
pub trait PageRecovery {
    fn recover_last_page(&self, diagnostics: &str) -> Option<u32>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for &T {
    fn add(&self, path: &str) -> Result<(), CatalogError> {
        (**self).add(path)
    }

    fn remove(&self, path: &str) -> Result<(), CatalogError> {
        (**self).remove(path)
    }

    fn list_paths(&self) -> Result<Vec<String>, CatalogError> {
        (**self).list_paths()
    }

    fn list_books(&self) -> Result<Vec<Book>, CatalogError> {
        (**self).list_books()
    }

    fn page(&self, path: &str) -> Result<u32, CatalogError> {
        (**self).page(path)
    }

    fn set_page(&self, path: &str, page: u32) -> Result<(), CatalogError> {
        (**self).set_page(path, page)
    }
}

impl<T: Selector + ?Sized> Selector for &T {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>, SelectorError> {
        (**self).select(prompt, items)
    }
}

impl<T: Viewer + ?Sized> Viewer for &T {
    fn open_and_track(&self, path: &str, start_page: u32) -> Result<Option<u32>, ViewerError> {
        (**self).open_and_track(path, start_page)
    }
}

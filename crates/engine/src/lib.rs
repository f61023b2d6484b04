//! Viewer process integration.
//!
//! The viewer is launched synchronously with its diagnostic output captured; once it exits
//! the captured text is scanned for page announcements.

use std::process::{Command, Stdio};

use doty_core::{DiagnosticStream, PageRecovery, Viewer, ViewerError, ViewerSettings};
use tracing::{debug, warn};

mod page_pattern;

pub use page_pattern::PagePattern;

#[derive(Debug, Clone)]
pub struct ProcessViewer<R = PagePattern> {
    settings: ViewerSettings,
    recovery: R,
}

impl ProcessViewer<PagePattern> {
    pub fn new(settings: ViewerSettings) -> anyhow::Result<Self> {
        let recovery = PagePattern::new(&settings.page_pattern)?;
        Ok(Self { settings, recovery })
    }
}

impl<R: PageRecovery> ProcessViewer<R> {
    pub fn with_recovery(settings: ViewerSettings, recovery: R) -> Self {
        Self { settings, recovery }
    }

    fn command(&self, path: &str, start_page: u32) -> Command {
        let mut cmd = Command::new(&self.settings.program);
        cmd.args(&self.settings.debug_args)
            .arg(path)
            .arg(&self.settings.page_flag)
            .arg(start_page.to_string());
        cmd.stdin(Stdio::null());
        cmd
    }
}

impl<R: PageRecovery> Viewer for ProcessViewer<R> {
    fn open_and_track(&self, path: &str, start_page: u32) -> Result<Option<u32>, ViewerError> {
        debug!(program = %self.settings.program, path, start_page, "launching viewer");
        let output = self
            .command(path, start_page)
            .output()
            .map_err(|source| ViewerError::Unavailable {
                program: self.settings.program.clone(),
                source,
            })?;

        if !output.status.success() {
            warn!(status = %output.status, "viewer exited unsuccessfully");
        }

        let captured = match self.settings.diagnostic_stream {
            DiagnosticStream::Stderr => &output.stderr,
            DiagnosticStream::Stdout => &output.stdout,
        };
        let diagnostics = String::from_utf8_lossy(captured);
        let page = self.recovery.recover_last_page(&diagnostics);
        debug!(
            stream = %self.settings.diagnostic_stream,
            bytes = captured.len(),
            ?page,
            "scanned viewer diagnostics"
        );
        Ok(page)
    }
}

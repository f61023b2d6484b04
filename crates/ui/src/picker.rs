use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use doty_core::{SelectorError, SelectorSettings};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{label_items, parse_choice};

/// Drives an external fuzzy finder such as `fzf`.
///
/// The finder owns the terminal, so its answer is redirected into a scratch file instead of
/// being read from a pipe. The scratch file is removed when it goes out of scope.
#[derive(Debug, Clone)]
pub struct FuzzyPicker {
    settings: SelectorSettings,
    scratch_dir: Option<PathBuf>,
}

impl FuzzyPicker {
    pub fn new(settings: SelectorSettings) -> Self {
        Self {
            settings,
            scratch_dir: None,
        }
    }

    /// Creates scratch files under `dir` instead of the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    fn scratch_file(&self) -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("doty-").suffix(".doty.txt");
        match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }

    pub(crate) fn pick(
        &self,
        prompt: &str,
        items: &[String],
    ) -> Result<Option<usize>, SelectorError> {
        let scratch = self.scratch_file()?;

        let mut cmd = Command::new(&self.settings.program);
        cmd.args(&self.settings.args);
        if let Some(flag) = &self.settings.prompt_flag {
            cmd.arg(flag).arg(prompt);
        }
        cmd.stdin(Stdio::piped()).stdout(Stdio::from(scratch.reopen()?));

        debug!(
            program = %self.settings.program,
            scratch = %scratch.path().display(),
            items = items.len(),
            "launching selector"
        );
        let mut child = cmd.spawn().map_err(|source| SelectorError::Unavailable {
            program: self.settings.program.clone(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(label_items(items).as_bytes()) {
                Ok(()) => {}
                // The picker may quit before reading everything.
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("selector closed its input early");
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(err.into());
                }
            }
        }

        let status = child.wait()?;
        if !status.success() {
            debug!(%status, "selection cancelled");
            return Ok(None);
        }

        let raw = std::fs::read_to_string(scratch.path())?;
        parse_choice(&raw, items.len()).map(Some)
    }
}

use anyhow::Context as _;
use doty_core::PageRecovery;
use regex::Regex;

/// Regex-driven page recovery.
///
/// The page number is read from the `page` named group when present, otherwise from the
/// first capture group. Matches that don't hold a positive `u32` are skipped.
#[derive(Debug, Clone)]
pub struct PagePattern {
    regex: Regex,
}

impl PagePattern {
    pub fn new(pattern: &str) -> anyhow::Result<Self> {
        let regex =
            Regex::new(pattern).with_context(|| format!("invalid page pattern: {pattern}"))?;
        // Group 0 is the whole match.
        if regex.captures_len() < 2 {
            anyhow::bail!("page pattern needs a capture group for the page number: {pattern}");
        }
        Ok(Self { regex })
    }
}

impl PageRecovery for PagePattern {
    fn recover_last_page(&self, diagnostics: &str) -> Option<u32> {
        self.regex
            .captures_iter(diagnostics)
            .filter_map(|caps| {
                caps.name("page")
                    .or_else(|| caps.get(1))
                    .and_then(|m| m.as_str().parse::<u32>().ok())
            })
            .filter(|page| *page > 0)
            .last()
    }
}

//! Interactive book selection.

use doty_core::{Selector, SelectorError};

mod picker;

pub use picker::FuzzyPicker;

impl Selector for FuzzyPicker {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>, SelectorError> {
        self.pick(prompt, items)
    }
}

/// Renders `items` as `"<n>. <item>"` lines, numbered from 1.
pub fn label_items(items: &[String]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {item}\n", i + 1));
    }
    out
}

/// Maps a line produced by [`label_items`] back to a zero-based index.
pub fn parse_choice(raw: &str, len: usize) -> Result<usize, SelectorError> {
    let unreadable = || SelectorError::UnreadableChoice {
        raw: raw.to_string(),
    };
    let (ordinal, _) = raw.trim_start().split_once('.').ok_or_else(unreadable)?;
    let ordinal = ordinal.trim().parse::<usize>().map_err(|_| unreadable())?;
    if ordinal == 0 || ordinal > len {
        return Err(SelectorError::OutOfRange { ordinal, len });
    }
    Ok(ordinal - 1)
}

//! Input collector
//!
//! Holds the draft concern while the user types. Submission validates the
//! draft; while a request is outstanding the collector is disabled and
//! refuses both edits and submissions.

use thiserror::Error;
use tracing::debug;

/// Blank or whitespace-only description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Please describe the concern you wish to explore.")]
pub struct ValidationError;

/// Reasons a submission is refused by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error(transparent)]
    Blank(#[from] ValidationError),

    #[error("Input is disabled while a reflection is being prepared.")]
    Disabled,
}

/// Trim a description, rejecting it if nothing is left
pub fn validate_description(text: &str) -> Result<&str, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() { Err(ValidationError) } else { Ok(trimmed) }
}

/// Draft text with a character cursor
#[derive(Debug, Clone)]
pub struct InputCollector {
    draft: String,
    /// Cursor position in characters, `0..=draft.chars().count()`
    cursor: usize,
    enabled: bool,
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCollector {
    pub fn new() -> Self {
        Self {
            draft: String::new(),
            cursor: 0,
            enabled: true,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }

    /// Enable or disable editing; driven by the session's loading state
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!(enabled, "InputCollector::set_enabled: changed");
        }
        self.enabled = enabled;
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.draft
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.draft.len())
    }

    pub fn insert(&mut self, c: char) -> bool {
        if !self.enabled {
            return false;
        }
        let idx = self.byte_index(self.cursor);
        self.draft.insert(idx, c);
        self.cursor += 1;
        true
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) -> bool {
        if !self.enabled || self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let idx = self.byte_index(self.cursor);
        self.draft.remove(idx);
        true
    }

    /// Delete the character under the cursor
    pub fn delete(&mut self) -> bool {
        if !self.enabled || self.cursor >= self.draft.chars().count() {
            return false;
        }
        let idx = self.byte_index(self.cursor);
        self.draft.remove(idx);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.draft.chars().count();
    }

    pub fn clear(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.draft.clear();
        self.cursor = 0;
        true
    }

    /// Validate the draft and hand back the trimmed description
    ///
    /// The draft is kept so the user can refine and resubmit it.
    pub fn submit(&self) -> Result<String, InputError> {
        debug!(draft_len = self.draft.len(), enabled = self.enabled, "InputCollector::submit: called");
        if !self.enabled {
            return Err(InputError::Disabled);
        }
        Ok(validate_description(&self.draft)?.to_string())
    }
}

//! Command history with an Up/Down cursor
//!
//! The cursor lives in `[0, len]`; `len` means "past the newest entry",
//! which is where it rests after every submission.

/// Submitted commands, oldest first
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted command and park the cursor past the end
    ///
    /// A command identical to the newest entry is not stored twice.
    pub fn push(&mut self, command: &str) {
        if self.entries.last().map(String::as_str) != Some(command) {
            self.entries.push(command.to_string());
        }
        self.cursor = self.entries.len();
    }

    /// Step back towards older entries
    ///
    /// Returns the entry to show, or `None` when already at the oldest.
    pub fn older(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Step forward towards newer entries
    ///
    /// Moving past the newest entry parks the cursor at `len` and returns an
    /// empty string so the caller blanks the input field.
    pub fn newer(&mut self) -> &str {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            &self.entries[self.cursor]
        } else {
            self.cursor = self.entries.len();
            ""
        }
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

//! Input handling for the emulated prompt
//!
//! Translates crossterm key events into [`InputAction`]s and keeps the
//! editable input field in a grapheme-aware [`LineEditor`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// What a key press means to the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Submit,
    HistoryOlder,
    HistoryNewer,
    Complete,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    KillLine,
    ScrollUp,
    ScrollDown,
}

impl InputAction {
    /// Map a key event to a prompt action
    ///
    /// Release/repeat events and chords with Ctrl/Alt (other than the line
    /// editing ones) are not prompt input.
    #[must_use]
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        let action = match key.code {
            KeyCode::Enter => Self::Submit,
            KeyCode::Up => Self::HistoryOlder,
            KeyCode::Down => Self::HistoryNewer,
            KeyCode::Tab => Self::Complete,
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Delete => Self::Delete,
            KeyCode::Left => Self::Left,
            KeyCode::Right => Self::Right,
            KeyCode::Home => Self::Home,
            KeyCode::End => Self::End,
            KeyCode::PageUp => Self::ScrollUp,
            KeyCode::PageDown => Self::ScrollDown,
            KeyCode::Char('a') if ctrl => Self::Home,
            KeyCode::Char('e') if ctrl => Self::End,
            KeyCode::Char('u') if ctrl => Self::KillLine,
            KeyCode::Char(c) if !ctrl && !alt => Self::Insert(c),
            _ => return None,
        };
        Some(action)
    }
}

/// Single-line editable buffer with a cursor measured in grapheme clusters
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    buffer: String,
    /// Cursor position in graphemes, `0..=grapheme_count`
    cursor: usize,
}

impl LineEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display columns between the start of the buffer and the cursor
    #[must_use]
    pub fn cursor_column(&self) -> usize {
        self.buffer[..self.byte_offset(self.cursor)].width()
    }

    fn grapheme_count(&self) -> usize {
        self.buffer.graphemes(true).count()
    }

    fn byte_offset(&self, grapheme: usize) -> usize {
        self.buffer
            .grapheme_indices(true)
            .nth(grapheme)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let before = self.grapheme_count();
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, c);
        // A combining mark merges into the previous cluster instead of adding one
        if self.grapheme_count() > before {
            self.cursor += 1;
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.buffer.replace_range(start..end, "");
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.grapheme_count() {
            return;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.buffer.replace_range(start..end, "");
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.grapheme_count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    /// Replace the whole buffer and move the cursor to its end
    pub fn set(&mut self, text: &str) {
        self.buffer.clear();
        self.buffer.push_str(text);
        self.cursor = self.grapheme_count();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the buffer contents, leaving the editor empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }
}

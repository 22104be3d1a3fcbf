//! Styled output lines
//!
//! Every producer of terminal text (command registry, emulator built-ins,
//! live feed, profile screen) emits [`OutputLine`]s. A line is a sequence of
//! [`Segment`]s, each tagged with a semantic [`Tone`] that the renderer maps
//! to a theme colour.

use std::fmt;

/// Semantic colour class of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    /// Default foreground
    #[default]
    Plain,
    /// Shell prompt (`user@host:~$`)
    Prompt,
    /// Echoed input and AI answers
    Output,
    Success,
    Info,
    Warning,
    Error,
    /// Command names and highlighted values
    Command,
    /// URLs and e-mail addresses
    Link,
}

/// A run of text sharing one tone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub tone: Tone,
}

/// One rendered line of output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputLine {
    pub segments: Vec<Segment>,
}

impl OutputLine {
    /// An empty line
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// A single plain segment
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(Tone::Plain, text)
    }

    /// A single segment with the given tone
    #[must_use]
    pub fn styled(tone: Tone, text: impl Into<String>) -> Self {
        Self::blank().push(tone, text)
    }

    /// Append a segment, builder style
    #[must_use]
    pub fn push(mut self, tone: Tone, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.segments.push(Segment { text, tone });
        }
        self
    }

    /// Concatenated text of all segments, without styling
    #[must_use]
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }

    /// Split multi-line text into one line per `\n`, all with the same tone
    #[must_use]
    pub fn block(tone: Tone, text: &str) -> Vec<Self> {
        text.lines().map(|l| Self::styled(tone, l)).collect()
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}

/// Plain text of a batch of lines joined with newlines
#[must_use]
pub fn plain_text(lines: &[OutputLine]) -> String {
    lines
        .iter()
        .map(OutputLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

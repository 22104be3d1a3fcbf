//! UI components drawn around the terminal emulator

pub mod ask_modal;
pub mod profile_view;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::colors::Palette;
use crate::terminal::line::Tone;
use crate::view::{View, ViewSurface};

/// Which screens are visible and where keyboard input goes
#[derive(Debug, Default)]
pub struct Screen {
    profile_shown: bool,
    terminal_shown: bool,
    input_focused: bool,
}

impl Screen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The view to draw; the terminal wins if both were left visible
    #[must_use]
    pub fn showing(&self) -> Option<View> {
        if self.terminal_shown {
            Some(View::Terminal)
        } else if self.profile_shown {
            Some(View::Profile)
        } else {
            None
        }
    }

    #[must_use]
    pub fn input_focused(&self) -> bool {
        self.input_focused
    }
}

impl ViewSurface for Screen {
    fn show(&mut self, view: View) {
        match view {
            View::Profile => self.profile_shown = true,
            View::Terminal => self.terminal_shown = true,
        }
    }

    fn hide(&mut self, view: View) {
        match view {
            View::Profile => self.profile_shown = false,
            View::Terminal => {
                self.terminal_shown = false;
                self.input_focused = false;
            }
        }
    }

    fn focus_input(&mut self) {
        self.input_focused = self.terminal_shown;
    }
}

/// One-line key hint bar at the bottom of the screen
pub fn render_status_bar(f: &mut Frame, area: Rect, view: View, palette: &Palette, notice: Option<&str>) {
    let hints: &[(&str, &str)] = match view {
        View::Profile => &[
            ("F2", "terminal"),
            ("a", "ask AI"),
            ("↑↓/PgUp/PgDn", "scroll"),
            ("q", "quit"),
        ],
        View::Terminal => &[
            ("F2", "portfolio"),
            ("Tab", "complete"),
            ("PgUp/PgDn", "scroll"),
            ("Ctrl+C", "quit"),
        ],
    };

    let mut spans = Vec::with_capacity(hints.len() * 2 + 2);
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key} "), palette.accent()));
        spans.push(Span::styled(format!("{label} "), palette.style(Tone::Plain)));
    }
    if let Some(notice) = notice {
        spans.push(Span::styled(format!(" {notice}"), palette.style(Tone::Warning)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(palette.base()), area);
}

//! "Ask AI" dialog shown over the profile view

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::{debug, error};
use unicode_width::UnicodeWidthStr;

use crate::colors::Palette;
use crate::error::BridgeError;
use crate::terminal::input::{InputAction, LineEditor};
use crate::terminal::line::{OutputLine, Tone};
use crate::terminal::renderer::{row_to_line, visible_rows};
use crate::terminal::AskTicket;

pub const EMPTY_QUESTION_NOTICE: &str = "Please enter a question for the AI.";
const THINKING: &str = "Thinking...";
const TASK_FAILED_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
    Info,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    id: u64,
    pub sender: Sender,
    pub text: String,
}

/// What the caller should do after a key press
#[derive(Debug, PartialEq, Eq)]
pub enum ModalOutcome {
    Handled,
    Closed,
    Submitted(AskTicket),
}

#[derive(Debug, Default)]
pub struct AskModal {
    visible: bool,
    input: LineEditor,
    messages: Vec<ChatMessage>,
    next_id: u64,
    notice: Option<&'static str>,
}

impl AskModal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog with an empty input; the chat log is kept
    pub fn open(&mut self) {
        self.visible = true;
        self.input.clear();
        self.notice = None;
        debug!("AI modal opened");
    }

    pub fn close(&mut self) {
        self.visible = false;
        debug!("AI modal closed");
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice
    }

    #[must_use]
    pub fn input(&self) -> &LineEditor {
        &self.input
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalOutcome {
        if key.kind == KeyEventKind::Release {
            return ModalOutcome::Handled;
        }
        if key.code == KeyCode::Esc {
            self.close();
            return ModalOutcome::Closed;
        }
        match InputAction::from_key(key) {
            Some(InputAction::Submit) => {
                if let Some(ticket) = self.submit() {
                    return ModalOutcome::Submitted(ticket);
                }
            }
            Some(InputAction::Insert(c)) => {
                self.notice = None;
                self.input.insert(c);
            }
            Some(InputAction::Backspace) => self.input.backspace(),
            Some(InputAction::Delete) => self.input.delete(),
            Some(InputAction::Left) => self.input.left(),
            Some(InputAction::Right) => self.input.right(),
            Some(InputAction::Home) => self.input.home(),
            Some(InputAction::End) => self.input.end(),
            Some(InputAction::KillLine) => self.input.clear(),
            _ => {}
        }
        ModalOutcome::Handled
    }

    pub fn paste(&mut self, text: &str) {
        self.input.insert_str(text);
    }

    /// Send the typed question; an empty one only shows a notice
    pub fn submit(&mut self) -> Option<AskTicket> {
        let question = self.input.as_str().trim().to_string();
        if question.is_empty() {
            self.notice = Some(EMPTY_QUESTION_NOTICE);
            return None;
        }
        self.notice = None;
        self.input.clear();
        self.push(Sender::User, question.clone());
        let id = self.push(Sender::Info, THINKING.to_string());
        Some(AskTicket { id, question })
    }

    /// Swap the thinking message of `ticket_id` for the answer
    pub fn resolve(&mut self, ticket_id: u64, outcome: Result<String, BridgeError>) {
        self.messages.retain(|m| m.id != ticket_id);
        let text = match outcome {
            Ok(answer) => answer,
            Err(e) => {
                error!("AI modal query failed: {}", e);
                TASK_FAILED_MESSAGE.to_string()
            }
        };
        self.push(Sender::Ai, text);
    }

    fn push(&mut self, sender: Sender, text: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage { id, sender, text });
        id
    }

    fn chat_lines(&self) -> Vec<OutputLine> {
        let mut lines = Vec::new();
        for message in &self.messages {
            let (label, tone) = match message.sender {
                Sender::User => ("You", Tone::Command),
                Sender::Ai => ("AI", Tone::Success),
                Sender::Info => ("", Tone::Info),
            };
            if !label.is_empty() {
                lines.push(OutputLine::styled(tone, label));
            }
            let body_tone = if message.sender == Sender::Info {
                Tone::Info
            } else {
                Tone::Output
            };
            lines.extend(OutputLine::block(body_tone, &message.text));
            lines.push(OutputLine::blank());
        }
        lines
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        if !self.visible {
            return;
        }
        let popup = centered(area, 80, 24);
        if popup.width < 10 || popup.height < 6 {
            return;
        }
        f.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Ask AI (Enter to send, Esc to close) ")
            .border_style(palette.accent())
            .style(palette.base());
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(inner);

        let rows = visible_rows(
            self.chat_lines().iter(),
            usize::from(chunks[0].width),
            usize::from(chunks[0].height),
            0,
        );
        let chat: Vec<Line> = rows.into_iter().map(|row| row_to_line(row, palette)).collect();
        f.render_widget(Paragraph::new(chat), chunks[0]);

        if let Some(notice) = self.notice {
            f.render_widget(
                Paragraph::new(Span::styled(notice, palette.style(Tone::Warning))),
                chunks[1],
            );
        }

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.style(Tone::Prompt));
        let input_inner = input_block.inner(chunks[2]);
        let prefix = "> ";
        let input = Paragraph::new(Line::from(vec![
            Span::styled(prefix, palette.style(Tone::Prompt)),
            Span::styled(self.input.as_str(), palette.style(Tone::Output)),
        ]))
        .block(input_block);
        f.render_widget(input, chunks[2]);

        if input_inner.width > 0 {
            let col = prefix.width() + self.input.cursor_column();
            let col = u16::try_from(col)
                .unwrap_or(u16::MAX)
                .min(input_inner.width - 1);
            f.set_cursor(input_inner.x + col, input_inner.y);
        }
    }
}

/// A rectangle of at most `width` x `height` centred in `area`
#[must_use]
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = area.width.min(width);
    let height = area.height.min(height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

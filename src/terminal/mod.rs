//! Terminal module for the folio portfolio shell
//!
//! This module contains the [`TerminalEmulator`] state machine and its
//! supporting modules:
//! - `history`: submitted commands with an Up/Down cursor
//! - `input`: key mapping and the editable input field
//! - `line`: styled output lines shared by every text producer
//! - `renderer`: drawing the emulator and the live feed with ratatui
//!
//! # Architecture
//! The emulator never performs I/O. Keystrokes come in as
//! [`InputAction`]s, output accumulates in an in-memory line buffer, and an
//! `ask` command is handed back to the caller as an [`AskTicket`]. The
//! caller runs the AI round trip and later calls
//! [`TerminalEmulator::resolve_ask`] with the result.

pub mod history;
pub mod input;
pub mod line;
pub mod renderer;

use tracing::{debug, error, info};

use crate::commands::CommandRegistry;
use crate::error::BridgeError;

use self::history::History;
use self::input::{InputAction, LineEditor};
use self::line::{OutputLine, Tone};

/// Lines moved per PageUp/PageDown
const SCROLL_STEP: usize = 10;

/// Shown when the bridge task itself failed
const ASK_FAILED_MESSAGE: &str = "Sorry, I couldn't get an answer. Please try again later.";

/// An `ask` command waiting for its answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskTicket {
    /// Id of the "thinking" placeholder line
    pub id: u64,
    pub question: String,
}

/// Size of the output area in screen cells, excluding the prompt row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: u64,
    line: OutputLine,
}

/// Emulated shell prompt: output buffer, input field and history
pub struct TerminalEmulator {
    prompt: String,
    registry: CommandRegistry,
    lines: Vec<Entry>,
    next_id: u64,
    history: History,
    input: LineEditor,
    initialized: bool,
    input_enabled: bool,
    // Screen rows scrolled up from the bottom
    scroll: usize,
    viewport: Viewport,
}

impl TerminalEmulator {
    #[must_use]
    pub fn new(prompt: impl Into<String>, registry: CommandRegistry) -> Self {
        Self {
            prompt: prompt.into(),
            registry,
            lines: Vec::new(),
            next_id: 0,
            history: History::new(),
            input: LineEditor::new(),
            initialized: false,
            input_enabled: true,
            scroll: 0,
            viewport: Viewport::default(),
        }
    }

    /// Print the welcome banner the first time the terminal is shown
    ///
    /// Returns `false` if the terminal was already initialised.
    pub fn init(&mut self) -> bool {
        if self.initialized {
            debug!("Terminal already initialized");
            return false;
        }
        let owner = self
            .registry
            .profile()
            .map_or_else(|| "my".to_string(), |p| format!("{}'s", p.personal.name));
        self.push(OutputLine::styled(
            Tone::Success,
            format!("Welcome to {owner} portfolio terminal."),
        ));
        self.push(
            OutputLine::plain("Type '")
                .push(Tone::Command, "help")
                .push(Tone::Plain, "' for a list of available commands, or '")
                .push(Tone::Command, "ask \"...\"")
                .push(Tone::Plain, "' to ask the AI assistant."),
        );
        self.initialized = true;
        info!("Terminal initialized");
        true
    }

    /// Apply one prompt action
    ///
    /// Returns a ticket when the action submitted an `ask` command that needs
    /// an AI answer.
    pub fn handle(&mut self, action: InputAction) -> Option<AskTicket> {
        match action {
            InputAction::ScrollUp => {
                self.scroll = (self.scroll + SCROLL_STEP).min(self.max_scroll());
                return None;
            }
            InputAction::ScrollDown => {
                self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
                return None;
            }
            _ => {}
        }
        if !self.input_enabled {
            return None;
        }

        match action {
            InputAction::Submit => return self.submit(),
            InputAction::HistoryOlder => {
                if let Some(entry) = self.history.older() {
                    let entry = entry.to_string();
                    self.input.set(&entry);
                }
            }
            InputAction::HistoryNewer => {
                let entry = self.history.newer().to_string();
                self.input.set(&entry);
            }
            InputAction::Complete => self.complete(),
            InputAction::Insert(c) => self.input.insert(c),
            InputAction::Backspace => self.input.backspace(),
            InputAction::Delete => self.input.delete(),
            InputAction::Left => self.input.left(),
            InputAction::Right => self.input.right(),
            InputAction::Home => self.input.home(),
            InputAction::End => self.input.end(),
            InputAction::KillLine => self.input.clear(),
            InputAction::ScrollUp | InputAction::ScrollDown => {}
        }
        None
    }

    /// Insert pasted text into the input field
    pub fn paste(&mut self, text: &str) {
        if self.input_enabled {
            self.input.insert_str(text);
        }
    }

    /// Submit the input field
    pub fn submit(&mut self) -> Option<AskTicket> {
        let raw = self.input.take();
        let command = raw.trim();
        if command.is_empty() {
            self.push(self.echo(""));
            return None;
        }
        self.history.push(command);
        self.dispatch(command)
    }

    /// Echo and execute a command line
    fn dispatch(&mut self, command_line: &str) -> Option<AskTicket> {
        self.push(self.echo(command_line));

        let (word, rest) = command_line
            .split_once(char::is_whitespace)
            .unwrap_or((command_line, ""));
        let command = word.to_lowercase();
        debug!("Dispatching terminal command '{}'", command);

        match command.as_str() {
            "clear" => {
                self.clear();
                None
            }
            "exit" => {
                self.push(OutputLine::styled(
                    Tone::Warning,
                    "Session ended. Thanks for visiting my portfolio!",
                ));
                self.push(OutputLine::styled(
                    Tone::Info,
                    "Press Ctrl+C to quit, or restart folio to begin a new session.",
                ));
                self.input_enabled = false;
                info!("Terminal session ended by user");
                None
            }
            "ask" => self.ask(rest),
            _ => {
                match self.registry.output(&command) {
                    Some(lines) => self.extend(lines),
                    None => self.not_found(&command),
                }
                None
            }
        }
    }

    fn ask(&mut self, rest: &str) -> Option<AskTicket> {
        let question = rest.replace(['"', '\''], "");
        let question = question.trim();
        if question.is_empty() {
            self.push(OutputLine::styled(
                Tone::Error,
                "Usage: ask \"your question here\"",
            ));
            self.push(OutputLine::styled(
                Tone::Info,
                "Example: ask \"what are your top skills?\"",
            ));
            return None;
        }

        let id = self.push(OutputLine::styled(Tone::Info, "✨ Thinking..."));
        Some(AskTicket {
            id,
            question: question.to_string(),
        })
    }

    fn not_found(&mut self, command: &str) {
        debug!("Unknown terminal command '{}'", command);
        self.push(OutputLine::styled(
            Tone::Error,
            format!("bash: {command}: command not found"),
        ));
        if let Some(suggestion) = self.registry.suggest(command) {
            self.push(
                OutputLine::plain("Did you mean '")
                    .push(Tone::Command, suggestion)
                    .push(Tone::Plain, "'?"),
            );
        }
        self.push(
            OutputLine::plain("Type '")
                .push(Tone::Command, "help")
                .push(Tone::Plain, "' for a list of available commands."),
        );
    }

    /// Replace the thinking placeholder of `ticket_id` with the answer
    pub fn resolve_ask(&mut self, ticket_id: u64, outcome: Result<String, BridgeError>) {
        self.lines.retain(|entry| entry.id != ticket_id);
        match outcome {
            Ok(answer) => {
                let lines = OutputLine::block(Tone::Output, &answer);
                if lines.is_empty() {
                    self.push(OutputLine::styled(Tone::Output, answer));
                } else {
                    self.extend(lines);
                }
            }
            Err(e) => {
                error!("Terminal AI error: {}", e);
                self.push(OutputLine::styled(Tone::Error, ASK_FAILED_MESSAGE));
            }
        }
    }

    /// Wipe all output and reinitialise the prompt
    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll = 0;
        self.push(
            OutputLine::styled(Tone::Success, "Terminal cleared.")
                .push(Tone::Plain, " Type '")
                .push(Tone::Command, "help")
                .push(Tone::Plain, "' for available commands."),
        );
    }

    fn complete(&mut self) {
        let typed = self.input.as_str().to_string();
        if typed.contains(char::is_whitespace) {
            return;
        }
        let matches = self.registry.completions(&typed);
        match matches.as_slice() {
            [] => {}
            [only] => self.input.set(&format!("{only} ")),
            many => {
                let common = common_prefix(many);
                if common.len() > typed.len() {
                    self.input.set(common);
                } else {
                    self.push(self.echo(&typed));
                    self.push(OutputLine::styled(Tone::Info, many.join("  ")));
                }
            }
        }
    }

    fn echo(&self, command: &str) -> OutputLine {
        OutputLine::styled(Tone::Prompt, self.prompt.as_str())
            .push(Tone::Plain, " ")
            .push(Tone::Output, command)
    }

    fn push(&mut self, line: OutputLine) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.lines.push(Entry { id, line });
        self.scroll = 0;
        id
    }

    fn extend(&mut self, lines: Vec<OutputLine>) {
        for line in lines {
            self.push(line);
        }
    }

    /// Rendered output, oldest first
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &OutputLine> + ExactSizeIterator {
        self.lines.iter().map(|entry| &entry.line)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn input(&self) -> &LineEditor {
        &self.input
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// `false` once the user ran `exit`
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    #[must_use]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Record the output area size and keep the scroll offset inside it
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        let viewport = Viewport {
            width: width.max(1),
            height,
        };
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// Largest scroll offset that still fills the viewport, in wrapped rows
    #[must_use]
    pub fn max_scroll(&self) -> usize {
        let rows: usize = self
            .lines
            .iter()
            .map(|entry| renderer::wrap_line(&entry.line, self.viewport.width).len())
            .sum();
        rows.saturating_sub(self.viewport.height)
    }
}

fn common_prefix<'a>(words: &[&'a str]) -> &'a str {
    let Some(first) = words.first() else {
        return "";
    };
    let mut end = first.len();
    for word in &words[1..] {
        end = first
            .char_indices()
            .zip(word.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, a), _)| i + a.len_utf8())
            .min(end);
    }
    &first[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures;
    use std::sync::Arc;

    fn terminal() -> TerminalEmulator {
        let registry = CommandRegistry::new(Some(Arc::new(fixtures::jane_doe())));
        let mut terminal = TerminalEmulator::new("visitor@folio:~$", registry);
        terminal.init();
        terminal
    }

    fn type_line(terminal: &mut TerminalEmulator, text: &str) -> Option<AskTicket> {
        for c in text.chars() {
            terminal.handle(InputAction::Insert(c));
        }
        terminal.handle(InputAction::Submit)
    }

    fn output(terminal: &TerminalEmulator) -> Vec<String> {
        terminal.lines().map(OutputLine::text).collect()
    }

    #[test]
    fn test_init_runs_once() {
        let mut terminal = terminal();
        let before = terminal.line_count();
        assert!(!terminal.init());
        assert_eq!(terminal.line_count(), before);
    }

    #[test]
    fn test_empty_enter_appends_prompt_only() {
        let mut terminal = terminal();
        let before = terminal.line_count();
        assert!(type_line(&mut terminal, "   ").is_none());
        assert_eq!(terminal.line_count(), before + 1);
        assert_eq!(output(&terminal).last().unwrap().trim_end(), "visitor@folio:~$");
        assert!(terminal.history().is_empty());
    }

    #[test]
    fn test_command_word_is_case_insensitive() {
        let mut terminal = terminal();
        type_line(&mut terminal, "WhoAmI");
        let text = output(&terminal).join("\n");
        assert!(text.contains("visitor@folio:~$ WhoAmI"));
        assert!(text.contains("Jane Doe - Platform Engineer"));
    }

    #[test]
    fn test_unknown_command_hints_help() {
        let mut terminal = terminal();
        type_line(&mut terminal, "skils");
        let text = output(&terminal).join("\n");
        assert!(text.contains("bash: skils: command not found"));
        assert!(text.contains("Did you mean 'skills'?"));
        assert!(text.contains("Type 'help' for a list of available commands."));
    }

    #[test]
    fn test_ask_keeps_argument_case_and_strips_quotes() {
        let mut terminal = terminal();
        let ticket = type_line(&mut terminal, "ASK \"What is Jane's AWS experience?\"").unwrap();
        assert_eq!(ticket.question, "What is Janes AWS experience?");
        assert_eq!(output(&terminal).last().unwrap(), "✨ Thinking...");
    }

    #[test]
    fn test_empty_ask_shows_usage() {
        let mut terminal = terminal();
        assert!(type_line(&mut terminal, "ask \"  \"").is_none());
        assert!(type_line(&mut terminal, "ask").is_none());
        let text = output(&terminal).join("\n");
        assert!(text.contains("Usage: ask \"your question here\""));
    }

    #[test]
    fn test_resolve_ask_replaces_placeholder() {
        let mut terminal = terminal();
        let ticket = type_line(&mut terminal, "ask hi").unwrap();
        type_line(&mut terminal, "skills");
        terminal.resolve_ask(ticket.id, Ok("Hello!\n• AWS".to_string()));
        let text = output(&terminal);
        assert!(!text.iter().any(|l| l.contains("Thinking")));
        assert_eq!(text[text.len() - 2..], ["Hello!", "• AWS"]);
    }

    #[test]
    fn test_resolve_ask_error_line() {
        let mut terminal = terminal();
        let ticket = type_line(&mut terminal, "ask hi").unwrap();
        terminal.resolve_ask(ticket.id, Err(BridgeError::TaskFailed("panicked".into())));
        assert_eq!(output(&terminal).last().unwrap(), ASK_FAILED_MESSAGE);
    }

    #[test]
    fn test_clear_then_command_leaves_only_new_output() {
        let mut terminal = terminal();
        type_line(&mut terminal, "whoami");
        type_line(&mut terminal, "clear");
        type_line(&mut terminal, "resume");
        let text = output(&terminal);
        assert!(text[0].starts_with("Terminal cleared."));
        let prompts = text
            .iter()
            .filter(|l| l.starts_with("visitor@folio:~$"))
            .count();
        assert_eq!(prompts, 1);
        assert!(!text.iter().any(|l| l.contains("SYNOPSIS")));
        assert!(text.iter().any(|l| l == "RESUME"));
    }

    #[test]
    fn test_exit_disables_input() {
        let mut terminal = terminal();
        type_line(&mut terminal, "exit");
        assert!(!terminal.input_enabled());
        let before = terminal.line_count();
        assert!(type_line(&mut terminal, "whoami").is_none());
        assert_eq!(terminal.line_count(), before);
        assert!(terminal.input().is_empty());
    }

    #[test]
    fn test_history_navigation_through_prompt() {
        let mut terminal = terminal();
        type_line(&mut terminal, "skills");
        type_line(&mut terminal, "skills");
        type_line(&mut terminal, "certs");
        assert_eq!(terminal.history().len(), 2);

        terminal.handle(InputAction::HistoryOlder);
        assert_eq!(terminal.input().as_str(), "certs");
        terminal.handle(InputAction::HistoryOlder);
        terminal.handle(InputAction::HistoryOlder);
        assert_eq!(terminal.input().as_str(), "skills");
        terminal.handle(InputAction::HistoryNewer);
        assert_eq!(terminal.input().as_str(), "certs");
        terminal.handle(InputAction::HistoryNewer);
        assert!(terminal.input().is_empty());
    }

    #[test]
    fn test_tab_completion() {
        let mut terminal = terminal();
        terminal.handle(InputAction::Insert('e'));
        terminal.handle(InputAction::Complete);
        assert_eq!(terminal.input().as_str(), "ex");
        terminal.handle(InputAction::Complete);
        assert_eq!(terminal.input().as_str(), "ex");
        assert_eq!(output(&terminal).last().unwrap(), "experience  exit");

        terminal.handle(InputAction::Insert('p'));
        terminal.handle(InputAction::Complete);
        assert_eq!(terminal.input().as_str(), "experience ");

        terminal.handle(InputAction::KillLine);
        terminal.handle(InputAction::Insert('c'));
        terminal.handle(InputAction::Insert('o'));
        terminal.handle(InputAction::Complete);
        assert_eq!(terminal.input().as_str(), "contact ");
    }

    #[test]
    fn test_scroll_resets_on_output() {
        let mut terminal = terminal();
        type_line(&mut terminal, "help");
        terminal.handle(InputAction::ScrollUp);
        assert_eq!(terminal.scroll(), SCROLL_STEP);
        type_line(&mut terminal, "whoami");
        assert_eq!(terminal.scroll(), 0);
    }

    #[test]
    fn test_scroll_reaches_first_wrapped_row() {
        let mut terminal = terminal();
        type_line(&mut terminal, "whoami");
        terminal.set_viewport(20, 5);
        for _ in 0..1000 {
            terminal.handle(InputAction::ScrollUp);
        }
        assert!(terminal.scroll() > terminal.line_count());
        assert_eq!(terminal.scroll(), terminal.max_scroll());

        let rows = renderer::visible_rows(terminal.lines(), 20, 5, terminal.scroll());
        let top: String = rows[0].iter().map(|(_, t)| t.as_str()).collect();
        assert!(top.starts_with("Welcome"), "top row was {top:?}");

        terminal.handle(InputAction::ScrollDown);
        assert_eq!(terminal.scroll(), terminal.max_scroll() - SCROLL_STEP);
    }

    #[test]
    fn test_narrower_viewport_keeps_scroll_in_range() {
        let mut terminal = terminal();
        type_line(&mut terminal, "help");
        terminal.set_viewport(20, 5);
        for _ in 0..1000 {
            terminal.handle(InputAction::ScrollUp);
        }
        terminal.set_viewport(200, 40);
        assert_eq!(terminal.scroll(), terminal.max_scroll());
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&["certs", "contact", "clear"]), "c");
        assert_eq!(common_prefix(&["experience", "exit"]), "ex");
        assert_eq!(common_prefix(&["skills"]), "skills");
        assert_eq!(common_prefix(&[]), "");
    }
}

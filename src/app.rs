//! Application root
//!
//! [`App`] owns every component and runs the event loop: terminal input,
//! live feed lines and AI answers are multiplexed with `tokio::select!` and
//! the screen is redrawn on a fixed tick when something changed.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal as RatatuiTerminal,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::ai::{AiBridge, TextGenerator};
use crate::colors::Palette;
use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::error::BridgeError;
use crate::keybindings::{Action, KeybindingManager};
use crate::live_feed::{FeedLine, FeedPanel, LiveFeed};
use crate::profile::Profile;
use crate::terminal::input::InputAction;
use crate::terminal::renderer;
use crate::terminal::{AskTicket, TerminalEmulator};
use crate::ui::ask_modal::{AskModal, ModalOutcome};
use crate::ui::profile_view::ProfileView;
use crate::ui::{render_status_bar, Screen};
use crate::view::{View, ViewManager};

/// Smallest window the layout is drawn in
const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 6;

/// Where an AI question was asked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOrigin {
    Terminal,
    Modal,
}

/// A finished AI round trip
#[derive(Debug)]
pub struct AskReply {
    pub origin: AskOrigin,
    pub ticket_id: u64,
    pub outcome: Result<String, BridgeError>,
}

pub struct App {
    config: Config,
    palette: Palette,
    keys: KeybindingManager,
    views: ViewManager,
    screen: Screen,
    terminal: TerminalEmulator,
    profile_view: ProfileView,
    modal: AskModal,
    bridge: AiBridge,
    feed: LiveFeed,
    feed_panel: FeedPanel,
    feed_rx: UnboundedReceiver<FeedLine>,
    ask_tx: UnboundedSender<AskReply>,
    ask_rx: UnboundedReceiver<AskReply>,
    notice: Option<String>,
    should_quit: bool,
    dirty: bool,
}

impl App {
    pub fn new(
        config: Config,
        profile: Option<Arc<Profile>>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let (palette, bad_colors) = Palette::from_theme(&config.theme);
        let (keys, bad_keys) = KeybindingManager::from_config(&config.keybindings);
        for problem in bad_colors.iter().chain(&bad_keys) {
            warn!("Ignoring invalid config value {}", problem);
        }
        let notice = (!bad_colors.is_empty() || !bad_keys.is_empty())
            .then(|| "Some config values were invalid; see the log".to_string());

        let (feed_tx, feed_rx) = unbounded_channel();
        let (ask_tx, ask_rx) = unbounded_channel();

        let feed = LiveFeed::new(
            config.terminal.live_feed_interval(),
            config.data.achievements_path.clone(),
            feed_tx,
        );
        let terminal = TerminalEmulator::new(
            config.terminal.prompt.as_str(),
            CommandRegistry::new(profile.clone()),
        );

        Self {
            palette,
            keys,
            views: ViewManager::new(),
            screen: Screen::new(),
            terminal,
            profile_view: ProfileView::new(profile.as_deref()),
            modal: AskModal::new(),
            bridge: AiBridge::new(profile, generator),
            feed,
            feed_panel: FeedPanel::new(config.terminal.max_feed_lines),
            feed_rx,
            ask_tx,
            ask_rx,
            notice,
            should_quit: false,
            dirty: true,
            config,
        }
    }

    /// Enter the configured start view
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        let view = self.config.app.default_view;
        self.views
            .switch_to(view, &mut self.terminal, &mut self.feed, &mut self.screen);
        self.dirty = true;
    }

    /// Run the UI until the user quits
    ///
    /// # Errors
    /// Returns an error if terminal setup, event reading or drawing fails
    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context(
            "Failed to enable raw mode. Ensure you're running in a proper terminal emulator.",
        )?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            event::EnableBracketedPaste,
            event::EnableFocusChange,
            Show
        )
        .context("Failed to setup terminal features")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal =
            RatatuiTerminal::new(backend).context("Failed to create terminal backend")?;

        self.start();
        let result = self.event_loop(&mut terminal).await;
        self.feed.stop();

        // Restore the terminal even when the loop failed
        execute!(
            terminal.backend_mut(),
            event::DisableBracketedPaste,
            event::DisableFocusChange,
            LeaveAlternateScreen,
            Show
        )?;
        disable_raw_mode()?;
        terminal.show_cursor()?;

        info!("Folio shutdown complete");
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut RatatuiTerminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let mut render_interval = interval(self.config.terminal.tick_rate());
        render_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frame_count: u64 = 0;

        while !self.should_quit {
            tokio::select! {
                // User input (higher priority)
                Ok(Ok(has_event)) = tokio::task::spawn_blocking(|| event::poll(Duration::from_millis(10))) => {
                    if has_event {
                        let event = event::read().context("Failed to read terminal event")?;
                        self.handle_event(event);
                    }
                }

                Some(line) = self.feed_rx.recv() => self.push_feed_line(line),

                Some(reply) = self.ask_rx.recv() => self.apply_reply(reply),

                _ = render_interval.tick() => {
                    if self.dirty {
                        terminal.draw(|f| self.render(f))?;
                        self.dirty = false;
                        frame_count += 1;

                        if frame_count % 1000 == 0 {
                            debug!("Rendered {} frames", frame_count);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => {
                if self.modal.is_visible() {
                    self.modal.paste(&text);
                } else if self.views.current() == View::Terminal {
                    self.terminal.paste(&text);
                }
            }
            Event::FocusLost => self.views.set_page_visible(false, &mut self.feed),
            Event::FocusGained => self.views.set_page_visible(true, &mut self.feed),
            Event::Resize(cols, rows) => debug!("Resized to {}x{}", cols, rows),
            Event::Mouse(_) => return,
        }
        self.dirty = true;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let view = self.views.current();
        let action = self.keys.get_action(view, key.code, key.modifiers);

        if self.modal.is_visible() {
            // Plain characters are text while the dialog is open
            let is_text = matches!(key.code, KeyCode::Char(_))
                && !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
            if action == Some(Action::Quit) && !is_text {
                self.should_quit = true;
                return;
            }
            if let ModalOutcome::Submitted(ticket) = self.modal.handle_key(key) {
                self.spawn_ask(AskOrigin::Modal, ticket);
            }
            return;
        }

        match action {
            Some(Action::Quit) => {
                info!("Quit requested");
                self.should_quit = true;
            }
            Some(Action::ToggleView) => {
                self.views
                    .toggle(false, &mut self.terminal, &mut self.feed, &mut self.screen);
            }
            Some(Action::OpenAsk) => self.modal.open(),
            None => match view {
                View::Terminal => {
                    if let Some(ticket) = InputAction::from_key(key)
                        .and_then(|action| self.terminal.handle(action))
                    {
                        self.spawn_ask(AskOrigin::Terminal, ticket);
                    }
                }
                View::Profile => {
                    self.profile_view.handle_key(key.code);
                }
            },
        }
    }

    fn spawn_ask(&self, origin: AskOrigin, ticket: AskTicket) {
        let bridge = self.bridge.clone();
        let tx = self.ask_tx.clone();
        debug!("Spawning AI request for ticket {}", ticket.id);
        tokio::spawn(async move {
            let question = ticket.question;
            // Inner task so a panic in the bridge still produces a reply
            let outcome = tokio::spawn(async move { bridge.ask(&question).await })
                .await
                .map_err(|e| BridgeError::TaskFailed(e.to_string()));
            let _ = tx.send(AskReply {
                origin,
                ticket_id: ticket.id,
                outcome,
            });
        });
    }

    /// Wait for the next AI answer
    pub async fn recv_reply(&mut self) -> Option<AskReply> {
        self.ask_rx.recv().await
    }

    pub fn apply_reply(&mut self, reply: AskReply) {
        match reply.origin {
            AskOrigin::Terminal => self.terminal.resolve_ask(reply.ticket_id, reply.outcome),
            AskOrigin::Modal => self.modal.resolve(reply.ticket_id, reply.outcome),
        }
        self.dirty = true;
    }

    pub fn push_feed_line(&mut self, line: FeedLine) {
        // Lines still queued from a stopped feed are dropped
        if self.feed.is_running() {
            self.feed_panel.push(line);
            self.dirty = true;
        }
    }

    fn render(&mut self, f: &mut ratatui::Frame) {
        let area = f.size();
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        match self.screen.showing() {
            Some(View::Terminal) => {
                let panes = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                    .split(chunks[0]);
                renderer::render_terminal(
                    f,
                    panes[0],
                    &mut self.terminal,
                    &self.palette,
                    self.screen.input_focused(),
                );
                renderer::render_feed(f, panes[1], &self.feed_panel, &self.palette);
            }
            Some(View::Profile) => self.profile_view.render(f, chunks[0], &self.palette),
            None => {}
        }
        self.modal.render(f, chunks[0], &self.palette);

        render_status_bar(
            f,
            chunks[1],
            self.views.current(),
            &self.palette,
            self.notice.as_deref(),
        );
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.views.current()
    }

    #[must_use]
    pub fn terminal(&self) -> &TerminalEmulator {
        &self.terminal
    }

    #[must_use]
    pub fn modal(&self) -> &AskModal {
        &self.modal
    }

    #[must_use]
    pub fn feed_panel(&self) -> &FeedPanel {
        &self.feed_panel
    }

    #[must_use]
    pub fn feed_running(&self) -> bool {
        self.feed.is_running()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, BridgeError> {
            let question = prompt
                .rsplit("**User's Question:** \"")
                .next()
                .and_then(|rest| rest.split('"').next())
                .unwrap_or_default();
            Ok(format!("echo: {question}"))
        }
    }

    fn app() -> App {
        let mut config = Config::default();
        config.data.achievements_path = "/nonexistent/achievements.json".into();
        let mut app = App::new(config, Some(Arc::new(fixtures::jane_doe())), Arc::new(Echo));
        app.start();
        app
    }

    fn key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_event(Event::Key(KeyEvent::new(code, modifiers)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            key(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_on_profile_without_feed() {
        let app = app();
        assert_eq!(app.view(), View::Profile);
        assert!(!app.feed_running());
        assert!(!app.terminal().is_initialized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_f2_toggles_and_drives_feed() {
        let mut app = app();
        key(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        assert_eq!(app.view(), View::Terminal);
        assert!(app.feed_running());

        app.handle_event(Event::FocusLost);
        assert!(!app.feed_running());
        app.handle_event(Event::FocusGained);
        assert!(app.feed_running());

        key(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert_eq!(app.view(), View::Profile);
        assert!(!app.feed_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_ask_round_trip() {
        let mut app = app();
        key(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        type_text(&mut app, "ask \"where do you work?\"");
        key(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        let reply = app.recv_reply().await.unwrap();
        assert_eq!(reply.origin, AskOrigin::Terminal);
        app.apply_reply(reply);
        let last = app.terminal().lines().last().unwrap().text();
        assert_eq!(last, "echo: where do you work?");
    }

    #[tokio::test(start_paused = true)]
    async fn test_modal_keeps_q_as_text() {
        let mut app = app();
        key(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(app.modal().is_visible());
        type_text(&mut app, "q");
        assert!(!app.should_quit());
        assert_eq!(app.modal().input().as_str(), "q");

        key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        let reply = app.recv_reply().await.unwrap();
        assert_eq!(reply.origin, AskOrigin::Modal);
        app.apply_reply(reply);
        assert_eq!(app.modal().messages().last().unwrap().text, "echo: q");

        key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.modal().is_visible());
        key(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_typing_is_not_captured_by_profile_keys() {
        let mut app = app();
        key(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        type_text(&mut app, "aq?");
        assert_eq!(app.terminal().input().as_str(), "aq?");
        assert!(!app.modal().is_visible());
        assert!(!app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_c_quits_from_anywhere() {
        let mut app = app();
        key(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        key(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_lines_reach_panel_while_running() {
        let mut app = app();
        key(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        tokio::time::sleep(Duration::from_millis(10)).await;
        while let Ok(line) = app.feed_rx.try_recv() {
            app.push_feed_line(line);
        }
        assert_eq!(app.feed_panel().len(), 1);
    }
}

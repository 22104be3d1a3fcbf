//! View manager
//!
//! Two screens share the terminal window: the profile page and the emulated
//! shell. [`ViewManager`] owns the current [`View`] and drives the side
//! effects of a transition (emulator initialisation, feed start/stop, input
//! focus). Drawing is abstracted behind [`ViewSurface`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::live_feed::LiveFeed;
use crate::terminal::TerminalEmulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Profile,
    Terminal,
}

impl View {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Profile => Self::Terminal,
            Self::Terminal => Self::Profile,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Profile => "profile",
            Self::Terminal => "terminal",
        })
    }
}

/// Whatever presents the views to the user
pub trait ViewSurface {
    fn show(&mut self, view: View);
    fn hide(&mut self, view: View);
    /// Give keyboard focus to the terminal input field
    fn focus_input(&mut self);
}

/// Current view plus window visibility
#[derive(Debug)]
pub struct ViewManager {
    current: Option<View>,
    page_visible: bool,
}

impl Default for ViewManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: None,
            page_visible: true,
        }
    }

    /// The active view; `Profile` before the first transition
    #[must_use]
    pub fn current(&self) -> View {
        self.current.unwrap_or_default()
    }

    #[must_use]
    pub fn page_visible(&self) -> bool {
        self.page_visible
    }

    /// Switch to the other view, or to the terminal when `force_terminal`
    pub fn toggle(
        &mut self,
        force_terminal: bool,
        terminal: &mut TerminalEmulator,
        feed: &mut LiveFeed,
        surface: &mut impl ViewSurface,
    ) -> View {
        let target = if force_terminal {
            View::Terminal
        } else {
            self.current().other()
        };
        self.switch_to(target, terminal, feed, surface);
        target
    }

    /// Enter `target` and apply its side effects
    pub fn switch_to(
        &mut self,
        target: View,
        terminal: &mut TerminalEmulator,
        feed: &mut LiveFeed,
        surface: &mut impl ViewSurface,
    ) {
        info!("Switching to {} view", target);
        surface.hide(target.other());
        surface.show(target);
        self.current = Some(target);

        match target {
            View::Terminal => {
                terminal.init();
                if self.page_visible {
                    feed.start();
                }
                surface.focus_input();
            }
            View::Profile => feed.stop(),
        }
    }

    /// Window focus changed; the feed only runs while the terminal is seen
    pub fn set_page_visible(&mut self, visible: bool, feed: &mut LiveFeed) {
        if self.page_visible == visible {
            return;
        }
        self.page_visible = visible;
        debug!("Page visible: {}", visible);
        if !visible {
            feed.stop();
        } else if self.current == Some(View::Terminal) {
            feed.start();
        }
    }
}

use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

use crate::config::KeyBindings;
use crate::view::View;

/// Keybinding table; every key event is resolved by a single lookup
#[derive(Debug, Clone)]
pub struct KeybindingManager {
    global: HashMap<KeyBinding, Action>,
    profile: HashMap<KeyBinding, Action>,
}

/// Key binding definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub modifiers: Vec<String>,
}

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleView,
    Quit,
    /// Open the AI question dialog
    OpenAsk,
}

/// Where a binding applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Both views, checked first
    Global,
    /// Only while the profile page is shown, where typing is not captured
    Profile,
}

impl KeybindingManager {
    /// Create new keybinding manager with defaults
    #[must_use]
    pub fn new() -> Self {
        let mut manager = Self {
            global: HashMap::new(),
            profile: HashMap::new(),
        };

        manager.load_defaults();
        manager
    }

    /// Defaults plus the user's configured combos
    ///
    /// Invalid combo strings are reported and skipped.
    pub fn from_config(config: &KeyBindings) -> (Self, Vec<String>) {
        let mut manager = Self::new();
        let mut errors = Vec::new();
        for (combo, scope, action) in [
            (&config.toggle_view, Scope::Global, Action::ToggleView),
            (&config.quit, Scope::Global, Action::Quit),
            (&config.ask, Scope::Profile, Action::OpenAsk),
        ] {
            if let Err(e) = manager.add_binding_from_string(combo, scope, action) {
                errors.push(format!("{combo}: {e}"));
            }
        }
        (manager, errors)
    }

    /// Load default keybindings
    fn load_defaults(&mut self) {
        self.add_binding("F2", &[], Scope::Global, Action::ToggleView);
        self.add_binding("t", &["Ctrl"], Scope::Global, Action::ToggleView);
        self.add_binding("c", &["Ctrl"], Scope::Global, Action::Quit);
        self.add_binding("q", &["Ctrl"], Scope::Global, Action::Quit);

        self.add_binding("a", &[], Scope::Profile, Action::OpenAsk);
        self.add_binding("?", &[], Scope::Profile, Action::OpenAsk);
        self.add_binding("q", &[], Scope::Profile, Action::Quit);
    }

    /// Add a keybinding
    pub fn add_binding(&mut self, key: &str, modifiers: &[&str], scope: Scope, action: Action) {
        let binding = KeyBinding {
            key: key.to_string(),
            modifiers: modifiers
                .iter()
                .map(std::string::ToString::to_string)
                .collect(),
        };
        let table = match scope {
            Scope::Global => &mut self.global,
            Scope::Profile => &mut self.profile,
        };
        table.insert(binding, action);
    }

    /// Parse and add a keybinding from a config string like "Ctrl+T" or "F2"
    ///
    /// Modifiers are normalised to the order Ctrl, Shift, Alt so that
    /// "Alt+Ctrl+X" and "Ctrl+Alt+X" bind the same chord.
    pub fn add_binding_from_string(
        &mut self,
        combo: &str,
        scope: Scope,
        action: Action,
    ) -> Result<(), String> {
        if combo.trim().is_empty() {
            return Err("Empty key combination".to_string());
        }

        let parts: Vec<&str> = combo.split('+').map(str::trim).collect();

        // Last part is the key, everything before is modifiers
        let key = match parts.last() {
            Some(k) if !k.is_empty() => *k,
            _ => return Err("Invalid key combination format".to_string()),
        };

        let mut normalized_mods = Vec::new();
        for m in &parts[..parts.len() - 1] {
            let normalized = match m.to_lowercase().as_str() {
                "ctrl" | "control" => "Ctrl",
                "shift" => "Shift",
                "alt" => "Alt",
                other => return Err(format!("Unknown modifier '{other}'")),
            };
            normalized_mods.push(normalized);
        }
        normalized_mods.sort_by_key(|m| match *m {
            "Ctrl" => 0,
            "Shift" => 1,
            _ => 2,
        });
        normalized_mods.dedup();

        let normalized_key = normalize_key(key)?;
        self.add_binding(&normalized_key, &normalized_mods, scope, action);
        Ok(())
    }

    /// Get the action for a key event in the given view
    ///
    /// Global bindings win over view bindings. Character keys are matched
    /// case-insensitively; Shift only counts for letters, so `?` matches
    /// whether or not the terminal reports Shift.
    #[must_use]
    pub fn get_action(&self, view: View, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        let (key_str, shift_counts) = match code {
            KeyCode::Char(c) => (c.to_lowercase().to_string(), c.is_alphabetic()),
            KeyCode::F(n) => (format!("F{n}"), true),
            KeyCode::Tab => ("Tab".to_string(), true),
            KeyCode::Enter => ("Enter".to_string(), true),
            KeyCode::Esc => ("Esc".to_string(), true),
            _ => return None,
        };

        let mut mod_vec = Vec::new();
        if modifiers.contains(KeyModifiers::CONTROL) {
            mod_vec.push("Ctrl".to_string());
        }
        if shift_counts && modifiers.contains(KeyModifiers::SHIFT) {
            mod_vec.push("Shift".to_string());
        }
        if modifiers.contains(KeyModifiers::ALT) {
            mod_vec.push("Alt".to_string());
        }

        let binding = KeyBinding {
            key: key_str,
            modifiers: mod_vec,
        };

        if let Some(action) = self.global.get(&binding) {
            return Some(*action);
        }
        match view {
            View::Profile => self.profile.get(&binding).copied(),
            View::Terminal => None,
        }
    }
}

fn normalize_key(key: &str) -> Result<String, String> {
    let key_lower = key.to_lowercase();
    let normalized = match key_lower.as_str() {
        "tab" => "Tab".to_string(),
        "enter" | "return" => "Enter".to_string(),
        "esc" | "escape" => "Esc".to_string(),
        "space" => " ".to_string(),
        k if k.len() > 1 && k.starts_with('f') => match k[1..].parse::<u8>() {
            Ok(n @ 1..=24) => format!("F{n}"),
            _ => return Err(format!("Unknown key '{key}'")),
        },
        k if k.chars().count() == 1 => k.to_string(),
        _ => return Err(format!("Unknown key '{key}'")),
    };
    Ok(normalized)
}

impl Default for KeybindingManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let manager = KeybindingManager::new();

        for view in [View::Profile, View::Terminal] {
            assert_eq!(
                manager.get_action(view, KeyCode::F(2), KeyModifiers::NONE),
                Some(Action::ToggleView)
            );
            assert_eq!(
                manager.get_action(view, KeyCode::Char('c'), KeyModifiers::CONTROL),
                Some(Action::Quit)
            );
        }
    }

    #[test]
    fn test_profile_keys_do_not_capture_terminal_typing() {
        let manager = KeybindingManager::new();

        assert_eq!(
            manager.get_action(View::Profile, KeyCode::Char('a'), KeyModifiers::NONE),
            Some(Action::OpenAsk)
        );
        assert_eq!(
            manager.get_action(View::Terminal, KeyCode::Char('a'), KeyModifiers::NONE),
            None
        );
        assert_eq!(
            manager.get_action(View::Terminal, KeyCode::Char('q'), KeyModifiers::NONE),
            None
        );
    }

    #[test]
    fn test_shift_ignored_for_symbols() {
        let manager = KeybindingManager::new();
        assert_eq!(
            manager.get_action(View::Profile, KeyCode::Char('?'), KeyModifiers::SHIFT),
            Some(Action::OpenAsk)
        );
    }

    #[test]
    fn test_binding_from_string() {
        let mut manager = KeybindingManager::new();
        manager
            .add_binding_from_string("Alt+Ctrl+V", Scope::Global, Action::ToggleView)
            .unwrap();
        manager
            .add_binding_from_string("f5", Scope::Global, Action::Quit)
            .unwrap();

        assert_eq!(
            manager.get_action(
                View::Terminal,
                KeyCode::Char('v'),
                KeyModifiers::CONTROL | KeyModifiers::ALT
            ),
            Some(Action::ToggleView)
        );
        assert_eq!(
            manager.get_action(View::Terminal, KeyCode::F(5), KeyModifiers::NONE),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_invalid_combos() {
        let mut manager = KeybindingManager::new();
        assert!(manager
            .add_binding_from_string("", Scope::Global, Action::Quit)
            .is_err());
        assert!(manager
            .add_binding_from_string("Hyper+X", Scope::Global, Action::Quit)
            .is_err());
        assert!(manager
            .add_binding_from_string("Ctrl+", Scope::Global, Action::Quit)
            .is_err());
        assert!(manager
            .add_binding_from_string("F99", Scope::Global, Action::Quit)
            .is_err());
    }

    #[test]
    fn test_from_config_reports_errors() {
        let config = KeyBindings {
            toggle_view: "F3".to_string(),
            quit: "Meta+Q".to_string(),
            ask: "i".to_string(),
        };
        let (manager, errors) = KeybindingManager::from_config(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            manager.get_action(View::Profile, KeyCode::F(3), KeyModifiers::NONE),
            Some(Action::ToggleView)
        );
        assert_eq!(
            manager.get_action(View::Profile, KeyCode::Char('i'), KeyModifiers::NONE),
            Some(Action::OpenAsk)
        );
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::view::View;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    /// View shown at startup
    pub default_view: View,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub prompt: String,

    /// Milliseconds between live feed entries
    pub live_feed_interval_ms: u64,

    /// Lines kept in the live feed panel
    pub max_feed_lines: usize,

    /// Redraw period of the UI loop
    pub tick_rate_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    /// Environment variable holding the API key; the key itself never lives
    /// in the config file
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub profile_path: PathBuf,
    pub achievements_path: PathBuf,
}

/// Hex colours (`#RRGGBB`) per semantic tone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub foreground: String,
    pub background: String,
    pub accent: String,
    pub prompt: String,
    pub success: String,
    pub info: String,
    pub warning: String,
    pub error: String,
    pub command: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub toggle_view: String,
    pub quit: String,
    pub ask: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "folio".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            default_view: View::Profile,
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: "visitor@folio:~$".to_string(),
            live_feed_interval_ms: 3000,
            max_feed_lines: 100,
            tick_rate_ms: 50,
        }
    }
}

impl TerminalConfig {
    #[must_use]
    pub fn live_feed_interval(&self) -> Duration {
        Duration::from_millis(self.live_feed_interval_ms.max(1))
    }

    #[must_use]
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            profile_path: PathBuf::from("data/resume.json"),
            achievements_path: PathBuf::from("data/achievements.json"),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            foreground: "#C9D1D9".to_string(),
            background: "#0D1117".to_string(),
            accent: "#58A6FF".to_string(),
            prompt: "#3FB950".to_string(),
            success: "#3FB950".to_string(),
            info: "#58A6FF".to_string(),
            warning: "#D29922".to_string(),
            error: "#F85149".to_string(),
            command: "#D2A8FF".to_string(),
            link: "#79C0FF".to_string(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            toggle_view: "F2".to_string(),
            quit: "Ctrl+Q".to_string(),
            ask: "a".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config =
            serde_yaml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self).context("Failed to serialize config")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path.as_ref(), contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get default configuration path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;

        Ok(home.join(".folio").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.terminal.prompt, "visitor@folio:~$");
        assert_eq!(config.terminal.live_feed_interval(), Duration::from_millis(3000));
        assert_eq!(config.terminal.max_feed_lines, 100);
        assert_eq!(config.ai.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.app.default_view, View::Profile);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let yaml = r#"
app:
  default_view: terminal
terminal:
  live_feed_interval_ms: 500
ai:
  model: gemini-1.5-pro
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.app.default_view, View::Terminal);
        assert_eq!(config.app.name, "folio");
        assert_eq!(config.terminal.live_feed_interval_ms, 500);
        assert_eq!(config.terminal.prompt, "visitor@folio:~$");
        assert_eq!(config.ai.model, "gemini-1.5-pro");
        assert_eq!(config.ai.provider, "gemini");
    }

    #[test]
    fn test_zero_durations_are_clamped() {
        let terminal = TerminalConfig {
            live_feed_interval_ms: 0,
            tick_rate_ms: 0,
            ..TerminalConfig::default()
        };
        assert_eq!(terminal.live_feed_interval(), Duration::from_millis(1));
        assert_eq!(terminal.tick_rate(), Duration::from_millis(1));
    }

    #[test]
    fn test_unknown_view_is_rejected() {
        let result: Result<Config, _> = serde_yaml::from_str("app:\n  default_view: gui\n");
        assert!(result.is_err());
    }
}

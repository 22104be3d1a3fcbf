use anyhow::{bail, Context, Result};
use ratatui::style::{Color, Modifier, Style};
use std::fmt;

use crate::config::ThemeConfig;
use crate::terminal::line::Tone;

/// 24-bit true color support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrueColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TrueColor {
    /// Create a new true color from RGB values
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            bail!("Invalid hex color '{hex}'");
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .with_context(|| format!("Invalid hex color '{hex}'"))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for TrueColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<TrueColor> for Color {
    fn from(c: TrueColor) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

/// Resolved theme colours
#[derive(Debug, Clone)]
pub struct Palette {
    pub foreground: TrueColor,
    pub background: TrueColor,
    pub accent: TrueColor,
    pub prompt: TrueColor,
    pub success: TrueColor,
    pub info: TrueColor,
    pub warning: TrueColor,
    pub error: TrueColor,
    pub command: TrueColor,
    pub link: TrueColor,
}

impl Palette {
    /// Build from the theme config, falling back per entry on bad values
    ///
    /// Returns the palette and the names of entries that were invalid.
    #[must_use]
    pub fn from_theme(theme: &ThemeConfig) -> (Self, Vec<String>) {
        let defaults = ThemeConfig::default();
        let mut invalid = Vec::new();
        let mut pick = |name: &str, value: &str, fallback: &str| {
            TrueColor::from_hex(value).unwrap_or_else(|_| {
                invalid.push(format!("{name}: {value}"));
                TrueColor::from_hex(fallback).unwrap_or(TrueColor::new(0xC0, 0xC0, 0xC0))
            })
        };

        let palette = Self {
            foreground: pick("foreground", &theme.foreground, &defaults.foreground),
            background: pick("background", &theme.background, &defaults.background),
            accent: pick("accent", &theme.accent, &defaults.accent),
            prompt: pick("prompt", &theme.prompt, &defaults.prompt),
            success: pick("success", &theme.success, &defaults.success),
            info: pick("info", &theme.info, &defaults.info),
            warning: pick("warning", &theme.warning, &defaults.warning),
            error: pick("error", &theme.error, &defaults.error),
            command: pick("command", &theme.command, &defaults.command),
            link: pick("link", &theme.link, &defaults.link),
        };
        (palette, invalid)
    }

    /// Colour of a semantic tone
    #[must_use]
    #[inline]
    pub fn tone(&self, tone: Tone) -> TrueColor {
        match tone {
            Tone::Plain | Tone::Output => self.foreground,
            Tone::Prompt => self.prompt,
            Tone::Success => self.success,
            Tone::Info => self.info,
            Tone::Warning => self.warning,
            Tone::Error => self.error,
            Tone::Command => self.command,
            Tone::Link => self.link,
        }
    }

    /// Full ratatui style of a tone
    #[must_use]
    pub fn style(&self, tone: Tone) -> Style {
        let style = Style::default().fg(self.tone(tone).into());
        match tone {
            Tone::Prompt | Tone::Command => style.add_modifier(Modifier::BOLD),
            Tone::Link => style.add_modifier(Modifier::UNDERLINED),
            _ => style,
        }
    }

    #[must_use]
    pub fn base(&self) -> Style {
        Style::default()
            .fg(self.foreground.into())
            .bg(self.background.into())
    }

    #[must_use]
    pub fn accent(&self) -> Style {
        Style::default()
            .fg(self.accent.into())
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_theme(&ThemeConfig::default()).0
    }
}

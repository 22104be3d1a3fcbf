//! Folio - a portfolio in your terminal
//!
//! This library provides the components of the folio TUI: a résumé page,
//! an emulated shell that answers questions about the résumé, a live
//! achievement feed and an AI question bridge.
//!
//! # Modules
//!
//! - [`app`]: Application root and event loop
//! - [`config`]: Configuration management and serialization
//! - [`profile`]: Résumé data model
//! - [`commands`]: Built-in terminal commands rendered from the profile
//! - [`terminal`]: Emulated shell, input editing and rendering
//! - [`live_feed`]: Timed achievement feed
//! - [`ai`]: Text-generation bridge and prompt construction
//! - [`view`]: Switching between the profile page and the terminal
//! - [`ui`]: Profile page, ask dialog and status bar
//! - [`keybindings`]: Keyboard shortcut handling
//! - [`colors`]: 24-bit theme colours

pub mod ai;
pub mod app;
pub mod colors;
pub mod commands;
pub mod config;
pub mod error;
pub mod keybindings;
pub mod live_feed;
pub mod profile;
pub mod terminal;
pub mod ui;
pub mod view;

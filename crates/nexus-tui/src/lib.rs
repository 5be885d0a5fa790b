//! nexus-tui: Terminal UI components
//!
//! Sidebar, home page, conversation view and composer for the chat client,
//! built on ratatui and crossterm.

pub mod app;
pub mod input;
pub mod theme;
pub mod widgets;

pub use app::{App, AppState};
pub use input::Action;
pub use theme::Theme;

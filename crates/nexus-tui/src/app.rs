//! Terminal lifecycle and the state trait screens implement

use crate::input::Action;
use crate::theme::Theme;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;

/// Application state trait
pub trait AppState {
    /// Handle an input action, return true to continue, false to quit
    fn handle_action(&mut self, action: Action, width: u16) -> bool;

    /// Render the UI
    fn render(&mut self, frame: &mut ratatui::Frame);
}

/// Owns the terminal while the UI is up; restores it on drop
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
    tick_rate: Duration,
}

impl App {
    /// Enter raw mode and the alternate screen
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            theme: Theme::default(),
            tick_rate: Duration::from_millis(80),
        })
    }

    /// Set the color theme
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the tick rate for animations
    pub fn with_tick_rate(mut self, rate: Duration) -> Self {
        self.tick_rate = rate;
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Draw one frame of `state`
    pub fn draw<S: AppState>(&mut self, state: &mut S) -> io::Result<()> {
        self.terminal.draw(|frame| state.render(frame))?;
        Ok(())
    }

    /// Current terminal width
    pub fn width(&self) -> io::Result<u16> {
        Ok(self.terminal.size()?.width)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

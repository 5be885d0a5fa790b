//! Color theme support

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (headers, focus, the user's messages)
    pub accent: Color,
    /// Assistant replies
    pub reply: Color,
    pub error: Color,
    pub border: Color,
    /// Cursor row in lists
    pub selection_bg: Color,
    /// Sidebar panel background
    pub sidebar_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            reply: Color::Green,
            error: Color::Red,
            border: Color::DarkGray,
            selection_bg: Color::DarkGray,
            sidebar_bg: Color::Reset,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            reply: Color::Rgb(0, 120, 60),
            error: Color::Red,
            border: Color::Gray,
            selection_bg: Color::LightBlue,
            sidebar_bg: Color::Rgb(240, 240, 240),
        }
    }

    /// Theme by config name; anything but "light" is dark
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("light") {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn reply_bold(&self) -> Style {
        Style::default().fg(self.reply).add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("Light").bg, Color::White);
        assert_eq!(Theme::from_name("dark").bg, Color::Reset);
        assert_eq!(Theme::from_name("solarized").bg, Color::Reset);
    }
}

//! Landing page shown when no conversation is selected

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

pub const HOME_TITLE: &str = "Nexus Spaces";

const HOME_PARAGRAPHS: [&str; 2] = [
    "Nexus Spaces is a social media platform for developers, designers and other skilled individuals.",
    "Join the community and connect with like-minded individuals.",
];

pub struct HomePage<'a> {
    theme: &'a Theme,
}

impl<'a> HomePage<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HomePage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(Span::styled(HOME_TITLE, self.theme.accent_bold())),
            Line::from(""),
        ];
        for paragraph in HOME_PARAGRAPHS {
            lines.push(Line::from(Span::styled(paragraph, self.theme.base_style())));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Pick a conversation or press Ctrl+N to start one.",
            self.theme.dim_style(),
        )));

        // Roughly center vertically; wrapping may add a few rows
        let top = area.height.saturating_sub(lines.len() as u16) / 2;
        let body = Rect::new(area.x, area.y + top, area.width, area.height - top);
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(body, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_renders_title() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 120, 12);
        let mut buf = Buffer::empty(area);
        HomePage::new(&theme).render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains(HOME_TITLE));
        assert!(text.contains("like-minded"));
    }
}

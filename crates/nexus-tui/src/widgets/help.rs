//! Centered popup listing commands and keys

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Maximum popup width
const MAX_POPUP_WIDTH: u16 = 70;

pub struct HelpPopup<'a> {
    text: &'a str,
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(text: &'a str, theme: &'a Theme) -> Self {
        Self { text, theme }
    }

    /// Popup size for the text, borders included
    fn size(&self, area: Rect) -> (u16, u16) {
        let widest = self.text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = (widest as u16 + 4).clamp(20, MAX_POPUP_WIDTH).min(area.width);
        let height = (self.text.lines().count() as u16 + 2).min(area.height);
        (width, height)
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.size(area);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let popup = Rect::new(x, y, width, height);

        Clear.render(popup, buf);
        let block = Block::default()
            .title(" Help (Esc to close) ")
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.accent_style());

        let lines: Vec<Line> = self
            .text
            .lines()
            .map(|l| Line::from(Span::styled(format!(" {}", l), self.theme.base_style())))
            .collect();
        Paragraph::new(lines).block(block).render(popup, buf);
    }
}

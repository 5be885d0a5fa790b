//! Multi-line draft editor

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Most text rows shown before the composer scrolls
pub const MAX_VISIBLE_LINES: u16 = 6;

/// Draft editor; Enter is handled by the caller, newlines come from
/// [`Action::Newline`] or pasted text.
#[derive(Debug, Default)]
pub struct Composer {
    content: String,
    /// Cursor position (character index, not byte index)
    cursor: usize,
    placeholder: String,
    focused: bool,
    /// File names shown under the text
    attachments: Vec<String>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Names of the files attached to the draft
    pub fn set_attachments(&mut self, names: Vec<String>) {
        self.attachments = names;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.cursor);
        self.content.insert(offset, c);
        self.cursor += 1;
    }

    fn remove_range(&mut self, from: usize, to: usize) {
        let start = self.byte_offset(from);
        let end = self.byte_offset(to);
        self.content.drain(start..end);
    }

    /// (row, column in chars) of the cursor
    fn cursor_row_col(&self) -> (usize, usize) {
        let before: String = self.content.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (row, col)
    }

    /// Char index of (row, col), clamping the column to the row length
    fn index_of(&self, row: usize, col: usize) -> usize {
        let mut index = 0;
        for (i, line) in self.content.split('\n').enumerate() {
            let len = line.chars().count();
            if i == row {
                return index + col.min(len);
            }
            index += len + 1;
        }
        self.content.chars().count()
    }

    fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// Handle an editing action; returns whether it was consumed
    pub fn handle_action(&mut self, action: &Action) -> bool {
        let char_count = self.content.chars().count();

        match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Newline => {
                self.insert_char('\n');
                true
            }
            Action::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                self.remove_range(self.cursor - 1, self.cursor);
                self.cursor -= 1;
                true
            }
            Action::Delete => {
                if self.cursor >= char_count {
                    return false;
                }
                self.remove_range(self.cursor, self.cursor + 1);
                true
            }
            Action::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            Action::Right => {
                self.cursor = (self.cursor + 1).min(char_count);
                true
            }
            Action::Up => {
                let (row, col) = self.cursor_row_col();
                if row == 0 {
                    return false;
                }
                self.cursor = self.index_of(row - 1, col);
                true
            }
            Action::Down => {
                let (row, col) = self.cursor_row_col();
                if row + 1 >= self.line_count() {
                    return false;
                }
                self.cursor = self.index_of(row + 1, col);
                true
            }
            Action::Home => {
                let (row, _) = self.cursor_row_col();
                self.cursor = self.index_of(row, 0);
                true
            }
            Action::End => {
                let (row, _) = self.cursor_row_col();
                self.cursor = self.index_of(row, usize::MAX);
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                while start > 0 && !chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                self.remove_range(start, self.cursor);
                self.cursor = start;
                true
            }
            Action::Paste(text) => {
                for c in text.replace("\r\n", "\n").chars() {
                    self.insert_char(if c == '\r' { '\n' } else { c });
                }
                true
            }
            _ => false,
        }
    }

    /// Rows needed to render, borders included
    pub fn height(&self) -> u16 {
        let text_rows = (self.line_count() as u16).clamp(1, MAX_VISIBLE_LINES);
        let attachment_rows = u16::from(!self.attachments.is_empty());
        text_rows + attachment_rows + 2
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let attachment_rows = u16::from(!self.attachments.is_empty()).min(inner.height);
        let text_height = (inner.height - attachment_rows) as usize;

        if attachment_rows > 0 {
            let label = format!("📎 {}", self.attachments.join(", "));
            let span = Span::styled(label, theme.dim_style());
            buf.set_span(
                inner.x,
                inner.y + text_height as u16,
                &span,
                inner.width,
            );
        }
        if text_height == 0 {
            return;
        }

        let (row, col) = self.cursor_row_col();
        let first = (row + 1).saturating_sub(text_height);

        let lines: Vec<Line> = if self.content.is_empty() {
            vec![Line::from(Span::styled(
                self.placeholder.clone(),
                theme.dim_style(),
            ))]
        } else {
            self.content
                .split('\n')
                .skip(first)
                .take(text_height)
                .map(|line| Line::from(Span::styled(line.to_string(), theme.base_style())))
                .collect()
        };
        let text_area = Rect::new(inner.x, inner.y, inner.width, text_height as u16);
        Paragraph::new(lines).render(text_area, buf);

        if self.focused {
            let line = self.content.split('\n').nth(row).unwrap_or("");
            let before: String = line.chars().take(col).collect();
            let x = before.width();
            let y = row - first;
            if x < inner.width as usize && y < text_height {
                if let Some(cell) = buf.cell_mut((inner.x + x as u16, inner.y + y as u16)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            composer.handle_action(&Action::Char(c));
        }
    }

    #[test]
    fn test_newline_and_height() {
        let mut composer = Composer::new();
        type_text(&mut composer, "hi");
        composer.handle_action(&Action::Newline);
        type_text(&mut composer, "there");
        assert_eq!(composer.content(), "hi\nthere");
        assert_eq!(composer.height(), 4);

        composer.set_attachments(vec!["a.png".into()]);
        assert_eq!(composer.height(), 5);
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut composer = Composer::new();
        composer.set_content("a\nlonger");
        composer.handle_action(&Action::Up);
        composer.handle_action(&Action::Char('b'));
        assert_eq!(composer.content(), "ab\nlonger");
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut composer = Composer::new();
        type_text(&mut composer, "héé");
        composer.handle_action(&Action::Backspace);
        assert_eq!(composer.content(), "hé");
        composer.handle_action(&Action::Home);
        assert!(!composer.handle_action(&Action::Backspace));
    }

    #[test]
    fn test_delete_word() {
        let mut composer = Composer::new();
        composer.set_content("hello big world  ");
        composer.handle_action(&Action::DeleteWord);
        assert_eq!(composer.content(), "hello big ");
    }

    #[test]
    fn test_paste_keeps_newlines() {
        let mut composer = Composer::new();
        composer.handle_action(&Action::Paste("one\r\ntwo".into()));
        assert_eq!(composer.content(), "one\ntwo");
    }

    #[test]
    fn test_render_with_attachment_in_one_row() {
        let mut composer = Composer::new();
        composer.set_focused(true);
        composer.set_content("one\ntwo");
        composer.set_attachments(vec!["notes.txt".into()]);
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        composer.render(area, &mut buf, &Theme::dark());

        let row: String = (0..30)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert!(row.contains("notes.txt"));
    }
}

//! Conversation sidebar

use crate::theme::Theme;
use nexus_api::ConversationSummary;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, StatefulWidget, Widget},
};

pub const SIDEBAR_TITLE: &str = "NEXUS SPACES";
pub const NEW_CHAT_LABEL: &str = "New Chat";

/// What a sidebar row refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEntry {
    NewChat,
    Conversation(String),
}

/// Cursor over the sidebar rows. Row 0 is "New Chat".
#[derive(Debug, Clone, Default)]
pub struct SidebarState {
    pub cursor: usize,
}

impl SidebarState {
    /// Move up, wrapping to the bottom
    pub fn up(&mut self, conversations: usize) {
        let rows = conversations + 1;
        self.cursor = if self.cursor == 0 {
            rows - 1
        } else {
            self.cursor.min(rows) - 1
        };
    }

    /// Move down, wrapping to the top
    pub fn down(&mut self, conversations: usize) {
        let rows = conversations + 1;
        self.cursor = (self.cursor + 1) % rows;
    }

    /// Entry under the cursor
    pub fn entry(&self, conversations: &[ConversationSummary]) -> SidebarEntry {
        match self.cursor.checked_sub(1) {
            Some(i) => conversations
                .get(i)
                .map(|s| SidebarEntry::Conversation(s.id.clone()))
                .unwrap_or(SidebarEntry::NewChat),
            None => SidebarEntry::NewChat,
        }
    }

    /// Put the cursor on `id` if it is listed
    pub fn focus_conversation(&mut self, conversations: &[ConversationSummary], id: &str) {
        if let Some(i) = conversations.iter().position(|s| s.id == id) {
            self.cursor = i + 1;
        }
    }
}

/// Sidebar listing conversations, newest first
pub struct Sidebar<'a> {
    conversations: &'a [ConversationSummary],
    selected: Option<&'a str>,
    user: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> Sidebar<'a> {
    pub fn new(conversations: &'a [ConversationSummary], theme: &'a Theme) -> Self {
        Self {
            conversations,
            selected: None,
            user: "",
            focused: false,
            theme,
        }
    }

    /// Highlight the selected conversation
    pub fn selected(mut self, selected: Option<&'a str>) -> Self {
        self.selected = selected;
        self
    }

    /// User shown in the footer
    pub fn user(mut self, user: &'a str) -> Self {
        self.user = user;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn items(&self) -> Vec<ListItem<'a>> {
        let mut items = Vec::with_capacity(self.conversations.len() + 1);
        items.push(ListItem::new(Line::from(Span::styled(
            format!("+ {}", NEW_CHAT_LABEL),
            self.theme.accent_bold(),
        ))));

        for summary in self.conversations {
            let is_selected = self.selected == Some(summary.id.as_str());
            let style = if is_selected {
                self.theme.accent_bold()
            } else {
                self.theme.base_style()
            };
            let prefix = if is_selected { "● " } else { "  " };
            let title = if summary.title.text.is_empty() {
                "Untitled"
            } else {
                summary.title.text.as_str()
            };
            items.push(ListItem::new(Line::from(Span::styled(
                format!("{}{}", prefix, title),
                style,
            ))));
        }
        items
    }

    pub fn render(self, area: Rect, buf: &mut Buffer, state: &SidebarState) {
        let block = Block::default()
            .title(format!(" {} ", SIDEBAR_TITLE))
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(if self.focused {
                self.theme.accent_style()
            } else {
                self.theme.border_style()
            })
            .style(Style::default().bg(self.theme.sidebar_bg));

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 {
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let mut list = List::new(self.items()).highlight_spacing(HighlightSpacing::Never);
        if self.focused {
            list = list.highlight_style(Style::default().bg(self.theme.selection_bg));
        }
        let mut list_state = ListState::default();
        list_state.select(Some(state.cursor.min(self.conversations.len())));
        StatefulWidget::render(list, chunks[0], buf, &mut list_state);

        let footer = if self.user.is_empty() {
            "Profile".to_string()
        } else {
            format!("@ {}", self.user)
        };
        let span = Span::styled(footer, self.theme.dim_style());
        buf.set_span(chunks[1].x, chunks[1].y, &span, chunks[1].width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_api::Title;

    fn summaries(ids: &[&str]) -> Vec<ConversationSummary> {
        ids.iter()
            .map(|id| ConversationSummary {
                id: id.to_string(),
                title: Title {
                    text: id.to_uppercase(),
                    updated: true,
                },
                timestamp: Default::default(),
            })
            .collect()
    }

    #[test]
    fn test_cursor_wraps() {
        let list = summaries(&["a", "b"]);
        let mut state = SidebarState::default();
        state.up(list.len());
        assert_eq!(state.cursor, 2);
        assert_eq!(state.entry(&list), SidebarEntry::Conversation("b".into()));
        state.down(list.len());
        assert_eq!(state.entry(&list), SidebarEntry::NewChat);
    }

    #[test]
    fn test_cursor_past_shrunk_list() {
        let list = summaries(&["a"]);
        let mut state = SidebarState { cursor: 5 };
        assert_eq!(state.entry(&list), SidebarEntry::NewChat);
        state.up(list.len());
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn test_focus_conversation() {
        let list = summaries(&["a", "b", "c"]);
        let mut state = SidebarState::default();
        state.focus_conversation(&list, "c");
        assert_eq!(state.cursor, 3);
        state.focus_conversation(&list, "missing");
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn test_render_shows_header_and_entries() {
        let list = summaries(&["a"]);
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        Sidebar::new(&list, &theme)
            .selected(Some("a"))
            .user("u1")
            .render(area, &mut buf, &SidebarState::default());

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains(SIDEBAR_TITLE));
        assert!(text.contains(NEW_CHAT_LABEL));
        assert!(text.contains("A"));
        assert!(text.contains("u1"));
    }
}

//! Message history of the loaded conversation

use crate::theme::Theme;
use nexus_api::{Conversation, Message};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget for displaying a conversation's messages
pub struct ConversationView<'a> {
    conversation: &'a Conversation,
    theme: &'a Theme,
    streaming: bool,
    scroll: usize,
}

impl<'a> ConversationView<'a> {
    pub fn new(conversation: &'a Conversation, theme: &'a Theme) -> Self {
        Self {
            conversation,
            theme,
            streaming: false,
            scroll: 0,
        }
    }

    /// Mark the last reply as still arriving
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Set scroll offset, in lines
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

fn message_lines(
    msg: &Message,
    streaming: bool,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (role, style, prefix) = if msg.is_user {
        ("You", theme.accent_bold(), "▶ ")
    } else {
        ("Assistant", theme.reply_bold(), "◀ ")
    };
    let header = if streaming {
        format!("{}{} ▌", prefix, role)
    } else {
        format!("{}{}", prefix, role)
    };
    lines.push(Line::from(Span::styled(header, style)));

    let content_width = width.saturating_sub(2).max(1);
    for line in textwrap::wrap(msg.text(), content_width) {
        lines.push(Line::from(Span::styled(
            format!("  {}", line),
            theme.base_style(),
        )));
    }

    let files = msg.content.file_count();
    if files > 0 {
        let noun = if files == 1 { "file" } else { "files" };
        lines.push(Line::from(Span::styled(
            format!("  📎 {} {} attached", files, noun),
            theme.dim_style(),
        )));
    }

    lines.push(Line::from(""));
    lines
}

/// Render every message into lines
pub fn conversation_lines(
    conversation: &Conversation,
    streaming: bool,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let last = conversation.messages.len().saturating_sub(1);
    conversation
        .messages
        .iter()
        .enumerate()
        .flat_map(|(i, msg)| {
            let live = streaming && i == last && !msg.is_user;
            message_lines(msg, live, width, theme)
        })
        .collect()
}

/// Total rendered height, for scroll clamping
pub fn content_height(conversation: &Conversation, width: usize) -> usize {
    conversation_lines(conversation, false, width, &Theme::dark()).len()
}

impl Widget for ConversationView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let lines = conversation_lines(
            self.conversation,
            self.streaming,
            area.width as usize,
            self.theme,
        );
        let visible: Vec<Line> = lines
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

//! TUI implementation for nexus

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::EventStream;
use futures::StreamExt;
use nexus_api::Attachment;
use nexus_chat::{ChatController, ChatEvent, ChatHandle, ChatStore, Route};
use nexus_tui::{
    App, AppState, Theme,
    input::{Action, event_to_action},
    widgets::{
        Composer, ConversationView, HelpPopup, HomePage, Sidebar, SidebarEntry, SidebarState,
        Spinner, conversation_view::content_height,
    },
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
    widgets::{Block, Borders},
};
use tokio::sync::{broadcast, mpsc};

use crate::commands::{CommandResult, execute_command, help_message};

const SIDEBAR_WIDTH: u16 = 32;

/// Requests from the UI to the run loop
#[derive(Debug, PartialEq, Eq)]
pub enum UiMessage {
    /// Open a conversation
    Select(String),
    /// Create a conversation
    NewChat,
    /// Refetch the list
    Refresh,
    /// User submitted the composer text
    Submit(String),
    /// Slash command
    Command(String),
    /// User requested quit
    Quit,
}

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Composer,
}

/// Outcome of a controller call run in the background
pub struct TaskResult {
    result: nexus_chat::Result<String>,
    /// Whether this was a message submit
    submit: bool,
}

/// TUI application state
pub struct TuiState {
    store: ChatStore,
    handle: ChatHandle,
    user: String,
    theme: Theme,
    route: Route,
    focus: Focus,
    sidebar: SidebarState,
    composer: Composer,
    /// Scroll offset; `usize::MAX` follows the newest message
    scroll: usize,
    status: String,
    status_is_error: bool,
    spinner_start: Instant,
    help: Option<String>,
    /// A submit was dispatched and its task has not reported back
    submit_pending: bool,
    outbox: VecDeque<UiMessage>,
}

impl TuiState {
    pub fn new(store: ChatStore, handle: ChatHandle, user: String, theme: Theme) -> Self {
        let mut composer = Composer::new().with_placeholder("Type a message...");
        composer.set_focused(true);

        Self {
            store,
            handle,
            user,
            theme,
            route: Route::Home,
            focus: Focus::Composer,
            sidebar: SidebarState::default(),
            composer,
            scroll: usize::MAX,
            status: "Loading conversations...".to_string(),
            status_is_error: false,
            spinner_start: Instant::now(),
            help: None,
            submit_pending: false,
            outbox: VecDeque::new(),
        }
    }

    /// Next request for the run loop
    pub fn next_message(&mut self) -> Option<UiMessage> {
        self.outbox.pop_front()
    }

    fn send(&mut self, msg: UiMessage) {
        self.outbox.push_back(msg);
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = false;
    }

    fn set_error(&mut self, error: impl std::fmt::Display) {
        self.status = format!("Error: {}", error);
        self.status_is_error = true;
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.composer.set_focused(focus == Focus::Composer);
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll = usize::MAX;
    }

    pub fn show_help(&mut self, text: String) {
        self.help = Some(text);
    }

    fn busy(&self) -> bool {
        self.submit_pending || self.handle.is_sending() || self.store.is_streaming()
    }

    /// Handle chat events
    pub fn handle_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::ConversationListUpdated { .. } => {
                if let Some(id) = self.store.selected_conversation() {
                    let list = self.store.conversation_list();
                    self.sidebar.focus_conversation(&list, &id);
                }
            }
            ChatEvent::SelectionChanged { .. } => {
                self.scroll_to_bottom();
            }
            ChatEvent::Navigate { route } => {
                tracing::debug!("Showing {}", route.path());
                self.route = route;
            }
            ChatEvent::ConversationLoaded { message_count, .. } => {
                self.scroll_to_bottom();
                self.set_status(format!("Loaded {} messages", message_count));
            }
            ChatEvent::MessageMerged { .. } => {
                self.scroll_to_bottom();
            }
            ChatEvent::MergeDiscarded { .. } => {
                self.set_status("Reply for another conversation finished in the background");
            }
            ChatEvent::SendStart { .. } => {
                self.spinner_start = Instant::now();
                self.set_status("Sending...");
            }
            ChatEvent::SendEnd { .. } => {
                if !self.status_is_error {
                    self.set_status("Ready");
                }
            }
            ChatEvent::Error { message } => {
                self.set_error(message);
            }
            ChatEvent::StreamingChanged { .. } => {}
        }
    }

    /// Show how a background call ended
    pub fn handle_task_result(&mut self, done: TaskResult) {
        if done.submit {
            self.submit_pending = false;
        }
        match done.result {
            Ok(message) => {
                if !message.is_empty() {
                    self.set_status(message);
                }
            }
            Err(e) => self.set_error(e),
        }
    }

    fn handle_sidebar_action(&mut self, action: Action) {
        let count = self.store.read(|s| s.conversation_list.len());
        match action {
            Action::Up => self.sidebar.up(count),
            Action::Down => self.sidebar.down(count),
            Action::Submit => {
                let list = self.store.conversation_list();
                match self.sidebar.entry(&list) {
                    SidebarEntry::NewChat => self.send(UiMessage::NewChat),
                    SidebarEntry::Conversation(id) => self.send(UiMessage::Select(id)),
                }
                self.set_focus(Focus::Composer);
            }
            Action::Char(_) | Action::Paste(_) => {
                self.set_focus(Focus::Composer);
                self.composer.handle_action(&action);
            }
            _ => {}
        }
    }

    fn handle_composer_action(&mut self, action: Action) {
        match action {
            Action::Submit => {
                let content = self.composer.content().to_string();
                if content.trim().is_empty() {
                    return;
                }
                if content.trim_start().starts_with('/') {
                    self.composer.clear();
                    self.send(UiMessage::Command(content));
                } else if self.store.selected_conversation().is_none() {
                    self.set_status("Select or create a conversation first (Ctrl+N)");
                } else if self.busy() {
                    self.set_status("Wait for the reply to finish");
                } else {
                    self.composer.clear();
                    self.submit_pending = true;
                    self.send(UiMessage::Submit(content));
                }
            }
            Action::Escape => self.set_focus(Focus::Sidebar),
            _ => {
                self.composer.handle_action(&action);
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.busy() {
            let label = if self.store.is_streaming() {
                "Receiving reply..."
            } else {
                "Waiting for reply..."
            };
            let spinner =
                Spinner::new(label, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let style = if self.status_is_error {
            self.theme.error_style()
        } else {
            self.theme.dim_style()
        };
        let span = Span::styled(format!(" {}", self.status), style);
        frame.buffer_mut().set_span(area.x, area.y, &span, area.width);
    }

    fn render_main(&mut self, frame: &mut Frame, area: Rect) {
        let state = self.store.snapshot();
        let title = match &self.route {
            Route::Home => " nexus ".to_string(),
            Route::Chat(id) => {
                let text = state
                    .summary(id)
                    .map(|s| s.title.text.as_str())
                    .filter(|t| !t.is_empty())
                    .unwrap_or("New conversation");
                format!(" {} ", text)
            }
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match &self.route {
            Route::Home => frame.render_widget(HomePage::new(&self.theme), inner),
            Route::Chat(_) => {
                let total = content_height(&state.conversation, inner.width as usize);
                let max_scroll = total.saturating_sub(inner.height as usize);
                self.scroll = self.scroll.min(max_scroll);
                let view = ConversationView::new(&state.conversation, &self.theme)
                    .streaming(self.store.is_streaming())
                    .scroll(self.scroll);
                frame.render_widget(view, inner);
            }
        }
    }
}

impl AppState for TuiState {
    fn handle_action(&mut self, action: Action, _width: u16) -> bool {
        if self.help.is_some() {
            if matches!(action, Action::Escape | Action::Submit | Action::Interrupt) {
                self.help = None;
            }
            return true;
        }

        match action {
            Action::Quit => {
                self.send(UiMessage::Quit);
                false
            }
            Action::Interrupt => {
                if self.composer.content().is_empty() {
                    self.send(UiMessage::Quit);
                    false
                } else {
                    self.composer.clear();
                    true
                }
            }
            Action::NewChat => {
                self.send(UiMessage::NewChat);
                self.set_focus(Focus::Composer);
                true
            }
            Action::Refresh => {
                self.send(UiMessage::Refresh);
                true
            }
            Action::FocusNext => {
                let next = match self.focus {
                    Focus::Sidebar => Focus::Composer,
                    Focus::Composer => Focus::Sidebar,
                };
                self.set_focus(next);
                true
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            Action::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(3);
                true
            }
            Action::ScrollDown => {
                self.scroll = self.scroll.saturating_add(3);
                true
            }
            action => {
                match self.focus {
                    Focus::Sidebar => self.handle_sidebar_action(action),
                    Focus::Composer => self.handle_composer_action(action),
                }
                true
            }
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(size);

        let (list, selected) = self
            .store
            .read(|s| (s.conversation_list.clone(), s.selected_conversation.clone()));
        Sidebar::new(&list, &self.theme)
            .selected(Some(selected.as_str()).filter(|s| !s.is_empty()))
            .user(&self.user)
            .focused(self.focus == Focus::Sidebar)
            .render(columns[0], frame.buffer_mut(), &self.sidebar);

        let files: Vec<String> = self
            .store
            .read(|s| s.draft.files.iter().map(Attachment::file_name).collect());
        self.composer.set_attachments(files);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(self.composer.height()),
            ])
            .split(columns[1]);

        self.render_main(frame, rows[0]);
        self.render_status(frame, rows[1]);
        self.composer
            .render(rows[2], frame.buffer_mut(), &self.theme);

        if let Some(text) = &self.help {
            frame.render_widget(HelpPopup::new(text, &self.theme), size);
        }
    }
}

/// Run a controller call in the background and report its result
fn spawn_task<F, Fut>(
    controller: &Arc<ChatController>,
    done_tx: &mpsc::UnboundedSender<TaskResult>,
    f: F,
) where
    F: FnOnce(Arc<ChatController>) -> Fut,
    Fut: Future<Output = nexus_chat::Result<String>> + Send + 'static,
{
    report(f(controller.clone()), done_tx, false);
}

fn report<Fut>(task: Fut, done_tx: &mpsc::UnboundedSender<TaskResult>, submit: bool)
where
    Fut: Future<Output = nexus_chat::Result<String>> + Send + 'static,
{
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = task.await;
        if let Err(ref e) = result {
            tracing::warn!("Background task failed: {}", e);
        }
        let _ = done_tx.send(TaskResult { result, submit });
    });
}

/// Dispatch one UI request; returns false to quit
fn dispatch(
    msg: UiMessage,
    state: &mut TuiState,
    controller: &Arc<ChatController>,
    done_tx: &mpsc::UnboundedSender<TaskResult>,
) -> bool {
    match msg {
        UiMessage::Select(id) => spawn_task(controller, done_tx, move |c| async move {
            c.select_conversation(id).await?;
            Ok(String::new())
        }),
        UiMessage::NewChat => spawn_task(controller, done_tx, |c| async move {
            let id = c.handle_new_chat().await?;
            Ok(format!("Started conversation {}", id))
        }),
        UiMessage::Refresh => spawn_task(controller, done_tx, |c| async move {
            c.refresh_conversation_list().await?;
            Ok("Conversation list refreshed".to_string())
        }),
        UiMessage::Submit(text) => {
            let c = controller.clone();
            let task = async move {
                Ok(match c.submit_text(&text).await? {
                    Some(outcome) => match outcome.stream_error {
                        Some(e) => format!("Reply interrupted: {}", e),
                        None => format!("Reply received ({} chunks)", outcome.chunks),
                    },
                    None => "Nothing to send".to_string(),
                })
            };
            report(task, done_tx, true);
        }
        UiMessage::Command(cmd) => {
            let Some(result) = execute_command(&cmd) else {
                return true;
            };
            match result {
                CommandResult::Message(text) => state.show_help(text),
                CommandResult::NewChat => return dispatch(UiMessage::NewChat, state, controller, done_tx),
                CommandResult::Refresh => return dispatch(UiMessage::Refresh, state, controller, done_tx),
                CommandResult::Home => spawn_task(controller, done_tx, |c| async move {
                    c.select_conversation("").await?;
                    Ok(String::new())
                }),
                CommandResult::Attach(path) => spawn_task(controller, done_tx, |c| async move {
                    let attachment = Attachment::load(&path).await?;
                    let name = attachment.file_name();
                    c.store().add_draft_file(attachment);
                    Ok(format!("Attached {}", name))
                }),
                CommandResult::Detach => {
                    let count = controller.store().clear_draft_files();
                    state.set_status(format!("Removed {} attachment(s)", count));
                }
                CommandResult::Exit => return false,
                CommandResult::Unknown(cmd) => {
                    state.set_status(format!("Unknown command: /{} (type /help)", cmd));
                }
            }
        }
        UiMessage::Quit => return false,
    }
    true
}

/// Run the TUI application
pub async fn run_tui(
    controller: Arc<ChatController>,
    theme: Theme,
    conversation: Option<String>,
    new_chat: bool,
) -> anyhow::Result<()> {
    let mut app = App::new()?.with_theme(theme);
    let mut state = TuiState::new(
        controller.store().clone(),
        controller.handle(),
        controller.user().id.clone(),
        app.theme().clone(),
    );

    let mut chat_rx = controller.subscribe();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<TaskResult>();
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(app.tick_rate());

    spawn_task(&controller, &done_tx, move |c| async move {
        c.load().await?;
        if new_chat {
            let id = c.create_conversation().await?;
            return Ok(format!("Started conversation {}", id));
        }
        if let Some(id) = conversation {
            c.select_conversation(id).await?;
        }
        Ok("Ready".to_string())
    });

    loop {
        app.draw(&mut state)?;
        let width = app.width()?;

        tokio::select! {
            event = chat_rx.recv() => match event {
                Ok(event) => state.handle_chat_event(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("UI skipped {} chat events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },

            Some(done) = done_rx.recv() => state.handle_task_result(done),

            event = event_stream.next() => match event {
                Some(Ok(evt)) => {
                    if let Some(action) = event_to_action(evt) {
                        if !state.handle_action(action, width) {
                            return Ok(());
                        }
                    }
                }
                Some(Err(e)) => return Err(anyhow::anyhow!("Event error: {}", e)),
                None => return Ok(()),
            },

            // Spinner animation
            _ = tick_interval.tick() => {}
        }

        while let Some(msg) = state.next_message() {
            if !dispatch(msg, &mut state, &controller, &done_tx) {
                return Ok(());
            }
        }
    }
}

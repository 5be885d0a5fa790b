//! Conversation state store: summaries, selection, loaded conversation,
//! draft, and the streaming flag.

use nexus_api::{Attachment, Conversation, ConversationSummary, MergeOutcome, Message};
use parking_lot::RwLock;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Message being composed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub files: Vec<Attachment>,
}

impl Draft {
    /// Whether there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.files.is_empty()
    }

    /// Whether the text is blank (files alone are not sendable)
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Plain chat state
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    /// Summaries, most recent first
    pub conversation_list: Vec<ConversationSummary>,
    /// Selected conversation id; empty when nothing is selected
    pub selected_conversation: String,
    /// Loaded conversation
    pub conversation: Conversation,
    /// Message being composed
    pub draft: Draft,
    /// Bumped on every selection; history fetched for an older one is stale
    load_generation: u64,
}

impl ChatState {
    /// Summary for a conversation id
    pub fn summary(&self, id: &str) -> Option<&ConversationSummary> {
        self.conversation_list.iter().find(|s| s.id == id)
    }
}

/// Shared handle over the chat state.
///
/// The controller is the only writer; presentation reads. Clones share the
/// same state. The streaming flag lives outside the lock so it can be read
/// without contending with merges.
#[derive(Clone, Default)]
pub struct ChatStore {
    state: Arc<RwLock<ChatState>>,
    streaming: Arc<AtomicBool>,
}

impl ChatStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned copy of the state, for rendering
    pub fn snapshot(&self) -> ChatState {
        self.state.read().clone()
    }

    /// Run `f` with shared access to the state
    pub fn read<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn conversation_list(&self) -> Vec<ConversationSummary> {
        self.state.read().conversation_list.clone()
    }

    pub fn set_conversation_list(&self, list: Vec<ConversationSummary>) {
        self.state.write().conversation_list = list;
    }

    /// Selected id, `None` when nothing is selected
    pub fn selected_conversation(&self) -> Option<String> {
        let state = self.state.read();
        (!state.selected_conversation.is_empty()).then(|| state.selected_conversation.clone())
    }

    pub fn set_selected_conversation(&self, id: impl Into<String>) {
        self.state.write().selected_conversation = id.into();
    }

    pub fn conversation(&self) -> Conversation {
        self.state.read().conversation.clone()
    }

    /// Replace the loaded conversation wholesale
    pub fn set_conversation(&self, conversation: Conversation) {
        self.state.write().conversation = conversation;
    }

    /// Load an empty conversation for `id` and start a new load generation.
    /// Returns the generation to pass to [`ChatStore::apply_history`].
    pub fn begin_load(&self, id: impl Into<String>) -> u64 {
        let mut state = self.state.write();
        state.load_generation = state.load_generation.wrapping_add(1);
        state.conversation = Conversation::new(id);
        state.load_generation
    }

    /// Install fetched history under whatever was merged locally since
    /// [`ChatStore::begin_load`]. Local messages win on id clashes and new
    /// ones keep their order after the history.
    ///
    /// Returns the resulting message count, or `None` if another selection
    /// started in the meantime.
    pub fn apply_history(&self, generation: u64, mut history: Conversation) -> Option<usize> {
        let mut state = self.state.write();
        if state.load_generation != generation {
            return None;
        }
        history.id = std::mem::take(&mut state.conversation.id);
        for message in std::mem::take(&mut state.conversation.messages) {
            history.merge_message(message);
        }
        let count = history.messages.len();
        state.conversation = history;
        Some(count)
    }

    /// Merge into the loaded conversation regardless of its id
    pub fn merge_message(&self, message: Message) -> MergeOutcome {
        self.state.write().conversation.merge_message(message)
    }

    /// Merge only if the loaded conversation is `conversation_id`.
    /// Returns `None` when the merge was discarded.
    pub fn merge_message_into(
        &self,
        conversation_id: &str,
        message: Message,
    ) -> Option<MergeOutcome> {
        let mut state = self.state.write();
        if state.conversation.id != conversation_id {
            return None;
        }
        Some(state.conversation.merge_message(message))
    }

    pub fn draft(&self) -> Draft {
        self.state.read().draft.clone()
    }

    pub fn set_draft_text(&self, text: impl Into<String>) {
        self.state.write().draft.text = text.into();
    }

    pub fn add_draft_file(&self, file: Attachment) {
        self.state.write().draft.files.push(file);
    }

    /// Remove all attached files, returning how many there were
    pub fn clear_draft_files(&self) -> usize {
        let mut state = self.state.write();
        let count = state.draft.files.len();
        state.draft.files.clear();
        count
    }

    /// Take the draft, leaving an empty one behind
    pub fn take_draft(&self) -> Draft {
        std::mem::take(&mut self.state.write().draft)
    }

    /// Whether the latest reply is still arriving
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Acquire)
    }

    /// Set the streaming flag, returning the previous value
    pub fn set_streaming(&self, streaming: bool) -> bool {
        self.streaming.swap(streaming, Ordering::AcqRel)
    }
}

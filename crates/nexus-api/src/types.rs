//! Core types exchanged with the chat backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user a chat session acts on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Display title of a conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    /// Title text shown in the sidebar
    pub text: String,
    /// Whether the backend has generated the final title
    #[serde(default)]
    pub updated: bool,
}

/// Sidebar entry for a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: Title,
    pub timestamp: DateTime<Utc>,
}

/// Sort summaries most recent first. The sort is stable, so entries with
/// equal timestamps keep the order the server sent them in.
pub fn sort_by_recency(summaries: &mut [ConversationSummary]) {
    summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Message body: text plus optional base64 data-URL attachments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl MessageContent {
    /// Text-only content
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            files: None,
        }
    }

    /// Number of attached files
    pub fn file_count(&self) -> usize {
        self.files.as_ref().map_or(0, Vec::len)
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: MessageContent,
    #[serde(rename = "isUser", default)]
    pub is_user: bool,
}

impl Message {
    /// Create a message authored by the user. An empty file list is omitted.
    pub fn user(id: impl Into<String>, text: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            id: id.into(),
            content: MessageContent {
                text: text.into(),
                files: (!files.is_empty()).then_some(files),
            },
            is_user: true,
        }
    }

    /// Create an assistant message
    pub fn assistant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: MessageContent::text(text),
            is_user: false,
        }
    }

    /// Get the message text
    pub fn text(&self) -> &str {
        &self.content.text
    }

    /// Shallow merge: every field of `other` overwrites the one in `self`.
    pub fn merge_from(&mut self, other: Message) {
        let Message {
            id,
            content,
            is_user,
        } = other;
        self.id = id;
        self.content = content;
        self.is_user = is_user;
    }
}

/// Outcome of merging a message into a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A message with a new id was appended
    Appended,
    /// An existing message was updated in place
    Updated,
}

/// A conversation with its full message history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
        }
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.messages.is_empty()
    }

    /// Find a message by id
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Merge `message` by id: update in place when present, otherwise append.
    ///
    /// Applying the same message twice leaves the conversation as after the
    /// first application.
    pub fn merge_message(&mut self, message: Message) -> MergeOutcome {
        match self.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => {
                existing.merge_from(message);
                MergeOutcome::Updated
            }
            None => {
                self.messages.push(message);
                MergeOutcome::Appended
            }
        }
    }
}

/// `{success, data}` envelope returned by the list and detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Payload, only if the backend reported success
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }
}

/// Identifier of a freshly created conversation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitConversationData {
    #[serde(default)]
    pub id: String,
}

/// Response of the conversation-init endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitConversation {
    #[serde(default)]
    pub data: Option<InitConversationData>,
}

impl InitConversation {
    /// The new conversation id, if usable
    pub fn id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.id.as_str())
            .filter(|id| !id.trim().is_empty())
    }
}

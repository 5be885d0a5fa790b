//! Chat event types

use nexus_api::Message;
use serde::{Deserialize, Serialize};

/// Views the presentation layer can show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "id", rename_all = "snake_case")]
pub enum Route {
    /// Landing page, nothing selected
    Home,
    /// Detail view of one conversation
    Chat(String),
}

impl Route {
    /// Path form, e.g. `/chat/abc`
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Chat(id) => format!("/chat/{}", id),
        }
    }
}

/// Events emitted while the controller syncs with the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The summary list was replaced
    ConversationListUpdated { count: usize },

    /// A different conversation id was selected (empty = none)
    SelectionChanged { conversation_id: String },

    /// The presentation layer should switch views
    Navigate { route: Route },

    /// A conversation's history replaced the loaded conversation
    ConversationLoaded {
        conversation_id: String,
        message_count: usize,
    },

    /// A message was appended or updated in the loaded conversation
    MessageMerged {
        conversation_id: String,
        message: Message,
    },

    /// A merge targeted a conversation that is no longer loaded
    MergeDiscarded {
        conversation_id: String,
        message_id: String,
    },

    /// A send was issued
    SendStart {
        conversation_id: String,
        message_id: String,
    },

    /// The streaming flag changed
    StreamingChanged { streaming: bool },

    /// The reply stream ended (normally or not)
    SendEnd {
        conversation_id: String,
        reply_id: Option<String>,
    },

    /// Error occurred
    Error { message: String },
}

impl ChatEvent {
    /// Check if this event ends a send
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::SendEnd { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Chat("c1".into()).path(), "/chat/c1");
    }

    #[test]
    fn test_only_send_end_is_terminal() {
        let end = ChatEvent::SendEnd {
            conversation_id: "c1".into(),
            reply_id: None,
        };
        assert!(end.is_terminal());
        assert!(!ChatEvent::Error { message: "x".into() }.is_terminal());
        assert!(!ChatEvent::StreamingChanged { streaming: false }.is_terminal());
    }

    #[test]
    fn test_event_tagging() {
        let event = ChatEvent::Navigate {
            route: Route::Chat("c1".into()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["route"]["view"], "chat");
        assert_eq!(json["route"]["id"], "c1");
    }
}

//! The remote chat API abstraction

use crate::{
    ApiResponse, ChunkStream, Conversation, ConversationSummary, InitConversation, Result, User,
};
use async_trait::async_trait;

/// The four operations the chat backend exposes
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// List conversation summaries for a user
    async fn fetch_all_conversations(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Vec<ConversationSummary>>>;

    /// Fetch one conversation's full message history
    async fn fetch_conversation(&self, conversation_id: &str) -> Result<ApiResponse<Conversation>>;

    /// Create a new conversation for a user
    async fn init_conversation(&self, user: &User) -> Result<InitConversation>;

    /// Send a message and stream back the assistant reply
    async fn send_message(
        &self,
        conversation_id: &str,
        message_id: &str,
        text: &str,
        files: &[String],
    ) -> Result<ChunkStream>;
}

//! Synchronization controller: keeps the store in step with the chat API

use futures::StreamExt;
use nexus_api::{
    Attachment, ChatApi, MergeOutcome, Message, ReplyBuilder, User, attachment, sort_by_recency,
};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    error::{Error, Result},
    events::{ChatEvent, Route},
    handle::{ChatHandle, SendGuard, SendPhase},
    ids::MessageIdGenerator,
    store::ChatStore,
};

/// What a send produced once its stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Id of the optimistic user message
    pub message_id: String,
    /// Id of the assistant reply, if any chunk arrived
    pub reply_id: Option<String>,
    /// Accumulated reply text
    pub reply_text: String,
    /// Number of chunks received
    pub chunks: usize,
    /// Error that ended the stream early
    pub stream_error: Option<String>,
    /// Whether the summary list was refreshed to pick up a new title
    pub refreshed_list: bool,
}

/// Reconciles the chat store with the remote API
pub struct ChatController {
    api: Arc<dyn ChatApi>,
    user: User,
    store: ChatStore,
    event_tx: broadcast::Sender<ChatEvent>,
    handle: ChatHandle,
    ids: MessageIdGenerator,
}

impl ChatController {
    /// Create a controller for `user` with a fresh store
    pub fn new(api: Arc<dyn ChatApi>, user: User) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            api,
            user,
            store: ChatStore::new(),
            event_tx,
            handle: ChatHandle::new(),
            ids: MessageIdGenerator::new(),
        }
    }

    /// Use a specific id generator for local messages
    pub fn with_id_generator(mut self, ids: MessageIdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Subscribe to chat events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    /// The shared store
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Get a cloneable handle for observing sends
    pub fn handle(&self) -> ChatHandle {
        self.handle.clone()
    }

    /// The session user
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Lifecycle phase, including `Composing` when a draft is pending
    pub fn send_phase(&self) -> SendPhase {
        match self.handle.phase() {
            SendPhase::Idle if !self.store.read(|s| s.draft.is_empty()) => SendPhase::Composing,
            phase => phase,
        }
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Start of a session: clear the selection and load the summary list
    pub async fn load(&self) -> Result<()> {
        self.select_conversation("").await?;
        self.refresh_conversation_list().await
    }

    /// Replace the summary list with the backend's, most recent first
    pub async fn refresh_conversation_list(&self) -> Result<()> {
        let response = self.api.fetch_all_conversations(&self.user.id).await?;
        let Some(mut list) = response.into_data() else {
            return Err(Error::Fetch("Failed to fetch conversations".to_string()));
        };

        sort_by_recency(&mut list);
        let count = list.len();
        self.store.set_conversation_list(list);
        tracing::debug!("Conversation list refreshed ({} entries)", count);
        self.emit(ChatEvent::ConversationListUpdated { count });
        Ok(())
    }

    /// Create a conversation on the backend, select it, and refresh the list.
    /// Returns the new id.
    pub async fn create_conversation(&self) -> Result<String> {
        let response = self.api.init_conversation(&self.user).await?;
        let Some(id) = response.id().map(str::to_string) else {
            return Err(Error::Fetch(
                "Conversation creation returned no id".to_string(),
            ));
        };

        tracing::info!("Created conversation {}", id);
        self.select_conversation(id.clone()).await?;
        self.refresh_conversation_list().await?;
        Ok(id)
    }

    /// "New Chat" button
    pub async fn handle_new_chat(&self) -> Result<String> {
        self.create_conversation().await
    }

    /// Select a conversation (empty id = none) and run the selection flow
    pub async fn select_conversation(&self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        self.store.set_selected_conversation(id.clone());
        self.emit(ChatEvent::SelectionChanged {
            conversation_id: id.clone(),
        });
        self.on_select(&id).await
    }

    /// Load history for the selected id and navigate to it
    async fn on_select(&self, id: &str) -> Result<()> {
        // Swap the loaded conversation first so replies still streaming into
        // the previous one get discarded.
        let generation = self.store.begin_load(id);
        if id.is_empty() {
            self.emit(ChatEvent::Navigate { route: Route::Home });
            return Ok(());
        }
        self.emit(ChatEvent::Navigate {
            route: Route::Chat(id.to_string()),
        });

        if self.store.read(|s| s.summary(id).is_none()) {
            tracing::debug!("Conversation {} not listed yet, no history to fetch", id);
            return Ok(());
        }

        let response = self.api.fetch_conversation(id).await?;
        let Some(conversation) = response.into_data() else {
            return Err(Error::Fetch(format!("Failed to fetch conversation {}", id)));
        };

        let Some(message_count) = self.store.apply_history(generation, conversation) else {
            tracing::debug!("Selection moved on while fetching {}, dropping history", id);
            return Ok(());
        };
        self.emit(ChatEvent::ConversationLoaded {
            conversation_id: id.to_string(),
            message_count,
        });
        Ok(())
    }

    /// Merge a message into the loaded conversation by id
    pub fn merge_message(&self, message: Message) -> MergeOutcome {
        let conversation_id = self.store.read(|s| s.conversation.id.clone());
        let outcome = self.store.merge_message(message.clone());
        self.emit(ChatEvent::MessageMerged {
            conversation_id,
            message,
        });
        outcome
    }

    /// Merge on behalf of a send to `conversation_id`; dropped if that
    /// conversation is no longer loaded.
    fn merge_for(&self, conversation_id: &str, message: Message) -> bool {
        match self
            .store
            .merge_message_into(conversation_id, message.clone())
        {
            Some(_) => {
                self.emit(ChatEvent::MessageMerged {
                    conversation_id: conversation_id.to_string(),
                    message,
                });
                true
            }
            None => {
                tracing::warn!(
                    "Discarding message {} for conversation {}: no longer loaded",
                    message.id,
                    conversation_id
                );
                self.emit(ChatEvent::MergeDiscarded {
                    conversation_id: conversation_id.to_string(),
                    message_id: message.id,
                });
                false
            }
        }
    }

    fn set_streaming(&self, streaming: bool) {
        if self.store.set_streaming(streaming) != streaming {
            self.emit(ChatEvent::StreamingChanged { streaming });
        }
    }

    /// Send a message and merge the streamed reply as it arrives.
    ///
    /// Stream failures end the stream without rolling anything back; they are
    /// reported in [`SendOutcome::stream_error`]. Only one send may be in
    /// flight at a time.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        files: &[Attachment],
    ) -> Result<SendOutcome> {
        let guard = self.handle.begin_send()?;
        self.send_claimed(guard, conversation_id, text, files).await
    }

    async fn send_claimed(
        &self,
        guard: SendGuard,
        conversation_id: &str,
        text: &str,
        files: &[Attachment],
    ) -> Result<SendOutcome> {
        let message_id = self.ids.next_id();
        let encoded = attachment::encode_all(files);

        self.merge_for(
            conversation_id,
            Message::user(message_id.clone(), text, encoded.clone()),
        );
        self.emit(ChatEvent::SendStart {
            conversation_id: conversation_id.to_string(),
            message_id: message_id.clone(),
        });

        let mut builder = ReplyBuilder::new();
        let mut reply_id = None;
        let mut stream_error = None;

        match self
            .api
            .send_message(conversation_id, &message_id, text, &encoded)
            .await
        {
            Ok(mut stream) => {
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(chunk) => {
                            self.handle.set_phase(SendPhase::Streaming);
                            let reply = builder.process_chunk(&chunk);
                            reply_id = Some(chunk.id.clone());
                            self.merge_for(conversation_id, reply);
                            self.set_streaming(chunk.streaming);
                        }
                        Err(e) => {
                            stream_error = Some(e.to_string());
                            break;
                        }
                    }
                }
            }
            Err(e) => stream_error = Some(e.to_string()),
        }

        if let Some(ref message) = stream_error {
            tracing::error!("Error processing response: {}", message);
            self.emit(ChatEvent::Error {
                message: message.clone(),
            });
        }
        self.set_streaming(false);
        self.emit(ChatEvent::SendEnd {
            conversation_id: conversation_id.to_string(),
            reply_id: reply_id.clone(),
        });
        drop(guard);

        let refreshed_list = self.refresh_if_title_pending(conversation_id).await?;

        Ok(SendOutcome {
            message_id,
            reply_id,
            reply_text: builder.text().to_string(),
            chunks: builder.chunk_count(),
            stream_error,
            refreshed_list,
        })
    }

    /// Refresh the list once if the backend has not finalized the title yet
    async fn refresh_if_title_pending(&self, conversation_id: &str) -> Result<bool> {
        let pending = self.store.read(|s| {
            s.summary(conversation_id)
                .is_none_or(|summary| !summary.title.updated)
        });
        if !pending {
            return Ok(false);
        }

        tracing::debug!("Title of {} not final, refreshing list", conversation_id);
        self.refresh_conversation_list().await?;
        Ok(true)
    }

    /// Conversation a submit of `text` would go to, if it is sendable
    fn submit_target(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        self.store.selected_conversation()
    }

    /// Send the draft to the selected conversation.
    ///
    /// Does nothing (`Ok(None)`) without a selection or with blank text. The
    /// draft is only taken once the send slot is claimed, so a rejected
    /// submit leaves it in place.
    pub async fn handle_submit(&self) -> Result<Option<SendOutcome>> {
        let text = self.store.read(|s| s.draft.text.clone());
        let Some(conversation_id) = self.submit_target(&text) else {
            return Ok(None);
        };

        let guard = self.handle.begin_send()?;
        let draft = self.store.take_draft();
        self.send_claimed(guard, &conversation_id, &draft.text, &draft.files)
            .await
            .map(Some)
    }

    /// Send `text` together with the draft's files, bypassing the draft text.
    /// Same no-op rules as [`ChatController::handle_submit`].
    pub async fn submit_text(&self, text: &str) -> Result<Option<SendOutcome>> {
        let Some(conversation_id) = self.submit_target(text) else {
            return Ok(None);
        };

        let guard = self.handle.begin_send()?;
        let draft = self.store.take_draft();
        self.send_claimed(guard, &conversation_id, text, &draft.files)
            .await
            .map(Some)
    }

    /// Send button
    pub async fn handle_send_message(&self) -> Result<Option<SendOutcome>> {
        self.handle_submit().await
    }
}

//! HTTP implementation of the chat API

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    ApiResponse, ChatApi, Conversation, ConversationSummary, InitConversation, User,
    error::{Error, Result},
    stream::{Chunk, ChunkStream},
};

/// Environment variable naming the backend base URL
pub const BASE_URL_ENV: &str = "NEXUS_API_URL";

/// Chat API client speaking JSON over HTTP, with replies streamed as SSE
pub struct HttpChatApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitConversationRequest<'a> {
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    message_id: &'a str,
    text: &'a str,
    files: &'a [String],
}

impl HttpChatApi {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token: None,
        })
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode its JSON body.
    ///
    /// Error statuses still carry the `{success: false}` envelope on this
    /// backend, so the body is decoded first and the status only matters when
    /// decoding fails.
    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) if status.is_success() => Err(Error::Json(e)),
            Err(_) => Err(Error::api(status.as_u16(), body)),
        }
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn fetch_all_conversations(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Vec<ConversationSummary>>> {
        tracing::debug!("GET conversations for user {}", user_id);
        let request = self
            .client
            .get(self.url("conversations"))
            .query(&[("userId", user_id)]);
        self.send_json(request).await
    }

    async fn fetch_conversation(&self, conversation_id: &str) -> Result<ApiResponse<Conversation>> {
        tracing::debug!("GET conversation {}", conversation_id);
        let request = self
            .client
            .get(self.url(&format!("conversations/{}", conversation_id)));
        self.send_json(request).await
    }

    async fn init_conversation(&self, user: &User) -> Result<InitConversation> {
        tracing::debug!("POST new conversation for user {}", user.id);
        let request = self
            .client
            .post(self.url("conversations"))
            .json(&InitConversationRequest { user_id: &user.id });
        self.send_json(request).await
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message_id: &str,
        text: &str,
        files: &[String],
    ) -> Result<ChunkStream> {
        tracing::debug!(
            "POST message {} to conversation {} ({} files)",
            message_id,
            conversation_id,
            files.len()
        );
        let body = SendMessageRequest {
            message_id,
            text,
            files,
        };
        let request = self.authorize(
            self.client
                .post(self.url(&format!("conversations/{}/messages", conversation_id)))
                .json(&body),
        );

        let event_source = EventSource::new(request)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(chunk_stream(event_source)))
    }
}

/// Decode one SSE data payload. `None` means the event carries no chunk.
fn parse_event_data(data: &str) -> Option<Result<Chunk>> {
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(serde_json::from_str(data).map_err(Error::from))
}

/// One SSE event, reduced to what the reply stream needs
#[derive(Debug)]
enum Frame {
    Open,
    Data(String),
    Ended,
    Failed(String),
}

impl From<std::result::Result<Event, reqwest_eventsource::Error>> for Frame {
    fn from(event: std::result::Result<Event, reqwest_eventsource::Error>) -> Self {
        match event {
            Ok(Event::Open) => Frame::Open,
            Ok(Event::Message(msg)) => Frame::Data(msg.data),
            Err(reqwest_eventsource::Error::StreamEnded) => Frame::Ended,
            Err(e) => Frame::Failed(e.to_string()),
        }
    }
}

fn chunk_stream(event_source: EventSource) -> impl futures::Stream<Item = Result<Chunk>> {
    chunks_from_frames(event_source.map(Frame::from))
}

/// Yield chunks until the server closes the stream, sends `[DONE]`, or
/// something fails. A chunk with `streaming: false` does not end the stream.
fn chunks_from_frames<S>(frames: S) -> impl futures::Stream<Item = Result<Chunk>>
where
    S: futures::Stream<Item = Frame> + Send,
{
    stream! {
        let mut frames = Box::pin(frames);
        while let Some(frame) = frames.next().await {
            match frame {
                Frame::Open => {}
                Frame::Data(data) => {
                    if data.trim() == "[DONE]" {
                        break;
                    }
                    match parse_event_data(&data) {
                        Some(Ok(chunk)) => yield Ok(chunk),
                        Some(Err(e)) => {
                            yield Err(e);
                            break;
                        }
                        None => {}
                    }
                }
                Frame::Ended => break,
                Frame::Failed(message) => {
                    yield Err(Error::Sse(message));
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let api = HttpChatApi::new("https://nexus.example.com/").unwrap();
        assert_eq!(api.base_url(), "https://nexus.example.com");
        assert_eq!(
            api.url("conversations/c1"),
            "https://nexus.example.com/api/conversations/c1"
        );
    }

    #[test]
    fn test_new_rejects_non_http_url() {
        let err = HttpChatApi::new("nexus.example.com").err().unwrap();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_parse_event_data_chunk() {
        let chunk = parse_event_data(r#"{"id":"a","data":"He","streaming":true}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk, Chunk::new("a", "He", true));
    }

    #[test]
    fn test_parse_event_data_skips_markers() {
        assert!(parse_event_data("").is_none());
        assert!(parse_event_data("  ").is_none());
        assert!(parse_event_data("[DONE]").is_none());
    }

    #[test]
    fn test_parse_event_data_invalid_json() {
        let result = parse_event_data("not json").unwrap();
        assert!(matches!(result, Err(Error::Json(_))));
    }

    fn data(chunk: &str) -> Frame {
        Frame::Data(chunk.to_string())
    }

    async fn collect(frames: Vec<Frame>) -> Vec<Result<Chunk>> {
        chunks_from_frames(futures::stream::iter(frames))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_stream_reads_until_server_closes() {
        let items = collect(vec![
            Frame::Open,
            data(r#"{"id":"a","data":"He","streaming":true}"#),
            data(r#"{"id":"a","data":"llo","streaming":false}"#),
            data(""),
            data(r#"{"id":"b","data":"!","streaming":false}"#),
            Frame::Ended,
            data(r#"{"id":"c","data":"late","streaming":false}"#),
        ])
        .await;

        let chunks: Vec<Chunk> = items.into_iter().map(|item| item.unwrap()).collect();
        assert_eq!(
            chunks,
            vec![
                Chunk::new("a", "He", true),
                Chunk::new("a", "llo", false),
                Chunk::new("b", "!", false),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_stops_at_done() {
        let items = collect(vec![
            data(r#"{"id":"a","data":"ok","streaming":true}"#),
            data("[DONE]"),
            data(r#"{"id":"a","data":"more","streaming":false}"#),
        ])
        .await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_error_ends_stream() {
        let items = collect(vec![
            data(r#"{"id":"a","data":"Hal","streaming":true}"#),
            Frame::Failed("connection reset".to_string()),
            data(r#"{"id":"a","data":"never","streaming":false}"#),
        ])
        .await;
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[1], Err(Error::Sse(m)) if m == "connection reset"));
    }

    #[tokio::test]
    async fn test_stream_bad_payload_ends_stream() {
        let items = collect(vec![
            data("not json"),
            data(r#"{"id":"a","data":"never","streaming":false}"#),
        ])
        .await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Json(_))));
    }

    #[test]
    fn test_send_body_is_camel_case() {
        let files = vec!["data:text/plain;base64,aGk=".to_string()];
        let body = SendMessageRequest {
            message_id: "user-1",
            text: "hi",
            files: &files,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messageId"], "user-1");
        assert_eq!(json["files"][0], "data:text/plain;base64,aGk=");
    }
}

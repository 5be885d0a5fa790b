//! Streamed reply chunks and the reply accumulator

use crate::error::Result;
use crate::types::Message;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// One increment of a streamed assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Id of the assistant message this chunk belongs to
    pub id: String,
    /// Delta text
    #[serde(default)]
    pub data: String,
    /// Whether more chunks are expected
    #[serde(default)]
    pub streaming: bool,
}

impl Chunk {
    pub fn new(id: impl Into<String>, data: impl Into<String>, streaming: bool) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            streaming,
        }
    }
}

/// A finite, non-restartable stream of reply chunks. Retrying means issuing a
/// fresh send.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Chunk>> + Send>>;

/// Accumulates chunk deltas into the full reply text.
///
/// The buffer is append-only: chunks are applied strictly in arrival order.
#[derive(Debug, Default)]
pub struct ReplyBuilder {
    text: String,
    chunks: usize,
}

impl ReplyBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a chunk and return the assistant message carrying the whole
    /// buffer so far, tagged with the chunk's id.
    pub fn process_chunk(&mut self, chunk: &Chunk) -> Message {
        self.text.push_str(&chunk.data);
        self.chunks += 1;
        Message::assistant(chunk.id.clone(), self.text.clone())
    }

    /// Accumulated text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of chunks applied
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }
}

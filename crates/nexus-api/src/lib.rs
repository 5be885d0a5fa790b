//! nexus-api: Client for the Nexus Spaces chat API
//!
//! This crate defines the wire types exchanged with the chat backend, the
//! `ChatApi` abstraction over its four endpoints, and an HTTP implementation
//! that streams assistant replies over server-sent events.

pub mod attachment;
pub mod client;
pub mod error;
pub mod http;
pub mod stream;
pub mod types;

pub use attachment::Attachment;
pub use client::ChatApi;
pub use error::{Error, Result};
pub use http::HttpChatApi;
pub use stream::{Chunk, ChunkStream, ReplyBuilder};
pub use types::*;

//! nexus-chat: Conversation state and synchronization
//!
//! This crate keeps a local conversation-state store in sync with the remote
//! chat API and merges streamed assistant replies into the loaded
//! conversation.

pub mod controller;
pub mod error;
pub mod events;
pub mod handle;
pub mod ids;
pub mod store;

pub use controller::{ChatController, SendOutcome};
pub use error::{Error, Result};
pub use events::{ChatEvent, Route};
pub use handle::{ChatHandle, SendPhase};
pub use ids::MessageIdGenerator;
pub use store::{ChatState, ChatStore, Draft};

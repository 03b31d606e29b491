//! karir-chat: Chat widget controller
//!
//! This crate provides the controller that owns the conversation, persists it
//! through a key-value store, and asks a completion client for replies.

pub mod conversation;
pub mod error;
pub mod events;
pub mod history;
pub mod locale;
pub mod store;
pub mod widget;

pub use conversation::Conversation;
pub use error::{Error, Result};
pub use events::WidgetEvent;
pub use history::ChatHistory;
pub use karir_ai::{Message, Sender};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use widget::{ChatWidget, SendOutcome, WidgetConfig};

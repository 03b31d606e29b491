//! karir-ai: Chat-completion client
//!
//! This crate holds the shared message types and the client that forwards a
//! conversation to a hosted OpenAI-compatible chat-completion endpoint.

pub mod error;
pub mod persona;
pub mod providers;
pub mod types;

pub use error::{Error, Result};
pub use providers::CompletionClient;
pub use types::*;

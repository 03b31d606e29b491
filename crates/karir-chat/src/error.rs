//! Error types for karir-chat

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias using karir-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during widget operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the completion client
    #[error(transparent)]
    Ai(#[from] karir_ai::Error),

    /// An error from the key-value store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The stored value is not a list of messages
    #[error("stored chat history is not a valid message list: {0}")]
    CorruptHistory(#[source] serde_json::Error),

    /// The conversation could not be encoded for storage
    #[error("could not encode chat history: {0}")]
    Encode(#[from] serde_json::Error),
}

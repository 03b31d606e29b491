//! Persistence adapter for the conversation
//!
//! Stores the message list as a JSON array under a single key. Every failure
//! is logged and swallowed: unreadable history means a cold start, and a
//! failed write never reaches the user.

use std::sync::Arc;

use karir_ai::Message;

use crate::{
    error::{Error, Result},
    store::KeyValueStore,
};

/// Storage key used by default
pub const DEFAULT_KEY: &str = "karirkita_chat_history";

/// Reads and writes the conversation in a key-value store
#[derive(Clone)]
pub struct ChatHistory {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ChatHistory {
    /// Use [`DEFAULT_KEY`] in `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Previously stored messages; `Ok(empty)` when the key is absent
    pub fn try_load(&self) -> Result<Vec<Message>> {
        match self.store.get(&self.key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(Error::CorruptHistory),
            None => Ok(Vec::new()),
        }
    }

    /// Previously stored messages, or empty when absent or unreadable
    pub fn load(&self) -> Vec<Message> {
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!("Could not load chat history: {}", e);
            Vec::new()
        })
    }

    /// Overwrite the stored messages
    pub fn try_save(&self, messages: &[Message]) -> Result<()> {
        let json = serde_json::to_string(messages)?;
        self.store.set(&self.key, &json)?;
        Ok(())
    }

    /// Overwrite the stored messages, logging failures
    pub fn save(&self, messages: &[Message]) {
        match self.try_save(messages) {
            Ok(()) => tracing::debug!(count = messages.len(), "Saved chat history"),
            Err(e) => tracing::warn!("Could not save chat history: {}", e),
        }
    }

    /// Remove the stored messages
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!("Could not clear chat history: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore, StoreError};

    fn memory_history() -> (Arc<MemoryStore>, ChatHistory) {
        let store = Arc::new(MemoryStore::new());
        let history = ChatHistory::new(store.clone());
        (store, history)
    }

    #[test]
    fn test_load_absent_is_empty() {
        let (_, history) = memory_history();
        assert!(history.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let (store, history) = memory_history();
        for bad in ["not json", "{\"text\":\"x\"}", "[{\"text\":1}]", "", "null"] {
            store.set(DEFAULT_KEY, bad).unwrap();
            assert!(history.load().is_empty(), "value {:?} should load as empty", bad);
        }
    }

    #[test]
    fn test_save_then_load() {
        let (store, history) = memory_history();
        let messages = vec![Message::user("hi"), Message::bot("hello")];
        history.save(&messages);

        assert_eq!(history.load(), messages);
        assert_eq!(
            store.get(DEFAULT_KEY).unwrap().as_deref(),
            Some(r#"[{"text":"hi","sender":"user"},{"text":"hello","sender":"bot"}]"#)
        );
    }

    #[test]
    fn test_reads_format_written_by_browser_widget() {
        let (store, history) = memory_history();
        store
            .set(
                DEFAULT_KEY,
                r#"[{"text":"Tips CV?","sender":"user"},{"text":"Gunakan format sederhana.","sender":"bot"}]"#,
            )
            .unwrap();

        assert_eq!(
            history.load(),
            vec![
                Message::user("Tips CV?"),
                Message::bot("Gunakan format sederhana.")
            ]
        );
    }

    #[test]
    fn test_try_variants_report_errors() {
        let store = Arc::new(MemoryStore::with_quota(32));
        let history = ChatHistory::new(store.clone());

        let err = history.try_save(&[Message::user("x".repeat(100))]).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::QuotaExceeded { .. })));

        store.set(DEFAULT_KEY, "oops").unwrap();
        let err = history.try_load().unwrap_err();
        assert!(matches!(err, Error::CorruptHistory(_)));
        assert!(err.to_string().starts_with("stored chat history is not a valid message list"));
    }

    #[test]
    fn test_save_over_quota_is_swallowed() {
        let store = Arc::new(MemoryStore::with_quota(32));
        let history = ChatHistory::new(store.clone());

        history.save(&[Message::user("x".repeat(100))]);
        assert!(store.is_empty());
        assert!(history.load().is_empty());
    }

    #[test]
    fn test_clear() {
        let (store, history) = memory_history();
        history.save(&[Message::user("hi")]);
        history.clear();
        assert!(store.is_empty());
        history.clear();
    }

    #[test]
    fn test_custom_key_isolated() {
        let store = Arc::new(MemoryStore::new());
        let a = ChatHistory::with_key(store.clone(), "a");
        let b = ChatHistory::with_key(store.clone(), "b");
        a.save(&[Message::user("only a")]);
        assert!(b.load().is_empty());
        assert_eq!(a.load().len(), 1);
    }

    #[test]
    fn test_load_with_unreadable_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "garbage").unwrap();

        let history = ChatHistory::new(Arc::new(FileStore::new(&path)));
        assert!(history.load().is_empty());

        history.save(&[Message::user("fresh")]);
        assert_eq!(history.load(), vec![Message::user("fresh")]);
    }
}

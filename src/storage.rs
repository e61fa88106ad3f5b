//! Conversation state persistence seam
//!
//! The engine defines *what* must be persisted and *when*; the store behind
//! this trait decides where. Writes carry the change token returned by the
//! matching read so concurrent writers of the same conversation are
//! detected rather than silently interleaved.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::state::PersistedConversation;

/// A loaded conversation plus its change token
#[derive(Debug, Clone, PartialEq)]
pub struct StoredConversation {
    /// The persisted state
    pub state: PersistedConversation,
    /// Token to hand back on the next write of this key
    pub token: String,
}

/// Durable key-value persistence for conversation state
///
/// Keys are caller-supplied, conversation-scoped strings. Implementations
/// return `anyhow` errors; the engine wraps them as storage failures.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load the state stored under `key`, if any
    async fn read(&self, key: &str) -> anyhow::Result<Option<StoredConversation>>;

    /// Store `state` under `key`
    ///
    /// `token` must be the token from the read that produced `state` (or
    /// `None` for a first write); a mismatch fails the write. Returns the
    /// new token.
    async fn write(
        &self,
        key: &str,
        state: &PersistedConversation,
        token: Option<&str>,
    ) -> anyhow::Result<String>;

    /// Remove the state stored under `key`
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// In-memory store for tests and single-process hosts
///
/// State is serialized to JSON on every write and parsed on every read, so
/// anything that survives a turn has provably survived a round trip through
/// the persisted representation.
#[derive(Default)]
pub struct MemoryConversationStore {
    entries: Mutex<HashMap<String, (String, u64)>>,
}

impl MemoryConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn read(&self, key: &str) -> anyhow::Result<Option<StoredConversation>> {
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some((json, version)) => {
                let state: PersistedConversation = serde_json::from_str(json)?;
                Ok(Some(StoredConversation {
                    state,
                    token: version.to_string(),
                }))
            }
            None => Ok(None),
        }
    }

    async fn write(
        &self,
        key: &str,
        state: &PersistedConversation,
        token: Option<&str>,
    ) -> anyhow::Result<String> {
        let mut entries = self.entries.lock().await;
        let next_version = match (entries.get(key), token) {
            (Some((_, current)), Some(token)) if token != current.to_string() => {
                anyhow::bail!(
                    "conversation '{key}' was modified concurrently (token {token}, current {current})"
                );
            }
            (Some((_, current)), _) => current + 1,
            (None, _) => 1,
        };
        let json = serde_json::to_string(state)?;
        entries.insert(key.to_string(), (json, next_version));
        Ok(next_version.to_string())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DialogInstance;

    #[test]
    fn round_trips_state_and_tokens() {
        tokio_test::block_on(async {
            let store = MemoryConversationStore::new();
            let mut state = PersistedConversation::default();
            state.dialog_stack.push(DialogInstance::new("root"));

            let token = store.write("conv-1", &state, None).await.unwrap();
            let loaded = store.read("conv-1").await.unwrap().unwrap();
            assert_eq!(loaded.state, state);
            assert_eq!(loaded.token, token);

            store
                .write("conv-1", &state, Some(&token))
                .await
                .unwrap();
        });
    }

    #[test]
    fn rejects_stale_tokens() {
        tokio_test::block_on(async {
            let store = MemoryConversationStore::new();
            let state = PersistedConversation::default();
            let token = store.write("conv-1", &state, None).await.unwrap();
            store.write("conv-1", &state, Some(&token)).await.unwrap();

            // First token is now stale.
            assert!(store.write("conv-1", &state, Some(&token)).await.is_err());
        });
    }

    #[test]
    fn delete_removes_state() {
        tokio_test::block_on(async {
            let store = MemoryConversationStore::new();
            let state = PersistedConversation::default();
            store.write("conv-1", &state, None).await.unwrap();
            store.delete("conv-1").await.unwrap();
            assert!(store.read("conv-1").await.unwrap().is_none());
        });
    }
}

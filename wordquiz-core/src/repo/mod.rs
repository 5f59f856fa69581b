use crate::{CoreError, ProgressStore, SessionRecord, Wordbook};
use async_trait::async_trait;

pub mod memory;

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    // Wordbooks
    async fn upsert_wordbook(&self, book: &Wordbook) -> Result<(), CoreError>;
    async fn get_wordbook(&self, hash: &str) -> Result<Option<Wordbook>, CoreError>;
    async fn list_wordbooks(&self) -> Result<Vec<Wordbook>, CoreError>;

    // Progress. Loading an unknown book yields an empty store; progress
    // is created lazily, never errored on.
    async fn load_progress(&self, hash: &str) -> Result<ProgressStore, CoreError>;
    async fn save_progress(&self, hash: &str, store: &ProgressStore) -> Result<(), CoreError>;
    async fn delete_progress(&self, hash: &str) -> Result<(), CoreError>;

    // Sessions
    async fn record_session(&self, record: &SessionRecord) -> Result<(), CoreError>;
    async fn list_sessions(&self, hash: Option<&str>) -> Result<Vec<SessionRecord>, CoreError>;
}

use crate::{CoreError, ProgressStore, SessionRecord, Wordbook};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryRepo {
    books: RwLock<HashMap<String, Wordbook>>,
    progress: RwLock<HashMap<String, ProgressStore>>,
    sessions: RwLock<Vec<SessionRecord>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::repo::ProgressRepository for MemoryRepo {
    async fn upsert_wordbook(&self, book: &Wordbook) -> Result<(), CoreError> {
        self.books
            .write()
            .insert(book.hash.clone(), book.clone());
        Ok(())
    }

    async fn get_wordbook(&self, hash: &str) -> Result<Option<Wordbook>, CoreError> {
        Ok(self.books.read().get(hash).cloned())
    }

    async fn list_wordbooks(&self) -> Result<Vec<Wordbook>, CoreError> {
        Ok(self.books.read().values().cloned().collect())
    }

    async fn load_progress(&self, hash: &str) -> Result<ProgressStore, CoreError> {
        Ok(self.progress.read().get(hash).cloned().unwrap_or_default())
    }

    async fn save_progress(&self, hash: &str, store: &ProgressStore) -> Result<(), CoreError> {
        self.progress
            .write()
            .insert(hash.to_string(), store.clone());
        Ok(())
    }

    async fn delete_progress(&self, hash: &str) -> Result<(), CoreError> {
        self.progress
            .write()
            .remove(hash)
            .ok_or(CoreError::NotFound("progress"))?;
        Ok(())
    }

    async fn record_session(&self, record: &SessionRecord) -> Result<(), CoreError> {
        self.sessions.write().push(record.clone());
        Ok(())
    }

    async fn list_sessions(&self, hash: Option<&str>) -> Result<Vec<SessionRecord>, CoreError> {
        let sessions = self.sessions.read();
        Ok(match hash {
            Some(h) => sessions
                .iter()
                .filter(|s| s.book_hash == h)
                .cloned()
                .collect(),
            None => sessions.clone(),
        })
    }
}

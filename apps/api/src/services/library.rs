use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::ApiError,
    models::{BookDescriptor, NewSavedAudio, SaveOutcome, SavedAudio, SavedBook},
    services::storage::KeyValueStore,
};

/// A record kept in the library under a fixed key.
pub trait LibraryRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KEY: &'static str;

    /// Identity used for removal
    fn record_id(&self) -> &str;

    /// Identity used for duplicate detection and `exists`
    fn dedup_key(&self) -> &str {
        self.record_id()
    }
}

impl LibraryRecord for SavedBook {
    const KEY: &'static str = "saved_books";

    fn record_id(&self) -> &str {
        &self.book.id
    }
}

impl LibraryRecord for SavedAudio {
    const KEY: &'static str = "saved_audios";

    fn record_id(&self) -> &str {
        &self.id
    }

    /// One saved soundtrack per book
    fn dedup_key(&self) -> &str {
        &self.book_id
    }
}

/// Ordered list of records stored as one JSON array.
pub struct LibraryRepository<T> {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles on the key.
    write_lock: Mutex<()>,
    _record: PhantomData<T>,
}

impl<T: LibraryRecord> LibraryRepository<T> {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        let Some(raw) = self.store.get(T::KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                // Unreadable data is treated as an empty list and replaced on next write.
                warn!("Ignoring unreadable {} data: {}", T::KEY, e);
                Ok(Vec::new())
            }
        }
    }

    /// Append `record` unless one with the same dedup key exists. Returns whether it was added.
    pub async fn add(&self, record: T) -> Result<bool, ApiError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;

        if records.iter().any(|r| r.dedup_key() == record.dedup_key()) {
            return Ok(false);
        }

        records.push(record);
        self.persist(&records).await?;
        Ok(true)
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    pub async fn remove(&self, id: &str) -> Result<bool, ApiError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;

        let before = records.len();
        records.retain(|r| r.record_id() != id);
        if records.len() == before {
            return Ok(false);
        }

        self.persist(&records).await?;
        Ok(true)
    }

    pub async fn exists(&self, key: &str) -> Result<bool, ApiError> {
        Ok(self.list().await?.iter().any(|r| r.dedup_key() == key))
    }

    async fn persist(&self, records: &[T]) -> Result<(), ApiError> {
        let raw = serde_json::to_string(records)?;
        self.store.set(T::KEY, &raw).await
    }
}

/// Saved books and saved soundtracks
pub struct LibraryService {
    books: LibraryRepository<SavedBook>,
    audios: LibraryRepository<SavedAudio>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            books: LibraryRepository::new(store.clone()),
            audios: LibraryRepository::new(store),
        }
    }

    pub async fn save_book(&self, book: BookDescriptor) -> Result<SaveOutcome, ApiError> {
        let title = book.title.clone();
        if self.books.add(SavedBook::new(book)).await? {
            info!("Saved book '{}'", title);
            Ok(SaveOutcome::ok("Book saved successfully"))
        } else {
            Ok(SaveOutcome::rejected("Book already saved"))
        }
    }

    /// Removing an id that is not saved still succeeds.
    pub async fn remove_book(&self, id: &str) -> Result<SaveOutcome, ApiError> {
        if !self.books.remove(id).await? {
            debug!("Book {} was not saved", id);
        }
        Ok(SaveOutcome::ok("Book removed"))
    }

    pub async fn saved_books(&self) -> Result<Vec<SavedBook>, ApiError> {
        self.books.list().await
    }

    pub async fn is_book_saved(&self, id: &str) -> Result<bool, ApiError> {
        self.books.exists(id).await
    }

    pub async fn save_audio(&self, audio: NewSavedAudio) -> Result<SaveOutcome, ApiError> {
        let audio = SavedAudio::from(audio);
        let book_title = audio.book_title.clone();
        if self.audios.add(audio).await? {
            info!("Saved soundtrack for '{}'", book_title);
            Ok(SaveOutcome::ok("Audio saved successfully"))
        } else {
            Ok(SaveOutcome::rejected("Audio for this book already saved"))
        }
    }

    pub async fn remove_audio(&self, id: &str) -> Result<SaveOutcome, ApiError> {
        if !self.audios.remove(id).await? {
            debug!("Audio {} was not saved", id);
        }
        Ok(SaveOutcome::ok("Audio removed"))
    }

    pub async fn saved_audios(&self) -> Result<Vec<SavedAudio>, ApiError> {
        self.audios.list().await
    }

    /// Whether a soundtrack for `book_id` is saved
    pub async fn is_audio_saved(&self, book_id: &str) -> Result<bool, ApiError> {
        self.audios.exists(book_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;

    fn book(id: &str, title: &str) -> BookDescriptor {
        BookDescriptor {
            id: id.to_string(),
            title: title.to_string(),
            authors: vec!["Frank Herbert".to_string()],
            description: String::new(),
            categories: Vec::new(),
            thumbnail_url: None,
        }
    }

    fn audio(book_id: &str) -> NewSavedAudio {
        NewSavedAudio {
            audio_url: "https://example.com/a.mp3".to_string(),
            music_prompt: "ambient".to_string(),
            book_title: "Dune".to_string(),
            book_id: book_id.to_string(),
            book_thumbnail: None,
        }
    }

    fn library() -> (LibraryService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (LibraryService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_books_are_added_once_in_order() {
        let (library, _) = library();

        assert!(library.save_book(book("1", "Dune")).await.unwrap().success);
        assert!(library.save_book(book("2", "Emma")).await.unwrap().success);

        let duplicate = library.save_book(book("1", "Dune")).await.unwrap();
        assert!(!duplicate.success);
        assert_eq!(duplicate.message, "Book already saved");

        let ids: Vec<_> = library
            .saved_books()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.book.id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_remove_and_exists_book() {
        let (library, _) = library();
        library.save_book(book("1", "Dune")).await.unwrap();

        assert!(library.is_book_saved("1").await.unwrap());
        library.remove_book("1").await.unwrap();
        assert!(!library.is_book_saved("1").await.unwrap());

        let again = library.remove_book("1").await.unwrap();
        assert!(again.success);
        assert_eq!(again.message, "Book removed");
    }

    #[tokio::test]
    async fn test_remove_unknown_audio_succeeds() {
        let (library, _) = library();
        library.save_audio(audio("dune")).await.unwrap();

        let outcome = library.remove_audio("audio_missing").await.unwrap();
        assert!(outcome.success);
        assert_eq!(library.saved_audios().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_audio_is_deduplicated_by_book() {
        let (library, _) = library();

        assert!(library.save_audio(audio("dune")).await.unwrap().success);
        let duplicate = library.save_audio(audio("dune")).await.unwrap();
        assert!(!duplicate.success);

        let saved = library.saved_audios().await.unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].id.starts_with("audio_"));
        assert!(library.is_audio_saved("dune").await.unwrap());

        library.remove_audio(&saved[0].id).await.unwrap();
        assert!(!library.is_audio_saved("dune").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (library, store) = library();
        library.save_book(book("1", "Dune")).await.unwrap();

        assert!(store.get("saved_books").await.unwrap().is_some());
        assert!(store.get("saved_audios").await.unwrap().is_none());
        assert!(library.saved_audios().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_data_is_treated_as_empty() {
        let (library, store) = library();
        store.set("saved_books", "not json").await.unwrap();

        assert!(library.saved_books().await.unwrap().is_empty());
        assert!(library.save_book(book("1", "Dune")).await.unwrap().success);
        assert_eq!(library.saved_books().await.unwrap().len(), 1);
    }
}

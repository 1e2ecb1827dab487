//! In-memory book catalog.
//!
//! All state lives behind one [`RwLock`]: mutations take the write half,
//! reads the read half, so no caller can observe a half-applied write.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Book, BookId, BookStatus, NewBook};

/// Bound on regeneration attempts when the id source returns an issued id.
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Book not found")]
    NotFound { id: BookId },

    #[error("{message}")]
    InvalidInput {
        message: String,
        fields: Vec<&'static str>,
    },

    #[error("could not generate an unused book id after {attempts} attempts")]
    IdExhausted { attempts: usize },
}

impl BookError {
    pub fn not_found(id: impl Into<BookId>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn invalid_input(message: impl Into<String>, fields: Vec<&'static str>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            fields,
        }
    }
}

type IdSource = Box<dyn Fn() -> BookId + Send + Sync>;

struct Entry {
    seq: u64,
    book: Book,
}

#[derive(Default)]
struct Catalog {
    books: HashMap<BookId, Entry>,
    /// Every id ever handed out, including deleted ones. Never pruned, so it
    /// grows by one entry per create; v4 collisions are negligible and the set
    /// exists to hold injected id sources to the never-reuse rule.
    issued: HashSet<BookId>,
    next_seq: u64,
}

/// Shared book collection handed to request handlers.
pub struct BookStore {
    catalog: RwLock<Catalog>,
    id_source: IdSource,
}

impl BookStore {
    /// Empty store issuing random v4 UUIDs.
    pub fn new() -> Self {
        Self::with_id_source(|| Uuid::new_v4().to_string())
    }

    /// Empty store drawing candidate ids from `id_source`. Candidates that
    /// were already issued are discarded.
    pub fn with_id_source<F>(id_source: F) -> Self
    where
        F: Fn() -> BookId + Send + Sync + 'static,
    {
        Self {
            catalog: RwLock::new(Catalog::default()),
            id_source: Box::new(id_source),
        }
    }

    /// Ids of every stored book, oldest first.
    pub async fn list(&self) -> Vec<BookId> {
        let catalog = self.catalog.read().await;
        let mut entries: Vec<&Entry> = catalog.books.values().collect();
        entries.sort_unstable_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.book.id.clone()).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Book, BookError> {
        self.catalog
            .read()
            .await
            .books
            .get(id)
            .map(|entry| entry.book.clone())
            .ok_or_else(|| BookError::not_found(id))
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.catalog.read().await.books.contains_key(id)
    }

    pub async fn create(&self, new_book: NewBook) -> Result<BookId, BookError> {
        let mut catalog = self.catalog.write().await;

        let id = self.fresh_id(&catalog.issued)?;
        let seq = catalog.next_seq;
        catalog.next_seq += 1;
        catalog.issued.insert(id.clone());

        let book = new_book.into_book(id.clone());
        tracing::debug!(
            book_id = %id,
            title = %book.title,
            status = %book.status,
            "book created"
        );
        catalog.books.insert(id.clone(), Entry { seq, book });

        Ok(id)
    }

    /// Create every record in order, returning their ids.
    pub async fn seed<I>(&self, books: I) -> Result<Vec<BookId>, BookError>
    where
        I: IntoIterator<Item = NewBook>,
    {
        let mut ids = Vec::new();
        for book in books {
            ids.push(self.create(book).await?);
        }
        Ok(ids)
    }

    /// Replace the status of a book, returning the updated record.
    pub async fn update_status(&self, id: &str, status: BookStatus) -> Result<Book, BookError> {
        let mut catalog = self.catalog.write().await;
        let entry = catalog
            .books
            .get_mut(id)
            .ok_or_else(|| BookError::not_found(id))?;

        let previous = entry.book.status;
        entry.book.status = status;
        tracing::debug!(book_id = %id, from = %previous, to = %status, "book status updated");

        Ok(entry.book.clone())
    }

    /// Remove a book, returning the record that was stored.
    pub async fn delete(&self, id: &str) -> Result<Book, BookError> {
        let mut catalog = self.catalog.write().await;
        let entry = catalog
            .books
            .remove(id)
            .ok_or_else(|| BookError::not_found(id))?;

        tracing::debug!(book_id = %id, "book deleted");
        Ok(entry.book)
    }

    pub async fn len(&self) -> usize {
        self.catalog.read().await.books.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.catalog.read().await.books.is_empty()
    }

    /// Drop every record. Issued ids stay retired.
    pub async fn clear(&self) {
        self.catalog.write().await.books.clear();
    }

    fn fresh_id(&self, issued: &HashSet<BookId>) -> Result<BookId, BookError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = (self.id_source)();
            if !issued.contains(&candidate) {
                return Ok(candidate);
            }
            tracing::warn!(candidate = %candidate, "id source returned an issued id; retrying");
        }
        Err(BookError::IdExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::sample_books;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn dune() -> NewBook {
        NewBook::new("Dune", "Frank Herbert", BookStatus::Unread).unwrap()
    }

    /// Id source replaying `ids` in order, then repeating the last one.
    fn scripted(ids: &'static [&'static str]) -> impl Fn() -> BookId + Send + Sync {
        let cursor = AtomicUsize::new(0);
        move || {
            let next = cursor.fetch_add(1, Ordering::SeqCst).min(ids.len() - 1);
            ids[next].to_string()
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_fields() {
        let store = BookStore::new();
        let id = store
            .create(NewBook::new("Dune", "Frank Herbert", BookStatus::Reading).unwrap())
            .await
            .unwrap();

        let book = store.get(&id).await.unwrap();
        assert_eq!(book.id, id);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.status, BookStatus::Reading);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn identical_input_yields_distinct_ids() {
        let store = BookStore::new();
        let first = store.create(dune()).await.unwrap();
        let second = store.create(dune()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.get(&first).await.unwrap().title, "Dune");
        assert_eq!(store.get(&second).await.unwrap().title, "Dune");
        assert_eq!(store.list().await, vec![first, second]);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = BookStore::new();
        assert!(matches!(
            store.get("missing").await,
            Err(BookError::NotFound { .. })
        ));
        assert!(matches!(
            store.update_status("missing", BookStatus::Read).await,
            Err(BookError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("missing").await,
            Err(BookError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_status_leaves_title_and_author() {
        let store = BookStore::new();
        let id = store.create(dune()).await.unwrap();

        let updated = store.update_status(&id, BookStatus::Read).await.unwrap();
        assert_eq!(updated.status, BookStatus::Read);

        let book = store.get(&id).await.unwrap();
        assert_eq!(book.status, BookStatus::Read);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
    }

    #[tokio::test]
    async fn deleted_book_is_gone_for_good() {
        let store = BookStore::new();
        let id = store.create(dune()).await.unwrap();

        store.delete(&id).await.unwrap();
        assert!(matches!(
            store.get(&id).await,
            Err(BookError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete(&id).await,
            Err(BookError::NotFound { .. })
        ));
        assert!(!store.list().await.contains(&id));
    }

    #[tokio::test]
    async fn deleted_ids_are_never_reissued() {
        let store = BookStore::with_id_source(scripted(&["a", "a", "b"]));
        let first = store.create(dune()).await.unwrap();
        assert_eq!(first, "a");
        store.delete(&first).await.unwrap();

        let second = store.create(dune()).await.unwrap();
        assert_eq!(second, "b");
        assert_eq!(store.list().await, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn exhausted_id_source_fails_without_inserting() {
        let store = BookStore::with_id_source(scripted(&["only"]));
        store.create(dune()).await.unwrap();

        assert!(matches!(
            store.create(dune()).await,
            Err(BookError::IdExhausted { .. })
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clear_keeps_ids_retired() {
        let store = BookStore::with_id_source(scripted(&["a", "a", "b"]));
        store.seed(vec![dune()]).await.unwrap();
        store.clear().await;
        assert!(store.is_empty().await);

        assert_eq!(store.create(dune()).await.unwrap(), "b");
    }

    #[tokio::test]
    async fn seed_preserves_order() {
        let store = BookStore::new();
        let ids = store.seed(sample_books()).await.unwrap();
        assert_eq!(store.list().await, ids);
        assert_eq!(store.get(&ids[1]).await.unwrap().title, "1984");
    }

    #[tokio::test]
    async fn concurrent_creates_keep_every_entry() {
        let store = Arc::new(BookStore::new());
        let mut tasks = Vec::new();
        for n in 0..32 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                let book =
                    NewBook::new(format!("Volume {n}"), "Anon", BookStatus::Unread).unwrap();
                store.create(book).await.unwrap()
            }));
        }

        let mut ids = HashSet::new();
        for task in tasks {
            ids.insert(task.await.unwrap());
        }
        assert_eq!(ids.len(), 32);
        assert_eq!(store.len().await, 32);
    }
}

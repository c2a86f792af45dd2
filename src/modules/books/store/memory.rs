use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::{Timestamp, Uuid};

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookFields, BookId};

/// Process-local store keeping books in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id() -> BookId {
        BookId::from(Uuid::new_v7(Timestamp::now(uuid::NoContext)).to_string())
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn create(&self, fields: BookFields) -> Result<Book, StoreError> {
        let book = Book::new(Self::next_id(), fields);
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books.read().await.clone())
    }

    async fn update_by_id(
        &self,
        id: &BookId,
        fields: BookFields,
    ) -> Result<Option<Book>, StoreError> {
        let mut books = self.books.write().await;
        Ok(books.iter_mut().find(|book| &book.id == id).map(|book| {
            *book = Book::new(id.clone(), fields);
            book.clone()
        }))
    }

    async fn delete_by_id(&self, id: &BookId) -> Result<bool, StoreError> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|book| &book.id != id);
        Ok(books.len() != before)
    }
}

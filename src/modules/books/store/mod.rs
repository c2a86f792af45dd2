//! Book persistence.
//!
//! [`BookStore`] is the seam between handlers and the document store. Inputs
//! are already schema-valid [`BookFields`], so stores only fail for
//! backend reasons.

pub use memory::InMemoryBookStore;
pub use mongo::MongoBookStore;

use async_trait::async_trait;
use bookshelf_http::error::AppError;

use super::models::{Book, BookFields, BookId};

mod memory;
mod mongo;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("invalid book id '{0}'")]
    InvalidId(BookId),

    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document store failure: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.into())
    }
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persists a new book and returns it with its assigned id
    async fn create(&self, fields: BookFields) -> Result<Book, StoreError>;

    /// Every stored book, in store order
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;

    /// Replaces all fields of the book at `id`; `None` if there is no such book
    async fn update_by_id(&self, id: &BookId, fields: BookFields)
        -> Result<Option<Book>, StoreError>;

    /// Removes the book at `id`; `false` if there was no such book
    async fn delete_by_id(&self, id: &BookId) -> Result<bool, StoreError>;
}

/// Stand-in used when no connection could be made at start-up.
///
/// The process keeps serving; every store call fails with the original reason.
#[derive(Debug, Clone)]
pub struct UnavailableBookStore {
    reason: String,
}

impl UnavailableBookStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl BookStore for UnavailableBookStore {
    async fn create(&self, _fields: BookFields) -> Result<Book, StoreError> {
        Err(self.error())
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Err(self.error())
    }

    async fn update_by_id(
        &self,
        _id: &BookId,
        _fields: BookFields,
    ) -> Result<Option<Book>, StoreError> {
        Err(self.error())
    }

    async fn delete_by_id(&self, _id: &BookId) -> Result<bool, StoreError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[tokio::test]
    async fn unavailable_store_reports_reason() {
        let store = UnavailableBookStore::new("DB_URL is not set");
        let err = store.find_all().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "document store unavailable: DB_URL is not set"
        );
    }

    #[test]
    fn store_errors_become_500() {
        let err: AppError = StoreError::InvalidId(BookId::from("nope")).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

use async_trait::async_trait;
use bookshelf_db::DbHandle;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::ReturnDocument,
    Collection,
};
use serde::{Deserialize, Serialize};

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookFields, BookId};

const BOOKS_COLLECTION: &str = "books";

/// Stored shape of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    description: String,
    status: bool,
}

impl BookDocument {
    fn new(id: ObjectId, fields: BookFields) -> Self {
        Self {
            id,
            title: fields.title.into(),
            description: fields.description.into(),
            status: fields.status,
        }
    }
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Book {
            id: BookId::from(document.id.to_hex()),
            title: document.title,
            description: document.description,
            status: document.status,
        }
    }
}

fn parse_id(id: &BookId) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id.as_str()).map_err(|_| StoreError::InvalidId(id.clone()))
}

/// Books kept in the `books` collection.
#[derive(Debug, Clone)]
pub struct MongoBookStore {
    books: Collection<BookDocument>,
}

impl MongoBookStore {
    pub fn new(db: &DbHandle) -> Self {
        Self {
            books: db.collection(BOOKS_COLLECTION),
        }
    }
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn create(&self, fields: BookFields) -> Result<Book, StoreError> {
        let document = BookDocument::new(ObjectId::new(), fields);
        self.books.insert_one(&document).await?;
        Ok(document.into())
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let documents: Vec<BookDocument> = self.books.find(doc! {}).await?.try_collect().await?;
        Ok(documents.into_iter().map(Book::from).collect())
    }

    async fn update_by_id(
        &self,
        id: &BookId,
        fields: BookFields,
    ) -> Result<Option<Book>, StoreError> {
        let object_id = parse_id(id)?;
        let replaced = self
            .books
            .find_one_and_replace(
                doc! { "_id": object_id },
                BookDocument::new(object_id, fields),
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(replaced.map(Book::from))
    }

    async fn delete_by_id(&self, id: &BookId) -> Result<bool, StoreError> {
        let object_id = parse_id(id)?;
        let result = self.books.delete_one(doc! { "_id": object_id }).await?;
        Ok(result.deleted_count > 0)
    }
}

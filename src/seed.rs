//! One-shot population of the books collection.
//!
//! Seeding is not idempotent: every run inserts the same records again.

use anyhow::Context;
use bookshelf_kernel::settings::Settings;

use crate::modules::books::models::{Book, BookFields};
use crate::modules::books::store::{BookStore, MongoBookStore};

/// A fixed record inserted by the seed, with the line logged once it exists.
#[derive(Debug, Clone, Copy)]
pub struct SeedBook {
    pub title: &'static str,
    pub description: &'static str,
    pub status: bool,
    pub announcement: &'static str,
}

pub const SEED_BOOKS: [SeedBook; 3] = [
    SeedBook {
        title: "Slaughterhouse Five",
        description: "War novel",
        status: true,
        announcement: "Slaughterhouse Five was created.",
    },
    SeedBook {
        title: "The Hitchhiker's Guide to the Galaxy",
        description: "Science Fiction",
        status: true,
        announcement: "The Hitchhiker's Guide to the Galaxy was created.",
    },
    SeedBook {
        title: "The Art of the Deal",
        description: "Fiction",
        status: false,
        announcement: "The Art of the Deal was ghost-written.",
    },
];

/// Insert [`SEED_BOOKS`] one after another, stopping at the first failure.
pub async fn seed_books(store: &dyn BookStore) -> anyhow::Result<Vec<Book>> {
    let mut created = Vec::with_capacity(SEED_BOOKS.len());

    for seed in SEED_BOOKS {
        let fields = BookFields::new(seed.title, seed.description, seed.status)
            .with_context(|| format!("seed record '{}' is invalid", seed.title))?;
        let book = store
            .create(fields)
            .await
            .with_context(|| format!("failed to insert '{}'", seed.title))?;

        tracing::info!(target: "bookshelf::seed", id = %book.id, "{}", seed.announcement);
        created.push(book);
    }

    Ok(created)
}

/// Connect with `settings`, seed, and close the connection.
pub async fn run(settings: &Settings) -> anyhow::Result<Vec<Book>> {
    let db = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to connect to the document store")?;
    let store = MongoBookStore::new(&db);

    let result = seed_books(&store).await;
    db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::{InMemoryBookStore, UnavailableBookStore};
    use crate::modules::books::BooksModule;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use bookshelf_kernel::ModuleRegistry;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn list(app: &Router) -> Vec<Book> {
        let response = app
            .clone()
            .oneshot(Request::get("/books").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn as_triples(books: &[Book]) -> Vec<(String, String, bool)> {
        let mut triples: Vec<_> = books
            .iter()
            .map(|book| (book.title.clone(), book.description.clone(), book.status))
            .collect();
        triples.sort();
        triples
    }

    #[tokio::test]
    async fn seeded_records_are_listed_and_reseeding_duplicates_them() {
        let store = Arc::new(InMemoryBookStore::new());
        let mut registry = ModuleRegistry::new();
        registry.register_custom(Arc::new(BooksModule::new(store.clone())));
        let app = bookshelf_http::build_router(&registry, &Settings::default());

        let created = seed_books(store.as_ref()).await.unwrap();
        assert_eq!(created.len(), 3);

        let expected = vec![
            ("Slaughterhouse Five".to_string(), "War novel".to_string(), true),
            ("The Art of the Deal".to_string(), "Fiction".to_string(), false),
            (
                "The Hitchhiker's Guide to the Galaxy".to_string(),
                "Science Fiction".to_string(),
                true,
            ),
        ];
        assert_eq!(as_triples(&list(&app).await), expected);

        seed_books(store.as_ref()).await.unwrap();
        let books = list(&app).await;
        assert_eq!(books.len(), 6);

        let mut doubled: Vec<_> = expected.iter().chain(expected.iter()).cloned().collect();
        doubled.sort();
        assert_eq!(as_triples(&books), doubled);
    }

    #[tokio::test]
    async fn seeding_stops_at_first_failure() {
        let store = UnavailableBookStore::new("DB_URL is not set");
        let err = seed_books(&store).await.unwrap_err();
        assert!(err.to_string().contains("Slaughterhouse Five"));
    }

    #[tokio::test]
    async fn run_requires_a_connection_string() {
        let err = run(&Settings::default()).await.unwrap_err();
        assert!(format!("{err:#}").contains("DB_URL is not set"));
    }
}

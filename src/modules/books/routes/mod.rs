//! HTTP handlers for the books resource.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use bookshelf_http::error::{AppError, JsonBody};
use utoipa::OpenApi;

use super::models::{Book, BookFields, BookId};
use super::store::BookStore;

/// Store shared by every request.
pub type SharedBookStore = Arc<dyn BookStore>;

/// Routes for `/books` and `/books/{id}` bound to `store`.
pub fn router(store: SharedBookStore) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", put(update_book).delete(delete_book))
        .with_state(store)
}

#[derive(OpenApi)]
#[openapi(
    paths(list_books, create_book, update_book, delete_book),
    components(schemas(Book, BookFields)),
    tags((name = "Books", description = "Book records"))
)]
pub struct BooksApi;

/// List every book
#[utoipa::path(
    get,
    path = "/books",
    tag = "Books",
    responses(
        (status = 200, description = "Every stored book", body = [Book]),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain")
    )
)]
async fn list_books(State(store): State<SharedBookStore>) -> Result<Json<Vec<Book>>, AppError> {
    let books = store
        .find_all()
        .await
        .inspect_err(|err| tracing::warn!(error = %err, "failed to list books"))?;
    Ok(Json(books))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "Books",
    request_body = BookFields,
    responses(
        (status = 201, description = "Created book", body = Book),
        (status = 500, description = "Invalid body or store failure", body = String, content_type = "text/plain")
    )
)]
async fn create_book(
    State(store): State<SharedBookStore>,
    JsonBody(fields): JsonBody<BookFields>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    tracing::debug!(?fields, "creating book");
    let book = store
        .create(fields)
        .await
        .inspect_err(|err| tracing::warn!(error = %err, "failed to create book"))?;
    tracing::info!(id = %book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace every field of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = String, Path, description = "Store-assigned book id")),
    request_body = BookFields,
    responses(
        (status = 201, description = "Book after replacement", body = Book),
        (status = 404, description = "No book with this id", body = String, content_type = "text/plain"),
        (status = 500, description = "Invalid body, malformed id or store failure", body = String, content_type = "text/plain")
    )
)]
async fn update_book(
    State(store): State<SharedBookStore>,
    Path(id): Path<BookId>,
    JsonBody(fields): JsonBody<BookFields>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let updated = store
        .update_by_id(&id, fields)
        .await
        .inspect_err(|err| tracing::warn!(%id, error = %err, "failed to update book"))?;

    match updated {
        Some(book) => {
            tracing::info!(%id, "book replaced");
            Ok((StatusCode::CREATED, Json(book)))
        }
        None => Err(AppError::not_found(format!("book {id} not found"))),
    }
}

/// Delete a book; deleting an unknown id also answers 204
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = String, Path, description = "Store-assigned book id")),
    responses(
        (status = 204, description = "Book deleted or already absent"),
        (status = 500, description = "Malformed id or store failure", body = String, content_type = "text/plain")
    )
)]
async fn delete_book(
    State(store): State<SharedBookStore>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, AppError> {
    let deleted = store
        .delete_by_id(&id)
        .await
        .inspect_err(|err| tracing::warn!(%id, error = %err, "failed to delete book"))?;

    if deleted {
        tracing::info!(%id, "book deleted");
    } else {
        tracing::debug!(%id, "delete of unknown book");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::{InMemoryBookStore, UnavailableBookStore};
    use crate::modules::books::BooksModule;
    use axum::{body::Body, http::Request, response::Response};
    use bookshelf_http::router::UNMATCHED_ROUTE_BODY;
    use bookshelf_kernel::{settings::Settings, ModuleRegistry};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(store: SharedBookStore) -> Router {
        let mut registry = ModuleRegistry::new();
        registry.register_custom(Arc::new(BooksModule::new(store)));
        bookshelf_http::build_router(&registry, &Settings::default())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    async fn body_text(response: Response) -> String {
        String::from_utf8(body_bytes(response).await).unwrap()
    }

    async fn list(app: &Router) -> Vec<Book> {
        let response = send(app, "GET", "/books", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_value(body_json(response).await).unwrap()
    }

    fn slaughterhouse() -> Value {
        json!({"title": "Slaughterhouse Five", "description": "War novel", "status": true})
    }

    #[tokio::test]
    async fn create_returns_201_with_generated_id() {
        let app = app(Arc::new(InMemoryBookStore::new()));

        let first = send(&app, "POST", "/books", Some(slaughterhouse())).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let first = body_json(first).await;
        assert_eq!(first["title"], "Slaughterhouse Five");
        assert_eq!(first["description"], "War novel");
        assert_eq!(first["status"], true);

        let second = body_json(send(&app, "POST", "/books", Some(slaughterhouse())).await).await;
        assert!(first["id"].is_string());
        assert_ne!(first["id"], second["id"]);
    }

    #[tokio::test]
    async fn invalid_bodies_are_rejected_and_not_stored() {
        let app = app(Arc::new(InMemoryBookStore::new()));

        let bodies = [
            json!({"title": "Slaughterhouse Five", "description": "War novel"}),
            json!({"description": "War novel", "status": true}),
            json!({"title": "", "description": "War novel", "status": true}),
            json!({"title": "Slaughterhouse Five", "description": "War novel", "status": "yes"}),
            json!({"title": "Slaughterhouse Five", "description": "War novel", "status": true, "pages": 190}),
        ];
        for body in bodies {
            let response = send(&app, "POST", "/books", Some(body)).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }

        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn list_returns_exactly_created_books() {
        let app = app(Arc::new(InMemoryBookStore::new()));
        assert!(list(&app).await.is_empty());

        let a: Book = serde_json::from_value(
            body_json(send(&app, "POST", "/books", Some(slaughterhouse())).await).await,
        )
        .unwrap();
        let b: Book = serde_json::from_value(
            body_json(
                send(
                    &app,
                    "POST",
                    "/books",
                    Some(json!({"title": "The Art of the Deal", "description": "Fiction", "status": false})),
                )
                .await,
            )
            .await,
        )
        .unwrap();

        let mut books = list(&app).await;
        books.sort_by(|x, y| x.id.as_str().cmp(y.id.as_str()));
        let mut expected = vec![a, b];
        expected.sort_by(|x, y| x.id.as_str().cmp(y.id.as_str()));
        assert_eq!(books, expected);
    }

    #[tokio::test]
    async fn put_replaces_the_whole_record() {
        let app = app(Arc::new(InMemoryBookStore::new()));
        let created = body_json(send(&app, "POST", "/books", Some(slaughterhouse())).await).await;
        let id = created["id"].as_str().unwrap().to_string();

        let replacement = json!({"title": "Cat's Cradle", "description": "Satire", "status": false});
        let response = send(&app, "PUT", &format!("/books/{id}"), Some(replacement)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let expected = Book {
            id: BookId::from(id.as_str()),
            title: "Cat's Cradle".to_string(),
            description: "Satire".to_string(),
            status: false,
        };
        let updated: Book = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(updated, expected);
        assert_eq!(list(&app).await, vec![expected]);
    }

    #[tokio::test]
    async fn put_on_missing_id_is_404() {
        let app = app(Arc::new(InMemoryBookStore::new()));
        let response = send(&app, "PUT", "/books/missing", Some(slaughterhouse())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "book missing not found");
        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn put_with_partial_body_is_rejected() {
        let app = app(Arc::new(InMemoryBookStore::new()));
        let created = body_json(send(&app, "POST", "/books", Some(slaughterhouse())).await).await;
        let id = created["id"].as_str().unwrap();

        let response = send(&app, "PUT", &format!("/books/{id}"), Some(json!({"status": false}))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(list(&app).await[0].status);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let app = app(Arc::new(InMemoryBookStore::new()));
        let created = body_json(send(&app, "POST", "/books", Some(slaughterhouse())).await).await;
        let id = created["id"].as_str().unwrap();

        let response = send(&app, "DELETE", &format!("/books/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(response).await.is_empty());
        assert!(list(&app).await.iter().all(|book| book.id.as_str() != id));
    }

    #[tokio::test]
    async fn delete_of_missing_id_is_still_204() {
        let app = app(Arc::new(InMemoryBookStore::new()));
        let response = send(&app, "DELETE", "/books/missing", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn unknown_get_paths_answer_fixed_500() {
        let app = app(Arc::new(InMemoryBookStore::new()));

        for path in ["/unknown-path", "/books/extra/segment", "/book"] {
            let response = send(&app, "GET", path, None).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body_text(response).await, UNMATCHED_ROUTE_BODY);
        }
    }

    #[tokio::test]
    async fn liveness_is_served_next_to_books() {
        let app = app(Arc::new(InMemoryBookStore::new()));
        let response = send(&app, "GET", "/", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, bookshelf_http::LIVENESS_BODY);
    }

    #[tokio::test]
    async fn unavailable_store_fails_book_routes_only() {
        let app = app(Arc::new(UnavailableBookStore::new("DB_URL is not set")));

        let response = send(&app, "GET", "/books", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "document store unavailable: DB_URL is not set"
        );

        let response = send(&app, "POST", "/books", Some(slaughterhouse())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = send(&app, "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn openapi_fragment_documents_both_paths() {
        let document = serde_json::to_value(BooksApi::openapi()).unwrap();
        assert!(document["paths"]["/books"]["get"].is_object());
        assert!(document["paths"]["/books"]["post"].is_object());
        assert!(document["paths"]["/books/{id}"]["put"].is_object());
        assert!(document["paths"]["/books/{id}"]["delete"].is_object());
        assert!(document["components"]["schemas"]["Book"].is_object());
    }
}

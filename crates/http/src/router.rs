//! Router builder for the bookshelf HTTP server

use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

use bookshelf_kernel::ModuleRegistry;

use crate::MakeRequestUuidV7;

/// Body sent for unmatched GET requests.
pub const UNMATCHED_ROUTE_BODY: &str = r#""error": "Something went wrong""#;

/// Builder for constructing the main HTTP router
///
/// Routes and fallbacks must be added before any `with_*` middleware call,
/// since a layer only wraps what the router already holds.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Merge a module's router at the root
    pub fn merge_module(mut self, module_router: Router) -> Self {
        self.router = self.router.merge(module_router);
        self
    }

    /// Answer unmatched paths, and known paths with an unsupported method
    pub fn with_unmatched_route_fallback(mut self) -> Self {
        self.router = self
            .router
            .fallback(unmatched_route)
            .method_not_allowed_fallback(unmatched_route);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware when a timeout is configured
    pub fn with_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        if let Some(timeout_ms) = timeout_ms {
            self.router = self
                .router
                .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        }
        self
    }

    /// Serve the OpenAPI document merged from all modules at `/docs/openapi.json`
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let document = Arc::new(collect_openapi(registry));
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || {
                let document = Arc::clone(&document);
                async move { Json(document.as_ref().clone()) }
            }),
        );
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge every module's OpenAPI fragment into one document
pub fn collect_openapi(registry: &ModuleRegistry) -> OpenApi {
    let mut document = OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Bookshelf API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Book records service"))
                .build(),
        )
        .build();

    for module in registry.modules() {
        if let Some(fragment) = module.openapi() {
            tracing::debug!(module = module.name(), "merging OpenAPI fragment");
            document.merge(fragment);
        }
    }

    document
}

/// GET and HEAD get the fixed 500 body; other methods get a plain 404.
async fn unmatched_route(method: Method, uri: Uri) -> Response {
    if method == Method::GET || method == Method::HEAD {
        tracing::warn!(path = %uri.path(), "unmatched GET route");
        (StatusCode::INTERNAL_SERVER_ERROR, UNMATCHED_ROUTE_BODY).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            format!("Cannot {} {}", method, uri.path()),
        )
            .into_response()
    }
}

//! Process bootstrap: connection, module registration, serving, shutdown.

use std::sync::Arc;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{
    self,
    books::{
        store::{MongoBookStore, UnavailableBookStore},
        SharedBookStore,
    },
};

/// Run the HTTP service until a shutdown signal arrives.
///
/// A missing or unusable `DB_URL` is logged and does not stop the process;
/// book routes then fail per request.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let mut registry = ModuleRegistry::new();
    let store = open_store(&settings, &mut registry).await;
    modules::register_all(&mut registry, store);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry
        .start_all(&ctx)
        .await
        .context("failed to start modules")?;

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry
        .stop_all()
        .await
        .context("failed to stop modules")?;
    served
}

async fn open_store(settings: &Settings, registry: &mut ModuleRegistry) -> SharedBookStore {
    match bookshelf_db::connect(&settings.database).await {
        Ok(db) => {
            let store: SharedBookStore = Arc::new(MongoBookStore::new(&db));
            registry.register_core(Arc::new(db));
            store
        }
        Err(err) => {
            let reason = format!("{err:#}");
            tracing::error!(error = %reason, "connection error");
            let store: SharedBookStore = Arc::new(UnavailableBookStore::new(reason));
            store
        }
    }
}

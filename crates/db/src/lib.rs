//! Owned MongoDB connection handle.
//!
//! The handle is created once at process start and registered as the core
//! `db` module so that the registry shuts the client down on exit.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::{InitCtx, Module};
use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};

pub use mongodb;

/// Connected client plus the database it resolved to.
#[derive(Clone, Debug)]
pub struct DbHandle {
    client: Client,
    database: Database,
}

/// Build a client from `settings.url`.
///
/// The driver connects lazily; this only fails for a missing or unparsable
/// connection string. Reachability is checked by [`DbHandle::ping`].
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DbHandle> {
    let url = settings
        .url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| anyhow!("DB_URL is not set"))?;

    let client = Client::with_uri_str(url)
        .await
        .context("failed to parse DB_URL")?;
    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(&settings.name));

    tracing::info!(
        target: "bookshelf-db",
        database = %database.name(),
        "document store client created"
    );

    Ok(DbHandle { client, database })
}

impl DbHandle {
    /// Name of the database in use.
    pub fn name(&self) -> &str {
        self.database.name()
    }

    /// Typed handle to a collection in the resolved database.
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.database.collection::<T>(name)
    }

    /// Round-trip a `ping` command to the server.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .context("document store did not answer ping")?;
        Ok(())
    }

    /// Close every pooled connection. Outstanding handles stop working.
    pub async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!(target: "bookshelf-db", "document store connection closed");
    }
}

#[async_trait]
impl Module for DbHandle {
    fn name(&self) -> &'static str {
        "db"
    }

    /// Pings in the background so an unreachable server never blocks start-up.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            match handle.ping().await {
                Ok(()) => tracing::info!(
                    target: "bookshelf-db",
                    database = %handle.name(),
                    "document store is connected"
                ),
                Err(err) => tracing::error!(
                    target: "bookshelf-db",
                    error = %format!("{err:#}"),
                    "connection error"
                ),
            }
        });
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.close().await;
        Ok(())
    }
}

use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Bookshelf service tooling
#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Insert the three sample books; running it twice inserts them twice
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "bookshelf-cli starting");

    match cli.command {
        Command::Serve => bookshelf_app::serve(settings).await,
        Command::Seed => {
            let created = bookshelf_app::seed::run(&settings).await?;
            tracing::info!(count = created.len(), "seed complete");
            Ok(())
        }
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand};

use bookinfo_kernel::settings::Settings;
use bookinfo_service::bootstrap;

/// Operator CLI for the book information service
#[derive(Debug, Parser)]
#[command(name = "bookinfo", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the merged OpenAPI document
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load settings")?;
    let _telemetry = bookinfo_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(env = ?settings.environment, "bookinfo serve");
            bootstrap::serve(settings).await
        }
        Command::Migrate => {
            let applied = bootstrap::migrate(&settings).await?;
            if applied.is_empty() {
                println!("schema is up to date");
            }
            for key in applied {
                println!("applied {}", key);
            }
            Ok(())
        }
        Command::Openapi => {
            let document = bootstrap::openapi_document(&settings).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&document).context("failed to render OpenAPI")?
            );
            Ok(())
        }
    }
}

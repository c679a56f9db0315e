//! Bookshelf catalog server
//!
//! Serves the book catalog over HTTP, backed by a SQLite file in the
//! working directory.
//!
//! Usage:
//!   bookshelf-server --port 3000
//!
//! The port can also be set with the `PORT` environment variable.

use std::sync::Arc;

use anyhow::{Context, Result};
use bookshelf_catalog::BookService;
use bookshelf_server::build_router;
use bookshelf_store::SqliteStore;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Store location. Not configurable.
const DATABASE_PATH: &str = "books.db";

#[derive(Parser, Debug)]
#[command(name = "bookshelf-server")]
#[command(about = "Book catalog HTTP service")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Bookshelf starting...");
    let store = SqliteStore::open(DATABASE_PATH)
        .with_context(|| format!("Failed to open book store at {DATABASE_PATH}"))?;
    let service = BookService::new(Arc::new(store));
    let app = build_router(service);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;
    info!("Bookshelf listening on port {}", args.port);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

use std::net::SocketAddr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scholardex_core::{IndexPaths, SearchEngine};
use scholardex_server::build_app;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "scholardex-server")]
#[command(about = "Serve ranked queries against a finalized index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP query service.
    Serve {
        #[arg(long, default_value = "./index")]
        index: String,
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one query against the index and print ranked hits as JSON.
    Search {
        #[arg(long, default_value = "./index")]
        index: String,
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { index, host, port } => serve(index, host, port),
        Commands::Search { index, query } => search_once(&index, &query),
    }
}

fn serve(index: String, host: String, port: u16) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let app = build_app(&index)?;
        let addr: SocketAddr = format!("{host}:{port}").parse()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "server listening");
        axum::serve(listener, app).await?;
        Ok(())
    })
}

/// The literal CLI surface for the "exits non-zero on missing/corrupt
/// index" contract: unlike the HTTP service, a one-shot query can and
/// does propagate a fatal error straight to the process exit code.
fn search_once(index: &str, query: &str) -> Result<()> {
    let paths = IndexPaths::new(index);
    let engine = SearchEngine::open(&paths)?;
    let hits = engine.search(query)?;

    let json_hits: Vec<serde_json::Value> = hits
        .iter()
        .map(|h| {
            serde_json::json!({
                "doc_id": h.doc_id,
                "score": h.score,
                "path": h.meta.path,
                "url": h.meta.url,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&json_hits)?);
    Ok(())
}

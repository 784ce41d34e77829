use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scholardex_core::finalize::{finalize_doc_map, write_final_index};
use scholardex_core::merge::MergeIter;
use scholardex_core::{IndexError, IndexPaths, Indexer};
use tracing_subscriber::{fmt, EnvFilter};

mod archive;

#[derive(Parser)]
#[command(name = "scholardex-indexer")]
#[command(
    about = "Build an external-memory inverted index from a ZIP archive of HTML documents",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full C1-C5 pipeline: ingest, spill, finalize, merge, write.
    Build {
        /// Path to the input ZIP archive.
        #[arg(long)]
        archive: PathBuf,
        /// Output directory for helper_indexes/ and main_indexes/.
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { archive, output } => build(&archive, &output),
    }
}

fn build(archive_path: &Path, output: &Path) -> Result<()> {
    if !archive_path.is_file() {
        return Err(IndexError::MissingArchive(archive_path.to_path_buf()).into());
    }

    let paths = IndexPaths::new(output);
    let mut indexer = Indexer::new();
    let mut spill_count: u32 = 0;
    let mut spill_err: Option<anyhow::Error> = None;

    let accepted = archive::for_each_document(archive_path, |filename, url, html| {
        if spill_err.is_some() {
            return;
        }
        indexer.ingest_document(filename, url, html);
        if indexer.should_spill() {
            spill_count += 1;
            let timestamp = format!("{spill_count:010}");
            if let Err(e) = indexer.spill(&paths, &timestamp) {
                spill_err = Some(anyhow::Error::from(e).context("spilling partial index"));
            }
        }
    })
    .context("reading archive")?;

    if let Some(e) = spill_err {
        return Err(e);
    }

    if indexer.has_unflushed_documents() {
        spill_count += 1;
        let timestamp = format!("{spill_count:010}");
        indexer
            .spill(&paths, &timestamp)
            .context("spilling final partial index")?;
    }

    tracing::info!(documents = accepted, spills = spill_count, "ingest complete");

    let doc_map = finalize_doc_map(&paths).context("finalizing doc map")?;
    let total_docs = doc_map.len() as u32;

    let mut run_files: Vec<PathBuf> = std::fs::read_dir(paths.main_dir())
        .context("listing partial posting runs")?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with("_search_index.txt"))
                .unwrap_or(false)
        })
        .collect();
    run_files.sort();

    let merge = MergeIter::open(&run_files).context("opening partial runs for merge")?;
    let offsets = write_final_index(merge, total_docs, &paths).context("writing final index")?;

    tracing::info!(terms = offsets.len(), total_docs, "index build complete");
    Ok(())
}

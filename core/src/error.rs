use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or querying an index.
///
/// Ingest-time per-document failures are not represented here: they are
/// logged and skipped by the caller (see `core::ingest`), never bubbled as
/// this type.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("archive not found: {0}")]
    MissingArchive(PathBuf),

    #[error("index artifact missing: {0}\nrun the indexer to build it first")]
    MissingArtifact(PathBuf),

    #[error("index corrupted: term at offset did not match lookup key ({expected:?} != {found:?})\nrebuild the index")]
    Corrupted { expected: String, found: String },

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;

//! C1/C2: per-document ingestion and periodic spill to disk.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};

use tracing::debug;

use crate::error::Result;
use crate::html::weighted_term_frequencies;
use crate::model::{DocId, DocMeta, PartialDocLine, PartialPostingLine, Posting};
use crate::paths::IndexPaths;
use crate::scoring::tf_score;

/// Flush cadence: one spill after every 5000 ingested documents, plus a
/// final spill for whatever remains once the archive is exhausted.
pub const SPILL_EVERY: u32 = 5000;

/// Accumulates doc metadata and term postings in memory, spilling both to
/// a matched pair of partial run files once `SPILL_EVERY` documents have
/// been ingested since the last spill.
#[derive(Debug, Default)]
pub struct Indexer {
    next_doc_id: DocId,
    docs: HashMap<DocId, DocMeta>,
    postings: BTreeMap<String, Vec<Posting>>,
    docs_since_spill: u32,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next doc_id, extracts weighted term frequencies from
    /// `html`, and appends one posting per term. Returns the assigned id.
    pub fn ingest_document(&mut self, path: &str, url: &str, html: &str) -> DocId {
        self.next_doc_id += 1;
        let doc_id = self.next_doc_id;
        self.docs.insert(
            doc_id,
            DocMeta {
                path: path.to_string(),
                url: url.to_string(),
            },
        );

        for (term, weighted_tf) in weighted_term_frequencies(html) {
            if weighted_tf <= 0.0 {
                continue;
            }
            let score = tf_score(weighted_tf);
            self.postings
                .entry(term)
                .or_default()
                .push(Posting { doc_id, score });
        }

        self.docs_since_spill += 1;
        doc_id
    }

    pub fn total_docs(&self) -> u32 {
        self.next_doc_id
    }

    pub fn should_spill(&self) -> bool {
        self.docs_since_spill >= SPILL_EVERY
    }

    pub fn has_unflushed_documents(&self) -> bool {
        self.docs_since_spill > 0
    }

    /// Writes the current in-memory doc map and posting map to one pair of
    /// partial run files under `paths`, timestamped by `timestamp`, then
    /// clears both buffers for the next batch.
    pub fn spill(&mut self, paths: &IndexPaths, timestamp: &str) -> Result<()> {
        fs::create_dir_all(paths.helper_dir())?;
        fs::create_dir_all(paths.main_dir())?;

        let mut doc_file = BufWriter::new(File::create(paths.partial_doc_index(timestamp))?);
        for (&doc_id, meta) in &self.docs {
            serde_json::to_writer(&mut doc_file, &PartialDocLine(doc_id, meta.clone()))?;
            doc_file.write_all(b"\n")?;
        }
        doc_file.flush()?;

        // Partial posting runs must come out sorted by term so the k-way
        // merge can assume it; `postings` is a `BTreeMap`, so iteration
        // order already satisfies that.
        let mut search_file = BufWriter::new(File::create(paths.partial_search_index(timestamp))?);
        for (term, postings) in &self.postings {
            serde_json::to_writer(
                &mut search_file,
                &PartialPostingLine(term.clone(), postings.clone()),
            )?;
            search_file.write_all(b"\n")?;
        }
        search_file.flush()?;

        debug!(
            docs = self.docs.len(),
            terms = self.postings.len(),
            timestamp,
            "spilled partial index run"
        );

        self.docs.clear();
        self.postings.clear();
        self.docs_since_spill = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingesting_assigns_dense_ascending_doc_ids() {
        let mut indexer = Indexer::new();
        let a = indexer.ingest_document("a.html", "http://x/a", "<title>Alpha</title>");
        let b = indexer.ingest_document("b.html", "http://x/b", "<title>Beta</title>");
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(indexer.total_docs(), 2);
    }

    #[test]
    fn spill_clears_buffers_and_writes_sorted_runs() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut indexer = Indexer::new();
        indexer.ingest_document("a.html", "http://x/a", "<title>zebra apple</title>");
        assert!(indexer.has_unflushed_documents());

        indexer.spill(&paths, "0001").unwrap();
        assert!(!indexer.has_unflushed_documents());

        let contents = std::fs::read_to_string(paths.partial_search_index("0001")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("apple"));
        assert!(lines[1].contains("zebra"));
    }
}

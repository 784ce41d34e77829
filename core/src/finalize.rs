//! C3/C5: collapsing partial runs into the two final on-disk artifacts.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};

use tracing::info;

use crate::error::Result;
use crate::merge::MergeIter;
use crate::model::{DocId, DocMeta, PartialDocLine};
use crate::paths::IndexPaths;
use crate::scoring::idf;

/// Posting lists are capped at this many entries per term once idf is
/// computed; ties at the cut line are broken by first occurrence, which
/// falls out of a stable sort.
const MAX_POSTINGS_PER_TERM: usize = 250;

/// C3: merges every partial doc-map run under `helper_indexes/` into one
/// canonical `DocId -> DocMeta` map, persists it as a single JSON object
/// keyed by decimal doc_id, and returns the merged map so the caller can
/// derive the total document count for idf.
pub fn finalize_doc_map(paths: &IndexPaths) -> Result<HashMap<DocId, DocMeta>> {
    let mut merged: HashMap<DocId, DocMeta> = HashMap::new();
    let dir = paths.helper_dir();
    if dir.is_dir() {
        let mut run_files: Vec<_> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with("_doc_index.txt"))
            .collect();
        run_files.sort_by_key(|e| e.file_name());

        for entry in run_files {
            let file = File::open(entry.path())?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let PartialDocLine(doc_id, meta) = serde_json::from_str(&line)?;
                merged.insert(doc_id, meta);
            }
        }
    }

    let string_keyed: BTreeMap<String, &DocMeta> = merged
        .iter()
        .map(|(id, meta)| (id.to_string(), meta))
        .collect();
    let mut out = BufWriter::new(File::create(paths.final_doc_index())?);
    serde_json::to_writer_pretty(&mut out, &string_keyed)?;
    out.flush()?;

    info!(docs = merged.len(), "finalized doc map");
    Ok(merged)
}

/// C5: consumes the merged term stream from `MergeIter`, truncates each
/// term's posting list to its 250 highest scores, computes idf from the
/// pre-truncation document frequency, and writes the final posting file.
/// Returns the term -> starting-byte-offset map, which is also persisted
/// so a later process can reopen the index without re-scanning it.
pub fn write_final_index(
    merge: MergeIter,
    total_docs: u32,
    paths: &IndexPaths,
) -> Result<HashMap<String, u64>> {
    let mut offsets: HashMap<String, u64> = HashMap::new();
    let mut out = BufWriter::new(File::create(paths.final_search_index())?);
    let mut written: u64 = 0;

    for entry in merge {
        let (term, mut postings) = entry?;
        let doc_freq = postings.len();
        if doc_freq == 0 {
            continue;
        }
        let term_idf = idf(total_docs, doc_freq);

        postings.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        postings.truncate(MAX_POSTINGS_PER_TERM);

        let mut line = serde_json::to_string(&crate::model::FinalPostingLine(
            term.clone(),
            postings,
            term_idf,
        ))?;
        line.push('\n');

        offsets.insert(term, written);
        out.write_all(line.as_bytes())?;
        written += line.len() as u64;
    }
    out.flush()?;

    let offsets_file = File::create(paths.final_word_index())?;
    serde_json::to_writer_pretty(offsets_file, &offsets)?;

    info!(terms = offsets.len(), bytes = written, "finalized posting index");
    Ok(offsets)
}
